//! Watchlist candidates: `/candidates`.
//!
//! Candidates are individuals queued for one-off watchlist scans or for
//! continuous re-scanning. Besides create/retrieve/list they can be updated,
//! deleted, and inspected through their revision history and past hits.

use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::error::Error;
use crate::http::{HttpMethod, Transport};
use crate::params::{escape_segment, Params};
use crate::resources::list::{ListOptions, ListResponse};
use crate::resources::nullable;
use crate::resources::watchlist::Match;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Candidate {
    #[serde(deserialize_with = "nullable")]
    pub object: String,
    #[serde(deserialize_with = "nullable")]
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub created_at: i64,
    #[serde(deserialize_with = "nullable")]
    pub updated_at: i64,
    #[serde(deserialize_with = "nullable")]
    pub livemode: bool,
    pub note: Option<String>,
    pub ssn: Option<String>,
    pub passport: Option<String>,
    pub date_of_birth: Option<String>,
    pub name_first: Option<String>,
    pub name_middle: Option<String>,
    pub name_last: Option<String>,
    pub address_street1: Option<String>,
    pub address_street2: Option<String>,
    pub address_city: Option<String>,
    pub address_subdivision: Option<String>,
    pub address_postal_code: Option<String>,
    pub address_country_code: Option<String>,
}

/// Input for `Candidates::create` and `Candidates::update`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateParams {
    pub note: String,
    pub ssn: String,
    pub passport: String,
    /// `YYYY-MM-DD`.
    pub date_of_birth: String,
    pub name_first: String,
    pub name_middle: String,
    pub name_last: String,
    pub address_street1: String,
    pub address_street2: String,
    pub address_city: String,
    pub address_subdivision: String,
    pub address_postal_code: String,
    pub address_country_code: String,
}

impl CandidateParams {
    pub fn to_params(&self) -> Params {
        let mut params = Params::new();
        params
            .insert("note", &self.note)
            .insert("ssn", &self.ssn)
            .insert("passport", &self.passport)
            .insert("date_of_birth", &self.date_of_birth)
            .insert("name_first", &self.name_first)
            .insert("name_middle", &self.name_middle)
            .insert("name_last", &self.name_last)
            .insert("address_street1", &self.address_street1)
            .insert("address_street2", &self.address_street2)
            .insert("address_city", &self.address_city)
            .insert("address_subdivision", &self.address_subdivision)
            .insert("address_postal_code", &self.address_postal_code)
            .insert("address_country_code", &self.address_country_code);
        params
    }
}

/// Handle for the `/candidates` resource.
pub struct Candidates<'a, T> {
    client: &'a Client<T>,
}

impl<'a, T: Transport> Candidates<'a, T> {
    pub(crate) fn new(client: &'a Client<T>) -> Self {
        Self { client }
    }

    pub fn create(&self, params: &CandidateParams) -> Result<Candidate, Error> {
        self.client
            .execute(HttpMethod::Post, "/candidates", &params.to_params())
    }

    pub fn retrieve(&self, id: &str) -> Result<Candidate, Error> {
        self.client
            .execute(HttpMethod::Get, &candidate_path(id), &Params::new())
    }

    /// Replace the candidate's fields. The previous revision stays visible
    /// through `history`.
    pub fn update(&self, id: &str, params: &CandidateParams) -> Result<Candidate, Error> {
        self.client
            .execute(HttpMethod::Patch, &candidate_path(id), &params.to_params())
    }

    /// Remove the candidate from future re-scans. Returns the deleted record.
    pub fn delete(&self, id: &str) -> Result<Candidate, Error> {
        self.client
            .execute(HttpMethod::Delete, &candidate_path(id), &Params::new())
    }

    /// Every revision of the candidate, newest first.
    pub fn history(&self, id: &str) -> Result<Vec<Candidate>, Error> {
        let path = format!("{}/history", candidate_path(id));
        self.client.execute(HttpMethod::Get, &path, &Params::new())
    }

    /// Watchlist matches recorded for the candidate by past searches.
    pub fn hits(&self, id: &str) -> Result<Vec<Match>, Error> {
        let path = format!("{}/hits", candidate_path(id));
        let list: ListResponse<Match> = self.client.execute(HttpMethod::Get, &path, &Params::new())?;
        Ok(list.data)
    }

    pub fn list(&self) -> Result<Vec<Candidate>, Error> {
        self.list_with(ListOptions::default())
    }

    pub fn list_with(&self, options: ListOptions) -> Result<Vec<Candidate>, Error> {
        let list: ListResponse<Candidate> =
            self.client
                .execute(HttpMethod::Get, "/candidates", &options.to_params())?;
        Ok(list.data)
    }
}

fn candidate_path(id: &str) -> String {
    format!("/candidates/{}", escape_segment(id))
}
