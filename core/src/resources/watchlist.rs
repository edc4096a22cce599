//! Global watchlist search: `POST /watchlists`.

use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::error::Error;
use crate::http::{HttpMethod, Transport};
use crate::params::Params;
use crate::resources::nullable;

/// Threshold sent when the caller leaves `similarity_threshold` unset.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.7;

/// Result of a watchlist search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Watchlist {
    #[serde(deserialize_with = "nullable")]
    pub object: String,
    #[serde(deserialize_with = "nullable")]
    pub livemode: bool,
    #[serde(deserialize_with = "nullable")]
    pub searched_lists: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub matches: Vec<Match>,
}

/// One watchlist entry matching the candidate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Match {
    #[serde(deserialize_with = "nullable")]
    pub watchlist_name: String,
    #[serde(deserialize_with = "nullable")]
    pub matching_info: Vec<String>,
    pub confidence: Option<f64>,
    pub name_full: Option<String>,
    pub alternate_names: Option<String>,
    pub date_of_birth: Option<String>,
    pub ssn: Option<String>,
    pub passport: Option<String>,
    pub address_raw: Option<String>,
    pub address_street1: Option<String>,
    pub address_city: Option<String>,
    pub address_state: Option<String>,
    pub address_postal_code: Option<String>,
    pub address_country_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchlistParams {
    pub candidate_id: String,
    /// `person` or `company` restricts the search to that entity kind;
    /// empty searches both.
    pub match_type: String,
    /// Matches below this confidence are filtered out by the service.
    /// 1.0 means exact matches only, 0.0 is lenient.
    pub similarity_threshold: Option<f64>,
}

impl WatchlistParams {
    pub fn to_params(&self) -> Params {
        let threshold = self
            .similarity_threshold
            .unwrap_or(DEFAULT_SIMILARITY_THRESHOLD);
        let mut params = Params::new();
        params
            .insert("candidate_id", &self.candidate_id)
            .insert("match_type", &self.match_type)
            .insert("similarity_threshold", threshold.to_string());
        params
    }
}

/// Handle for the `/watchlists` resource.
pub struct Watchlists<'a, T> {
    client: &'a Client<T>,
}

impl<'a, T: Transport> Watchlists<'a, T> {
    pub(crate) fn new(client: &'a Client<T>) -> Self {
        Self { client }
    }

    /// Search every watchlist for the given candidate.
    pub fn search(&self, params: &WatchlistParams) -> Result<Watchlist, Error> {
        self.client
            .execute(HttpMethod::Post, "/watchlists", &params.to_params())
    }
}
