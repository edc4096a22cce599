//! Domestic identity verification: `/people`.

use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::error::Error;
use crate::http::{HttpMethod, Transport};
use crate::params::{escape_segment, Params};
use crate::resources::list::{ListOptions, ListResponse};
use crate::resources::nullable;

/// A verified person.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Person {
    #[serde(deserialize_with = "nullable")]
    pub object: String,
    #[serde(deserialize_with = "nullable")]
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub created_at: i64,
    #[serde(deserialize_with = "nullable")]
    pub updated_at: i64,
    /// `valid` or `invalid`.
    #[serde(deserialize_with = "nullable")]
    pub status: String,
    #[serde(deserialize_with = "nullable")]
    pub livemode: bool,
    #[serde(deserialize_with = "nullable")]
    pub name_first: String,
    pub name_middle: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub name_last: String,
    #[serde(deserialize_with = "nullable")]
    pub document_type: String,
    #[serde(deserialize_with = "nullable")]
    pub document_value: String,
    pub birth_day: Option<u8>,
    pub birth_month: Option<u8>,
    pub birth_year: Option<u16>,
    pub phone_number: Option<String>,
    pub ip_address: Option<String>,
    pub note: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub address_street1: String,
    pub address_street2: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub address_city: String,
    #[serde(deserialize_with = "nullable")]
    pub address_subdivision: String,
    #[serde(deserialize_with = "nullable")]
    pub address_postal_code: String,
    #[serde(deserialize_with = "nullable")]
    pub address_country_code: String,
    #[serde(deserialize_with = "nullable")]
    pub details: PersonDetails,
    /// Ids of question sets created for this person.
    #[serde(deserialize_with = "nullable")]
    pub question_sets: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonDetails {
    #[serde(deserialize_with = "nullable")]
    pub address: String,
    #[serde(deserialize_with = "nullable")]
    pub address_risk: String,
    #[serde(deserialize_with = "nullable")]
    pub identification: String,
    #[serde(deserialize_with = "nullable")]
    pub date_of_birth: String,
    #[serde(deserialize_with = "nullable")]
    pub ofac: String,
    #[serde(deserialize_with = "nullable")]
    pub pep: String,
}

/// Input for `People::create`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonParams {
    pub name_first: String,
    pub name_middle: String,
    pub name_last: String,
    /// `ssn`, `passport`, `drivers_license`, ...
    pub document_type: String,
    pub document_value: String,
    pub birth_day: Option<u8>,
    pub birth_month: Option<u8>,
    pub birth_year: Option<u16>,
    pub phone_number: String,
    pub ip_address: String,
    pub note: String,
    pub address_street1: String,
    pub address_street2: String,
    pub address_city: String,
    pub address_subdivision: String,
    pub address_postal_code: String,
    pub address_country_code: String,
}

impl PersonParams {
    pub fn to_params(&self) -> Params {
        let mut params = Params::new();
        params
            .insert("name_first", &self.name_first)
            .insert("name_middle", &self.name_middle)
            .insert("name_last", &self.name_last)
            .insert("document_type", &self.document_type)
            .insert("document_value", &self.document_value)
            .insert_opt("birth_day", self.birth_day)
            .insert_opt("birth_month", self.birth_month)
            .insert_opt("birth_year", self.birth_year)
            .insert("phone_number", &self.phone_number)
            .insert("ip_address", &self.ip_address)
            .insert("note", &self.note)
            .insert("address_street1", &self.address_street1)
            .insert("address_street2", &self.address_street2)
            .insert("address_city", &self.address_city)
            .insert("address_subdivision", &self.address_subdivision)
            .insert("address_postal_code", &self.address_postal_code)
            .insert("address_country_code", &self.address_country_code);
        params
    }
}

/// Handle for the `/people` resource.
pub struct People<'a, T> {
    client: &'a Client<T>,
}

impl<'a, T: Transport> People<'a, T> {
    pub(crate) fn new(client: &'a Client<T>) -> Self {
        Self { client }
    }

    pub fn create(&self, params: &PersonParams) -> Result<Person, Error> {
        self.client
            .execute(HttpMethod::Post, "/people", &params.to_params())
    }

    pub fn retrieve(&self, id: &str) -> Result<Person, Error> {
        let path = format!("/people/{}", escape_segment(id));
        self.client.execute(HttpMethod::Get, &path, &Params::new())
    }

    pub fn list(&self) -> Result<Vec<Person>, Error> {
        self.list_with(ListOptions::default())
    }

    pub fn list_with(&self, options: ListOptions) -> Result<Vec<Person>, Error> {
        let list: ListResponse<Person> =
            self.client
                .execute(HttpMethod::Get, "/people", &options.to_params())?;
        Ok(list.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::{client, StubTransport};

    #[test]
    fn create_posts_form_and_decodes_person() {
        let transport = StubTransport::replying(
            201,
            r#"{"object":"person","id":"p_1","status":"valid","name_first":"John","name_last":"Doe",
                "birth_day":23,"birth_month":8,"birth_year":1980,
                "details":{"address":"mismatch","ofac":"no_match"},"question_sets":["qs_1"]}"#,
        );
        let params = PersonParams {
            name_first: "John".to_string(),
            name_last: "Doe".to_string(),
            document_type: "ssn".to_string(),
            document_value: "0000".to_string(),
            birth_day: Some(23),
            birth_month: Some(8),
            birth_year: Some(1980),
            address_country_code: "US".to_string(),
            ..PersonParams::default()
        };
        let person = client(&transport).people().create(&params).unwrap();
        assert_eq!(person.id, "p_1");
        assert_eq!(person.birth_year, Some(1980));
        assert_eq!(person.details.address, "mismatch");
        assert_eq!(person.question_sets, vec!["qs_1".to_string()]);

        let req = transport.last();
        assert_eq!(req.url, "https://api.blockscore.com/people");
        let body = req.body.unwrap();
        assert!(body.contains("birth_day=23"));
        assert!(body.contains("name_middle=&"));
    }

    #[test]
    fn unset_birth_date_is_empty_not_zero() {
        let params = PersonParams::default().to_params();
        assert_eq!(params.get("birth_day"), Some(""));
        assert_eq!(params.get("birth_month"), Some(""));
        assert_eq!(params.get("birth_year"), Some(""));
    }

    #[test]
    fn retrieve_uses_id_path() {
        let transport = StubTransport::replying(200, r#"{"id":"p_1"}"#);
        client(&transport).people().retrieve("p_1").unwrap();
        let req = transport.last();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "https://api.blockscore.com/people/p_1");
    }

    #[test]
    fn payment_required_surfaces_api_error() {
        let transport = StubTransport::replying(
            402,
            r#"{"error":{"code":"insufficient_funds","message":"Payment required"}}"#,
        );
        let err = client(&transport).people().list().unwrap_err();
        assert_eq!(err.api_error().map(|e| e.status), Some(402));
        assert_eq!(err.to_string(), "Payment required");
    }
}
