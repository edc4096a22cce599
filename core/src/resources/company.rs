//! Company verification: `/companies`.

use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::error::Error;
use crate::http::{HttpMethod, Transport};
use crate::params::{escape_segment, Params};
use crate::resources::list::{ListOptions, ListResponse};
use crate::resources::nullable;

/// A verified company record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Company {
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
    pub entity_name: String,
    #[serde(deserialize_with = "nullable")]
    pub tax_id: String,
    pub incorporation_date: Option<String>,
    pub incorporation_state: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub incorporation_country_code: String,
    #[serde(deserialize_with = "nullable")]
    pub incorporation_type: String,
    pub dbas: Option<String>,
    pub registration_number: Option<String>,
    pub email: Option<String>,
    pub url: Option<String>,
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
    pub details: CompanyDetails,
}

/// Per-check verification outcome, e.g. `match` / `no_match`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyDetails {
    #[serde(deserialize_with = "nullable")]
    pub entity_name: String,
    #[serde(deserialize_with = "nullable")]
    pub tax_id: String,
    #[serde(deserialize_with = "nullable")]
    pub ofac: String,
}

/// Input for `Companies::create`. Empty strings and `None` are sent as
/// empty values, which the service treats as "not provided".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyParams {
    pub entity_name: String,
    pub tax_id: String,
    pub incorporation_state: String,
    pub incorporation_country_code: String,
    /// e.g. `corporation`, `llc`, `partnership`.
    pub incorporation_type: String,
    pub incorporation_day: Option<u8>,
    pub incorporation_month: Option<u8>,
    pub incorporation_year: Option<u16>,
    pub dbas: String,
    pub registration_number: String,
    pub email: String,
    pub url: String,
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

impl CompanyParams {
    pub fn to_params(&self) -> Params {
        let mut params = Params::new();
        params
            .insert("entity_name", &self.entity_name)
            .insert("tax_id", &self.tax_id)
            .insert("incorporation_state", &self.incorporation_state)
            .insert("incorporation_country_code", &self.incorporation_country_code)
            .insert("incorporation_type", &self.incorporation_type)
            .insert_opt("incorporation_day", self.incorporation_day)
            .insert_opt("incorporation_month", self.incorporation_month)
            .insert_opt("incorporation_year", self.incorporation_year)
            .insert("dbas", &self.dbas)
            .insert("registration_number", &self.registration_number)
            .insert("email", &self.email)
            .insert("url", &self.url)
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

/// Handle for the `/companies` resource.
pub struct Companies<'a, T> {
    client: &'a Client<T>,
}

impl<'a, T: Transport> Companies<'a, T> {
    pub(crate) fn new(client: &'a Client<T>) -> Self {
        Self { client }
    }

    /// Run a verification on a new company.
    pub fn create(&self, params: &CompanyParams) -> Result<Company, Error> {
        self.client
            .execute(HttpMethod::Post, "/companies", &params.to_params())
    }

    /// Fetch a company exactly as it was when created.
    pub fn retrieve(&self, id: &str) -> Result<Company, Error> {
        let path = format!("/companies/{}", escape_segment(id));
        self.client.execute(HttpMethod::Get, &path, &Params::new())
    }

    /// The most recent 25 companies.
    pub fn list(&self) -> Result<Vec<Company>, Error> {
        self.list_with(ListOptions::default())
    }

    pub fn list_with(&self, options: ListOptions) -> Result<Vec<Company>, Error> {
        let list: ListResponse<Company> =
            self.client
                .execute(HttpMethod::Get, "/companies", &options.to_params())?;
        Ok(list.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::{client, StubTransport};

    fn acme() -> CompanyParams {
        CompanyParams {
            entity_name: "Acme".to_string(),
            tax_id: "12-3456789".to_string(),
            incorporation_country_code: "US".to_string(),
            incorporation_type: "corporation".to_string(),
            address_street1: "1 Infinite Loop".to_string(),
            address_city: "Cupertino".to_string(),
            address_subdivision: "CA".to_string(),
            address_postal_code: "95014".to_string(),
            address_country_code: "US".to_string(),
            ..CompanyParams::default()
        }
    }

    #[test]
    fn create_decodes_created_company() {
        let transport = StubTransport::replying(
            201,
            r#"{"id":"co_1","entity_name":"Acme","status":"valid"}"#,
        );
        let company = client(&transport).companies().create(&acme()).unwrap();
        assert_eq!(company.id, "co_1");
        assert_eq!(company.status, "valid");
        assert_eq!(company.entity_name, "Acme");

        let req = transport.last();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "https://api.blockscore.com/companies");
        let body = req.body.unwrap();
        assert!(body.contains("entity_name=Acme"));
        assert!(body.contains("tax_id=12-3456789"));
    }

    #[test]
    fn unset_optional_fields_are_sent_as_empty_strings() {
        let params = CompanyParams::default().to_params();
        assert_eq!(params.len(), 21);
        for (key, value) in params.iter() {
            assert_eq!(value, "", "{key} should be empty");
        }
        assert_eq!(params.get("incorporation_day"), Some(""));
        assert_eq!(params.get("incorporation_year"), Some(""));
    }

    #[test]
    fn incorporation_date_parts_are_stringified() {
        let params = CompanyParams {
            incorporation_day: Some(7),
            incorporation_month: Some(3),
            incorporation_year: Some(1980),
            ..acme()
        }
        .to_params();
        assert_eq!(params.get("incorporation_day"), Some("7"));
        assert_eq!(params.get("incorporation_month"), Some("3"));
        assert_eq!(params.get("incorporation_year"), Some("1980"));
    }

    #[test]
    fn retrieve_escapes_id() {
        let transport = StubTransport::replying(200, r#"{"id":"co 1"}"#);
        let company = client(&transport).companies().retrieve("co 1").unwrap();
        assert_eq!(company.id, "co 1");
        assert_eq!(transport.last().url, "https://api.blockscore.com/companies/co+1");
    }

    #[test]
    fn list_defaults_to_25() {
        let transport = StubTransport::replying(
            200,
            r#"{"object":"list","data":[{"id":"co_1"},{"id":"co_2"}]}"#,
        );
        let companies = client(&transport).companies().list().unwrap();
        assert_eq!(companies.len(), 2);
        assert_eq!(
            transport.last().url,
            "https://api.blockscore.com/companies?count=25&offset=0"
        );
    }

    #[test]
    fn list_with_passes_count_and_offset() {
        let transport = StubTransport::replying(200, r#"{"object":"list","data":[]}"#);
        let companies = client(&transport)
            .companies()
            .list_with(ListOptions::new(10, 5))
            .unwrap();
        assert!(companies.is_empty());
        assert!(transport.last().url.ends_with("?count=10&offset=5"));
    }

    #[test]
    fn create_tolerates_null_address() {
        let transport = StubTransport::replying(
            201,
            r#"{"id":"co_1","status":"valid","address_street1":null,"address_city":null,
                "incorporation_country_code":null,"details":null}"#,
        );
        let company = client(&transport).companies().create(&acme()).unwrap();
        assert_eq!(company.id, "co_1");
        assert_eq!(company.address_street1, "");
        assert_eq!(company.details, CompanyDetails::default());
    }

    #[test]
    fn null_optional_fields_decode() {
        let company: Company = serde_json::from_str(
            r#"{"id":"co_1","dbas":null,"note":null,"details":{"ofac":"no_match"},"unknown":1}"#,
        )
        .unwrap();
        assert_eq!(company.dbas, None);
        assert_eq!(company.details.ofac, "no_match");
    }
}
