//! Authenticated request executor for the BlockScore API.
//!
//! # Design
//! `Client` owns a `Config` and a `Transport`. Every call goes through the
//! same three steps: `build_request` turns a method, path and parameter set
//! into an `HttpRequest`, the transport performs one round trip, and
//! `parse_response` decodes the body or maps the status to `Error::Api`.
//! The build and parse halves are pure, so they can be exercised without a
//! network. Resource handles (`people()`, `companies()`, ...) borrow the
//! client and only decide paths and parameters.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::Config;
use crate::error::{ApiError, Error};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
use crate::params::Params;
use crate::resources::{Candidates, Companies, People, QuestionSets, Watchlists};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Synchronous client for the BlockScore API.
#[derive(Debug, Clone)]
pub struct Client<T = UreqTransport> {
    config: Config,
    transport: T,
}

impl Client<UreqTransport> {
    pub fn new(config: Config) -> Self {
        Self::with_transport(config, UreqTransport::new())
    }

    /// Build a client from `BLOCKSCORE_API_KEY` and friends.
    pub fn from_env() -> Result<Self, Error> {
        Ok(Self::new(Config::from_env()?))
    }
}

impl<T: Transport> Client<T> {
    pub fn with_transport(config: Config, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Select the protocol revision used from the next request on.
    pub fn set_version(&mut self, version: u32) {
        self.config.version = version;
    }

    pub fn set_api_key(&mut self, api_key: impl Into<String>) {
        self.config.api_key = api_key.into().trim().to_string();
    }

    pub fn people(&self) -> People<'_, T> {
        People::new(self)
    }

    pub fn companies(&self) -> Companies<'_, T> {
        Companies::new(self)
    }

    pub fn candidates(&self) -> Candidates<'_, T> {
        Candidates::new(self)
    }

    pub fn question_sets(&self) -> QuestionSets<'_, T> {
        QuestionSets::new(self)
    }

    pub fn watchlists(&self) -> Watchlists<'_, T> {
        Watchlists::new(self)
    }

    /// Perform one authenticated round trip and decode the result as `R`.
    pub fn execute<R: DeserializeOwned>(
        &self,
        method: HttpMethod,
        path: &str,
        params: &Params,
    ) -> Result<R, Error> {
        let request = self.build_request(method, path, params)?;
        tracing::debug!(%method, url = %request.url, "sending BlockScore request");

        let response = self.transport.send(&request).map_err(|err| {
            tracing::debug!(%method, path, error = %err, "BlockScore request failed");
            err
        })?;
        tracing::debug!(%method, path, status = response.status, "BlockScore response received");

        self.parse_response(response)
    }

    /// Build the `HttpRequest` for `method path` without sending it.
    ///
    /// Fails with `Error::Configuration` when the key is blank, the version
    /// is zero or the base URL cannot be parsed.
    pub fn build_request(
        &self,
        method: HttpMethod,
        path: &str,
        params: &Params,
    ) -> Result<HttpRequest, Error> {
        self.config.validate()?;

        let mut url = Url::parse(&self.config.base_url).map_err(|e| {
            Error::Configuration(format!("invalid base URL {:?}: {e}", self.config.base_url))
        })?;
        let prefix = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{prefix}{path}"));

        let mut headers = vec![
            ("accept".to_string(), self.config.accept_header()),
            ("authorization".to_string(), basic_auth(&self.config.api_key)),
        ];

        let body = if method.has_body() {
            let body = params.encode();
            headers.push(("content-type".to_string(), FORM_CONTENT_TYPE.to_string()));
            headers.push(("content-length".to_string(), body.len().to_string()));
            Some(body)
        } else {
            if !params.is_empty() {
                url.set_query(Some(&params.encode()));
            }
            None
        };

        Ok(HttpRequest {
            method,
            url: url.into(),
            headers,
            body,
        })
    }

    /// Decode a response: JSON into `R` on 200/201, `Error::Api` otherwise.
    pub fn parse_response<R: DeserializeOwned>(&self, response: HttpResponse) -> Result<R, Error> {
        if !response.is_success() {
            let err = ApiError::from_body(response.status, &response.body);
            tracing::warn!(
                status = err.status,
                code = %err.code,
                message = %err.message,
                "BlockScore API returned an error"
            );
            return Err(Error::Api(err));
        }
        serde_json::from_str(&response.body).map_err(|e| Error::Decode(e.to_string()))
    }
}

/// `Authorization` value for HTTP Basic with the key as username and an
/// empty password.
fn basic_auth(api_key: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{api_key}:")))
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use serde::Deserialize;

    use super::*;

    /// Transport that records requests and replays canned responses.
    #[derive(Default)]
    pub(crate) struct StubTransport {
        responses: Mutex<Vec<HttpResponse>>,
        pub(crate) sent: Mutex<Vec<HttpRequest>>,
    }

    impl StubTransport {
        pub(crate) fn replying(status: u16, body: &str) -> Self {
            Self {
                responses: Mutex::new(vec![HttpResponse::new(status, body)]),
                sent: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn calls(&self) -> usize {
            self.sent.lock().unwrap().len()
        }

        pub(crate) fn last(&self) -> HttpRequest {
            self.sent.lock().unwrap().last().cloned().expect("no request sent")
        }
    }

    impl Transport for StubTransport {
        fn send(&self, request: &HttpRequest) -> Result<HttpResponse, Error> {
            self.sent.lock().unwrap().push(request.clone());
            self.responses
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| Error::Transport("no canned response".to_string()))
        }
    }

    pub(crate) fn client(transport: &StubTransport) -> Client<&StubTransport> {
        Client::with_transport(Config::new("sk_test_key"), transport)
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Echo {
        id: String,
    }

    #[test]
    fn get_puts_params_in_query() {
        let transport = StubTransport::default();
        let params: Params = [("count", "10"), ("offset", "5")].into_iter().collect();
        let req = client(&transport)
            .build_request(HttpMethod::Get, "/companies", &params)
            .unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "https://api.blockscore.com/companies?count=10&offset=5");
        assert!(req.body.is_none());
        assert_eq!(req.header("content-type"), None);
    }

    #[test]
    fn get_without_params_has_no_query() {
        let transport = StubTransport::default();
        let req = client(&transport)
            .build_request(HttpMethod::Get, "/people/p_1", &Params::new())
            .unwrap();
        assert_eq!(req.url, "https://api.blockscore.com/people/p_1");
    }

    #[test]
    fn post_puts_params_in_form_body() {
        let transport = StubTransport::default();
        let params: Params = [("candidate_id", "cand 1"), ("match_type", "")]
            .into_iter()
            .collect();
        let req = client(&transport)
            .build_request(HttpMethod::Post, "/watchlists", &params)
            .unwrap();
        assert_eq!(req.url, "https://api.blockscore.com/watchlists");
        assert_eq!(req.body.as_deref(), Some("candidate_id=cand+1&match_type="));
        assert_eq!(req.header("content-type"), Some(FORM_CONTENT_TYPE));
        assert_eq!(req.header("content-length"), Some("31"));
    }

    #[test]
    fn accept_header_carries_version() {
        let transport = StubTransport::default();
        let mut client = client(&transport);
        let req = client
            .build_request(HttpMethod::Get, "/people", &Params::new())
            .unwrap();
        assert_eq!(
            req.header("accept"),
            Some("application/vnd.blockscore+json;version=4")
        );

        client.set_version(3);
        let req = client
            .build_request(HttpMethod::Get, "/people", &Params::new())
            .unwrap();
        assert_eq!(
            req.header("accept"),
            Some("application/vnd.blockscore+json;version=3")
        );
    }

    #[test]
    fn basic_auth_uses_key_with_empty_password() {
        let transport = StubTransport::default();
        let req = client(&transport)
            .build_request(HttpMethod::Get, "/people", &Params::new())
            .unwrap();
        // base64("sk_test_key:")
        assert_eq!(req.header("authorization"), Some("Basic c2tfdGVzdF9rZXk6"));
    }

    #[test]
    fn base_url_override_is_used() {
        let transport = StubTransport::default();
        let config = Config::new("k").with_base_url("http://127.0.0.1:3000/");
        let req = Client::with_transport(config, &transport)
            .build_request(HttpMethod::Delete, "/candidates/c_1", &Params::new())
            .unwrap();
        assert_eq!(req.url, "http://127.0.0.1:3000/candidates/c_1");
        assert!(req.body.is_none());
    }

    #[test]
    fn base_url_path_prefix_is_kept() {
        let transport = StubTransport::default();
        let config = Config::new("k").with_base_url("http://gateway.local/blockscore/");
        let req = Client::with_transport(config, &transport)
            .build_request(HttpMethod::Get, "/people/p_1", &Params::new())
            .unwrap();
        assert_eq!(req.url, "http://gateway.local/blockscore/people/p_1");
    }

    #[test]
    fn transport_accessor_sees_sent_requests() {
        let transport = StubTransport::replying(200, r#"{"id":"x"}"#);
        let client = client(&transport);
        client
            .execute::<Echo>(HttpMethod::Get, "/people/x", &Params::new())
            .unwrap();
        assert_eq!(client.transport().calls(), 1);
        assert_eq!(client.transport().last().url, "https://api.blockscore.com/people/x");
    }

    #[test]
    fn malformed_base_url_is_configuration_error() {
        let transport = StubTransport::default();
        let config = Config::new("k").with_base_url("not a url");
        let err = Client::with_transport(config, &transport)
            .execute::<Echo>(HttpMethod::Get, "/people", &Params::new())
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert_eq!(transport.calls(), 0);
    }

    #[test]
    fn empty_key_fails_before_any_network_call() {
        let transport = StubTransport::replying(200, r#"{"id":"x"}"#);
        let mut client = client(&transport);
        client.set_api_key("");
        let err = client
            .execute::<Echo>(HttpMethod::Get, "/people", &Params::new())
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert_eq!(transport.calls(), 0);
    }

    #[test]
    fn success_body_is_decoded() {
        for status in [200, 201] {
            let transport = StubTransport::replying(status, r#"{"id":"co_1","extra":true}"#);
            let echo: Echo = client(&transport)
                .execute(HttpMethod::Get, "/companies/co_1", &Params::new())
                .unwrap();
            assert_eq!(echo, Echo { id: "co_1".to_string() });
            assert_eq!(transport.calls(), 1);
        }
    }

    #[test]
    fn non_success_status_is_api_error() {
        let transport = StubTransport::replying(
            404,
            r#"{"error":{"code":"not_found","message":"Company not found","param":"id","type":"invalid_request_error"}}"#,
        );
        let err = client(&transport)
            .execute::<Echo>(HttpMethod::Get, "/companies/nope", &Params::new())
            .unwrap_err();
        let api = err.api_error().expect("expected Api error");
        assert_eq!(api.status, 404);
        assert_eq!(api.message, "Company not found");
        assert_eq!(api.param, "id");
        assert_eq!(transport.calls(), 1);
    }

    #[test]
    fn error_body_is_not_decoded_as_payload() {
        // A 204 body that happens to match the payload shape is still an error.
        let transport = StubTransport::replying(204, r#"{"id":"co_1"}"#);
        let err = client(&transport)
            .execute::<Echo>(HttpMethod::Get, "/companies/co_1", &Params::new())
            .unwrap_err();
        assert!(matches!(err, Error::Api(ApiError { status: 204, .. })));
    }

    #[test]
    fn bad_json_is_decode_error() {
        let transport = StubTransport::replying(200, "not json");
        let err = client(&transport)
            .execute::<Echo>(HttpMethod::Get, "/people/p_1", &Params::new())
            .unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn transport_failure_is_surfaced_unchanged() {
        let transport = StubTransport::default();
        let err = client(&transport)
            .execute::<Echo>(HttpMethod::Get, "/people/p_1", &Params::new())
            .unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
        assert_eq!(transport.calls(), 1);
    }
}
