//! Synchronous client for the BlockScore verification API.
//!
//! # Overview
//! Maps the service's People, Companies, Candidates, QuestionSets and
//! Watchlists resources onto typed request and response structs. Every
//! operation is one authenticated request/response round trip: no caching,
//! no retry, no background work.
//!
//! # Design
//! - `Client` owns its `Config` (API key, protocol version, origin) rather
//!   than reading process-wide state, so clients with different credentials
//!   can coexist.
//! - Requests are built and responses parsed as plain data (`HttpRequest`,
//!   `HttpResponse`); only the `Transport` touches the network. The default
//!   transport is a blocking `ureq` agent.
//! - Failures are split into `Error::{Configuration, Transport, Api, Decode}`.
//!
//! ```no_run
//! use blockscore::{Client, CompanyParams};
//!
//! let client = Client::from_env()?;
//! let company = client.companies().create(&CompanyParams {
//!     entity_name: "Acme".to_string(),
//!     tax_id: "12-3456789".to_string(),
//!     ..CompanyParams::default()
//! })?;
//! println!("{} is {}", company.id, company.status);
//! # Ok::<(), blockscore::Error>(())
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod params;
pub mod resources;

pub use client::Client;
pub use config::{Config, API_URL, DEFAULT_VERSION};
pub use error::{ApiError, Error};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
pub use params::Params;
pub use resources::{
    Answer, AnswerChoice, Candidate, CandidateParams, Company, CompanyDetails, CompanyParams,
    ListOptions, Match, Person, PersonDetails, PersonParams, Question, QuestionSet,
    QuestionSetParams, Watchlist, WatchlistParams,
};
