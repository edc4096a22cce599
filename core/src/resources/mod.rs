//! Typed handles for each BlockScore resource.
//!
//! Every handle borrows a `Client`, turns a typed parameter struct into a
//! `Params`, picks the method and path, and hands the call to the executor.
//! Errors come back unchanged.

pub mod candidate;
pub mod company;
pub mod list;
pub mod person;
pub mod question_set;
pub mod watchlist;

pub use candidate::{Candidate, CandidateParams, Candidates};
pub use company::{Company, CompanyDetails, CompanyParams, Companies};
pub use list::{ListOptions, DEFAULT_PAGE_SIZE};
pub use person::{People, Person, PersonDetails, PersonParams};
pub use question_set::{
    Answer, AnswerChoice, Question, QuestionSet, QuestionSetParams, QuestionSets,
};
pub use watchlist::{Match, Watchlist, WatchlistParams, Watchlists, DEFAULT_SIMILARITY_THRESHOLD};

use serde::{Deserialize, Deserializer};

/// Decode `null` as the field's default. The service answers `null` for any
/// field that was submitted empty.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
