//! Knowledge-based authentication: `/question_sets`.

use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::error::Error;
use crate::http::{HttpMethod, Transport};
use crate::params::{escape_segment, Params};
use crate::resources::list::{ListOptions, ListResponse};
use crate::resources::nullable;

/// Out-of-wallet questions generated for a verified person.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestionSet {
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
    #[serde(deserialize_with = "nullable")]
    pub person_id: String,
    /// Seconds the person has to answer.
    #[serde(deserialize_with = "nullable")]
    pub time_limit: u32,
    #[serde(deserialize_with = "nullable")]
    pub expired: bool,
    /// Percentage of correct answers; `None` until scored.
    pub score: Option<f64>,
    #[serde(deserialize_with = "nullable")]
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Question {
    #[serde(deserialize_with = "nullable")]
    pub id: u32,
    #[serde(deserialize_with = "nullable")]
    pub question: String,
    #[serde(deserialize_with = "nullable")]
    pub answers: Vec<AnswerChoice>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerChoice {
    #[serde(deserialize_with = "nullable")]
    pub id: u32,
    #[serde(deserialize_with = "nullable")]
    pub answer: String,
}

/// Input for `QuestionSets::create`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestionSetParams {
    pub person_id: String,
    /// `None` lets the service apply its default limit.
    pub time_limit: Option<u32>,
}

impl QuestionSetParams {
    pub fn to_params(&self) -> Params {
        let mut params = Params::new();
        params
            .insert("person_id", &self.person_id)
            .insert_opt("time_limit", self.time_limit);
        params
    }
}

/// The answer picked for one question when scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Answer {
    pub question_id: u32,
    pub answer_id: u32,
}

fn answers_to_params(answers: &[Answer]) -> Params {
    let mut params = Params::new();
    for (i, answer) in answers.iter().enumerate() {
        params
            .insert(format!("answers[{i}][question_id]"), answer.question_id.to_string())
            .insert(format!("answers[{i}][answer_id]"), answer.answer_id.to_string());
    }
    params
}

/// Handle for the `/question_sets` resource.
pub struct QuestionSets<'a, T> {
    client: &'a Client<T>,
}

impl<'a, T: Transport> QuestionSets<'a, T> {
    pub(crate) fn new(client: &'a Client<T>) -> Self {
        Self { client }
    }

    pub fn create(&self, params: &QuestionSetParams) -> Result<QuestionSet, Error> {
        self.client
            .execute(HttpMethod::Post, "/question_sets", &params.to_params())
    }

    pub fn retrieve(&self, id: &str) -> Result<QuestionSet, Error> {
        let path = format!("/question_sets/{}", escape_segment(id));
        self.client.execute(HttpMethod::Get, &path, &Params::new())
    }

    /// Submit answers and get the set back with `score` filled in.
    pub fn score(&self, id: &str, answers: &[Answer]) -> Result<QuestionSet, Error> {
        let path = format!("/question_sets/{}/score", escape_segment(id));
        self.client
            .execute(HttpMethod::Post, &path, &answers_to_params(answers))
    }

    pub fn list(&self) -> Result<Vec<QuestionSet>, Error> {
        self.list_with(ListOptions::default())
    }

    pub fn list_with(&self, options: ListOptions) -> Result<Vec<QuestionSet>, Error> {
        let list: ListResponse<QuestionSet> =
            self.client
                .execute(HttpMethod::Get, "/question_sets", &options.to_params())?;
        Ok(list.data)
    }
}
