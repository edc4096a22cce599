//! In-memory stand-in for the BlockScore API.
//!
//! Implements the subset of endpoints the client speaks, with the same
//! authentication, version negotiation, form-encoded inputs and error
//! envelope as the real service. Verification outcomes are canned: every
//! person and company comes back `valid`, and watchlist searches only match
//! names on `SANCTIONED_NAMES`.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// Protocol revision the mock answers to.
pub const SUPPORTED_VERSION: u32 = 4;

/// Candidates with one of these full names produce a watchlist hit.
pub const SANCTIONED_NAMES: &[&str] = &["John Doe", "Jane Roe"];

/// Candidates whose note equals this make watchlist searches fail with 402.
pub const OUT_OF_CREDITS_NOTE: &str = "insufficient_funds";

const DEFAULT_PAGE_SIZE: usize = 25;
const DEFAULT_TIME_LIMIT: u64 = 180;

const PERSON_FIELDS: &[&str] = &[
    "name_first",
    "name_middle",
    "name_last",
    "document_type",
    "document_value",
    "phone_number",
    "ip_address",
    "note",
    "address_street1",
    "address_street2",
    "address_city",
    "address_subdivision",
    "address_postal_code",
    "address_country_code",
];

const COMPANY_FIELDS: &[&str] = &[
    "entity_name",
    "tax_id",
    "incorporation_state",
    "incorporation_country_code",
    "incorporation_type",
    "dbas",
    "registration_number",
    "email",
    "url",
    "phone_number",
    "ip_address",
    "note",
    "address_street1",
    "address_street2",
    "address_city",
    "address_subdivision",
    "address_postal_code",
    "address_country_code",
];

const CANDIDATE_FIELDS: &[&str] = &[
    "note",
    "ssn",
    "passport",
    "date_of_birth",
    "name_first",
    "name_middle",
    "name_last",
    "address_street1",
    "address_street2",
    "address_city",
    "address_subdivision",
    "address_postal_code",
    "address_country_code",
];

/// Records are kept oldest first; listings return newest first.
#[derive(Default)]
pub struct Store {
    people: Vec<Value>,
    companies: Vec<Value>,
    candidates: Vec<Value>,
    /// Previous revisions per candidate id, oldest first.
    candidate_history: HashMap<String, Vec<Value>>,
    candidate_hits: HashMap<String, Vec<Value>>,
    question_sets: Vec<Value>,
}

pub type Db = Arc<RwLock<Store>>;

type Fields = Form<HashMap<String, String>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/people", get(list_people).post(create_person))
        .route("/people/{id}", get(get_person))
        .route("/companies", get(list_companies).post(create_company))
        .route("/companies/{id}", get(get_company))
        .route("/candidates", get(list_candidates).post(create_candidate))
        .route(
            "/candidates/{id}",
            get(get_candidate)
                .patch(update_candidate)
                .delete(delete_candidate),
        )
        .route("/candidates/{id}/history", get(candidate_history))
        .route("/candidates/{id}/hits", get(candidate_hits))
        .route("/question_sets", get(list_question_sets).post(create_question_set))
        .route("/question_sets/{id}", get(get_question_set))
        .route("/question_sets/{id}/score", post(score_question_set))
        .route("/watchlists", post(search_watchlists))
        .layer(middleware::from_fn(authenticate))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "mock BlockScore API listening");
    }
    axum::serve(listener, app()).await
}

// ---------------------------------------------------------------------------
// Errors and auth
// ---------------------------------------------------------------------------

fn api_error(status: StatusCode, code: &str, message: &str, param: &str, kind: &str) -> Response {
    let body = json!({
        "error": {
            "code": code,
            "message": message,
            "param": param,
            "type": kind,
        }
    });
    (status, Json(body)).into_response()
}

fn missing_param(param: &str) -> Response {
    api_error(
        StatusCode::BAD_REQUEST,
        "missing_param",
        &format!("{param} is required"),
        param,
        "invalid_request_error",
    )
}

fn not_found(object: &str, id: &str) -> Response {
    api_error(
        StatusCode::NOT_FOUND,
        "not_found",
        &format!("{object} {id} not found"),
        "id",
        "invalid_request_error",
    )
}

/// Require a Basic credential with a non-empty username and the supported
/// version in `Accept`.
async fn authenticate(request: Request, next: Next) -> Response {
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Basic "))
        .and_then(|encoded| STANDARD.decode(encoded).ok())
        .and_then(|decoded| String::from_utf8(decoded).ok())
        .is_some_and(|credentials| {
            credentials
                .split_once(':')
                .is_some_and(|(key, _)| !key.is_empty())
        });
    if !authorized {
        tracing::debug!(uri = %request.uri(), "rejecting unauthenticated request");
        return api_error(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "No valid API key provided",
            "",
            "authentication_error",
        );
    }

    let expected = format!("application/vnd.blockscore+json;version={SUPPORTED_VERSION}");
    let accept = request
        .headers()
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if accept != expected {
        return api_error(
            StatusCode::BAD_REQUEST,
            "unsupported_version",
            &format!("Accept header must be {expected}"),
            "",
            "invalid_request_error",
        );
    }

    next.run(request).await
}

// ---------------------------------------------------------------------------
// Record helpers
// ---------------------------------------------------------------------------

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

fn new_id() -> String {
    Uuid::new_v4().simple().to_string()[..24].to_string()
}

/// Copy `fields` from the form; empty values become `null`.
fn copy_fields(record: &mut Map<String, Value>, form: &HashMap<String, String>, fields: &[&str]) {
    for &field in fields {
        let value = form
            .get(field)
            .filter(|v| !v.is_empty())
            .map_or(Value::Null, |v| Value::String(v.clone()));
        record.insert(field.to_string(), value);
    }
}

/// Numeric form value, or `null` when empty or unparseable.
fn number_field(form: &HashMap<String, String>, field: &str) -> Value {
    form.get(field)
        .and_then(|v| v.parse::<u64>().ok())
        .map_or(Value::Null, Value::from)
}

fn base_record(object: &str) -> Map<String, Value> {
    let ts = now();
    let mut record = Map::new();
    record.insert("object".into(), json!(object));
    record.insert("id".into(), json!(new_id()));
    record.insert("created_at".into(), json!(ts));
    record.insert("updated_at".into(), json!(ts));
    record.insert("livemode".into(), json!(false));
    record
}

fn require<'a>(form: &'a HashMap<String, String>, field: &str) -> Result<&'a str, Response> {
    match form.get(field).map(String::as_str) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(missing_param(field)),
    }
}

fn find<'a>(records: &'a [Value], id: &str) -> Option<&'a Value> {
    records.iter().find(|r| r["id"] == id)
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub count: Option<usize>,
    pub offset: Option<usize>,
}

fn list_page(records: &[Value], query: &ListQuery) -> Json<Value> {
    let count = query
        .count
        .filter(|&c| c != 0)
        .unwrap_or(DEFAULT_PAGE_SIZE);
    let offset = query.offset.unwrap_or(0);
    let data: Vec<Value> = records
        .iter()
        .rev()
        .skip(offset)
        .take(count)
        .cloned()
        .collect();
    Json(json!({
        "object": "list",
        "has_more": records.len() > offset + data.len(),
        "data": data,
    }))
}

// ---------------------------------------------------------------------------
// People
// ---------------------------------------------------------------------------

async fn create_person(State(db): State<Db>, Form(form): Fields) -> Response {
    for field in ["name_first", "name_last"] {
        if let Err(resp) = require(&form, field) {
            return resp;
        }
    }

    let mut record = base_record("person");
    copy_fields(&mut record, &form, PERSON_FIELDS);
    for field in ["birth_day", "birth_month", "birth_year"] {
        record.insert(field.to_string(), number_field(&form, field));
    }
    record.insert("status".into(), json!("valid"));
    record.insert(
        "details".into(),
        json!({
            "address": "match",
            "address_risk": "low",
            "identification": "match",
            "date_of_birth": "match",
            "ofac": "no_match",
            "pep": "no_match",
        }),
    );
    record.insert("question_sets".into(), json!([]));

    let record = Value::Object(record);
    db.write().await.people.push(record.clone());
    (StatusCode::CREATED, Json(record)).into_response()
}

async fn get_person(State(db): State<Db>, Path(id): Path<String>) -> Response {
    let store = db.read().await;
    match find(&store.people, &id) {
        Some(person) => Json(person.clone()).into_response(),
        None => not_found("person", &id),
    }
}

async fn list_people(State(db): State<Db>, Query(query): Query<ListQuery>) -> Json<Value> {
    list_page(&db.read().await.people, &query)
}

// ---------------------------------------------------------------------------
// Companies
// ---------------------------------------------------------------------------

async fn create_company(State(db): State<Db>, Form(form): Fields) -> Response {
    let entity_name = match require(&form, "entity_name") {
        Ok(name) => name.to_string(),
        Err(resp) => return resp,
    };

    let mut record = base_record("company");
    copy_fields(&mut record, &form, COMPANY_FIELDS);
    let date = match (
        form.get("incorporation_year").and_then(|v| v.parse::<u16>().ok()),
        form.get("incorporation_month").and_then(|v| v.parse::<u8>().ok()),
        form.get("incorporation_day").and_then(|v| v.parse::<u8>().ok()),
    ) {
        (Some(y), Some(m), Some(d)) => json!(format!("{y:04}-{m:02}-{d:02}")),
        _ => Value::Null,
    };
    record.insert("incorporation_date".into(), date);
    record.insert("status".into(), json!("valid"));
    let ofac = if SANCTIONED_NAMES.contains(&entity_name.as_str()) {
        "match"
    } else {
        "no_match"
    };
    record.insert(
        "details".into(),
        json!({ "entity_name": "match", "tax_id": "match", "ofac": ofac }),
    );

    let record = Value::Object(record);
    db.write().await.companies.push(record.clone());
    (StatusCode::CREATED, Json(record)).into_response()
}

async fn get_company(State(db): State<Db>, Path(id): Path<String>) -> Response {
    let store = db.read().await;
    match find(&store.companies, &id) {
        Some(company) => Json(company.clone()).into_response(),
        None => not_found("company", &id),
    }
}

async fn list_companies(State(db): State<Db>, Query(query): Query<ListQuery>) -> Json<Value> {
    list_page(&db.read().await.companies, &query)
}

// ---------------------------------------------------------------------------
// Candidates
// ---------------------------------------------------------------------------

async fn create_candidate(State(db): State<Db>, Form(form): Fields) -> Response {
    let mut record = base_record("candidate");
    copy_fields(&mut record, &form, CANDIDATE_FIELDS);

    let record = Value::Object(record);
    db.write().await.candidates.push(record.clone());
    (StatusCode::CREATED, Json(record)).into_response()
}

async fn get_candidate(State(db): State<Db>, Path(id): Path<String>) -> Response {
    let store = db.read().await;
    match find(&store.candidates, &id) {
        Some(candidate) => Json(candidate.clone()).into_response(),
        None => not_found("candidate", &id),
    }
}

async fn update_candidate(
    State(db): State<Db>,
    Path(id): Path<String>,
    Form(form): Fields,
) -> Response {
    let mut store = db.write().await;
    let Some(index) = store.candidates.iter().position(|c| c["id"] == id) else {
        return not_found("candidate", &id);
    };

    let previous = store.candidates[index].clone();
    let mut updated = match previous.clone() {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    copy_fields(&mut updated, &form, CANDIDATE_FIELDS);
    updated.insert("updated_at".into(), json!(now()));
    let updated = Value::Object(updated);

    store.candidates[index] = updated.clone();
    store.candidate_history.entry(id).or_default().push(previous);
    Json(updated).into_response()
}

async fn delete_candidate(State(db): State<Db>, Path(id): Path<String>) -> Response {
    let mut store = db.write().await;
    let Some(index) = store.candidates.iter().position(|c| c["id"] == id) else {
        return not_found("candidate", &id);
    };

    let mut removed = store.candidates.remove(index);
    store.candidate_history.remove(&id);
    store.candidate_hits.remove(&id);
    removed["deleted"] = json!(true);
    Json(removed).into_response()
}

async fn candidate_history(State(db): State<Db>, Path(id): Path<String>) -> Response {
    let store = db.read().await;
    let Some(current) = find(&store.candidates, &id) else {
        return not_found("candidate", &id);
    };

    let mut revisions = vec![current.clone()];
    if let Some(previous) = store.candidate_history.get(&id) {
        revisions.extend(previous.iter().rev().cloned());
    }
    Json(Value::Array(revisions)).into_response()
}

async fn candidate_hits(State(db): State<Db>, Path(id): Path<String>) -> Response {
    let store = db.read().await;
    if find(&store.candidates, &id).is_none() {
        return not_found("candidate", &id);
    }
    let hits = store.candidate_hits.get(&id).cloned().unwrap_or_default();
    Json(json!({ "object": "list", "data": hits })).into_response()
}

async fn list_candidates(State(db): State<Db>, Query(query): Query<ListQuery>) -> Json<Value> {
    list_page(&db.read().await.candidates, &query)
}

// ---------------------------------------------------------------------------
// Question sets
// ---------------------------------------------------------------------------

/// Every generated question has answer id 1 as its correct choice.
fn canned_questions() -> Value {
    json!([
        {
            "id": 1,
            "question": "Which one of the following addresses is associated with you?",
            "answers": [
                { "id": 1, "answer": "309 Colver Rd" },
                { "id": 2, "answer": "732 Peachtree St" },
                { "id": 3, "answer": "None of the above" },
            ]
        },
        {
            "id": 2,
            "question": "Which one of the following area codes is associated with you?",
            "answers": [
                { "id": 1, "answer": "812" },
                { "id": 2, "answer": "512" },
                { "id": 3, "answer": "None of the above" },
            ]
        }
    ])
}

async fn create_question_set(State(db): State<Db>, Form(form): Fields) -> Response {
    let person_id = match require(&form, "person_id") {
        Ok(id) => id.to_string(),
        Err(resp) => return resp,
    };

    let mut store = db.write().await;
    let Some(person_index) = store.people.iter().position(|p| p["id"] == person_id) else {
        return not_found("person", &person_id);
    };

    let time_limit = form
        .get("time_limit")
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(DEFAULT_TIME_LIMIT);
    let mut record = base_record("question_set");
    record.insert("person_id".into(), json!(person_id));
    record.insert("time_limit".into(), json!(time_limit));
    record.insert("expired".into(), json!(false));
    record.insert("score".into(), Value::Null);
    record.insert("questions".into(), canned_questions());
    let record = Value::Object(record);

    if let Some(sets) = store.people[person_index]["question_sets"].as_array_mut() {
        sets.push(record["id"].clone());
    }
    store.question_sets.push(record.clone());
    (StatusCode::CREATED, Json(record)).into_response()
}

async fn get_question_set(State(db): State<Db>, Path(id): Path<String>) -> Response {
    let store = db.read().await;
    match find(&store.question_sets, &id) {
        Some(set) => Json(set.clone()).into_response(),
        None => not_found("question_set", &id),
    }
}

async fn score_question_set(
    State(db): State<Db>,
    Path(id): Path<String>,
    Form(form): Fields,
) -> Response {
    let mut store = db.write().await;
    let Some(set) = store.question_sets.iter_mut().find(|s| s["id"] == id) else {
        return not_found("question_set", &id);
    };

    let total = set["questions"].as_array().map_or(0, Vec::len);
    let correct = (0..)
        .map_while(|i| form.get(&format!("answers[{i}][answer_id]")))
        .filter(|answer| answer.as_str() == "1")
        .count();
    let score = if total == 0 {
        0.0
    } else {
        correct as f64 * 100.0 / total as f64
    };
    set["score"] = json!(score);
    set["updated_at"] = json!(now());
    Json(set.clone()).into_response()
}

async fn list_question_sets(State(db): State<Db>, Query(query): Query<ListQuery>) -> Json<Value> {
    list_page(&db.read().await.question_sets, &query)
}

// ---------------------------------------------------------------------------
// Watchlists
// ---------------------------------------------------------------------------

async fn search_watchlists(State(db): State<Db>, Form(form): Fields) -> Response {
    let candidate_id = match require(&form, "candidate_id") {
        Ok(id) => id.to_string(),
        Err(resp) => return resp,
    };
    let threshold = form
        .get("similarity_threshold")
        .and_then(|v| v.parse::<f64>().ok())
        .unwrap_or(0.7);

    let mut store = db.write().await;
    let Some(candidate) = find(&store.candidates, &candidate_id).cloned() else {
        return not_found("candidate", &candidate_id);
    };
    if candidate["note"] == OUT_OF_CREDITS_NOTE {
        return api_error(
            StatusCode::PAYMENT_REQUIRED,
            "insufficient_funds",
            "Payment required",
            "",
            "billing_error",
        );
    }

    let full_name = format!(
        "{} {}",
        candidate["name_first"].as_str().unwrap_or_default(),
        candidate["name_last"].as_str().unwrap_or_default()
    );
    let confidence = 0.95;
    let person_search = form.get("match_type").map_or(true, |t| t.is_empty() || t == "person");
    let matches: Vec<Value> = if person_search
        && confidence >= threshold
        && SANCTIONED_NAMES.contains(&full_name.as_str())
    {
        vec![json!({
            "watchlist_name": "US Department of Treasury OFAC SDN List",
            "matching_info": ["name"],
            "confidence": confidence,
            "name_full": full_name,
            "date_of_birth": candidate["date_of_birth"],
            "address_country_code": candidate["address_country_code"],
        })]
    } else {
        Vec::new()
    };

    store
        .candidate_hits
        .entry(candidate_id)
        .or_default()
        .extend(matches.iter().cloned());

    Json(json!({
        "object": "watchlist",
        "livemode": false,
        "searched_lists": [
            "US Department of Treasury OFAC SDN List",
            "UK HM Treasury Consolidated List",
        ],
        "matches": matches,
    }))
    .into_response()
}
