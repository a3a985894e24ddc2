use std::sync::{Arc, OnceLock};

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};

pub const PUBLISHED: &str = "published";
pub const DEFAULT_PER_PAGE: u32 = 12;
pub const MAX_PER_PAGE: u32 = 100;
pub const MAX_EMAIL_LEN: usize = 256;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Publication {
    pub id: u64,
    pub title: String,
    pub author_id: String,
    pub author: String,
    pub publication_date: Option<NaiveDate>,
    pub creation_date: Option<NaiveDateTime>,
    pub updated_date: Option<NaiveDateTime>,
    pub state: String,
    pub summary: String,
    pub content: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublicationPage {
    pub data: Vec<Publication>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub id: u64,
    pub title: String,
    pub full_name: String,
    pub email: String,
    pub message: String,
    pub state: String,
    pub comment: Option<String>,
}

#[derive(Deserialize)]
pub struct ListParams {
    pub page: Option<String>,
    pub author: Option<String>,
    pub published_from: Option<String>,
    pub published_to: Option<String>,
    pub per_page: Option<String>,
}

/// Contact form fields. Presence is checked by validation, not by serde.
#[derive(Default, Deserialize)]
pub struct MessageInput {
    pub title: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

/// How the server judges a captcha token.
#[derive(Clone, Debug)]
pub enum CaptchaPolicy {
    AcceptNonEmpty,
    Exact(String),
}

impl CaptchaPolicy {
    fn verify(&self, token: &str) -> bool {
        match self {
            CaptchaPolicy::AcceptNonEmpty => !token.trim().is_empty(),
            CaptchaPolicy::Exact(expected) => token == expected,
        }
    }
}

#[derive(Debug, Default)]
pub struct Db {
    /// `(author_id, alias)`
    pub authors: Vec<(String, String)>,
    pub publications: Vec<Publication>,
    pub messages: Vec<Message>,
}

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<RwLock<Db>>,
    pub captcha: CaptchaPolicy,
}

impl AppState {
    pub fn new(db: Db, captcha: CaptchaPolicy) -> Self {
        Self {
            db: Arc::new(RwLock::new(db)),
            captcha,
        }
    }
}

/// Three authors and fifteen publications dated 2024-01-01 through
/// 2024-01-15. Publications 14 and 15 are drafts.
pub fn seed() -> Db {
    let authors: Vec<(String, String)> = ["lee", "smith", "garcia"]
        .iter()
        .enumerate()
        .map(|(id, alias)| (id.to_string(), alias.to_string()))
        .collect();
    let publications = (1..=15u32)
        .map(|n| {
            let (author_id, alias) = &authors[n as usize % authors.len()];
            let publication_date = NaiveDate::from_ymd_opt(2024, 1, n);
            let creation_date = publication_date.and_then(|d| d.and_hms_opt(9, 0, 0));
            Publication {
                id: u64::from(n),
                title: format!("Publication {n}"),
                author_id: author_id.clone(),
                author: alias.clone(),
                publication_date,
                creation_date,
                updated_date: creation_date,
                state: if n > 13 { "draft" } else { PUBLISHED }.to_string(),
                summary: format!("Summary of publication {n}"),
                content: format!("Content of publication {n}"),
            }
        })
        .collect();
    Db {
        authors,
        publications,
        messages: Vec::new(),
    }
}

pub fn app() -> Router {
    app_with(AppState::new(seed(), CaptchaPolicy::AcceptNonEmpty))
}

pub fn app_with(state: AppState) -> Router {
    Router::new()
        .route("/publications/", get(list_publications))
        .route("/publications/{id}", get(get_publication))
        .route("/messages/", post(create_message))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, message.to_string()).into_response()
}

fn parse_date(raw: Option<&str>, error: &str) -> Result<Option<NaiveDate>, Response> {
    match raw.filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| bad_request(error)),
    }
}

async fn list_publications(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<PublicationPage>, Response> {
    let page = match params.page.as_deref() {
        None => 1,
        Some(raw) => raw
            .parse::<i64>()
            .map_err(|_| bad_request("Invalid page number"))?
            .clamp(1, i64::from(u32::MAX)) as u32,
    };
    let per_page = match params.per_page.as_deref() {
        None => DEFAULT_PER_PAGE,
        Some(raw) => match raw.parse::<i64>() {
            Ok(n) if n > 0 => n.min(i64::from(MAX_PER_PAGE)) as u32,
            _ => return Err(bad_request("Invalid number of items per page")),
        },
    };
    let from = parse_date(params.published_from.as_deref(), "Invalid start date")?;
    let to = parse_date(params.published_to.as_deref(), "Invalid end date")?;
    if let (Some(from), Some(to)) = (from, to) {
        if to < from {
            return Err(bad_request("Invalid end date"));
        }
    }

    let db = state.db.read().await;
    let author = params.author.as_deref().filter(|a| !a.is_empty());
    let author_ids: Option<Vec<&str>> = match author {
        None => None,
        Some(alias) => {
            let ids: Vec<&str> = db
                .authors
                .iter()
                .filter(|(_, a)| a == alias)
                .map(|(id, _)| id.as_str())
                .collect();
            if ids.is_empty() {
                return Err(bad_request("Author does not exist"));
            }
            Some(ids)
        }
    };

    let mut matching: Vec<&Publication> = db
        .publications
        .iter()
        .filter(|p| p.state == PUBLISHED)
        .filter(|p| {
            author_ids
                .as_ref()
                .map_or(true, |ids| ids.contains(&p.author_id.as_str()))
        })
        .filter(|p| from.map_or(true, |from| p.publication_date.is_some_and(|d| d >= from)))
        .filter(|p| to.map_or(true, |to| p.publication_date.is_some_and(|d| d <= to)))
        .collect();
    matching.sort_by(|a, b| b.publication_date.cmp(&a.publication_date));

    let total = matching.len() as u64;
    let offset = (page as usize - 1).saturating_mul(per_page as usize);
    let data = matching
        .into_iter()
        .skip(offset)
        .take(per_page as usize)
        .cloned()
        .collect();
    debug!(page, per_page, total, "listing publications");
    Ok(Json(PublicationPage {
        data,
        total,
        page,
        per_page,
    }))
}

async fn get_publication(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let not_found = || {
        (
            StatusCode::NOT_FOUND,
            Json(json!({"message": "Publication not found"})),
        )
            .into_response()
    };
    let Ok(id) = id.parse::<u64>() else {
        return not_found();
    };
    let db = state.db.read().await;
    match db.publications.iter().find(|p| p.id == id && p.state == PUBLISHED) {
        Some(publication) => Json(publication.clone()).into_response(),
        None => not_found(),
    }
}

async fn create_message(State(state): State<AppState>, body: Bytes) -> Response {
    let mut payload: serde_json::Map<String, Value> = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => return bad_request(&e.to_string()),
    };
    let token = match payload.remove("recaptchaToken") {
        Some(Value::String(token)) => token,
        _ => return bad_request("recaptchaToken is required"),
    };
    let input: MessageInput = match serde_json::from_value(Value::Object(payload)) {
        Ok(input) => input,
        Err(e) => return (StatusCode::BAD_REQUEST, Json(vec![e.to_string()])).into_response(),
    };

    let errors = validate_message(&input);
    if !errors.is_empty() {
        debug!(?errors, "message rejected");
        return (StatusCode::BAD_REQUEST, Json(errors)).into_response();
    }
    if !state.captcha.verify(&token) {
        return (
            StatusCode::BAD_REQUEST,
            Json(vec!["Could not validate the reCAPTCHA".to_string()]),
        )
            .into_response();
    }

    let mut db = state.db.write().await;
    let message = Message {
        id: db.messages.len() as u64 + 1,
        title: input.title.unwrap_or_default(),
        full_name: input.full_name.unwrap_or_default(),
        email: input.email.unwrap_or_default(),
        message: input.message.unwrap_or_default(),
        state: "pending".to_string(),
        comment: None,
    };
    db.messages.push(message.clone());
    info!(id = message.id, "message stored");
    (StatusCode::CREATED, Json(message)).into_response()
}

/// Every problem with `input`, in field order.
pub fn validate_message(input: &MessageInput) -> Vec<String> {
    let mut errors = Vec::new();
    check_text(&mut errors, "Title", input.title.as_deref(), 100);
    check_text(&mut errors, "Full name", input.full_name.as_deref(), 100);
    if let Some(name) = input.full_name.as_deref() {
        if !name.chars().all(|c| c.is_alphabetic() || c == ' ') {
            errors.push("Full name may only contain letters and spaces".to_string());
        }
    }
    match input.email.as_deref().map(str::trim) {
        None | Some("") => errors.push("Email is required".to_string()),
        Some(email) => {
            if !is_valid_email(email) {
                errors.push("Email is invalid".to_string());
            }
            if email.chars().count() > MAX_EMAIL_LEN {
                errors.push(format!("Email must be at most {MAX_EMAIL_LEN} characters"));
            }
        }
    }
    check_text(&mut errors, "Message", input.message.as_deref(), 500);
    errors
}

fn check_text(errors: &mut Vec<String>, label: &str, value: Option<&str>, max: usize) {
    match value.map(str::trim) {
        None | Some("") => errors.push(format!("{label} is required")),
        Some(v) if v.chars().count() > max => {
            errors.push(format!("{label} must be at most {max} characters"))
        }
        Some(_) => {}
    }
}

fn is_valid_email(email: &str) -> bool {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL
        .get_or_init(|| {
            Regex::new(r"^[\w.-]+@[a-zA-Z\d.-]+\.[a-zA-Z]{2,}$").expect("email pattern compiles")
        })
        .is_match(email)
}
