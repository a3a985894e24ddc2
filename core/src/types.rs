//! Domain DTOs for the portal API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently.
//! Integration tests against the mock server catch any schema drift between
//! the two crates.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A single publication record returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Publication {
    pub id: u64,
    pub title: String,
    pub author_id: String,
    pub author: String,
    #[serde(default)]
    pub publication_date: Option<NaiveDate>,
    #[serde(default)]
    pub creation_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_date: Option<NaiveDateTime>,
    pub state: String,
    pub summary: String,
    pub content: String,
}

/// One page of the publications listing, with the server's paging echo.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublicationPage {
    pub data: Vec<Publication>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
}

/// Optional filters for the publications listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PublicationFilters {
    pub author: Option<String>,
    pub published_from: Option<NaiveDate>,
    pub published_to: Option<NaiveDate>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl PublicationFilters {
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn published_between(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.published_from = from;
        self.published_to = to;
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }
}

/// Contact form payload. Field validation is the endpoint's job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewMessage {
    pub title: String,
    pub full_name: String,
    pub email: String,
    pub message: String,
    #[serde(rename = "recaptchaToken")]
    pub recaptcha_token: String,
}

/// A contact message as stored by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub id: u64,
    pub title: String,
    pub full_name: String,
    pub email: String,
    pub message: String,
    pub state: String,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Outcome of a successful message submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub status: u16,
    /// The created record, when the response body carried one.
    pub created: Option<Message>,
}
