//! Stateless HTTP request builder and response parser for the portal API.
//!
//! # Design
//! `PortalClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! The stores run the actual round-trip through a `Transport` in between.

use std::fmt::Display;

use serde::de::DeserializeOwned;
use url::form_urlencoded::byte_serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::query::QueryBuilder;
use crate::types::{NewMessage, Publication, PublicationFilters, PublicationPage, Submission};

/// Query keys of the publications listing, in the order they are sent.
pub const LIST_QUERY_KEYS: [&str; 5] = ["author", "published_from", "published_to", "page", "per_page"];

/// Synchronous, stateless client for the portal API.
#[derive(Debug, Clone)]
pub struct PortalClient {
    base_url: String,
}

impl PortalClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The listing query for `filters`. An empty author counts as absent.
    pub fn list_query(filters: &PublicationFilters) -> QueryBuilder {
        let [author, from, to, page, per_page] = LIST_QUERY_KEYS;
        QueryBuilder::new()
            .push(author, filters.author.as_deref().filter(|a| !a.is_empty()))
            .push(from, filters.published_from.map(|d| d.format("%Y-%m-%d")))
            .push(to, filters.published_to.map(|d| d.format("%Y-%m-%d")))
            .push(page, filters.page)
            .push(per_page, filters.per_page)
    }

    pub fn build_list_publications(&self, filters: &PublicationFilters) -> HttpRequest {
        let query = Self::list_query(filters).finish();
        let mut path = format!("{}/publications/", self.base_url);
        if !query.is_empty() {
            path.push('?');
            path.push_str(&query);
        }
        HttpRequest {
            method: HttpMethod::Get,
            path,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_get_publication(&self, id: impl Display) -> Result<HttpRequest, ApiError> {
        let id = id.to_string();
        let id = id.trim();
        if id.is_empty() {
            return Err(ApiError::MissingId);
        }
        // Form encoding writes spaces as '+'; a path segment needs %20.
        let segment = byte_serialize(id.as_bytes()).collect::<String>().replace('+', "%20");
        Ok(HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/publications/{segment}", self.base_url),
            headers: Vec::new(),
            body: None,
        })
    }

    pub fn build_submit_message(&self, input: &NewMessage) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/messages/", self.base_url),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }

    pub fn parse_list_publications(&self, response: HttpResponse) -> Result<PublicationPage, ApiError> {
        check_status(&response)?;
        decode(&response.body)
    }

    pub fn parse_get_publication(&self, response: HttpResponse) -> Result<Publication, ApiError> {
        check_status(&response)?;
        decode(&response.body)
    }

    /// Any 2xx counts as accepted. The body is kept only when it is a message record.
    pub fn parse_submit_message(&self, response: HttpResponse) -> Result<Submission, ApiError> {
        check_status(&response)?;
        Ok(Submission {
            status: response.status,
            created: serde_json::from_str(&response.body).ok(),
        })
    }
}

/// Map non-2xx status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound {
            body: response.body.clone(),
        });
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn client() -> PortalClient {
        PortalClient::new("http://localhost:3000/api")
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    const PUBLICATION: &str = r#"{"id":7,"title":"Therapy","author_id":"2","author":"smith","publication_date":"2024-05-01","state":"published","summary":"s","content":"c"}"#;

    #[test]
    fn build_list_without_filters_has_no_query() {
        let req = client().build_list_publications(&PublicationFilters::default());
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:3000/api/publications/");
        assert!(req.body.is_none());
    }

    #[test]
    fn build_list_sends_author_and_page_only() {
        let filters = PublicationFilters::default().author("Smith").page(2);
        let req = client().build_list_publications(&filters);
        assert_eq!(req.path, "http://localhost:3000/api/publications/?author=Smith&page=2");
    }

    #[test]
    fn build_list_sends_every_key_in_fixed_order() {
        let filters = PublicationFilters {
            author: Some("smith".to_string()),
            published_from: NaiveDate::from_ymd_opt(2024, 1, 1),
            published_to: NaiveDate::from_ymd_opt(2024, 12, 31),
            page: Some(3),
            per_page: Some(6),
        };
        let req = client().build_list_publications(&filters);
        assert_eq!(
            req.path,
            "http://localhost:3000/api/publications/?author=smith&published_from=2024-01-01&published_to=2024-12-31&page=3&per_page=6"
        );
    }

    #[test]
    fn list_query_includes_exactly_present_keys() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 2);
        // Every subset of the five filters, encoded as a bitmask.
        for mask in 0u8..32 {
            let filters = PublicationFilters {
                author: (mask & 1 != 0).then(|| "smith".to_string()),
                published_from: if mask & 2 != 0 { date } else { None },
                published_to: if mask & 4 != 0 { date } else { None },
                page: (mask & 8 != 0).then_some(1),
                per_page: (mask & 16 != 0).then_some(12),
            };
            let expected: Vec<&str> = LIST_QUERY_KEYS
                .iter()
                .enumerate()
                .filter(|(bit, _)| mask & (1u8 << *bit) != 0)
                .map(|(_, key)| *key)
                .collect();
            assert_eq!(PortalClient::list_query(&filters).keys(), expected, "mask {mask}");
        }
    }

    #[test]
    fn empty_author_is_omitted() {
        let filters = PublicationFilters::default().author("");
        let req = client().build_list_publications(&filters);
        assert_eq!(req.path, "http://localhost:3000/api/publications/");
    }

    #[test]
    fn build_get_publication_accepts_strings_and_integers() {
        let req = client().build_get_publication("abc123").unwrap();
        assert_eq!(req.path, "http://localhost:3000/api/publications/abc123");
        let req = client().build_get_publication(42).unwrap();
        assert_eq!(req.path, "http://localhost:3000/api/publications/42");
    }

    #[test]
    fn build_get_publication_rejects_blank_id() {
        assert_eq!(client().build_get_publication(""), Err(ApiError::MissingId));
        assert_eq!(client().build_get_publication("   "), Err(ApiError::MissingId));
    }

    #[test]
    fn build_get_publication_encodes_id_segment() {
        let req = client().build_get_publication("a/b c+d").unwrap();
        assert_eq!(req.path, "http://localhost:3000/api/publications/a%2Fb%20c%2Bd");
    }

    #[test]
    fn build_submit_message_produces_json_post() {
        let input = NewMessage {
            title: "Question".to_string(),
            full_name: "Ana Smith".to_string(),
            email: "ana@example.com".to_string(),
            message: "Hello".to_string(),
            recaptcha_token: "token".to_string(),
        };
        let req = client().build_submit_message(&input).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:3000/api/messages/");
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "application/json".to_string())]
        );
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["title"], "Question");
        assert_eq!(body["recaptchaToken"], "token");
    }

    #[test]
    fn parse_list_publications_success() {
        let body = format!(r#"{{"data":[{PUBLICATION}],"total":40,"page":2,"per_page":12}}"#);
        let page = client().parse_list_publications(response(200, &body)).unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.total, 40);
        assert_eq!(page.page, 2);
        assert_eq!(page.per_page, 12);
    }

    #[test]
    fn parse_accepts_any_2xx_status() {
        let body = format!(r#"{{"data":[{PUBLICATION}],"total":1,"page":1,"per_page":12}}"#);
        let page = client().parse_list_publications(response(203, &body)).unwrap();
        assert_eq!(page.total, 1);
        let publication = client().parse_get_publication(response(203, PUBLICATION)).unwrap();
        assert_eq!(publication.id, 7);
    }

    #[test]
    fn parse_list_publications_redirect_is_an_error() {
        let err = client().parse_list_publications(response(304, "")).unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 304, .. }));
    }

    #[test]
    fn parse_list_publications_bad_request() {
        let err = client()
            .parse_list_publications(response(400, "Invalid start date"))
            .unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 400, .. }));
    }

    #[test]
    fn parse_list_publications_bad_json() {
        let err = client().parse_list_publications(response(200, "not json")).unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[test]
    fn parse_get_publication_success() {
        let publication = client().parse_get_publication(response(200, PUBLICATION)).unwrap();
        assert_eq!(publication.id, 7);
        assert_eq!(publication.publication_date, NaiveDate::from_ymd_opt(2024, 5, 1));
    }

    #[test]
    fn parse_get_publication_not_found_keeps_body() {
        let err = client()
            .parse_get_publication(response(404, r#"{"message":"not found"}"#))
            .unwrap_err();
        assert_eq!(
            err,
            ApiError::NotFound {
                body: r#"{"message":"not found"}"#.to_string()
            }
        );
    }

    #[test]
    fn parse_submit_message_created() {
        let body = r#"{"id":1,"title":"Q","full_name":"Ana","email":"a@b.co","message":"m","state":"pending"}"#;
        let submission = client().parse_submit_message(response(201, body)).unwrap();
        assert_eq!(submission.status, 201);
        assert_eq!(submission.created.unwrap().id, 1);
    }

    #[test]
    fn parse_submit_message_created_with_text_body() {
        let submission = client().parse_submit_message(response(201, "Message sent")).unwrap();
        assert!(submission.created.is_none());
    }

    #[test]
    fn parse_submit_message_rejected() {
        let err = client()
            .parse_submit_message(response(400, r#"["Title is required"]"#))
            .unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 400, .. }));
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = PortalClient::new("http://localhost:3000/");
        let req = client.build_list_publications(&PublicationFilters::default());
        assert_eq!(req.path, "http://localhost:3000/publications/");
    }
}
