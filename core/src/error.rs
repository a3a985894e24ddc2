//! Error types for the portal API client.
//!
//! # Design
//! `ApiError` is what the sans-IO client and the transport return. Stores
//! never surface it directly: at settlement they resolve it once into a
//! `NormalizedError`, the display-ready value held in `FetchState::error`.
//! Which shape a failure takes depends on the endpoint, expressed as an
//! `ErrorShape`.

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Errors returned by `PortalClient` and `Transport` implementations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request could not complete (connect, DNS, timeout, body read).
    #[error("transport failure: {0}")]
    Transport(String),

    /// The server returned 404.
    #[error("resource not found")]
    NotFound { body: String },

    /// The server returned a status other than the expected one.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// A resource-by-id request was attempted with an empty id.
    #[error("a resource id is required")]
    MissingId,
}

impl ApiError {
    /// The response body carried by a non-success status, if non-blank.
    pub fn response_body(&self) -> Option<&str> {
        match self {
            ApiError::NotFound { body } | ApiError::HttpError { body, .. } => {
                Some(body.as_str()).filter(|b| !b.trim().is_empty())
            }
            _ => None,
        }
    }
}

/// How an endpoint's error body is surfaced to the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorShape {
    /// The whole body, as JSON when it parses, as a string otherwise.
    Verbatim,
    /// The `message` field of a JSON object body.
    MessageField,
    /// A list of error entries; a single entry is wrapped.
    List,
}

/// The error value stored in a store's state after a failed action.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum NormalizedError {
    Single(Value),
    Multiple(Vec<Value>),
    Generic(String),
}

impl NormalizedError {
    /// Resolve `error` into the shape an endpoint displays, falling back to
    /// `generic` when no usable response body exists.
    pub fn normalize(error: &ApiError, shape: ErrorShape, generic: &str) -> Self {
        let fallback = || NormalizedError::Generic(generic.to_string());
        let Some(body) = error.response_body() else {
            return fallback();
        };
        let value = body_value(body);
        match shape {
            ErrorShape::Verbatim => NormalizedError::Single(value),
            ErrorShape::MessageField => match value {
                Value::Object(mut map) => match map.remove("message") {
                    Some(message) if !message.is_null() => NormalizedError::Single(message),
                    _ => fallback(),
                },
                _ => fallback(),
            },
            ErrorShape::List => match value {
                Value::Array(entries) => NormalizedError::Multiple(entries),
                other => NormalizedError::Multiple(vec![other]),
            },
        }
    }

    /// Each entry rendered as a line of display text.
    pub fn messages(&self) -> Vec<String> {
        match self {
            NormalizedError::Single(value) => vec![render(value)],
            NormalizedError::Multiple(values) => values.iter().map(render).collect(),
            NormalizedError::Generic(message) => vec![message.clone()],
        }
    }
}

impl fmt::Display for NormalizedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.messages().join("; "))
    }
}

fn body_value(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
