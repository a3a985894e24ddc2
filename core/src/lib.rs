//! Fetch-stores for the publications portal.
//!
//! # Overview
//! Views read publications and submit contact messages through three stores,
//! each holding a `FetchState` (payload, paging echo, loading flag, error,
//! success message) that views snapshot or subscribe to.
//!
//! # Design
//! - `PortalClient` is stateless and sans-IO: `build_*` produces an
//!   `HttpRequest`, `parse_*` consumes an `HttpResponse`.
//! - A `Transport` performs the round-trip; `ReqwestTransport` is the real one.
//! - Stores never return errors. Failures are resolved once into a
//!   `NormalizedError` and stored in state.
//! - Re-invoking an action supersedes the pending call; only the latest
//!   invocation's outcome is applied.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod contact;
pub mod error;
pub mod http;
pub mod portal;
pub mod publications;
pub mod query;
pub mod store;
pub mod transport;
pub mod types;

#[cfg(test)]
mod testing;

pub use client::PortalClient;
pub use config::{Config, ConfigError};
pub use contact::ContactStore;
pub use error::{ApiError, ErrorShape, NormalizedError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use portal::Portal;
pub use publications::{PublicationDetailStore, PublicationsStore};
pub use query::QueryBuilder;
pub use store::{FetchState, FetchStore};
pub use transport::{ReqwestTransport, Transport};
pub use types::{Message, NewMessage, Publication, PublicationFilters, PublicationPage, Submission};
