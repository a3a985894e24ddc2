//! Stores for the publications listing and the single-publication view.

use std::fmt::Display;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::client::PortalClient;
use crate::error::{ApiError, ErrorShape, NormalizedError};
use crate::store::{FetchState, FetchStore};
use crate::transport::Transport;
use crate::types::{Publication, PublicationFilters};

pub const GENERIC_ERROR: &str = "An error occurred";
pub const MISSING_ID_ERROR: &str = "A publication id is required";
pub const LIST_LOADED: &str = "Publications loaded successfully";
pub const DETAIL_LOADED: &str = "Publication loaded successfully";

/// Paginated publications listing.
pub struct PublicationsStore {
    client: PortalClient,
    transport: Arc<dyn Transport>,
    store: FetchStore<Vec<Publication>>,
}

impl PublicationsStore {
    pub fn new(client: PortalClient, transport: Arc<dyn Transport>) -> Self {
        Self {
            client,
            transport,
            store: FetchStore::new("publications"),
        }
    }

    pub fn state(&self) -> FetchState<Vec<Publication>> {
        self.store.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState<Vec<Publication>>> {
        self.store.subscribe()
    }

    /// Load one page of publications.
    ///
    /// On success `data`, `total`, `page` and `per_page` take the server's
    /// values. On failure only `error` changes; the body is surfaced as is.
    pub async fn fetch_list(&self, filters: &PublicationFilters) {
        let ticket = self.store.begin();
        let request = self.client.build_list_publications(filters);
        debug!(path = %request.path, "fetching publications");

        let outcome = match self.transport.execute(request).await {
            Ok(response) => self.client.parse_list_publications(response),
            Err(err) => Err(err),
        }
        .map_err(|err| failure(self.store.name(), &err, ErrorShape::Verbatim));

        self.store.settle(ticket, |state| match outcome {
            Ok(page) => {
                state.data = Some(page.data);
                state.total = page.total;
                state.page = page.page;
                state.per_page = page.per_page;
                state.message = Some(LIST_LOADED.to_string());
            }
            Err(error) => state.error = Some(error),
        });
    }
}

/// A single publication, looked up by id.
pub struct PublicationDetailStore {
    client: PortalClient,
    transport: Arc<dyn Transport>,
    store: FetchStore<Publication>,
}

impl PublicationDetailStore {
    pub fn new(client: PortalClient, transport: Arc<dyn Transport>) -> Self {
        Self {
            client,
            transport,
            store: FetchStore::new("publication_detail"),
        }
    }

    pub fn state(&self) -> FetchState<Publication> {
        self.store.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState<Publication>> {
        self.store.subscribe()
    }

    /// Load the publication `id`. A blank id fails without issuing a request.
    pub async fn fetch_one(&self, id: impl Display) {
        let ticket = self.store.begin();
        let outcome = match self.client.build_get_publication(id) {
            Ok(request) => {
                debug!(path = %request.path, "fetching publication");
                match self.transport.execute(request).await {
                    Ok(response) => self
                        .client
                        .parse_get_publication(response)
                        .map_err(|err| failure(self.store.name(), &err, ErrorShape::MessageField)),
                    Err(err) => Err(failure(self.store.name(), &err, ErrorShape::MessageField)),
                }
            }
            Err(err) => {
                warn!(store = self.store.name(), error = %err, "rejected before request");
                Err(NormalizedError::Generic(MISSING_ID_ERROR.to_string()))
            }
        };

        self.store.settle(ticket, |state| match outcome {
            Ok(publication) => {
                state.data = Some(publication);
                state.message = Some(DETAIL_LOADED.to_string());
            }
            Err(error) => state.error = Some(error),
        });
    }
}

fn failure(store: &str, err: &ApiError, shape: ErrorShape) -> NormalizedError {
    let normalized = NormalizedError::normalize(err, shape, GENERIC_ERROR);
    warn!(store, error = %err, shown = %normalized, "request failed");
    normalized
}
