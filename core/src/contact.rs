//! Store backing the contact form.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::client::PortalClient;
use crate::error::{ErrorShape, NormalizedError};
use crate::store::{FetchState, FetchStore};
use crate::transport::Transport;
use crate::types::{Message, NewMessage};

pub const SUBMIT_ERROR: &str = "An error occurred while sending the form";
pub const MESSAGE_SENT: &str = "Message sent successfully";

pub struct ContactStore {
    client: PortalClient,
    transport: Arc<dyn Transport>,
    store: FetchStore<Message>,
}

impl ContactStore {
    pub fn new(client: PortalClient, transport: Arc<dyn Transport>) -> Self {
        Self {
            client,
            transport,
            store: FetchStore::new("contact"),
        }
    }

    pub fn state(&self) -> FetchState<Message> {
        self.store.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState<Message>> {
        self.store.subscribe()
    }

    /// Post a contact message.
    ///
    /// On success `data` holds the created record, or nothing when the body
    /// was not one. Errors are always a list: the server's list as sent, a
    /// single error wrapped, or the generic message when no response arrived.
    pub async fn submit_message(&self, fields: &NewMessage) {
        let ticket = self.store.begin();
        let outcome = match self.client.build_submit_message(fields) {
            Ok(request) => {
                debug!(path = %request.path, "submitting message");
                match self.transport.execute(request).await {
                    Ok(response) => self.client.parse_submit_message(response),
                    Err(err) => Err(err),
                }
            }
            Err(err) => Err(err),
        }
        .map_err(|err| {
            let normalized = NormalizedError::normalize(&err, ErrorShape::List, SUBMIT_ERROR);
            warn!(store = self.store.name(), error = %err, shown = %normalized, "request failed");
            normalized
        });

        self.store.settle(ticket, |state| match outcome {
            Ok(submission) => {
                state.data = submission.created;
                if submission.status == 201 {
                    state.message = Some(MESSAGE_SENT.to_string());
                }
            }
            Err(error) => state.error = Some(error),
        });
    }
}
