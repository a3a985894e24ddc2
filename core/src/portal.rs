//! The set of stores a portal UI works with.
//!
//! Construct one `Portal` at startup and hand references to the views that
//! need it. All stores share a single client and transport.

use std::sync::Arc;

use tracing::info;

use crate::client::PortalClient;
use crate::config::Config;
use crate::contact::ContactStore;
use crate::error::ApiError;
use crate::publications::{PublicationDetailStore, PublicationsStore};
use crate::transport::{ReqwestTransport, Transport};

pub struct Portal {
    pub publications: PublicationsStore,
    pub publication_detail: PublicationDetailStore,
    pub contact: ContactStore,
}

impl Portal {
    pub fn new(client: PortalClient, transport: Arc<dyn Transport>) -> Self {
        Self {
            publications: PublicationsStore::new(client.clone(), transport.clone()),
            publication_detail: PublicationDetailStore::new(client.clone(), transport.clone()),
            contact: ContactStore::new(client, transport),
        }
    }

    /// Stores talking to `config.api_url` over reqwest.
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        let transport = ReqwestTransport::new(config.timeout)?;
        info!(api_url = %config.api_url, timeout = ?config.timeout, "portal configured");
        Ok(Self::new(PortalClient::new(&config.api_url), Arc::new(transport)))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::testing::ScriptedTransport;
    use crate::types::PublicationFilters;

    #[tokio::test]
    async fn stores_share_transport_but_not_state() {
        let transport = Arc::new(ScriptedTransport::default());
        transport.fail("offline");
        let portal = Portal::new(PortalClient::new("http://api.test/"), transport.clone());

        portal.publications.fetch_list(&PublicationFilters::default()).await;

        assert!(portal.publications.state().error.is_some());
        assert!(portal.publication_detail.state().error.is_none());
        assert!(portal.contact.state().error.is_none());
        assert_eq!(transport.requests()[0].path, "http://api.test/publications/");
    }

    #[test]
    fn from_config_builds_reqwest_backed_portal() {
        let config = Config::new("http://api.test").with_timeout(Duration::from_secs(2));
        let portal = Portal::from_config(&config).unwrap();
        assert!(portal.publications.state().data.is_none());
    }
}
