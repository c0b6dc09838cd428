//! MongoDB-backed sites
//!
//! The client is built from the site's single parameter. Building a client
//! does not contact the server, so reachability problems show up on the
//! first point registration or CRUD call.

use mongodb::{options::ClientOptions, Client};
use tracing::{debug, warn};

use super::Site;
use crate::storage::errors::{StorageError, StorageResult};

/// Client of a mongo site, or the reason it could not be built
pub(crate) struct MongoHandle {
    site: String,
    client: Result<Client, String>,
}

impl MongoHandle {
    pub(crate) fn client(&self) -> StorageResult<Client> {
        self.client.clone().map_err(|reason| {
            StorageError::Connection(format!("site '{}': {}", self.site, reason))
        })
    }
}

pub(super) async fn initialize(site: &Site) -> MongoHandle {
    let uri = site.parameters().first().map(String::as_str).unwrap_or_default();

    let client = match ClientOptions::parse(uri).await {
        Ok(mut options) => {
            if options.app_name.is_none() {
                options.app_name = Some(site.owner().name().to_string());
            }
            Client::with_options(options).map_err(|e| e.to_string())
        }
        Err(e) => Err(e.to_string()),
    };

    match &client {
        Ok(_) => debug!(site = %site.name(), "mongo client created"),
        Err(reason) => warn!(site = %site.name(), %reason, "mongo client unavailable"),
    }

    MongoHandle {
        site: site.name().to_string(),
        client,
    }
}

pub(super) async fn terminate(handle: MongoHandle) {
    if let Ok(client) = handle.client {
        client.shutdown().await;
    }
}
