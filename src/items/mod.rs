//! HubSpot item fetching and normalization.
//!
//! Reads one page of CRM contacts with the caller's access token and maps each
//! record into an [`IntegrationItem`], the provider-independent shape consumed
//! by the frontend.

mod api;
mod transformer;

pub use api::{HubSpotClient, HubSpotObject, CONTACTS_PATH};
pub use transformer::{create_integration_item, parse_timestamp, HUBSPOT_TIMESTAMP_FORMAT};

use crate::credentials::Credential;
use crate::error::IntegrationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

/// Type tag for CRM contacts
pub const CONTACTS_ITEM_TYPE: &str = "hubspot_object_contacts";

/// Normalized provider record
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntegrationItem {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub creation_time: DateTime<Utc>,
    pub last_modified_time: DateTime<Utc>,
    pub properties: Map<String, Value>,
}

/// Load the first page of contacts for the given credential JSON.
///
/// `credentials` is the token response exactly as handed out by the
/// credentials endpoint.
pub async fn get_items(
    client: &HubSpotClient,
    credentials: &str,
) -> Result<Vec<IntegrationItem>, IntegrationError> {
    let credential: Credential = serde_json::from_str(credentials).map_err(|e| {
        warn!(error = %e, "Rejected malformed HubSpot credentials");
        IntegrationError::Client("Invalid credentials.".to_string())
    })?;

    // TODO: follow `paging.next.after` once callers need more than the first page
    let objects = client
        .fetch_page(&credential.access_token, &client.contacts_url())
        .await?;

    let items = objects
        .iter()
        .map(|object| create_integration_item(object, CONTACTS_ITEM_TYPE))
        .collect::<Result<Vec<_>, _>>()?;

    info!(count = items.len(), "Loaded HubSpot contacts");
    Ok(items)
}
