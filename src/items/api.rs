use crate::error::IntegrationError;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, error};

/// Contacts listing, relative to the API base URL
pub const CONTACTS_PATH: &str = "/crm/v3/objects/contacts";

/// One CRM object as returned by the v3 objects API.
#[derive(Clone, Debug, Deserialize)]
pub struct HubSpotObject {
    pub id: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

/// A page of objects. Paging cursors are not followed.
#[derive(Debug, Deserialize)]
struct ObjectPage {
    #[serde(default)]
    results: Vec<HubSpotObject>,
}

/// HTTP client for the HubSpot CRM REST API.
///
/// Authenticates every request with the caller's Bearer token.
#[derive(Clone)]
pub struct HubSpotClient {
    http_client: Client,
    base_url: String,
}

impl HubSpotClient {
    /// `base_url` is `https://api.hubapi.com` in production, a mock server in tests.
    pub fn new(http_client: Client, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
        }
    }

    pub fn contacts_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), CONTACTS_PATH)
    }

    /// Fetch a single page of objects from `url`.
    ///
    /// - Non-2xx → [`IntegrationError::Provider`] with the upstream status
    /// - Transport or decoding failure → [`IntegrationError::Server`]
    pub async fn fetch_page(
        &self,
        access_token: &str,
        url: &str,
    ) -> Result<Vec<HubSpotObject>, IntegrationError> {
        let response = self
            .http_client
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| {
                error!(url = %url, error = %e, "Failed to send HubSpot request");
                IntegrationError::Server("Failed to fetch items from HubSpot".to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(url = %url, status = %status, body = %body, "HubSpot API error");
            return Err(IntegrationError::Provider {
                status: status.as_u16(),
                detail: format!("{} for url {}", status, url),
            });
        }

        let page: ObjectPage = response.json().await.map_err(|e| {
            error!(url = %url, error = %e, "Failed to parse HubSpot response");
            IntegrationError::Server("Failed to fetch items from HubSpot".to_string())
        })?;

        debug!(url = %url, count = page.results.len(), "Fetched HubSpot page");
        Ok(page.results)
    }
}
