// HTTP API (axum routers)
pub mod api;

// Configuration loading
pub mod config;

// Provider token responses
pub mod credentials;

// Error signals returned to callers
pub mod error;

// Contact fetching and normalization
pub mod items;

// OAuth 2.0 + PKCE handshake
pub mod oauth;

// Short-lived session storage
pub mod store;

pub use error::IntegrationError;

/// User agent sent on every outbound request
const USER_AGENT: &str = concat!("hubspot-connector/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client for the token endpoint and the CRM API
pub fn build_http_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder().user_agent(USER_AGENT).build()
}
