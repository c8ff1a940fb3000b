//! OAuth token exchange logic.
//!
//! Redeems an authorization code plus PKCE verifier for an access token.

use crate::config::HubSpotConfig;
use crate::credentials::Credential;
use crate::error::IntegrationError;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::{debug, error};

const EXCHANGE_FAILED: &str = "Failed to exchange code for access token";

/// OAuth token exchange request (form-encoded)
#[derive(Serialize)]
struct TokenRequest<'a> {
    grant_type: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
    redirect_uri: &'a str,
    code: &'a str,
    code_verifier: &'a str,
}

/// Successful token response
#[derive(Debug, Clone)]
pub struct TokenGrant {
    pub credential: Credential,
    /// Body exactly as the provider sent it
    pub raw: String,
}

/// Exchange authorization code for access token
///
/// # Returns
/// * `Ok(TokenGrant)` - the parsed token response and its raw body
/// * `Err(IntegrationError::Server)` - transport failure, non-200 status or
///   a body without `access_token`. The upstream detail is logged only.
pub async fn exchange_code_for_token(
    http_client: &Client,
    config: &HubSpotConfig,
    code: &str,
    code_verifier: &str,
) -> Result<TokenGrant, IntegrationError> {
    let request = TokenRequest {
        grant_type: "authorization_code",
        client_id: &config.client_id,
        client_secret: &config.client_secret,
        redirect_uri: &config.redirect_uri,
        code,
        code_verifier,
    };

    debug!("Exchanging authorization code for token at {}", config.token_url);

    let response = http_client
        .post(&config.token_url)
        .header("Accept", "application/json")
        .form(&request)
        .send()
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to send token exchange request");
            IntegrationError::Server(EXCHANGE_FAILED.to_string())
        })?;

    if response.status() != StatusCode::OK {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        error!(status = %status, body = %body, "Failed to fetch token");
        return Err(IntegrationError::Server(EXCHANGE_FAILED.to_string()));
    }

    let raw = response.text().await.map_err(|e| {
        error!(error = %e, "Failed to read token response");
        IntegrationError::Server(EXCHANGE_FAILED.to_string())
    })?;
    let credential: Credential = serde_json::from_str(&raw).map_err(|e| {
        error!(error = %e, "Failed to parse token response");
        IntegrationError::Server(EXCHANGE_FAILED.to_string())
    })?;

    debug!(
        "Token exchange successful, has_refresh_token={}, expires_in={:?}",
        credential.refresh_token.is_some(),
        credential.expires_in
    );

    Ok(TokenGrant { credential, raw })
}
