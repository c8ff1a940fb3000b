//! HubSpot integration endpoints.
//!
//! - `POST /integrations/hubspot/authorize` → authorization URL (JSON string)
//! - `GET  /integrations/hubspot/oauth2callback` → close-window HTML
//! - `POST /integrations/hubspot/credentials` → stored token response, once
//! - `POST /integrations/hubspot/get_hubspot_items` → normalized contacts
//!
//! Request bodies are forms, urlencoded or multipart (see [`FormData`]).

use super::form::FormData;
use crate::credentials::Credential;
use crate::error::IntegrationError;
use crate::items::{self, HubSpotClient, IntegrationItem};
use crate::oauth::{HubSpotOAuth, OAuthCallback};
use axum::{
    extract::{Query, State},
    response::{Html, Json},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;


/// Shared application state for the integration API
#[derive(Clone)]
pub struct IntegrationAppState {
    pub oauth: HubSpotOAuth,
    pub hubspot_client: HubSpotClient,
}

/// Form identifying the session
#[derive(Debug, Deserialize)]
pub struct SessionForm {
    pub user_id: String,
    pub org_id: String,
}

/// Form carrying the credential JSON previously handed out
#[derive(Debug, Deserialize)]
pub struct ItemsForm {
    pub credentials: String,
}

/// Create HubSpot integration router
pub fn create_integration_router(state: IntegrationAppState) -> Router {
    Router::new()
        .route("/integrations/hubspot/authorize", post(authorize))
        .route("/integrations/hubspot/oauth2callback", get(oauth2callback))
        .route("/integrations/hubspot/credentials", post(credentials))
        .route("/integrations/hubspot/get_hubspot_items", post(get_hubspot_items))
        .with_state(Arc::new(state))
}

async fn authorize(
    State(state): State<Arc<IntegrationAppState>>,
    FormData(form): FormData<SessionForm>,
) -> Result<Json<String>, IntegrationError> {
    debug!(org_id = %form.org_id, user_id = %form.user_id, "Authorize requested");
    let url = state.oauth.authorize(&form.user_id, &form.org_id).await?;
    Ok(Json(url))
}

async fn oauth2callback(
    State(state): State<Arc<IntegrationAppState>>,
    Query(callback): Query<OAuthCallback>,
) -> Result<Html<&'static str>, IntegrationError> {
    state.oauth.handle_callback(callback).await
}

async fn credentials(
    State(state): State<Arc<IntegrationAppState>>,
    FormData(form): FormData<SessionForm>,
) -> Result<Json<Credential>, IntegrationError> {
    let credential = state
        .oauth
        .get_credentials(&form.user_id, &form.org_id)
        .await?;
    Ok(Json(credential))
}

async fn get_hubspot_items(
    State(state): State<Arc<IntegrationAppState>>,
    FormData(form): FormData<ItemsForm>,
) -> Result<Json<Vec<IntegrationItem>>, IntegrationError> {
    let items = items::get_items(&state.hubspot_client, &form.credentials).await?;
    Ok(Json(items))
}
