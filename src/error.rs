//! Error signals surfaced by the integration endpoints.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use tracing::error;

/// Failure kinds returned to the caller of an integration operation.
#[derive(Debug, thiserror::Error)]
pub enum IntegrationError {
    /// Caller-side problem (bad or missing state, missing verifier or credentials,
    /// authorization denied by the provider). The detail is shown verbatim.
    #[error("{0}")]
    Client(String),

    /// Internal or upstream failure. Callers log the upstream detail before
    /// building this; the message itself stays generic.
    #[error("{0}")]
    Server(String),

    /// Non-success status from the provider's API, propagated as-is.
    #[error("HTTP error: {detail}")]
    Provider { status: u16, detail: String },

    /// Key-value backend failure.
    #[error("key-value store error: {0}")]
    Store(#[from] anyhow::Error),
}

impl IntegrationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            IntegrationError::Client(_) => StatusCode::BAD_REQUEST,
            IntegrationError::Server(_) | IntegrationError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            IntegrationError::Provider { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
        }
    }
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
}

impl IntoResponse for IntegrationError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let detail = match &self {
            IntegrationError::Store(e) => {
                error!(error = %e, "Key-value store operation failed");
                "Session storage unavailable".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(ErrorResponse { detail })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            IntegrationError::Client("State does not match.".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            IntegrationError::Server("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            IntegrationError::Provider {
                status: 401,
                detail: "401 Unauthorized".into()
            }
            .status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            IntegrationError::Store(anyhow::anyhow!("connection refused")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_invalid_provider_status_falls_back_to_bad_gateway() {
        let err = IntegrationError::Provider {
            status: 1000,
            detail: "weird".into(),
        };
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_client_error_body_carries_detail() {
        let response = IntegrationError::Client("No credentials found.".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["detail"], "No credentials found.");
    }

    #[tokio::test]
    async fn test_store_error_hides_backend_detail() {
        let response =
            IntegrationError::Store(anyhow::anyhow!("redis://secret-host refused")).into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["detail"], "Session storage unavailable");
    }
}
