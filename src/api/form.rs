//! Form body extractor accepting both browser encodings.
//!
//! A `FormData` object posted from the frontend arrives as
//! `multipart/form-data`; plain HTML forms and most clients send
//! `application/x-www-form-urlencoded`. [`FormData`] dispatches on
//! `Content-Type` and deserializes either into the same struct.

use crate::error::IntegrationError;
use async_trait::async_trait;
use axum::{
    extract::{FromRequest, Multipart, Request},
    http::header,
    Form,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

/// Form fields deserialized into `T`, from a urlencoded or multipart body.
#[derive(Debug)]
pub struct FormData<T>(pub T);

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|content_type| content_type.starts_with("multipart/form-data"))
        .unwrap_or(false)
}

#[async_trait]
impl<S, T> FromRequest<S> for FormData<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = IntegrationError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !is_multipart(&req) {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(|e| IntegrationError::Client(e.body_text()))?;
            return Ok(FormData(value));
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| IntegrationError::Client(e.body_text()))?;

        let mut fields = Map::new();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| IntegrationError::Client(format!("Invalid multipart body: {}", e)))?
        {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };
            let text = field.text().await.map_err(|e| {
                IntegrationError::Client(format!("Invalid multipart field '{}': {}", name, e))
            })?;
            fields.insert(name, Value::String(text));
        }

        debug!(fields = fields.len(), "Parsed multipart form");

        serde_json::from_value(Value::Object(fields))
            .map(FormData)
            .map_err(|e| IntegrationError::Client(format!("Failed to deserialize form: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Session {
        user_id: String,
        org_id: String,
    }

    const BOUNDARY: &str = "form-boundary";

    fn multipart_body(pairs: &[(&str, &str)]) -> String {
        let mut body = String::new();
        for (name, value) in pairs {
            body.push_str(&format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            ));
        }
        body.push_str(&format!("--{}--\r\n", BOUNDARY));
        body
    }

    fn request(content_type: &str, body: String) -> Request {
        axum::http::Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_urlencoded_body() {
        let req = request(
            "application/x-www-form-urlencoded",
            "user_id=TestUser&org_id=TestOrg".to_string(),
        );

        let FormData(session) = FormData::<Session>::from_request(req, &()).await.unwrap();
        assert_eq!(session.user_id, "TestUser");
        assert_eq!(session.org_id, "TestOrg");
    }

    #[tokio::test]
    async fn test_multipart_body() {
        let req = request(
            &format!("multipart/form-data; boundary={}", BOUNDARY),
            multipart_body(&[("user_id", "TestUser"), ("org_id", "TestOrg")]),
        );

        let FormData(session) = FormData::<Session>::from_request(req, &()).await.unwrap();
        assert_eq!(session.user_id, "TestUser");
        assert_eq!(session.org_id, "TestOrg");
    }

    #[tokio::test]
    async fn test_multipart_missing_field_is_client_error() {
        let req = request(
            &format!("multipart/form-data; boundary={}", BOUNDARY),
            multipart_body(&[("user_id", "TestUser")]),
        );

        let err = FormData::<Session>::from_request(req, &()).await.unwrap_err();
        assert!(matches!(err, IntegrationError::Client(_)));
    }

    #[tokio::test]
    async fn test_json_body_is_rejected() {
        let req = request(
            "application/json",
            r#"{"user_id":"TestUser","org_id":"TestOrg"}"#.to_string(),
        );

        let err = FormData::<Session>::from_request(req, &()).await.unwrap_err();
        assert!(matches!(err, IntegrationError::Client(_)));
    }
}
