use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::signature::SignatureError;
use crate::store::StoreError;

pub type Result<T> = anyhow::Result<T>;

/// Reasons a delivery is answered with something other than 200.
#[derive(Error, Debug)]
pub enum WebhookError {
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Server configuration error")]
    NotConfigured,
    #[error("Webhook error: {0}")]
    InvalidPayload(#[from] serde_json::Error),
    #[error("Invalid Signature")]
    InvalidSignature(#[source] SignatureError),
    #[error("Webhook error: {0}")]
    Store(#[from] StoreError),
}

impl WebhookError {
    pub fn status(&self) -> StatusCode {
        match self {
            WebhookError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            WebhookError::NotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            WebhookError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            WebhookError::InvalidSignature(_) => StatusCode::UNAUTHORIZED,
            // Senders retry 5xx; only a store outage is worth retrying.
            WebhookError::Store(e) if e.is_transient() => StatusCode::SERVICE_UNAVAILABLE,
            WebhookError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<SignatureError> for WebhookError {
    fn from(e: SignatureError) -> Self {
        WebhookError::InvalidSignature(e)
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_split_by_retryability() {
        let outage = WebhookError::Store(StoreError::Unavailable("timeout".to_string()));
        assert_eq!(outage.status(), StatusCode::SERVICE_UNAVAILABLE);

        let rejected = WebhookError::Store(StoreError::Rejected {
            table: "projects",
            status: 400,
            body: String::new(),
        });
        assert_eq!(rejected.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn signature_errors_hide_the_reason() {
        let error = WebhookError::from(SignatureError::Mismatch);
        assert_eq!(error.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error.to_string(), "Invalid Signature");
    }

    #[test]
    fn payload_errors_carry_parser_text() {
        let parse_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error = WebhookError::from(parse_error);

        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
        assert!(error.to_string().starts_with("Webhook error: EOF"));
    }
}
