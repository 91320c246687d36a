use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("invalid subscription: {0}")]
    InvalidSubscription(&'static str),
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("no subscriptions available")]
    NoSubscribers,

    #[error("subscription is gone: {endpoint}")]
    SubscriptionGone { endpoint: String },

    #[error("delivery failed{}: {reason}", status_suffix(.status_code))]
    DeliveryFailure {
        status_code: Option<u16>,
        reason: String,
    },

    #[error("failed to serialize notification payload: {0}")]
    Payload(#[from] serde_json::Error),
}

fn status_suffix(status_code: &Option<u16>) -> String {
    match status_code {
        Some(code) => format!(" (HTTP {code})"),
        None => String::new(),
    }
}

#[derive(Debug, Error)]
pub enum ServeError {
    #[error("failed to initialize web-push client: {0}")]
    Sender(#[from] web_push::WebPushError),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors returned by HTTP handlers, rendered as `{"success": false, "error": ...}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("invalid request: {0}")]
    BadRequest(&'static str),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Registry(RegistryError::InvalidSubscription(_)) => StatusCode::BAD_REQUEST,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Dispatch(DispatchError::NoSubscribers) => StatusCode::BAD_REQUEST,
            ApiError::Dispatch(DispatchError::SubscriptionGone { .. }) => StatusCode::GONE,
            ApiError::Dispatch(DispatchError::DeliveryFailure { .. }) => StatusCode::BAD_GATEWAY,
            ApiError::Dispatch(DispatchError::Payload(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let message = if status.is_server_error() && status != StatusCode::BAD_GATEWAY {
            tracing::error!(error = %self, "request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = json!({ "success": false, "error": message });
        (status, Json(body)).into_response()
    }
}
