use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{error, warn};

use crate::AssistantError;

/// Errors returned by the HTTP handlers. Messages are sent to the client as plain text.
#[derive(Error, Debug)]
pub enum WebError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    /// The cause is logged; only `message` reaches the client
    #[error("{message}")]
    Processing {
        message: &'static str,
        #[source]
        source: AssistantError,
    },

    #[error("Internal server error")]
    Internal(String),
}

impl WebError {
    #[inline]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    #[inline]
    pub fn processing(message: &'static str, source: impl Into<AssistantError>) -> Self {
        Self::Processing {
            message,
            source: source.into(),
        }
    }

    #[inline]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Processing { .. } | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebError {
    #[inline]
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::BadRequest(message) | Self::PayloadTooLarge(message) => {
                warn!("Rejected request ({}): {}", status.as_u16(), message);
            }
            Self::Processing { message, source } => {
                error!("{}: {}", message, source);
            }
            Self::Internal(details) => {
                error!("Internal server error: {}", details);
            }
        }

        (status, self.to_string()).into_response()
    }
}
