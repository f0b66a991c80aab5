use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use hoard_protocol::ProtocolError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// HTTP status reported when this error ends a request.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Protocol(
                ProtocolError::OutsideBasePath { .. }
                | ProtocolError::MalformedPath(_)
                | ProtocolError::InvalidEscape(_),
            ) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

pub type ServerResult<T> = Result<T, ServerError>;
