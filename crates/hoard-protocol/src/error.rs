use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("path {path:?} is not under base path {base_path:?}")]
    OutsideBasePath { path: String, base_path: String },

    #[error("malformed request path {0:?}: expected <namespace>/<key>")]
    MalformedPath(String),

    #[error("invalid escape sequence in {0:?}")]
    InvalidEscape(String),

    #[error("value too large: {size} bytes (max {max})")]
    ValueTooLarge { size: usize, max: usize },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;
