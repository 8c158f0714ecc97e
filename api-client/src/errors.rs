// API client errors

/// API client error types
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Server answered with a non-2xx status
    #[error("HTTP error: {status}")]
    Remote { status: u16 },

    /// Request never produced a response
    #[error("network error: {0}")]
    Network(String),

    /// 2xx response whose body could not be decoded
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// Request could not be built (bad URL, bad multipart part)
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    /// HTTP status carried by a remote failure
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Remote { status } => Some(*status),
            _ => None,
        }
    }
}
