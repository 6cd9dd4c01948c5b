use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BackendError {
    /// JSON-RPC error object returned by the backend, message kept verbatim
    #[error("{message}")]
    Rpc { code: i64, message: String },

    #[error("Backend connection closed: {0}")]
    Closed(String),

    #[error("Backend sent an invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Backend restart failed: {0}")]
    Restart(String),
}
