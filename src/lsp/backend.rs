//! Contract the per-language backend process must honour

use async_trait::async_trait;
use serde_json::Value;

use crate::lsp::error::BackendError;

/// Request/response channel to a language backend.
///
/// Framing, request ids and process management live behind this trait.
/// Implementations must deliver `notify` and `request` calls issued by the
/// same task in program order.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LanguageBackend: Send + Sync {
    /// Sends a request and waits for the correlated response.
    ///
    /// # Returns
    /// * `Ok(Value)` - The `result` member of the response (`Value::Null` for `null`)
    /// * `Err(BackendError)` - The backend answered with an error object or the channel failed
    async fn request(&self, method: &str, params: Value) -> Result<Value, BackendError>;

    /// Sends a notification; no response is expected.
    async fn notify(&self, method: &str, params: Value) -> Result<(), BackendError>;

    /// Tears down and relaunches the backend.
    async fn restart(&self) -> Result<(), BackendError>;
}
