// Backend protocol layer
// - backend.rs: LanguageBackend trait (request/response contract)
// - error.rs: Backend transport and protocol errors
// - service.rs: Adapter over tower services speaking tower_lsp::jsonrpc
// - state.rs: CompleterState readiness flag
// - sync.rs: DocumentSyncGate (didOpen/didChange before every command)
// - lifecycle.rs: initialize/initialized handshake

pub mod backend;
pub mod error;
pub mod lifecycle;
pub mod service;
pub mod state;
pub mod sync;

pub use backend::LanguageBackend;
pub use error::BackendError;
pub use service::ServiceBackend;
pub use state::CompleterState;
pub use sync::DocumentSyncGate;
