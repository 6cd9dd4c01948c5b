use tracing::info;

use crate::command::error::CommandError;
use crate::command::response::CommandResponse;
use crate::lsp::backend::LanguageBackend;
use crate::lsp::state::CompleterState;
use crate::lsp::sync::DocumentSyncGate;

/// Drops readiness, forgets open documents and relaunches the backend.
///
/// Readiness only returns once the lifecycle collaborator completes a new handshake.
pub async fn restart(
    backend: &dyn LanguageBackend,
    state: &CompleterState,
    gate: &DocumentSyncGate,
) -> Result<CommandResponse, CommandError> {
    state.reset();
    gate.reset();
    backend.restart().await?;
    info!("Backend restarted");
    Ok(CommandResponse::Empty)
}
