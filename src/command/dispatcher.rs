use std::sync::Arc;

use tower_lsp::lsp_types::ServerCapabilities;
use tracing::{debug, warn};

use crate::command::context::CommandContext;
use crate::command::error::CommandError;
use crate::command::handlers::goto::{self, NavigationMethod};
use crate::command::handlers::{fixit, format, hover, lifecycle, rename};
use crate::command::request::CommandRequest;
use crate::command::response::{CommandResponse, Reply};
use crate::command::subcommand::{self, Subcommand};
use crate::config::Settings;
use crate::lsp::backend::LanguageBackend;
use crate::lsp::state::CompleterState;
use crate::lsp::sync::DocumentSyncGate;

/// Routes subcommands for one backend instance.
///
/// Holds no per-call state; the readiness flag is shared with the lifecycle
/// collaborator through `CompleterState`.
pub struct CommandDispatcher {
    backend: Arc<dyn LanguageBackend>,
    state: Arc<CompleterState>,
    gate: DocumentSyncGate,
    settings: Settings,
}

impl CommandDispatcher {
    pub fn new(
        backend: Arc<dyn LanguageBackend>,
        state: Arc<CompleterState>,
        settings: Settings,
    ) -> Self {
        let gate = DocumentSyncGate::new(&settings.language_id, settings.request_timeout);
        Self {
            backend,
            state,
            gate,
            settings,
        }
    }

    pub fn state(&self) -> &Arc<CompleterState> {
        &self.state
    }

    pub fn backend(&self) -> &Arc<dyn LanguageBackend> {
        &self.backend
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Subcommands the running backend supports; only RestartServer before the handshake.
    pub fn defined_subcommands(&self) -> Vec<&'static str> {
        let capabilities = self.state.capabilities().unwrap_or_else(ServerCapabilities::default);
        subcommand::defined_subcommands(&capabilities)
    }

    /// Executes `request` and renders the outcome with its status.
    pub async fn reply(&self, request: &CommandRequest) -> Reply {
        Reply::from_result(self.execute(request).await)
    }

    pub async fn execute(&self, request: &CommandRequest) -> Result<CommandResponse, CommandError> {
        let generation = self.state.generation();
        let parsed = request.command.parse::<Subcommand>();

        // Readiness is checked before the name, so nothing reaches the backend early
        let exempt = matches!(&parsed, Ok(subcommand) if !subcommand.descriptor().requires_ready);
        if !exempt && !self.state.is_initialized() {
            debug!("Rejecting {} while the backend initializes", request.command);
            return Err(CommandError::ServerNotInitialized);
        }

        let subcommand = parsed?;
        let descriptor = subcommand.descriptor();
        let argument = descriptor.arguments.extract(request)?;

        debug!(
            "Executing {} at {:?}:{}:{}",
            subcommand, request.filepath, request.line, request.column
        );

        if subcommand != Subcommand::RestartServer {
            validate_positions(request)?;
            self.gate
                .sync(self.backend.as_ref(), &request.filepath, &request.buffer_text)
                .await;
        }

        let mut cx = CommandContext::new(
            self.backend.as_ref(),
            request,
            self.settings.request_timeout,
        );
        let argument = argument.as_deref().unwrap_or_default();
        let capabilities = self.state.capabilities().unwrap_or_default();

        let result = match subcommand {
            Subcommand::Format => format::format(&mut cx).await,
            Subcommand::FixIt => fixit::fixits(&mut cx).await,
            Subcommand::GetDoc => hover::get_doc(&mut cx).await,
            Subcommand::GetType => hover::get_type(&mut cx).await,
            Subcommand::GoTo => goto::chain(&mut cx, goto::GOTO, &capabilities).await,
            Subcommand::GoToDeclaration => {
                goto::chain(&mut cx, goto::GOTO_DECLARATION, &capabilities).await
            }
            Subcommand::GoToDefinition => {
                goto::chain(&mut cx, goto::GOTO_DEFINITION, &capabilities).await
            }
            Subcommand::GoToDocumentOutline => goto::outline(&mut cx).await,
            Subcommand::GoToImplementation => {
                goto::single(&mut cx, NavigationMethod::Implementation).await
            }
            Subcommand::GoToReferences => goto::single(&mut cx, NavigationMethod::References).await,
            Subcommand::GoToSymbol => goto::symbol(&mut cx, argument).await,
            Subcommand::GoToType => goto::single(&mut cx, NavigationMethod::TypeDefinition).await,
            Subcommand::RefactorRename => rename::rename(&mut cx, argument).await,
            Subcommand::RestartServer => {
                lifecycle::restart(self.backend.as_ref(), &self.state, &self.gate).await
            }
        };

        if descriptor.requires_ready && !self.state.is_current(generation) {
            warn!("Backend restarted while {} was in flight", subcommand);
            return Err(CommandError::ServerNotInitialized);
        }

        result
    }
}

/// Rejects a 0-based cursor or an inverted or 0-based selection before anything is sent.
fn validate_positions(request: &CommandRequest) -> Result<(), CommandError> {
    if !request.cursor().is_valid() {
        return Err(CommandError::InvalidRequest(format!(
            "line and column are 1-based, got {}:{}",
            request.line, request.column
        )));
    }
    match request.range {
        Some(range) if !range.is_valid() => Err(CommandError::InvalidRequest(format!(
            "range must be 1-based and end after it starts, got {:?}",
            range
        ))),
        _ => Ok(()),
    }
}
