//! Initialize/initialized handshake
//!
//! Spawning the backend is somebody else's job; this only performs the
//! protocol handshake on an already running backend and records readiness.

use std::path::Path;
use std::time::Duration;

use serde_json::json;
use tower_lsp::lsp_types::{
    ClientCapabilities, InitializeParams, InitializeResult, InitializedParams, Url,
    WorkspaceFolder,
};
use tracing::info;

use crate::lsp::backend::LanguageBackend;
use crate::lsp::error::BackendError;
use crate::lsp::state::CompleterState;

/// Runs the handshake and flips `state` to ready on success.
pub async fn handshake(
    backend: &dyn LanguageBackend,
    root: &Path,
    state: &CompleterState,
    timeout: Duration,
) -> Result<InitializeResult, BackendError> {
    let root_uri = Url::from_directory_path(root)
        .map_err(|_| BackendError::InvalidPayload(format!("invalid root path: {:?}", root)))?;

    #[allow(deprecated)]
    let params = InitializeParams {
        process_id: Some(std::process::id()),
        root_uri: Some(root_uri.clone()),
        workspace_folders: Some(vec![WorkspaceFolder {
            uri: root_uri,
            name: root
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
        }]),
        capabilities: ClientCapabilities::default(),
        ..Default::default()
    };

    let params =
        serde_json::to_value(params).map_err(|e| BackendError::InvalidPayload(e.to_string()))?;

    let response = tokio::time::timeout(timeout, backend.request("initialize", params))
        .await
        .map_err(|_| BackendError::Closed(format!("initialize timed out after {:?}", timeout)))??;

    let result: InitializeResult = serde_json::from_value(response)
        .map_err(|e| BackendError::InvalidPayload(e.to_string()))?;

    let initialized =
        serde_json::to_value(InitializedParams {}).unwrap_or_else(|_| json!({}));
    backend.notify("initialized", initialized).await?;

    info!(
        "Handshake completed with {}",
        result
            .server_info
            .as_ref()
            .map(|info| info.name.as_str())
            .unwrap_or("unknown backend")
    );
    state.mark_initialized(result.capabilities.clone());

    Ok(result)
}
