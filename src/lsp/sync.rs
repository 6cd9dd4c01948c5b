//! Best-effort buffer synchronisation issued ahead of every command

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use thiserror::Error;
use tower_lsp::lsp_types::{
    DidChangeTextDocumentParams, DidOpenTextDocumentParams, TextDocumentContentChangeEvent,
    TextDocumentItem, Url, VersionedTextDocumentIdentifier,
};
use tracing::{debug, warn};

use crate::lsp::backend::LanguageBackend;
use crate::lsp::error::BackendError;

#[derive(Debug, Error)]
enum SyncError {
    #[error("path is not absolute: {0:?}")]
    InvalidPath(PathBuf),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("failed to encode params: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Keeps the backend's view of each buffer current.
///
/// The first sync of a file opens it, later ones replace its full text.
/// Failures are logged and never reach the caller.
pub struct DocumentSyncGate {
    language_id: String,
    timeout: Duration,
    versions: Mutex<HashMap<PathBuf, i32>>,
}

impl DocumentSyncGate {
    pub fn new(language_id: &str, timeout: Duration) -> Self {
        Self {
            language_id: language_id.to_string(),
            timeout,
            versions: Mutex::new(HashMap::new()),
        }
    }

    /// Sends the current buffer to the backend. The outcome is discarded.
    ///
    /// Versions are allocated in call order, but no lock is held while the
    /// notification is in flight: two concurrent syncs of the same file may
    /// reach the backend out of order. Only syncs of one file issued one
    /// after the other are ordered.
    pub async fn sync(&self, backend: &dyn LanguageBackend, filepath: &Path, contents: &str) {
        if let Err(e) = self.try_sync(backend, filepath, contents).await {
            warn!("Document sync for {:?} failed: {}", filepath, e);
        }
    }

    /// Forgets every open document, so the next sync reopens it.
    pub fn reset(&self) {
        self.versions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    async fn try_sync(
        &self,
        backend: &dyn LanguageBackend,
        filepath: &Path,
        contents: &str,
    ) -> Result<(), SyncError> {
        let uri = Url::from_file_path(filepath)
            .map_err(|_| SyncError::InvalidPath(filepath.to_path_buf()))?;
        let version = self.next_version(filepath);

        let (method, params) = if version == 1 {
            let params = DidOpenTextDocumentParams {
                text_document: TextDocumentItem {
                    uri,
                    language_id: self.language_id.clone(),
                    version,
                    text: contents.to_string(),
                },
            };
            ("textDocument/didOpen", serde_json::to_value(params)?)
        } else {
            let params = DidChangeTextDocumentParams {
                text_document: VersionedTextDocumentIdentifier { uri, version },
                content_changes: vec![TextDocumentContentChangeEvent {
                    range: None,
                    range_length: None,
                    text: contents.to_string(),
                }],
            };
            ("textDocument/didChange", serde_json::to_value(params)?)
        };

        debug!("Syncing {:?} (version {})", filepath, version);

        let outcome = match tokio::time::timeout(self.timeout, backend.notify(method, params)).await
        {
            Ok(result) => result.map_err(SyncError::from),
            Err(_) => Err(SyncError::Timeout(self.timeout)),
        };

        if outcome.is_err() && version == 1 {
            // the backend never saw the document; open it again next time
            self.forget(filepath);
        }

        outcome
    }

    fn next_version(&self, filepath: &Path) -> i32 {
        let mut versions = self.versions.lock().unwrap_or_else(PoisonError::into_inner);
        let version = versions
            .entry(filepath.to_path_buf())
            .and_modify(|version| *version += 1)
            .or_insert(1);
        *version
    }

    fn forget(&self, filepath: &Path) {
        self.versions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(filepath);
    }
}
