//! Readiness state shared between the dispatcher and the lifecycle collaborator

use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tower_lsp::lsp_types::ServerCapabilities;
use tracing::info;

/// Readiness of one backend instance.
///
/// Readers go through [`CompleterState::is_initialized`]; only the lifecycle
/// collaborator (handshake and restart) writes.
#[derive(Debug, Default)]
pub struct CompleterState {
    initialized: AtomicBool,
    generation: AtomicU64,
    capabilities: RwLock<Option<ServerCapabilities>>,
}

impl CompleterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Current restart generation. Changes every time the backend is torn down.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// True when the backend is ready and no restart happened since `generation` was read.
    pub fn is_current(&self, generation: u64) -> bool {
        self.is_initialized() && self.generation() == generation
    }

    /// Records handshake completion.
    pub fn mark_initialized(&self, capabilities: ServerCapabilities) {
        if let Ok(mut guard) = self.capabilities.write() {
            *guard = Some(capabilities);
        }
        self.initialized.store(true, Ordering::SeqCst);
        info!("Backend initialized");
    }

    /// Drops readiness ahead of a restart; every in-flight gated command will fail.
    pub fn reset(&self) {
        self.initialized.store(false, Ordering::SeqCst);
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut guard) = self.capabilities.write() {
            *guard = None;
        }
        info!("Backend state reset, waiting for readiness");
    }

    /// Capabilities reported by the last successful handshake.
    pub fn capabilities(&self) -> Option<ServerCapabilities> {
        self.capabilities
            .read()
            .ok()
            .and_then(|guard| guard.clone())
    }
}
