use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::command::types::Position;
use crate::lsp::error::BackendError;

pub const SERVER_NOT_INITIALIZED: &str = "Server is initializing. Please wait.";
pub const CANNOT_JUMP: &str = "Cannot jump to location";
pub const NO_DOCUMENTATION: &str = "No documentation available.";
pub const UNKNOWN_TYPE: &str = "Unknown type.";
pub const CANNOT_RENAME: &str = "Cannot rename the symbol under cursor.";
pub const RENAME_USAGE: &str =
    "Please specify a new name to rename it to.\nUsage: RefactorRename <new name>";
pub const SYMBOL_QUERY_REQUIRED: &str = "Must specify something to search for";

/// Every failure a subcommand can report. `Display` is the caller-visible message.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("Server is initializing. Please wait.")]
    ServerNotInitialized,

    /// Zero matches for a navigation, documentation or type query
    #[error("{0}")]
    NoResult(String),

    #[error("{0}")]
    InvalidTarget(String),

    /// Failure reported by the backend itself, message untouched
    #[error("{message}")]
    BackendCapability { code: i64, message: String },

    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Unknown subcommand: {0}")]
    UnsupportedCommand(String),

    #[error("Response timeout for {method} after {timeout:?}")]
    Timeout { method: String, timeout: Duration },

    #[error("{0}")]
    MissingArgument(String),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("Invalid response from backend: {0}")]
    InvalidResponse(String),
}

impl CommandError {
    pub fn cannot_jump() -> Self {
        Self::NoResult(CANNOT_JUMP.to_string())
    }

    pub fn no_documentation() -> Self {
        Self::NoResult(NO_DOCUMENTATION.to_string())
    }

    pub fn unknown_type() -> Self {
        Self::NoResult(UNKNOWN_TYPE.to_string())
    }

    pub fn cannot_rename() -> Self {
        Self::InvalidTarget(CANNOT_RENAME.to_string())
    }

    /// Stable kind name reported alongside the message
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ServerNotInitialized => "ServerNotInitializedError",
            Self::NoResult(_) => "NoResultError",
            Self::InvalidTarget(_) => "InvalidTargetError",
            Self::BackendCapability { .. } => "BackendCapabilityError",
            Self::BackendUnavailable(_) => "BackendUnavailableError",
            Self::UnsupportedCommand(_) => "UnsupportedCommandError",
            Self::Timeout { .. } => "TimeoutError",
            Self::MissingArgument(_) => "MissingArgumentError",
            Self::InvalidRequest(_) => "InvalidRequestError",
            Self::InvalidResponse(_) => "InvalidResponseError",
        }
    }

    /// True when the caller may retry the same request later unchanged
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ServerNotInitialized | Self::Timeout { .. })
    }
}

impl From<BackendError> for CommandError {
    fn from(error: BackendError) -> Self {
        match error {
            BackendError::Rpc { code, message } => Self::BackendCapability { code, message },
            BackendError::InvalidPayload(message) => Self::InvalidResponse(message),
            other @ (BackendError::Closed(_) | BackendError::Restart(_)) => {
                Self::BackendUnavailable(other.to_string())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplyError {
    #[error("Position {0:?} is outside the buffer")]
    OutOfBounds(Position),

    #[error("Overlapping edits for {0:?}")]
    Overlap(PathBuf),
}
