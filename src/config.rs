use std::path::PathBuf;
use std::time::Duration;

/// Default backend round-trip timeout in milliseconds (30 seconds)
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30 * 1000;

/// Environment variable overriding the backend round-trip timeout
pub const REQUEST_TIMEOUT_ENV: &str = "LSP_SUBCOMMANDS_REQUEST_TIMEOUT_MS";

/// Returns the path to the data directory for lsp-subcommands.
/// Uses $XDG_DATA_HOME/lsp-subcommands if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/lsp-subcommands,
/// or ./lsp-subcommands if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the file name of the log file inside the data directory.
pub fn log_file_name() -> &'static str {
    "lsp-subcommands.log"
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("lsp-subcommands")
}

/// Per-backend settings for the command layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Language identifier sent with document sync notifications (e.g. "rust")
    pub language_id: String,
    /// Upper bound for every backend round trip
    pub request_timeout: Duration,
}

impl Settings {
    pub fn new(language_id: &str) -> Self {
        Self {
            language_id: language_id.to_string(),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }

    /// Builds settings, honouring `LSP_SUBCOMMANDS_REQUEST_TIMEOUT_MS` when it is set.
    pub fn from_env(language_id: &str) -> Self {
        settings_with_env(language_id, std::env::var(REQUEST_TIMEOUT_ENV).ok())
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }
}

fn settings_with_env(language_id: &str, timeout_ms: Option<String>) -> Settings {
    let settings = Settings::new(language_id);

    match timeout_ms.and_then(|value| value.trim().parse::<u64>().ok()) {
        Some(ms) if ms > 0 => settings.with_request_timeout(Duration::from_millis(ms)),
        _ => settings,
    }
}
