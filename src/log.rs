use std::path::Path;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::JsonFields;
use tracing_subscriber::prelude::*;

use crate::config;

/// Installs the global JSON file logger under the data directory.
pub fn init() -> anyhow::Result<()> {
    init_in(&config::data_dir())
}

/// Installs the global JSON file logger writing into `dir`.
pub fn init_in(dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir).inspect_err(|e| {
        eprintln!("Failed to create data directory {:?}: {}", dir, e);
    })?;

    let log_file = tracing_appender::rolling::never(dir, config::log_file_name());

    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(log_file)
        .fmt_fields(JsonFields::default());

    // Use RUST_LOG if set, otherwise default to INFO
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .try_init()?;

    Ok(())
}
