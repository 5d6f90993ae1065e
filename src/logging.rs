use crate::persistence::log_file;
use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

/// Initialize tracing to a file in the app directory. The TUI owns the
/// terminal, so nothing may write to stderr while it runs.
pub fn init() -> Result<()> {
    let path = log_file()?;
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "taskdeck=info".into()),
        )
        .with_writer(file)
        .with_ansi(false)
        .init();

    Ok(())
}
