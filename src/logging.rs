use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Send tracing output to a file inside the data directory. The TUI owns
/// stdout and stderr while the alternate screen is active, so nothing may
/// log to the terminal.
pub fn init(data_dir: &Path) -> Result<()> {
    fs::create_dir_all(data_dir)?;
    let file = File::create(data_dir.join("lawncare-manager.log"))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}
