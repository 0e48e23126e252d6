use crate::presenter::DOCUMENT_FILE_NAME;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "objection-cli";

fn base_dir() -> Result<PathBuf> {
    let dir = dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .context("could not determine a data directory")?;
    Ok(dir.join(APP_DIR))
}

/// Default location for the TUI log file.
pub fn default_log_path() -> Result<PathBuf> {
    Ok(base_dir()?.join("objection.log"))
}

/// Write the generated document as `legal_document.txt` inside `dir`.
pub fn export_document(dir: &Path, document: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let path = dir.join(DOCUMENT_FILE_NAME);
    std::fs::write(&path, document).with_context(|| format!("write {}", path.display()))?;
    tracing::info!(path = %path.display(), bytes = document.len(), "exported document");
    Ok(path)
}
