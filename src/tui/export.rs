use anyhow::{Context, Result};
use std::sync::mpsc as std_mpsc;
use std::sync::OnceLock;
use std::time::Duration;

use super::state::UiState;

// Global clipboard manager channel - initialized once on first use
static CLIPBOARD_SENDER: OnceLock<std_mpsc::Sender<String>> = OnceLock::new();

/// Save the current document to the export directory (or the working directory).
pub fn save_document(state: &mut UiState) {
    let Some(doc) = state
        .presenter
        .as_ref()
        .and_then(|p| p.document())
        .map(str::to_string)
    else {
        state.info = "No document generated to save.".into();
        return;
    };
    let dir = match state.export_dir.clone() {
        Some(d) => Ok(d),
        None => std::env::current_dir().context("get current directory"),
    };
    match dir.and_then(|d| crate::storage::export_document(&d, &doc)) {
        Ok(path) => {
            state.last_exported_path = Some(path.to_string_lossy().to_string());
            state.info = format!("Saved: {}", path.display());
        }
        Err(e) => {
            state.info = format!("Save failed: {e:#}");
        }
    }
}

/// Copy the current document to the clipboard.
pub fn copy_document(state: &mut UiState) {
    let Some(doc) = state.presenter.as_ref().and_then(|p| p.document()) else {
        state.info = "No document generated to copy.".into();
        return;
    };
    state.info = match copy_to_clipboard(doc) {
        Ok(()) => "Document copied to clipboard".into(),
        Err(e) => format!("Clipboard copy failed: {e:#}"),
    };
}

/// Initialize the clipboard manager thread if not already initialized.
/// Each clipboard instance is kept alive long enough for clipboard managers to read it.
fn init_clipboard_manager() -> Result<&'static std_mpsc::Sender<String>> {
    CLIPBOARD_SENDER.get_or_init(|| {
        let (tx, rx) = std_mpsc::channel::<String>();

        std::thread::spawn(move || {
            use arboard::Clipboard;

            for text in rx {
                if let Ok(mut clipboard) = Clipboard::new() {
                    if clipboard.set_text(&text).is_ok() {
                        std::thread::sleep(Duration::from_secs(2));
                    }
                }
            }
        });

        tx
    });

    CLIPBOARD_SENDER
        .get()
        .ok_or_else(|| anyhow::anyhow!("Failed to initialize clipboard manager"))
}

/// Queue text for the clipboard without blocking the UI thread.
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let sender = init_clipboard_manager()?;
    sender
        .send(text.to_string())
        .map_err(|_| anyhow::anyhow!("Clipboard manager channel closed"))?;
    Ok(())
}
