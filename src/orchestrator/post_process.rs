//! Post-result processing utilities.
//!
//! Handles document export after a request succeeds.

use crate::presenter::ResultPresenter;
use crate::storage;
use std::path::Path;

/// Result of post-success processing, ready for presentation layers.
pub(crate) struct ProcessedResult {
    pub export_messages: Vec<String>,
    pub exported_path: Option<std::path::PathBuf>,
}

/// Export the generated document when an export directory is configured.
pub(crate) fn process_result_completion(
    export_dir: Option<&Path>,
    presenter: &ResultPresenter,
) -> ProcessedResult {
    let mut export_messages = Vec::new();
    let mut exported_path = None;

    if let Some(dir) = export_dir {
        match presenter.document() {
            Some(doc) => match storage::export_document(dir, doc) {
                Ok(p) => {
                    export_messages.push(format!("Exported document: {}", p.display()));
                    exported_path = Some(p);
                }
                Err(e) => export_messages.push(format!("Export document failed: {e:#}")),
            },
            None => export_messages.push("No document generated; nothing exported".into()),
        }
    }

    ProcessedResult {
        export_messages,
        exported_path,
    }
}
