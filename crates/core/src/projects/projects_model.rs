use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// A remote tabular file that has been downloaded for offline editing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFile {
    /// Remote file id.
    pub id: String,
    pub name: String,
    /// Local path; this is the `file_id` used by the record store and queue.
    pub local_path: String,
    pub downloaded_at: DateTime<Utc>,
}

/// Local file name for a download, suffixed with the date.
///
/// Whitespace runs and path separators become `_`, `.`/`..` segments are
/// dropped, and any character outside `[A-Za-z0-9_.-]` is replaced, so the
/// result always names a file directly inside the projects directory.
pub fn local_file_name(name: &str, date: NaiveDate) -> Result<String> {
    let stem = name
        .split(|c: char| c.is_whitespace() || c == '/' || c == '\\')
        .filter(|part| !part.is_empty() && *part != "." && *part != "..")
        .map(|part| {
            part.chars()
                .map(|c| {
                    if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                        c
                    } else {
                        '_'
                    }
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("_");
    let stem = stem.trim_start_matches('.');
    if stem.is_empty() {
        return Err(Error::validation(format!(
            "Project name '{}' has no usable file name",
            name
        )));
    }
    Ok(format!("{}_{}.csv", stem, date.format("%Y-%m-%d")))
}
