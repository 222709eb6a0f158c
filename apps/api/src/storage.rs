use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;

/// Strips path components and unsafe characters from a client-supplied
/// filename before it is used as a storage path. Anything outside
/// `[A-Za-z0-9._-]` is replaced with `_`.
pub fn sanitize_filename(name: &str) -> String {
    let base = Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload");

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    // A name of only dots would resolve to the directory itself.
    if cleaned.trim_matches('.').is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

/// An upload spooled to disk for the duration of text extraction.
///
/// The file is removed when the guard drops, so save is paired with delete
/// on every exit path out of the handler. The path is derived from the
/// sanitized filename with no uniqueness suffix; concurrent uploads of the
/// same name may race on it (accepted).
pub struct TempUpload {
    path: PathBuf,
}

impl TempUpload {
    pub fn save(dir: &Path, filename: &str, data: &[u8]) -> io::Result<Self> {
        let path = dir.join(sanitize_filename(filename));
        fs::write(&path, data)?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!("Failed to remove temporary upload {}: {e}", self.path.display());
        }
    }
}
