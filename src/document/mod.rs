// Document loading
// Reads a local plain-text file into the document set used for chunking


use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::{QaError, Result};

/// Raw content of a loaded source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Full text of the file
    pub text: String,
    /// Path the text was read from
    pub source: PathBuf,
}

/// Load a text file as a document set.
///
/// A missing file is reported as [`QaError::MissingDocument`]. A file holding
/// only whitespace yields an empty set; callers decide how to treat that.
#[inline]
pub fn load_documents<P: AsRef<Path>>(path: P) -> Result<Vec<Document>> {
    let path = path.as_ref();
    debug!("Loading document from {}", path.display());

    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(QaError::MissingDocument(path.to_path_buf()));
        }
        Err(e) => return Err(QaError::Io(e)),
    };

    if text.trim().is_empty() {
        info!("Document {} is empty", path.display());
        return Ok(Vec::new());
    }

    info!(
        "Loaded document {} ({} characters)",
        path.display(),
        text.chars().count()
    );

    Ok(vec![Document {
        text,
        source: path.to_path_buf(),
    }])
}
