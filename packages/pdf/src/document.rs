//! References to the document being extracted.

use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::PdfError;

/// Where a document's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentRef {
    /// A file on disk, read in full on each extraction.
    Path(PathBuf),
    /// Bytes already held in memory.
    Bytes(Vec<u8>),
}

impl DocumentRef {
    /// Builds a reference from optional parts, requiring exactly one.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError::DocumentRef`] when both or neither are given.
    pub fn from_parts(path: Option<PathBuf>, bytes: Option<Vec<u8>>) -> Result<Self, PdfError> {
        match (path, bytes) {
            (Some(path), None) => Ok(Self::Path(path)),
            (None, Some(bytes)) => Ok(Self::Bytes(bytes)),
            (Some(_), Some(_)) => Err(PdfError::DocumentRef(
                "supply either a path or a byte buffer, not both".to_owned(),
            )),
            (None, None) => Err(PdfError::DocumentRef(
                "supply a path or a byte buffer".to_owned(),
            )),
        }
    }

    /// Returns the document's bytes.
    ///
    /// Files are read in full, so no handle outlives this call.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError::Io`] if the file cannot be read.
    pub fn read(&self) -> Result<Cow<'_, [u8]>, PdfError> {
        match self {
            Self::Path(path) => Ok(Cow::Owned(std::fs::read(path)?)),
            Self::Bytes(bytes) => Ok(Cow::Borrowed(bytes)),
        }
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Path(path) => Some(path),
            Self::Bytes(_) => None,
        }
    }
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Bytes(bytes) => write!(f, "<{} in-memory bytes>", bytes.len()),
        }
    }
}
