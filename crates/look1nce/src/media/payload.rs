use std::path::Path;
use std::sync::Arc;

use super::error::{MediaError, Result};

/// Normalized image bytes ready for upload.
///
/// File uploads and camera captures both end up in this shape, so nothing
/// downstream can tell where an image came from. Cloning is cheap.
#[derive(Clone, PartialEq, Eq)]
pub struct ImagePayload {
    file_name: String,
    content_type: String,
    bytes: Arc<[u8]>,
}

impl ImagePayload {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub(crate) fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }
}

impl std::fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImagePayload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// A file handed over by a file picker.
#[derive(Debug, Clone)]
pub struct FileInput {
    /// File name as reported by the picker.
    pub name: String,
    /// Content type declared by the picker, if any.
    pub declared_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl FileInput {
    pub fn new(name: impl Into<String>, declared_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            declared_type,
            bytes,
        }
    }

    /// Reads a file from disk; the content type is guessed from its extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| MediaError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image")
            .to_string();
        Ok(Self::new(name, None, bytes))
    }

    /// Declared content type, falling back to a guess from the file name.
    pub fn content_kind(&self) -> Option<String> {
        self.declared_type
            .as_ref()
            .filter(|t| !t.trim().is_empty())
            .cloned()
            .or_else(|| mime_guess::from_path(&self.name).first().map(|m| m.to_string()))
    }
}
