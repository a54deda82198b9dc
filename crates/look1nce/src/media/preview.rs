//! Local preview handles for selected images.
//!
//! A preview is the in-process equivalent of a browser object URL: a short
//! string a renderer can resolve to the image bytes. Handles are released
//! when dropped, so replacing a selection or resetting the wizard frees the
//! previous preview without any explicit call.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use uuid::Uuid;

const PREVIEW_SCHEME: &str = "blob:look1nce/";

type PreviewTable = Mutex<HashMap<Uuid, Arc<[u8]>>>;

/// Registry of live preview handles.
#[derive(Clone, Default)]
pub struct PreviewRegistry {
    table: Arc<PreviewTable>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a preview for the given bytes.
    pub fn allocate(&self, bytes: Arc<[u8]>) -> PreviewHandle {
        let id = Uuid::new_v4();
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, bytes);
        log::trace!("Allocated preview {}", id);
        PreviewHandle {
            id,
            url: format!("{}{}", PREVIEW_SCHEME, id),
            table: Arc::downgrade(&self.table),
        }
    }

    /// Looks up the bytes behind a preview URL while its handle is alive.
    pub fn resolve(&self, url: &str) -> Option<Arc<[u8]>> {
        let id = url.strip_prefix(PREVIEW_SCHEME)?.parse::<Uuid>().ok()?;
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    /// Number of previews that have not been released.
    pub fn live_count(&self) -> usize {
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Single-owner preview; dropping it releases the preview.
pub struct PreviewHandle {
    id: Uuid,
    url: String,
    table: Weak<PreviewTable>,
}

impl PreviewHandle {
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl std::fmt::Debug for PreviewHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PreviewHandle").field(&self.url).finish()
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        if let Some(table) = self.table.upgrade() {
            table
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&self.id);
            log::trace!("Released preview {}", self.id);
        }
    }
}
