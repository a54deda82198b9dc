//! Per-stage data envelopes owned by the wizard.

use crate::media::{ImagePayload, MediaSelection, PreviewHandle};
use crate::model::{GarmentCategory, ProcessedPath, ResultPath};

/// Image chosen in one stage, plus what the service made of it.
#[derive(Debug, Default)]
struct StagePayload {
    /// Raw upload; dropped once the service has accepted it.
    payload: Option<ImagePayload>,
    preview: Option<PreviewHandle>,
    processed_path: Option<ProcessedPath>,
}

impl StagePayload {
    fn set_media(&mut self, media: MediaSelection) {
        // Replacing the handle releases the previous preview.
        self.preview = Some(media.preview);
        self.payload = Some(media.payload);
    }

    fn clear_media(&mut self) {
        self.preview = None;
        self.payload = None;
    }

    fn submittable(&self) -> Option<ImagePayload> {
        self.payload.as_ref().filter(|p| !p.is_empty()).cloned()
    }

    fn mark_processed(&mut self, path: ProcessedPath) -> Result<(), ProcessedPath> {
        if self.processed_path.is_some() {
            return Err(path);
        }
        self.payload = None;
        self.processed_path = Some(path);
        Ok(())
    }
}

/// Garment image and category.
#[derive(Debug, Default)]
pub struct GarmentSelection {
    inner: StagePayload,
    category: GarmentCategory,
}

impl GarmentSelection {
    pub fn new(category: GarmentCategory) -> Self {
        Self {
            inner: StagePayload::default(),
            category,
        }
    }

    pub fn category(&self) -> GarmentCategory {
        self.category
    }

    pub(crate) fn set_category(&mut self, category: GarmentCategory) {
        self.category = category;
    }

    pub(crate) fn set_media(&mut self, media: MediaSelection) {
        self.inner.set_media(media);
    }

    pub(crate) fn clear_media(&mut self) {
        self.inner.clear_media();
    }

    /// Non-empty payload ready for submission.
    pub fn submittable(&self) -> Option<ImagePayload> {
        self.inner.submittable()
    }

    pub fn payload(&self) -> Option<&ImagePayload> {
        self.inner.payload.as_ref()
    }

    pub fn preview(&self) -> Option<&PreviewHandle> {
        self.inner.preview.as_ref()
    }

    pub fn processed_path(&self) -> Option<&ProcessedPath> {
        self.inner.processed_path.as_ref()
    }

    /// Records the service reference. A path, once set, never changes.
    pub(crate) fn mark_processed(&mut self, path: ProcessedPath) -> Result<(), ProcessedPath> {
        self.inner.mark_processed(path)
    }
}

/// Photo of the person, from a file or the camera.
#[derive(Debug, Default)]
pub struct PersonSelection {
    inner: StagePayload,
}

impl PersonSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set_media(&mut self, media: MediaSelection) {
        self.inner.set_media(media);
    }

    pub(crate) fn clear_media(&mut self) {
        self.inner.clear_media();
    }

    /// Non-empty payload ready for submission.
    pub fn submittable(&self) -> Option<ImagePayload> {
        self.inner.submittable()
    }

    pub fn payload(&self) -> Option<&ImagePayload> {
        self.inner.payload.as_ref()
    }

    pub fn preview(&self) -> Option<&PreviewHandle> {
        self.inner.preview.as_ref()
    }

    pub fn processed_path(&self) -> Option<&ProcessedPath> {
        self.inner.processed_path.as_ref()
    }

    pub(crate) fn mark_processed(&mut self, path: ProcessedPath) -> Result<(), ProcessedPath> {
        self.inner.mark_processed(path)
    }
}

/// Outcome of the synthesis stage.
///
/// The progress label shown while pending lives with the narrator, not here.
#[derive(Debug, Default)]
pub struct TryOnResult {
    result_path: Option<ResultPath>,
}

impl TryOnResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn result_path(&self) -> Option<&ResultPath> {
        self.result_path.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        self.result_path.is_none()
    }

    pub(crate) fn set_result(&mut self, path: ResultPath) {
        self.result_path = Some(path);
    }
}
