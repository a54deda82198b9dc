use chrono::{DateTime, Utc};
use serde::Serialize;

use super::state::{FailedStage, WizardStage, WizardState};
use crate::error::ErrorKind;
use crate::gateway::GatewayError;
use crate::media::PreviewHandle;
use crate::model::{GarmentCategory, ProcessedPath};

/// Read-only view of the wizard for renderers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardSnapshot {
    pub state: WizardState,
    pub stage: WizardStage,
    /// Identifier of the current workflow run; changes on every reset.
    pub run: u64,
    pub category: GarmentCategory,
    pub garment: SelectionView,
    pub person: SelectionView,
    pub result: ResultView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FailureView>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionView {
    /// An image is selected and not yet consumed by the service.
    pub has_image: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_path: Option<String>,
}

impl SelectionView {
    pub(crate) fn new(
        has_image: bool,
        preview: Option<&PreviewHandle>,
        processed_path: Option<&ProcessedPath>,
    ) -> Self {
        Self {
            has_image,
            preview_url: preview.map(|p| p.url().to_string()),
            processed_path: processed_path.map(|p| p.as_str().to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_url: Option<String>,
    /// Cosmetic progress text while synthesis runs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage_label: Option<String>,
}

/// Error surfaced to the user together with retry and reset actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureView {
    pub stage: FailedStage,
    pub kind: ErrorKind,
    /// Service-provided detail, verbatim where available.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Retrying re-runs the failed call without a new upload.
    pub retry_reuses_upload: bool,
}

impl FailureView {
    pub(crate) fn new(stage: FailedStage, err: &GatewayError) -> Self {
        Self {
            stage,
            kind: err.kind(),
            message: err.to_string(),
            status: err.status(),
            retry_reuses_upload: stage == FailedStage::Synthesis,
        }
    }
}
