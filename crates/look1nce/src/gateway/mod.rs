//! Network boundary to the try-on service.
//!
//! [`TryOnBackend`] is the seam the wizard talks to; [`HttpGateway`] is the
//! reqwest implementation. Every call is a single request/response and is
//! attempted exactly once; retry decisions belong to the caller.

pub mod endpoint;
pub mod error;
pub mod http;
pub mod types;

use async_trait::async_trait;
use reqwest::Url;

use crate::media::ImagePayload;
use crate::model::{GarmentCategory, ProcessedPath, ResultPath};

pub use endpoint::ApiBase;
pub use error::{GatewayError, GatewayOperation, Result};
pub use http::HttpGateway;
pub use types::HealthStatus;

/// Operations the wizard needs from the try-on service.
#[async_trait]
pub trait TryOnBackend: Send + Sync {
    /// Segments the garment and returns a reference to the processed image.
    async fn preprocess_garment(
        &self,
        payload: ImagePayload,
        category: GarmentCategory,
    ) -> Result<ProcessedPath>;

    /// Runs pose estimation on the person photo.
    async fn preprocess_person(&self, payload: ImagePayload) -> Result<ProcessedPath>;

    /// Composites the garment onto the person. Typically 10-30 seconds.
    async fn synthesize(
        &self,
        garment: &ProcessedPath,
        person: &ProcessedPath,
        category: GarmentCategory,
    ) -> Result<ResultPath>;

    /// Where the composited image can be fetched. No network access.
    fn result_asset_url(&self, result_path: &ResultPath) -> Url;
}
