//! reqwest implementation of the try-on backend.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use tracing::Instrument;

use super::endpoint::{
    ApiBase, CLEANUP_PATH, HEALTH_PATH, PREPROCESS_GARMENT_PATH, PREPROCESS_PERSON_PATH, TRYON_PATH,
};
use super::error::{GatewayError, GatewayOperation, Result};
use super::types::{ErrorBody, HealthStatus, PreprocessResponse, TryOnResponse};
use super::TryOnBackend;
use crate::config::ClientConfig;
use crate::media::ImagePayload;
use crate::model::{GarmentCategory, ProcessedPath, ResultPath};

/// Maximum length of a raw error body quoted in an error message.
const MAX_ERROR_BODY_LENGTH: usize = 200;

/// Truncates an error body that is not structured JSON.
fn sanitize_error_body(body: &str) -> String {
    let body = body.trim();
    if body.len() > MAX_ERROR_BODY_LENGTH {
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated)", &body[..end])
    } else {
        body.to_string()
    }
}

/// Maps a non-success response to the failure taxonomy.
///
/// 4xx is a rejection of this request, everything else means the service is
/// not able to serve it right now. The service's own detail text is kept
/// verbatim when present.
pub(crate) fn classify_failure(operation: GatewayOperation, status: u16, body: &str) -> GatewayError {
    let detail = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message())
        .unwrap_or_else(|| {
            let raw = sanitize_error_body(body);
            if raw.is_empty() {
                format!("{} ({})", operation.fallback_message(), status)
            } else {
                format!("{} ({}): {}", operation.fallback_message(), status, raw)
            }
        });

    if (400..500).contains(&status) {
        GatewayError::UpstreamRejected {
            operation,
            status,
            detail,
        }
    } else {
        GatewayError::UpstreamUnavailable {
            operation,
            status: Some(status),
            detail,
        }
    }
}

fn transport_error(operation: GatewayOperation, err: &reqwest::Error) -> GatewayError {
    let reason = if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        "service unreachable".to_string()
    } else {
        err.to_string()
    };
    GatewayError::UpstreamUnavailable {
        operation,
        status: None,
        detail: format!("{}: {}", operation.fallback_message(), reason),
    }
}

fn image_part(operation: GatewayOperation, payload: &ImagePayload) -> Result<Part> {
    Part::bytes(payload.bytes().to_vec())
        .file_name(payload.file_name().to_string())
        .mime_str(payload.content_type())
        .map_err(|e| GatewayError::InvalidRequest {
            operation,
            detail: format!("Invalid content type '{}': {}", payload.content_type(), e),
        })
}

fn create_http_client(connect_timeout: Duration, request_timeout: Duration) -> Result<Client> {
    Client::builder()
        .connect_timeout(connect_timeout)
        .timeout(request_timeout)
        .build()
        .map_err(|e| GatewayError::Client(e.to_string()))
}

/// HTTP client for the try-on service.
#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    base: ApiBase,
}

impl HttpGateway {
    pub fn new(base: ApiBase, connect_timeout: Duration, request_timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: create_http_client(connect_timeout, request_timeout)?,
            base,
        })
    }

    /// Builds a gateway from the client configuration.
    pub fn from_config(config: &ClientConfig) -> crate::error::Result<Self> {
        let base = config.api_base()?;
        Ok(Self::new(
            base,
            config.connect_timeout(),
            config.request_timeout(),
        )?)
    }

    pub fn base(&self) -> &ApiBase {
        &self.base
    }

    async fn send(&self, operation: GatewayOperation, request: RequestBuilder) -> Result<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| transport_error(operation, &e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = classify_failure(operation, status.as_u16(), &body);
        warn!("{} failed ({}): {}", operation, status, err);
        Err(err)
    }

    async fn post_multipart<T: DeserializeOwned>(
        &self,
        operation: GatewayOperation,
        segments: &[&str],
        form: Form,
    ) -> Result<T> {
        let url = self.base.endpoint(segments);
        debug!("POST {} ({})", url, operation);

        let response = self.send(operation, self.client.post(url).multipart(form)).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| GatewayError::InvalidResponse {
                operation,
                detail: e.to_string(),
            })
    }

    /// Liveness check; not part of the wizard flow.
    pub async fn health(&self) -> Result<HealthStatus> {
        let operation = GatewayOperation::Health;
        let response = self
            .send(operation, self.client.get(self.base.endpoint(HEALTH_PATH)))
            .await?;
        response
            .json::<HealthStatus>()
            .await
            .map_err(|e| GatewayError::InvalidResponse {
                operation,
                detail: e.to_string(),
            })
    }

    /// Downloads the composited image.
    pub async fn fetch_result(&self, result_path: &ResultPath) -> Result<Vec<u8>> {
        let operation = GatewayOperation::FetchResult;
        let url = self.base.result_asset_url(result_path.as_str());
        info!("Fetching result {}", url);

        let response = self.send(operation, self.client.get(url)).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| transport_error(operation, &e))?;
        Ok(bytes.to_vec())
    }

    /// Asks the service to delete uploaded and generated files.
    pub async fn cleanup(&self) -> Result<()> {
        let operation = GatewayOperation::Cleanup;
        self.send(operation, self.client.delete(self.base.endpoint(CLEANUP_PATH)))
            .await?;
        info!("Service cleanup completed");
        Ok(())
    }
}

#[async_trait]
impl TryOnBackend for HttpGateway {
    async fn preprocess_garment(
        &self,
        payload: ImagePayload,
        category: GarmentCategory,
    ) -> Result<ProcessedPath> {
        let operation = GatewayOperation::PreprocessGarment;
        let span = tracing::info_span!("gateway.preprocess_garment", category = %category);
        async {
            info!(
                "Preprocessing garment image: {}, category: {}",
                payload.file_name(),
                category
            );
            let form = Form::new()
                .part("file", image_part(operation, &payload)?)
                .text("category", category.as_wire());
            let resp: PreprocessResponse = self
                .post_multipart(operation, PREPROCESS_GARMENT_PATH, form)
                .await?;
            ProcessedPath::new(resp.processed_path).ok_or(GatewayError::InvalidResponse {
                operation,
                detail: "empty processed_path".to_string(),
            })
        }
        .instrument(span)
        .await
    }

    async fn preprocess_person(&self, payload: ImagePayload) -> Result<ProcessedPath> {
        let operation = GatewayOperation::PreprocessPerson;
        let span = tracing::info_span!("gateway.preprocess_person");
        async {
            info!("Preprocessing person image: {}", payload.file_name());
            let form = Form::new().part("file", image_part(operation, &payload)?);
            let resp: PreprocessResponse = self
                .post_multipart(operation, PREPROCESS_PERSON_PATH, form)
                .await?;
            ProcessedPath::new(resp.processed_path).ok_or(GatewayError::InvalidResponse {
                operation,
                detail: "empty processed_path".to_string(),
            })
        }
        .instrument(span)
        .await
    }

    async fn synthesize(
        &self,
        garment: &ProcessedPath,
        person: &ProcessedPath,
        category: GarmentCategory,
    ) -> Result<ResultPath> {
        let operation = GatewayOperation::Synthesize;
        let span = tracing::info_span!("gateway.synthesize", category = %category);
        async {
            info!(
                "Running virtual try-on: cloth={}, person={}, category={}",
                garment, person, category
            );
            let form = Form::new()
                .text("cloth_path", garment.as_str().to_string())
                .text("person_path", person.as_str().to_string())
                .text("category", category.as_wire());
            let resp: TryOnResponse = self.post_multipart(operation, TRYON_PATH, form).await?;
            ResultPath::new(resp.result_path).ok_or(GatewayError::InvalidResponse {
                operation,
                detail: "empty result_path".to_string(),
            })
        }
        .instrument(span)
        .await
    }

    fn result_asset_url(&self, result_path: &ResultPath) -> Url {
        self.base.result_asset_url(result_path.as_str())
    }
}
