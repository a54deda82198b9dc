use reqwest::Url;

use crate::model::result_file_name;

pub const PREPROCESS_GARMENT_PATH: &[&str] = &["api", "preprocess", "cloth"];
pub const PREPROCESS_PERSON_PATH: &[&str] = &["api", "preprocess", "person"];
pub const TRYON_PATH: &[&str] = &["api", "tryon"];
pub const RESULT_PATH: &[&str] = &["api", "result"];
pub const HEALTH_PATH: &[&str] = &["health"];
pub const CLEANUP_PATH: &[&str] = &["api", "cleanup"];

/// Validated base URL of the try-on service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiBase(Url);

impl ApiBase {
    /// Parses an http(s) URL that can carry path segments.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let url = Url::parse(raw.trim()).map_err(|e| e.to_string())?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(format!("unsupported scheme '{}'", url.scheme()));
        }
        if url.cannot_be_a_base() {
            return Err("URL cannot be used as a base".to_string());
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err("base URL must not have a query or fragment".to_string());
        }
        Ok(Self(url))
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Appends path segments to the base; segments are percent-encoded.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.0.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// URL the composited image is served from.
    ///
    /// Pure string transform: the same `result_path` always yields the same URL.
    pub fn result_asset_url(&self, result_path: &str) -> Url {
        let mut url = self.endpoint(RESULT_PATH);
        if let Ok(mut path) = url.path_segments_mut() {
            path.push(result_file_name(result_path));
        }
        url
    }
}

impl std::fmt::Display for ApiBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
