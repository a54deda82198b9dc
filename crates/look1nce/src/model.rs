//! Value types shared between the gateway and the wizard.

use serde::{Deserialize, Serialize};

/// Kind of garment being tried on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GarmentCategory {
    /// Shirts, T-shirts, hoodies.
    #[default]
    UpperBody,
    /// Pants, jeans, shorts.
    LowerBody,
    /// Dresses, jumpsuits.
    Dress,
}

impl GarmentCategory {
    pub const ALL: [GarmentCategory; 3] = [
        GarmentCategory::UpperBody,
        GarmentCategory::LowerBody,
        GarmentCategory::Dress,
    ];

    /// Name used on the wire by the try-on service.
    pub fn as_wire(&self) -> &'static str {
        match self {
            GarmentCategory::UpperBody => "upper_body",
            GarmentCategory::LowerBody => "lower_body",
            GarmentCategory::Dress => "dress",
        }
    }

    /// Human-readable label for selection UIs.
    pub fn label(&self) -> &'static str {
        match self {
            GarmentCategory::UpperBody => "Upper Body",
            GarmentCategory::LowerBody => "Lower Body",
            GarmentCategory::Dress => "Full Dress",
        }
    }
}

impl std::fmt::Display for GarmentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_wire())
    }
}

impl std::str::FromStr for GarmentCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "upper_body" | "upper" => Ok(GarmentCategory::UpperBody),
            "lower_body" | "lower" => Ok(GarmentCategory::LowerBody),
            "dress" => Ok(GarmentCategory::Dress),
            other => Err(format!(
                "unknown garment category '{}' (expected upper_body, lower_body or dress)",
                other
            )),
        }
    }
}

/// Opaque, non-empty reference to a preprocessed image held by the service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ProcessedPath(String);

impl ProcessedPath {
    /// Returns `None` for empty or whitespace-only references.
    pub fn new(path: impl Into<String>) -> Option<Self> {
        let path = path.into();
        if path.trim().is_empty() {
            None
        } else {
            Some(Self(path))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProcessedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque, non-empty reference to a composited try-on image.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ResultPath(String);

impl ResultPath {
    /// Returns `None` for empty or whitespace-only references.
    pub fn new(path: impl Into<String>) -> Option<Self> {
        let path = path.into();
        if path.trim().is_empty() {
            None
        } else {
            Some(Self(path))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path segment, the name the service serves the result under.
    ///
    /// Both `/` and `\` count as separators since the service may run on Windows.
    pub fn file_name(&self) -> &str {
        result_file_name(&self.0)
    }
}

impl std::fmt::Display for ResultPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

pub(crate) fn result_file_name(path: &str) -> &str {
    path.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(path)
}
