use crate::constants::*;
use crate::cover::CoverPageSource;
use crate::types::*;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Complete export configuration.
///
/// Built once per export from [`ExportOverrides`] and read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportConfiguration {
    // Output
    pub filename: String,

    // Page geometry
    pub orientation: Orientation,
    pub format: PaperFormat,
    pub margins: Margins,

    // Rasterization and embedding
    pub scale: f32,
    pub quality: f32,
    pub encoding: ImageEncoding,

    // Cover page
    pub include_cover_page: bool,
    pub cover_page_url: Option<String>,
    pub cover_fetch_timeout_secs: u64,

    // Overlays
    pub watermark: Option<String>,
}

impl Default for ExportConfiguration {
    fn default() -> Self {
        Self {
            filename: DEFAULT_FILENAME.to_string(),
            orientation: Orientation::Portrait,
            format: PaperFormat::A4,
            margins: Margins::default(),
            scale: DEFAULT_SCALE,
            quality: DEFAULT_QUALITY,
            encoding: ImageEncoding::Jpeg,
            include_cover_page: false,
            cover_page_url: None,
            cover_fetch_timeout_secs: DEFAULT_COVER_FETCH_TIMEOUT_SECS,
            watermark: None,
        }
    }
}

impl ExportConfiguration {
    /// Merge caller overrides over the defaults, field by field.
    pub fn from_overrides(overrides: ExportOverrides) -> Self {
        overrides.apply_to(Self::default())
    }

    /// Validate the configuration. Runs before any rendering work.
    pub fn validate(&self) -> Result<()> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(ExportError::Config(format!(
                "Scale must be a positive number, got {}",
                self.scale
            )));
        }

        if !(0.0..=1.0).contains(&self.quality) {
            return Err(ExportError::Config(format!(
                "Quality must be between 0 and 1, got {}",
                self.quality
            )));
        }

        if !self.margins.is_valid() {
            return Err(ExportError::Config(
                "Margins must be non-negative numbers".to_string(),
            ));
        }

        let geometry = self.page_geometry();
        if self.margins.left + self.margins.right >= geometry.width_pt
            || self.margins.top + self.margins.bottom >= geometry.height_pt
        {
            return Err(ExportError::Config(format!(
                "Margins leave no printable area on a {:?} {:?} page",
                self.format, self.orientation
            )));
        }

        if self.include_cover_page && self.cover_source().is_none() {
            return Err(ExportError::Config(
                "include_cover_page requires a cover_page_url".to_string(),
            ));
        }

        Ok(())
    }

    /// Page size in points for the configured format and orientation
    pub fn page_geometry(&self) -> PageGeometry {
        PageGeometry::from_format(self.format, self.orientation)
    }

    /// Cover page source, if a cover page was requested
    pub fn cover_source(&self) -> Option<CoverPageSource> {
        if !self.include_cover_page {
            return None;
        }
        self.cover_page_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(CoverPageSource::parse)
    }

    /// Watermark text; an empty string means no watermark
    pub fn watermark_text(&self) -> Option<&str> {
        self.watermark.as_deref().filter(|text| !text.is_empty())
    }

    pub fn cover_fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.cover_fetch_timeout_secs)
    }
}

/// Caller-supplied overrides. Unset fields keep their defaults.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct ExportOverrides {
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub filename: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub orientation: Option<Orientation>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub format: Option<PaperFormat>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub margins: Option<Margins>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub scale: Option<f32>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub quality: Option<f32>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub encoding: Option<ImageEncoding>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub include_cover_page: Option<bool>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub cover_page_url: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub cover_fetch_timeout_secs: Option<u64>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub watermark: Option<String>,
}

impl ExportOverrides {
    /// Shallow merge: every field set in `other` replaces the one in `self`.
    pub fn merge(self, other: ExportOverrides) -> ExportOverrides {
        ExportOverrides {
            filename: other.filename.or(self.filename),
            orientation: other.orientation.or(self.orientation),
            format: other.format.or(self.format),
            margins: other.margins.or(self.margins),
            scale: other.scale.or(self.scale),
            quality: other.quality.or(self.quality),
            encoding: other.encoding.or(self.encoding),
            include_cover_page: other.include_cover_page.or(self.include_cover_page),
            cover_page_url: other.cover_page_url.or(self.cover_page_url),
            cover_fetch_timeout_secs: other
                .cover_fetch_timeout_secs
                .or(self.cover_fetch_timeout_secs),
            watermark: other.watermark.or(self.watermark),
        }
    }

    /// Apply these overrides on top of `base`.
    pub fn apply_to(self, base: ExportConfiguration) -> ExportConfiguration {
        ExportConfiguration {
            filename: self.filename.unwrap_or(base.filename),
            orientation: self.orientation.unwrap_or(base.orientation),
            format: self.format.unwrap_or(base.format),
            margins: self.margins.unwrap_or(base.margins),
            scale: self.scale.unwrap_or(base.scale),
            quality: self.quality.unwrap_or(base.quality),
            encoding: self.encoding.unwrap_or(base.encoding),
            include_cover_page: self.include_cover_page.unwrap_or(base.include_cover_page),
            cover_page_url: self.cover_page_url.or(base.cover_page_url),
            cover_fetch_timeout_secs: self
                .cover_fetch_timeout_secs
                .unwrap_or(base.cover_fetch_timeout_secs),
            watermark: self.watermark.or(base.watermark),
        }
    }

    /// Load overrides from a JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let overrides = serde_json::from_slice(&bytes)
            .map_err(|e| ExportError::Config(format!("Failed to parse config: {}", e)))?;
        Ok(overrides)
    }

    /// Save overrides to a JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ExportError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }
}
