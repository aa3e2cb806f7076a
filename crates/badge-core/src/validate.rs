use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::ValidationConfig;
use crate::error::ValidationError;
use crate::source::{Size, SourceImage};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// A raw upload as received from the browser.
#[derive(Clone, Copy, Debug)]
pub struct Upload<'a> {
    pub bytes: &'a [u8],
    /// Declared MIME type. When absent the format is sniffed from the bytes.
    pub mime: Option<&'a str>,
}

impl<'a> Upload<'a> {
    pub fn new(bytes: &'a [u8], mime: &'a str) -> Self {
        Self {
            bytes,
            mime: Some(mime),
        }
    }

    pub fn sniffed(bytes: &'a [u8]) -> Self {
        Self { bytes, mime: None }
    }
}

/// Non-blocking note that an accepted image is smaller than recommended.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QualityWarning {
    pub dimensions: Size,
    pub recommended: u32,
}

impl fmt::Display for QualityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Image resolution ({}x{}) is below the recommended {}px on the shorter side \
             ({}px short). The printed badge may look soft",
            self.dimensions.width,
            self.dimensions.height,
            self.recommended,
            self.recommended - self.dimensions.shorter_side(),
        )
    }
}

/// Outcome of [`ImageValidator::validate`].
#[derive(Clone, Debug, PartialEq)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub error: Option<ValidationError>,
    pub warning: Option<QualityWarning>,
    /// Known once the image decoded, even when it was rejected for size.
    pub dimensions: Option<Size>,
    pub aspect_ratio: Option<f64>,
}

/// A validated upload together with its decoded bitmap.
#[derive(Debug)]
pub struct AcceptedImage {
    pub image: SourceImage,
    pub warning: Option<QualityWarning>,
}

impl AcceptedImage {
    pub fn dimensions(&self) -> Size {
        self.image.natural_size()
    }
}

/// Gatekeeper applied to every upload before it reaches a design.
#[derive(Clone, Debug, Default)]
pub struct ImageValidator {
    config: ValidationConfig,
}

impl ImageValidator {
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Check format, size and resolution, reporting the first violated
    /// constraint. The decoded bitmap is dropped before returning.
    pub fn validate(&self, upload: Upload<'_>) -> ValidationReport {
        match self.inspect(upload) {
            Ok(accepted) => {
                let dimensions = accepted.dimensions();
                ValidationReport {
                    is_valid: true,
                    error: None,
                    warning: accepted.warning,
                    dimensions: Some(dimensions),
                    aspect_ratio: Some(dimensions.aspect_ratio()),
                }
            }
            Err((error, dimensions)) => ValidationReport {
                is_valid: false,
                error: Some(error),
                warning: None,
                dimensions,
                aspect_ratio: dimensions.map(|d| d.aspect_ratio()),
            },
        }
    }

    /// Validate and hand back the decoded bitmap so it is never decoded twice.
    pub fn accept(&self, upload: Upload<'_>) -> Result<AcceptedImage, ValidationError> {
        self.inspect(upload).map_err(|(error, _)| error)
    }

    fn inspect(
        &self,
        upload: Upload<'_>,
    ) -> Result<AcceptedImage, (ValidationError, Option<Size>)> {
        let mime = self.resolve_mime(&upload).map_err(|e| (e, None))?;

        let len = upload.bytes.len() as u64;
        if len > self.config.max_bytes {
            return Err((
                ValidationError::FileTooLarge {
                    size_mb: len as f64 / BYTES_PER_MB,
                    max_mb: self.config.max_bytes as f64 / BYTES_PER_MB,
                },
                None,
            ));
        }

        let image = SourceImage::decode(upload.bytes).map_err(|e| (e, None))?;
        let dimensions = image.natural_size();
        let shorter = dimensions.shorter_side();
        debug!(
            mime = %mime,
            width = dimensions.width,
            height = dimensions.height,
            bytes = len,
            "Decoded upload"
        );

        if shorter < self.config.min_side {
            return Err((
                ValidationError::ResolutionTooLow {
                    width: dimensions.width,
                    height: dimensions.height,
                    actual: shorter,
                    required: self.config.min_side,
                },
                Some(dimensions),
            ));
        }

        let warning = (shorter > self.config.min_side && shorter < self.config.recommended_side)
            .then(|| QualityWarning {
                dimensions,
                recommended: self.config.recommended_side,
            });
        if let Some(ref w) = warning {
            warn!("{w}");
        }

        Ok(AcceptedImage { image, warning })
    }

    fn resolve_mime(&self, upload: &Upload<'_>) -> Result<String, ValidationError> {
        let mime = match upload.mime {
            Some(declared) => declared.trim().to_ascii_lowercase(),
            None => image::guess_format(upload.bytes)
                .map(|f| f.to_mime_type().to_string())
                .unwrap_or_else(|_| "unknown".to_string()),
        };
        if self.config.accepted_mime_types.iter().any(|m| *m == mime) {
            Ok(mime)
        } else {
            Err(ValidationError::UnsupportedFormat { mime })
        }
    }
}
