pub mod config;
pub mod geometry;
pub mod info;
pub mod order;
pub mod print;
pub mod render;

use std::path::Path;

use anyhow::{Context, Result};
use badge_core::config::BadgeConfig;
use badge_core::transform::{Point, Transform, TransformModel};
use badge_core::validate::{AcceptedImage, ImageValidator, Upload};
use clap::Args;
use console::Style;

/// Transform flags shared by the export commands, in preview-space units.
#[derive(Args)]
pub struct TransformArgs {
    /// Horizontal offset of the image center in preview pixels
    #[arg(long, allow_hyphen_values = true)]
    pub x: Option<f64>,

    /// Vertical offset of the image center in preview pixels
    #[arg(long, allow_hyphen_values = true)]
    pub y: Option<f64>,

    /// Zoom factor (default: fit the shorter side to the preview)
    #[arg(long)]
    pub zoom: Option<f64>,

    /// Rotation in degrees
    #[arg(long, allow_hyphen_values = true)]
    pub rotation: Option<f64>,
}

impl TransformArgs {
    /// Overlay the given flags on `base`.
    pub fn apply_to(&self, base: Transform) -> Transform {
        Transform {
            position: Point::new(
                self.x.unwrap_or(base.position.x),
                self.y.unwrap_or(base.position.y),
            ),
            zoom: self.zoom.unwrap_or(base.zoom),
            rotation: self.rotation.unwrap_or(base.rotation),
        }
    }
}

pub fn load_config(path: Option<&Path>) -> Result<BadgeConfig> {
    let Some(path) = path else {
        return Ok(BadgeConfig::default());
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config: BadgeConfig = toml::from_str(&contents)
        .with_context(|| format!("Invalid config {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

/// MIME type implied by a file extension, `None` when it should be sniffed.
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        "tif" | "tiff" => Some("image/tiff"),
        _ => None,
    }
}

/// Read and validate an image file, reporting any quality warning.
pub fn accept_image(path: &Path, config: &BadgeConfig) -> Result<AcceptedImage> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let upload = match mime_for_path(path) {
        Some(mime) => Upload::new(&bytes, mime),
        None => Upload::sniffed(&bytes),
    };
    let accepted = ImageValidator::new(config.validation.clone())
        .accept(upload)
        .with_context(|| format!("{} was rejected", path.display()))?;
    if let Some(ref warning) = accepted.warning {
        eprintln!(
            "{} {}: {}",
            Style::new().yellow().bold().apply_to("warning"),
            path.display(),
            warning
        );
    }
    Ok(accepted)
}

/// Load `path` into a fresh model and apply the transform flags on top of
/// the natural fit.
pub fn load_model(path: &Path, flags: &TransformArgs, config: &BadgeConfig) -> Result<TransformModel> {
    let accepted = accept_image(path, config)?;
    let mut model = TransformModel::from_config(&config.designer);
    model.set_image(accepted.image);
    let transform = flags.apply_to(model.transform());
    model.apply(&transform);
    Ok(model)
}
