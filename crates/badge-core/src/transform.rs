use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::DesignerConfig;
use crate::consts::{
    DEFAULT_PREVIEW_VIEWPORT, MAX_ROTATION_DEG, MAX_ZOOM, MIN_FIT_ZOOM, MIN_ROTATION_DEG,
    MIN_ZOOM,
};
use crate::error::ValidationError;
use crate::source::{Size, SourceImage};

/// Offset in preview-space pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The user-editable part of a design, authored in preview space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    pub position: Point,
    pub zoom: f64,
    /// Degrees, clockwise on screen.
    pub rotation: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Point::ORIGIN,
            zoom: 1.0,
            rotation: 0.0,
        }
    }
}

/// Allowed ranges for interactive edits.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformLimits {
    pub zoom_min: f64,
    pub zoom_max: f64,
    pub rotation_min: f64,
    pub rotation_max: f64,
}

impl Default for TransformLimits {
    fn default() -> Self {
        Self {
            zoom_min: MIN_ZOOM,
            zoom_max: MAX_ZOOM,
            rotation_min: MIN_ROTATION_DEG,
            rotation_max: MAX_ROTATION_DEG,
        }
    }
}

impl From<&DesignerConfig> for TransformLimits {
    fn from(c: &DesignerConfig) -> Self {
        Self {
            zoom_min: c.zoom_min,
            zoom_max: c.zoom_max,
            rotation_min: c.rotation_min,
            rotation_max: c.rotation_max,
        }
    }
}

/// Whether a model holds a usable bitmap.
#[derive(Clone, Debug, Default)]
pub enum ImageState {
    #[default]
    Empty,
    /// The upstream decode failed; distinct from "nothing loaded yet".
    Failed { reason: String },
    Loaded(SourceImage),
}

/// Authoritative pan/zoom/rotate state of one badge design.
///
/// Position and zoom are only meaningful relative to `preview_viewport`;
/// the compositor rescales them to any export size.
#[derive(Clone, Debug)]
pub struct TransformModel {
    image: ImageState,
    position: Point,
    zoom: f64,
    rotation: f64,
    preview_viewport: u32,
    limits: TransformLimits,
}

impl Default for TransformModel {
    fn default() -> Self {
        Self::new(DEFAULT_PREVIEW_VIEWPORT)
    }
}

impl TransformModel {
    pub fn new(preview_viewport: u32) -> Self {
        Self::with_limits(preview_viewport, TransformLimits::default())
    }

    pub fn with_limits(preview_viewport: u32, limits: TransformLimits) -> Self {
        let empty = Transform::default();
        Self {
            image: ImageState::Empty,
            position: empty.position,
            zoom: empty.zoom,
            rotation: empty.rotation,
            preview_viewport,
            limits,
        }
    }

    pub fn from_config(config: &DesignerConfig) -> Self {
        Self::with_limits(config.preview_viewport, TransformLimits::from(config))
    }

    /// Install the result of an upstream decode.
    ///
    /// A decode error leaves the model in the `Failed` state and is
    /// returned to the caller. On success the transform resets to the
    /// natural fit.
    pub fn load_image(
        &mut self,
        decoded: Result<SourceImage, ValidationError>,
    ) -> Result<(), ValidationError> {
        match decoded {
            Ok(image) => {
                self.set_image(image);
                Ok(())
            }
            Err(e) => {
                self.reset_numeric();
                self.image = ImageState::Failed {
                    reason: e.to_string(),
                };
                Err(e)
            }
        }
    }

    /// Replace the bitmap (dropping any previous one) and reset the transform.
    pub fn set_image(&mut self, image: SourceImage) {
        debug!(
            width = image.width(),
            height = image.height(),
            "Loading image into design"
        );
        self.image = ImageState::Loaded(image);
        self.fit();
    }

    /// Pan. Content dragged outside the circle is clipped at render time.
    pub fn set_position(&mut self, x: f64, y: f64) -> bool {
        if !self.is_loaded() || !(x.is_finite() && y.is_finite()) {
            return false;
        }
        let next = Point::new(x, y);
        let changed = next != self.position;
        self.position = next;
        changed
    }

    pub fn set_zoom(&mut self, zoom: f64) -> bool {
        if !self.is_loaded() || !zoom.is_finite() {
            return false;
        }
        let next = zoom.clamp(self.limits.zoom_min, self.limits.zoom_max);
        let changed = next != self.zoom;
        self.zoom = next;
        changed
    }

    /// Clamp, never wrap: 200 becomes 180, not -160.
    pub fn set_rotation(&mut self, degrees: f64) -> bool {
        if !self.is_loaded() || !degrees.is_finite() {
            return false;
        }
        let next = degrees.clamp(self.limits.rotation_min, self.limits.rotation_max);
        let changed = next != self.rotation;
        self.rotation = next;
        changed
    }

    /// Set all three edit values at once, each clamped like its setter.
    pub fn apply(&mut self, transform: &Transform) -> bool {
        let moved = self.set_position(transform.position.x, transform.position.y);
        let zoomed = self.set_zoom(transform.zoom);
        let rotated = self.set_rotation(transform.rotation);
        moved || zoomed || rotated
    }

    /// Back to the natural fit, keeping the bitmap.
    pub fn reset(&mut self) -> bool {
        if !self.is_loaded() {
            return false;
        }
        let before = self.transform();
        self.fit();
        before != self.transform()
    }

    /// Release the bitmap and return to the empty state.
    pub fn clear(&mut self) -> bool {
        let had_state = !matches!(self.image, ImageState::Empty)
            || self.transform() != Transform::default();
        self.image = ImageState::Empty;
        self.reset_numeric();
        had_state
    }

    /// Zoom at which the shorter image side spans the viewport diameter,
    /// never below [`MIN_FIT_ZOOM`].
    pub fn fit_zoom(&self) -> Option<f64> {
        let size = self.natural_size()?;
        let shorter = size.shorter_side().max(1) as f64;
        let fit = (self.preview_viewport as f64 / shorter).max(MIN_FIT_ZOOM);
        Some(fit.min(self.limits.zoom_max))
    }

    fn fit(&mut self) {
        self.position = Point::ORIGIN;
        self.rotation = 0.0;
        if let Some(z) = self.fit_zoom() {
            self.zoom = z;
        }
    }

    fn reset_numeric(&mut self) {
        let empty = Transform::default();
        self.position = empty.position;
        self.zoom = empty.zoom;
        self.rotation = empty.rotation;
    }

    pub fn state(&self) -> &ImageState {
        &self.image
    }

    pub fn image(&self) -> Option<&SourceImage> {
        match &self.image {
            ImageState::Loaded(img) => Some(img),
            _ => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.image, ImageState::Loaded(_))
    }

    /// True when the model has no bitmap, whether never loaded or failed.
    pub fn is_empty(&self) -> bool {
        !self.is_loaded()
    }

    pub fn failure(&self) -> Option<&str> {
        match &self.image {
            ImageState::Failed { reason } => Some(reason),
            _ => None,
        }
    }

    pub fn natural_size(&self) -> Option<Size> {
        self.image().map(SourceImage::natural_size)
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn preview_viewport(&self) -> u32 {
        self.preview_viewport
    }

    pub fn limits(&self) -> TransformLimits {
        self.limits
    }

    pub fn transform(&self) -> Transform {
        Transform {
            position: self.position,
            zoom: self.zoom,
            rotation: self.rotation,
        }
    }
}
