use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::compose::{Artifact, Compositor};
use crate::config::DesignerConfig;
use crate::error::{RenderError, ValidationError};
use crate::schedule::Debouncer;
use crate::source::SourceImage;
use crate::transform::{Transform, TransformModel};

/// Identity of a design within its session. Never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DesignId(pub u64);

impl fmt::Display for DesignId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Result of one render attempt on a design.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderOutcome {
    Rendered,
    /// Nothing to render; the design holds no image.
    Empty,
    Failed(RenderError),
}

/// One badge slot: a transform model, its latest artifact and the
/// debounced re-render that keeps the two in sync.
#[derive(Debug)]
pub struct Design {
    id: DesignId,
    model: TransformModel,
    artifact: Option<Artifact>,
    render_error: Option<RenderError>,
    debounce: Debouncer,
}

impl Design {
    pub fn new(id: DesignId, config: &DesignerConfig) -> Self {
        Self {
            id,
            model: TransformModel::from_config(config),
            artifact: None,
            render_error: None,
            debounce: Debouncer::new(config.debounce()),
        }
    }

    pub fn id(&self) -> DesignId {
        self.id
    }

    pub fn model(&self) -> &TransformModel {
        &self.model
    }

    pub fn is_empty(&self) -> bool {
        self.model.is_empty()
    }

    /// Latest artifact, possibly older than the current transform.
    pub fn artifact(&self) -> Option<&Artifact> {
        self.artifact.as_ref()
    }

    /// Artifact matching the current transform, `None` while a render is pending.
    pub fn fresh_artifact(&self) -> Option<&Artifact> {
        if self.debounce.is_pending() {
            None
        } else {
            self.artifact.as_ref()
        }
    }

    pub fn render_error(&self) -> Option<&RenderError> {
        self.render_error.as_ref()
    }

    pub fn is_render_pending(&self) -> bool {
        self.debounce.is_pending()
    }

    fn touched(&mut self, changed: bool, now: Instant) -> bool {
        if changed {
            self.debounce.arm(now);
        }
        changed
    }

    /// Install an upstream decode result; see [`TransformModel::load_image`].
    pub fn load_image(
        &mut self,
        decoded: Result<SourceImage, ValidationError>,
        now: Instant,
    ) -> Result<(), ValidationError> {
        let result = self.model.load_image(decoded);
        match &result {
            Ok(()) => {
                self.debounce.arm(now);
            }
            Err(e) => {
                warn!(design = %self.id, "Image load failed: {e}");
                self.artifact = None;
                self.debounce.cancel();
            }
        }
        result
    }

    pub fn set_image(&mut self, image: SourceImage, now: Instant) {
        self.model.set_image(image);
        self.debounce.arm(now);
    }

    pub fn set_position(&mut self, x: f64, y: f64, now: Instant) -> bool {
        let changed = self.model.set_position(x, y);
        self.touched(changed, now)
    }

    pub fn set_zoom(&mut self, zoom: f64, now: Instant) -> bool {
        let changed = self.model.set_zoom(zoom);
        self.touched(changed, now)
    }

    pub fn set_rotation(&mut self, degrees: f64, now: Instant) -> bool {
        let changed = self.model.set_rotation(degrees);
        self.touched(changed, now)
    }

    pub fn apply(&mut self, transform: &Transform, now: Instant) -> bool {
        let changed = self.model.apply(transform);
        self.touched(changed, now)
    }

    pub fn reset(&mut self, now: Instant) -> bool {
        let changed = self.model.reset();
        self.touched(changed, now)
    }

    /// Release the image. An empty model renders to nothing, so the
    /// artifact is dropped right away and no render is scheduled.
    pub fn clear(&mut self) -> bool {
        let changed = self.model.clear();
        self.artifact = None;
        self.render_error = None;
        self.debounce.cancel();
        changed
    }

    /// Render if the quiescence window has elapsed. `None` when nothing was due.
    pub fn tick(
        &mut self,
        now: Instant,
        compositor: &Compositor,
        export_size: u32,
    ) -> Option<RenderOutcome> {
        if !self.debounce.fire(now) {
            return None;
        }
        debug!(design = %self.id, "Debounce elapsed, rendering");
        let result = compositor.render(&self.model, export_size);
        Some(self.store(result))
    }

    /// Render now, superseding any pending debounced render.
    pub fn export(&mut self, compositor: &Compositor, export_size: u32) -> RenderOutcome {
        self.debounce.cancel();
        let result = compositor.render(&self.model, export_size);
        self.store(result)
    }

    /// Apply a render result computed elsewhere for the current model state.
    pub(crate) fn store(&mut self, result: Result<Option<Artifact>, RenderError>) -> RenderOutcome {
        self.debounce.cancel();
        match result {
            Ok(Some(artifact)) => {
                self.artifact = Some(artifact);
                self.render_error = None;
                RenderOutcome::Rendered
            }
            Ok(None) => {
                self.artifact = None;
                self.render_error = None;
                RenderOutcome::Empty
            }
            Err(e) => {
                warn!(design = %self.id, "Render failed: {e}");
                self.artifact = None;
                self.render_error = Some(e.clone());
                RenderOutcome::Failed(e)
            }
        }
    }
}
