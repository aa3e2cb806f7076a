pub mod artifact;
pub mod labels;
mod marks;

use std::sync::Arc;

use serde::Serialize;
use tiny_skia::{FillRule, FilterQuality, Mask, PathBuilder, Pixmap, PixmapPaint};
use tracing::{info, warn};

use crate::config::{MarkOptions, PrintConfig};
use crate::consts::MAX_EXPORT_SIZE;
use crate::error::RenderError;
use crate::geometry::{print_geometry, PrintGeometry};
use crate::source::Size;
use crate::transform::{Point, Transform, TransformModel};

pub use artifact::{Artifact, ArtifactKind};
pub use labels::LabelFont;

/// Where the source image lands on an output surface.
///
/// This is the single mapping from preview space to output space; both
/// export variants draw through it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Placement {
    /// Center of the circular clip on the output surface.
    pub canvas_center: f64,
    /// Diameter of the circular clip in output pixels.
    pub diameter: f64,
    /// `diameter / preview_viewport`.
    pub scale_factor: f64,
    /// Image center on the output surface.
    pub center_x: f64,
    pub center_y: f64,
    pub drawn_width: f64,
    pub drawn_height: f64,
    /// Degrees, unaffected by scale.
    pub rotation: f64,
}

impl Placement {
    /// Map back to the preview-space transform that produced this placement.
    pub fn preview_transform(&self, natural: Size) -> Transform {
        Transform {
            position: Point::new(
                (self.center_x - self.canvas_center) / self.scale_factor,
                (self.center_y - self.canvas_center) / self.scale_factor,
            ),
            zoom: self.drawn_width / (natural.width as f64 * self.scale_factor),
            rotation: self.rotation,
        }
    }

    /// Output pixel coordinates of a source pixel coordinate.
    pub fn map_source_point(&self, natural: Size, sx: f64, sy: f64) -> (f64, f64) {
        let kx = self.drawn_width / natural.width as f64;
        let ky = self.drawn_height / natural.height as f64;
        let lx = (sx - natural.width as f64 / 2.0) * kx;
        let ly = (sy - natural.height as f64 / 2.0) * ky;
        let (sin, cos) = self.rotation.to_radians().sin_cos();
        (
            self.center_x + lx * cos - ly * sin,
            self.center_y + lx * sin + ly * cos,
        )
    }

    fn skia_transform(&self, natural: Size) -> tiny_skia::Transform {
        let sx = (self.drawn_width / natural.width as f64) as f32;
        let sy = (self.drawn_height / natural.height as f64) as f32;
        tiny_skia::Transform::from_translate(self.center_x as f32, self.center_y as f32)
            .pre_concat(tiny_skia::Transform::from_rotate(self.rotation as f32))
            .pre_scale(sx, sy)
            .pre_translate(
                -(natural.width as f32) / 2.0,
                -(natural.height as f32) / 2.0,
            )
    }
}

/// Compute the placement of `model` inside a circle of `diameter` pixels
/// centered at `canvas_center`. `None` for an empty model.
pub fn placement(model: &TransformModel, diameter: f64, canvas_center: f64) -> Option<Placement> {
    let natural = model.natural_size()?;
    let scale_factor = diameter / model.preview_viewport() as f64;
    let position = model.position();
    Some(Placement {
        canvas_center,
        diameter,
        scale_factor,
        center_x: canvas_center + position.x * scale_factor,
        center_y: canvas_center + position.y * scale_factor,
        drawn_width: natural.width as f64 * model.zoom() * scale_factor,
        drawn_height: natural.height as f64 * model.zoom() * scale_factor,
        rotation: model.rotation(),
    })
}

/// Turns transform models into print artifacts.
///
/// Holds only configuration, so one compositor can be shared by every
/// design in a session, across threads.
#[derive(Clone, Debug)]
pub struct Compositor {
    print: PrintConfig,
    font: Option<Arc<LabelFont>>,
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new(PrintConfig::default())
    }
}

impl Compositor {
    /// Labels use the bundled font until overridden.
    pub fn new(print: PrintConfig) -> Self {
        let font = LabelFont::bundled().map(Arc::new);
        if font.is_none() {
            warn!("Bundled label font failed to parse");
        }
        Self { print, font }
    }

    /// Use `font` for print annotations.
    pub fn with_font(mut self, font: LabelFont) -> Self {
        self.font = Some(Arc::new(font));
        self
    }

    /// Prefer the first system sans-serif font for print annotations; keeps
    /// the current font when none is installed.
    pub fn with_system_font(mut self) -> Self {
        match LabelFont::system() {
            Some(font) => self.font = Some(Arc::new(font)),
            None => warn!("No system font found, keeping the bundled label font"),
        }
        self
    }

    pub fn print_config(&self) -> &PrintConfig {
        &self.print
    }

    pub fn has_label_font(&self) -> bool {
        self.font.is_some()
    }

    /// Plain badge export: an `export_size` square with the image clipped
    /// to the inscribed circle and a transparent outside.
    ///
    /// An empty model yields `Ok(None)`.
    pub fn render(
        &self,
        model: &TransformModel,
        export_size: u32,
    ) -> Result<Option<Artifact>, RenderError> {
        let Some(image) = model.image() else {
            return Ok(None);
        };
        if export_size == 0 || export_size > MAX_EXPORT_SIZE {
            return Err(RenderError::InvalidSize(export_size));
        }

        let mut pixmap = Pixmap::new(export_size, export_size).ok_or(RenderError::Surface {
            width: export_size,
            height: export_size,
        })?;
        let center = export_size as f64 / 2.0;
        let Some(p) = placement(model, export_size as f64, center) else {
            return Ok(None);
        };
        draw_clipped(&mut pixmap, image, &p)?;

        let artifact = Artifact::encode(&pixmap, ArtifactKind::Plain)?;
        info!(
            size = export_size,
            scale = p.scale_factor,
            bytes = artifact.png_bytes().len(),
            "Rendered badge"
        );
        Ok(Some(artifact))
    }

    /// Print-marked export: image drawn to the bleed circle on a canvas
    /// with label margin, overlaid with guides, labels and corner marks.
    pub fn render_print_ready(
        &self,
        model: &TransformModel,
        opts: &MarkOptions,
    ) -> Result<Option<Artifact>, RenderError> {
        let Some(image) = model.image() else {
            return Ok(None);
        };
        let geometry =
            print_geometry(opts.dpi, &self.print).map_err(|_| RenderError::InvalidDpi(opts.dpi))?;
        if geometry.bleed_diameter_px == 0 {
            return Err(RenderError::InvalidSize(geometry.canvas_size_px));
        }

        let size = geometry.canvas_size_px;
        let mut pixmap =
            Pixmap::new(size, size).ok_or(RenderError::Surface { width: size, height: size })?;
        pixmap.fill(opts.background_color.to_skia());

        let Some(p) = placement(
            model,
            geometry.bleed_diameter_px as f64,
            geometry.center() as f64,
        ) else {
            return Ok(None);
        };
        draw_clipped(&mut pixmap, image, &p)?;
        self.draw_overlays(&mut pixmap, &geometry, opts);

        let artifact = Artifact::encode(&pixmap, ArtifactKind::PrintReady)?;
        info!(
            dpi = geometry.dpi,
            canvas = size,
            bleed_diameter = geometry.bleed_diameter_px,
            bytes = artifact.png_bytes().len(),
            "Rendered print-ready badge"
        );
        Ok(Some(artifact))
    }

    fn draw_overlays(&self, pixmap: &mut Pixmap, geometry: &PrintGeometry, opts: &MarkOptions) {
        marks::draw_guides(pixmap, geometry, opts);
        match &self.font {
            Some(font) => marks::draw_labels(pixmap, font, geometry, &self.print, opts),
            None => warn!("No label font configured, skipping print labels"),
        }
        marks::draw_corner_marks(pixmap, geometry, opts.line_width);
    }
}

/// Draw `image` at `p`, clipped to the placement's circle.
fn draw_clipped(
    pixmap: &mut Pixmap,
    image: &crate::source::SourceImage,
    p: &Placement,
) -> Result<(), RenderError> {
    let (w, h) = (pixmap.width(), pixmap.height());
    let mut clip = Mask::new(w, h).ok_or(RenderError::Surface { width: w, height: h })?;
    let center = p.canvas_center as f32;
    let circle = PathBuilder::from_circle(center, center, (p.diameter / 2.0) as f32)
        .ok_or(RenderError::InvalidSize(p.diameter as u32))?;
    clip.fill_path(&circle, FillRule::Winding, true, tiny_skia::Transform::identity());

    let paint = PixmapPaint {
        quality: FilterQuality::Bicubic,
        ..Default::default()
    };
    pixmap.draw_pixmap(
        0,
        0,
        image.pixmap(),
        &paint,
        p.skia_transform(image.natural_size()),
        Some(&clip),
    );
    Ok(())
}
