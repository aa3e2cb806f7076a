use serde::Serialize;

use crate::config::PrintConfig;
use crate::consts::{MAX_CANVAS_SIZE, MAX_DPI, MM_PER_INCH};
use crate::error::{BadgeError, Result};

/// Pixel measurements of the print layout at one DPI.
///
/// Every derived length is rounded once from millimetres, and the circles
/// are then built from those integers so they share an exact center and
/// the clip path never drifts from the stroked guides.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PrintGeometry {
    pub dpi: f64,
    pub cutting_diameter_px: u32,
    /// Width of the bleed ring outside the cutting line.
    pub bleed_px: u32,
    /// Inset of the safe zone inside the cutting line.
    pub safe_margin_px: u32,
    pub bleed_diameter_px: u32,
    pub safe_zone_diameter_px: u32,
    pub label_margin_px: u32,
    /// Side of the square print canvas: bleed circle plus label margin on all sides.
    pub canvas_size_px: u32,
}

/// Convert millimetres to whole pixels at `dpi`.
pub fn mm_to_px(mm: f64, dpi: f64) -> u32 {
    (mm * (dpi / MM_PER_INCH)).round().max(0.0) as u32
}

/// Print geometry for the standard badge dimensions.
pub fn geometry(dpi: f64) -> Result<PrintGeometry> {
    print_geometry(dpi, &PrintConfig::default())
}

/// Print geometry for the physical dimensions in `print`.
///
/// Fails with [`BadgeError::InvalidDpi`] when `dpi` is outside
/// `(0, MAX_DPI]` or the canvas would exceed `MAX_CANVAS_SIZE`.
pub fn print_geometry(dpi: f64, print: &PrintConfig) -> Result<PrintGeometry> {
    if !(dpi.is_finite() && dpi > 0.0 && dpi <= MAX_DPI) {
        return Err(BadgeError::InvalidDpi(dpi));
    }

    let cutting_diameter_px = mm_to_px(print.badge_diameter_mm, dpi);
    let bleed_px = mm_to_px(print.bleed_mm, dpi);
    let safe_margin_px = mm_to_px(print.safe_zone_mm, dpi);
    let label_margin_px = mm_to_px(print.label_margin_mm, dpi);

    let span = |diameter: u32, margin: u32| {
        margin
            .checked_mul(2)
            .and_then(|m| diameter.checked_add(m))
    };
    let bleed_diameter_px = span(cutting_diameter_px, bleed_px);
    let canvas_size_px = bleed_diameter_px.and_then(|d| span(d, label_margin_px));
    let (Some(bleed_diameter_px), Some(canvas_size_px)) = (bleed_diameter_px, canvas_size_px)
    else {
        return Err(BadgeError::InvalidDpi(dpi));
    };
    if canvas_size_px > MAX_CANVAS_SIZE {
        return Err(BadgeError::InvalidDpi(dpi));
    }
    let safe_zone_diameter_px =
        cutting_diameter_px.saturating_sub(safe_margin_px.saturating_mul(2));

    Ok(PrintGeometry {
        dpi,
        cutting_diameter_px,
        bleed_px,
        safe_margin_px,
        bleed_diameter_px,
        safe_zone_diameter_px,
        label_margin_px,
        canvas_size_px,
    })
}

impl PrintGeometry {
    /// Canvas center; all three guide circles are concentric on it.
    pub fn center(&self) -> f32 {
        self.canvas_size_px as f32 / 2.0
    }

    pub fn bleed_radius(&self) -> f32 {
        self.bleed_diameter_px as f32 / 2.0
    }

    pub fn cutting_radius(&self) -> f32 {
        self.cutting_diameter_px as f32 / 2.0
    }

    pub fn safe_zone_radius(&self) -> f32 {
        self.safe_zone_diameter_px as f32 / 2.0
    }
}
