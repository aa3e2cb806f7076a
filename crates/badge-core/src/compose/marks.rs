use tiny_skia::{Paint, PathBuilder, Pixmap, Stroke, StrokeDash, Transform};

use crate::config::{MarkOptions, PrintConfig, Rgba8};
use crate::consts::{CORNER_MARK_FRACTION, GUIDE_DASH, LABEL_FONT_FRACTION};
use crate::geometry::PrintGeometry;

use super::labels::LabelFont;

const REGISTRATION_COLOR: Rgba8 = Rgba8::rgb(0, 0, 0);

/// Distance of the corner marks from the canvas edge, as a fraction of the label margin.
const CORNER_MARK_INSET_FRACTION: f32 = 0.25;

fn stroke_circle(pixmap: &mut Pixmap, center: f32, radius: f32, color: Rgba8, width: f32, dashed: bool) {
    let Some(path) = PathBuilder::from_circle(center, center, radius) else {
        return;
    };
    let mut paint = Paint::default();
    paint.set_color(color.to_skia());
    paint.anti_alias = true;

    let dash = if dashed {
        StrokeDash::new(vec![GUIDE_DASH[0] * width, GUIDE_DASH[1] * width], 0.0)
    } else {
        None
    };
    let stroke = Stroke {
        width,
        dash,
        ..Default::default()
    };
    pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
}

/// Bleed, cutting and safe-zone circles, outermost first.
pub(crate) fn draw_guides(pixmap: &mut Pixmap, geometry: &PrintGeometry, opts: &MarkOptions) {
    let c = geometry.center();
    if opts.show_bleed_line {
        stroke_circle(pixmap, c, geometry.bleed_radius(), opts.bleed_line_color, opts.line_width, true);
    }
    if opts.show_cut_line {
        stroke_circle(pixmap, c, geometry.cutting_radius(), opts.cut_line_color, opts.line_width, false);
    }
    if opts.show_safe_zone {
        stroke_circle(pixmap, c, geometry.safe_zone_radius(), opts.safe_zone_color, opts.line_width, true);
    }
}

/// L-shaped registration marks in the four corners of the label margin.
pub(crate) fn draw_corner_marks(pixmap: &mut Pixmap, geometry: &PrintGeometry, line_width: f32) {
    let size = geometry.canvas_size_px as f32;
    let margin = geometry.label_margin_px as f32;
    let inset = margin * CORNER_MARK_INSET_FRACTION;
    let arm = margin * CORNER_MARK_FRACTION;
    if arm <= 0.0 {
        return;
    }

    let mut pb = PathBuilder::new();
    // (corner x, corner y, direction x, direction y) pointing into the canvas
    for (x, y, dx, dy) in [
        (inset, inset, 1.0, 1.0),
        (size - inset, inset, -1.0, 1.0),
        (inset, size - inset, 1.0, -1.0),
        (size - inset, size - inset, -1.0, -1.0),
    ] {
        pb.move_to(x + dx * arm, y);
        pb.line_to(x, y);
        pb.line_to(x, y + dy * arm);
    }
    let Some(path) = pb.finish() else {
        return;
    };

    let mut paint = Paint::default();
    paint.set_color(REGISTRATION_COLOR.to_skia());
    paint.anti_alias = true;
    let stroke = Stroke {
        width: line_width,
        ..Default::default()
    };
    pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
}

/// Annotations: guide sizes above the badge, cut size and caption below.
pub(crate) fn draw_labels(
    pixmap: &mut Pixmap,
    font: &LabelFont,
    geometry: &PrintGeometry,
    print: &PrintConfig,
    opts: &MarkOptions,
) {
    let c = geometry.center();
    let margin = geometry.label_margin_px as f32;
    let size_px = (margin * LABEL_FONT_FRACTION).max(1.0);
    let line = size_px * 1.3;
    let top_edge = margin;
    let bottom_edge = geometry.canvas_size_px as f32 - margin;

    let mut top_lines: Vec<(String, Rgba8)> = Vec::new();
    if opts.show_bleed_line {
        let bleed_mm = print.badge_diameter_mm + 2.0 * print.bleed_mm;
        top_lines.push((format!("BLEED {}mm", fmt_mm(bleed_mm)), opts.bleed_line_color));
    }
    if opts.show_safe_zone {
        let safe_mm = print.badge_diameter_mm - 2.0 * print.safe_zone_mm;
        top_lines.push((format!("SAFE ZONE {}mm", fmt_mm(safe_mm)), opts.safe_zone_color));
    }
    // Stack upwards from the bleed circle.
    for (i, (text, color)) in top_lines.iter().rev().enumerate() {
        let baseline = top_edge - size_px * 0.5 - line * i as f32;
        font.draw_centered(pixmap, text, c, baseline, size_px, *color);
    }

    let mut baseline = bottom_edge + size_px * 1.5;
    if opts.show_cut_line {
        let text = format!("CUT {}mm", fmt_mm(print.badge_diameter_mm));
        font.draw_centered(pixmap, &text, c, baseline, size_px, opts.cut_line_color);
        baseline += line;
    }
    let caption = format!(
        "{}mm badge @ {} DPI",
        fmt_mm(print.badge_diameter_mm),
        fmt_mm(geometry.dpi)
    );
    font.draw_centered(pixmap, &caption, c, baseline, size_px, REGISTRATION_COLOR);
}

/// Millimetre values without a trailing ".0".
fn fmt_mm(v: f64) -> String {
    if v.fract().abs() < 1e-9 {
        format!("{}", v.round() as i64)
    } else {
        format!("{v:.1}")
    }
}

#[cfg(test)]
mod tests {
    use super::fmt_mm;

    #[test]
    fn test_fmt_mm() {
        assert_eq!(fmt_mm(58.0), "58");
        assert_eq!(fmt_mm(64.0), "64");
        assert_eq!(fmt_mm(2.5), "2.5");
    }
}
