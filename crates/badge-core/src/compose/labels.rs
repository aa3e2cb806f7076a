use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use rusttype::{point, Font, PositionedGlyph, Scale};
use tiny_skia::{Pixmap, PremultipliedColorU8};
use tracing::debug;

use crate::config::Rgba8;

/// Font used for the print annotations.
#[derive(Clone)]
pub struct LabelFont {
    font: Font<'static>,
}

impl std::fmt::Debug for LabelFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabelFont")
            .field("glyphs", &self.font.glyph_count())
            .finish()
    }
}

/// DejaVu Sans, shipped with the crate so labels render on hosts without
/// installed fonts.
static BUNDLED_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

impl LabelFont {
    /// The face compiled into the crate.
    pub fn bundled() -> Option<Self> {
        Font::try_from_bytes(BUNDLED_FONT).map(|font| Self { font })
    }

    /// Parse TrueType/OpenType font bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Option<Self> {
        Font::try_from_vec(bytes).map(|font| Self { font })
    }

    /// First sans-serif face installed on the system, if any.
    pub fn system() -> Option<Self> {
        let mut db = Database::new();
        db.load_system_fonts();

        let query = Query {
            families: &[Family::SansSerif],
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = db.query(&query)?;
        let font = db.with_face_data(id, |data, index| {
            Font::try_from_vec_and_index(data.to_vec(), index)
        })??;
        debug!(faces = db.len(), "Loaded system label font");
        Some(Self { font })
    }

    fn layout(&self, text: &str, size_px: f32, x: f32, baseline: f32) -> Vec<PositionedGlyph<'_>> {
        self.font
            .layout(text, Scale::uniform(size_px), point(x, baseline))
            .collect()
    }

    /// Advance width of `text` at `size_px`.
    pub fn measure(&self, text: &str, size_px: f32) -> f32 {
        self.layout(text, size_px, 0.0, 0.0)
            .last()
            .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
            .unwrap_or(0.0)
    }

    /// Draw `text` horizontally centered on `cx` with its baseline at `baseline`.
    pub fn draw_centered(
        &self,
        pixmap: &mut Pixmap,
        text: &str,
        cx: f32,
        baseline: f32,
        size_px: f32,
        color: Rgba8,
    ) {
        let x = cx - self.measure(text, size_px) / 2.0;
        let (w, h) = (pixmap.width() as i32, pixmap.height() as i32);
        let pixels = pixmap.pixels_mut();

        for glyph in self.layout(text, size_px, x, baseline) {
            let Some(bb) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|gx, gy, coverage| {
                let px = gx as i32 + bb.min.x;
                let py = gy as i32 + bb.min.y;
                if px < 0 || py < 0 || px >= w || py >= h {
                    return;
                }
                let idx = (py * w + px) as usize;
                pixels[idx] = blend_over(pixels[idx], color, coverage);
            });
        }
    }
}

/// Source-over of `color` at `coverage` onto a premultiplied pixel.
fn blend_over(dst: PremultipliedColorU8, color: Rgba8, coverage: f32) -> PremultipliedColorU8 {
    let sa = coverage.clamp(0.0, 1.0) * color.a as f32 / 255.0;
    if sa <= 0.0 {
        return dst;
    }
    let inv = 1.0 - sa;
    let mix = |s: u8, d: u8| (s as f32 * sa + d as f32 * inv).round().min(255.0) as u8;
    let a = (255.0 * sa + dst.alpha() as f32 * inv).round().min(255.0) as u8;
    let r = mix(color.r, dst.red()).min(a);
    let g = mix(color.g, dst.green()).min(a);
    let b = mix(color.b, dst.blue()).min(a);
    PremultipliedColorU8::from_rgba(r, g, b, a).unwrap_or(dst)
}
