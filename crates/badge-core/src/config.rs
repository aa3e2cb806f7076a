use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{BadgeError, Result};
use crate::geometry::print_geometry;

/// Complete set of tunables for the badge pipeline.
///
/// Every section falls back to its defaults, so a TOML file only needs the
/// keys it overrides.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BadgeConfig {
    #[serde(default)]
    pub designer: DesignerConfig,
    #[serde(default)]
    pub print: PrintConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
}

impl BadgeConfig {
    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        self.designer.validate()?;
        self.print.validate()?;
        self.validation.validate()?;
        self.pricing.validate()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignerConfig {
    /// Diameter of the circular editing viewport transforms are authored against.
    pub preview_viewport: u32,
    /// Side length of the plain production export.
    pub export_size: u32,
    pub debounce_ms: u64,
    pub zoom_min: f64,
    pub zoom_max: f64,
    pub rotation_min: f64,
    pub rotation_max: f64,
}

impl Default for DesignerConfig {
    fn default() -> Self {
        Self {
            preview_viewport: DEFAULT_PREVIEW_VIEWPORT,
            export_size: DEFAULT_EXPORT_SIZE,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            zoom_min: MIN_ZOOM,
            zoom_max: MAX_ZOOM,
            rotation_min: MIN_ROTATION_DEG,
            rotation_max: MAX_ROTATION_DEG,
        }
    }
}

impl DesignerConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    fn validate(&self) -> Result<()> {
        if self.preview_viewport == 0 {
            return Err(BadgeError::Config("preview_viewport must be > 0".into()));
        }
        if self.export_size == 0 || self.export_size > MAX_EXPORT_SIZE {
            return Err(BadgeError::Config(format!(
                "export_size must be in 1..={} (got {})",
                MAX_EXPORT_SIZE, self.export_size
            )));
        }
        let bounds = [self.zoom_min, self.zoom_max, self.rotation_min, self.rotation_max];
        if bounds.iter().any(|v| !v.is_finite()) {
            return Err(BadgeError::Config(
                "zoom and rotation bounds must be finite".into(),
            ));
        }
        if !(self.zoom_min > 0.0 && self.zoom_min <= self.zoom_max) {
            return Err(BadgeError::Config(format!(
                "zoom bounds must satisfy 0 < min <= max (got {}..{})",
                self.zoom_min, self.zoom_max
            )));
        }
        if self.rotation_min > self.rotation_max {
            return Err(BadgeError::Config(format!(
                "rotation bounds must satisfy min <= max (got {}..{})",
                self.rotation_min, self.rotation_max
            )));
        }
        Ok(())
    }
}

/// Physical badge dimensions plus the default print mark options.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintConfig {
    pub badge_diameter_mm: f64,
    pub bleed_mm: f64,
    pub safe_zone_mm: f64,
    pub label_margin_mm: f64,
    pub marks: MarkOptions,
}

impl Default for PrintConfig {
    fn default() -> Self {
        Self {
            badge_diameter_mm: BADGE_DIAMETER_MM,
            bleed_mm: BLEED_MM,
            safe_zone_mm: SAFE_ZONE_MM,
            label_margin_mm: LABEL_MARGIN_MM,
            marks: MarkOptions::default(),
        }
    }
}

impl PrintConfig {
    fn validate(&self) -> Result<()> {
        let lengths = [
            self.badge_diameter_mm,
            self.bleed_mm,
            self.safe_zone_mm,
            self.label_margin_mm,
        ];
        if lengths.iter().any(|v| !v.is_finite()) {
            return Err(BadgeError::Config(
                "badge dimensions must be finite".into(),
            ));
        }
        if self.badge_diameter_mm <= 0.0 {
            return Err(BadgeError::Config("badge_diameter_mm must be > 0".into()));
        }
        if self.bleed_mm < 0.0 || self.safe_zone_mm < 0.0 || self.label_margin_mm < 0.0 {
            return Err(BadgeError::Config(
                "bleed, safe zone and label margin must be >= 0".into(),
            ));
        }
        if self.safe_zone_mm * 2.0 >= self.badge_diameter_mm {
            return Err(BadgeError::Config(
                "safe zone leaves no printable area".into(),
            ));
        }
        if !(self.marks.line_width.is_finite() && self.marks.line_width > 0.0) {
            return Err(BadgeError::Config("line_width must be > 0".into()));
        }
        print_geometry(self.marks.dpi, self).map(|_| ())
    }
}

/// Overlay toggles and styling for the print-marked export.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkOptions {
    pub dpi: f64,
    pub show_bleed_line: bool,
    pub show_cut_line: bool,
    pub show_safe_zone: bool,
    pub bleed_line_color: Rgba8,
    pub cut_line_color: Rgba8,
    pub safe_zone_color: Rgba8,
    pub line_width: f32,
    pub background_color: Rgba8,
}

impl Default for MarkOptions {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            show_bleed_line: true,
            show_cut_line: true,
            show_safe_zone: false,
            bleed_line_color: Rgba8::rgb(0xFF, 0x00, 0x00),
            cut_line_color: Rgba8::rgb(0x00, 0x00, 0xFF),
            safe_zone_color: Rgba8::rgb(0x00, 0xAA, 0x00),
            line_width: 2.0,
            background_color: Rgba8::rgb(0xFF, 0xFF, 0xFF),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub max_bytes: u64,
    pub min_side: u32,
    pub recommended_side: u32,
    pub accepted_mime_types: Vec<String>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_bytes: MAX_UPLOAD_BYTES,
            min_side: MIN_IMAGE_SIDE,
            recommended_side: RECOMMENDED_IMAGE_SIDE,
            accepted_mime_types: ACCEPTED_MIME_TYPES.iter().map(|m| m.to_string()).collect(),
        }
    }
}

impl ValidationConfig {
    fn validate(&self) -> Result<()> {
        if self.min_side > self.recommended_side {
            return Err(BadgeError::Config(format!(
                "min_side ({}) exceeds recommended_side ({})",
                self.min_side, self.recommended_side
            )));
        }
        if self.accepted_mime_types.is_empty() {
            return Err(BadgeError::Config("accepted_mime_types is empty".into()));
        }
        Ok(())
    }
}

/// One step of the personal-order price table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceTier {
    /// Smallest quantity this tier applies to.
    pub min_quantity: u32,
    /// Price per badge in cents.
    pub unit_price_cents: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    pub personal_tiers: Vec<PriceTier>,
    pub event_price_cents: u64,
    pub event_minimum: u32,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            personal_tiers: vec![
                PriceTier {
                    min_quantity: 1,
                    unit_price_cents: 2500,
                },
                PriceTier {
                    min_quantity: 5,
                    unit_price_cents: 2000,
                },
                PriceTier {
                    min_quantity: 10,
                    unit_price_cents: 1500,
                },
            ],
            event_price_cents: DEFAULT_EVENT_PRICE_CENTS,
            event_minimum: DEFAULT_EVENT_MINIMUM,
        }
    }
}

impl PricingConfig {
    /// The tier table must start at quantity 1, have strictly increasing
    /// minimums and never raise the unit price.
    pub fn validate(&self) -> Result<()> {
        let first = self
            .personal_tiers
            .first()
            .ok_or_else(|| BadgeError::Config("personal_tiers is empty".into()))?;
        if first.min_quantity != 1 {
            return Err(BadgeError::Config(format!(
                "first price tier must start at quantity 1 (got {})",
                first.min_quantity
            )));
        }
        for pair in self.personal_tiers.windows(2) {
            if pair[1].min_quantity <= pair[0].min_quantity {
                return Err(BadgeError::Config(format!(
                    "price tier minimums must increase ({} then {})",
                    pair[0].min_quantity, pair[1].min_quantity
                )));
            }
            if pair[1].unit_price_cents > pair[0].unit_price_cents {
                return Err(BadgeError::Config(format!(
                    "price tier at quantity {} is more expensive than the previous tier",
                    pair[1].min_quantity
                )));
            }
        }
        if self.event_minimum == 0 {
            return Err(BadgeError::Config("event_minimum must be >= 1".into()));
        }
        Ok(())
    }
}

/// An 8-bit RGBA color, written as `#RRGGBB` or `#RRGGBBAA` in config files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn to_skia(self) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }
}

impl TryFrom<String> for Rgba8 {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl std::str::FromStr for Rgba8 {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
            return Err(format!("invalid color '{s}', expected #RRGGBB or #RRGGBBAA"));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| format!("invalid color '{s}', expected #RRGGBB or #RRGGBBAA"))
        };
        Ok(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
            a: if hex.len() == 8 { channel(6)? } else { 255 },
        })
    }
}

impl From<Rgba8> for String {
    fn from(c: Rgba8) -> Self {
        c.to_string()
    }
}

impl fmt::Display for Rgba8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }
}
