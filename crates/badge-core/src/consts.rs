/// Diameter (px) of the circular on-screen editing viewport.
pub const DEFAULT_PREVIEW_VIEWPORT: u32 = 300;

/// Side length (px) of the square plain production export.
pub const DEFAULT_EXPORT_SIZE: u32 = 2000;

/// Print resolution used when none is requested.
pub const DEFAULT_DPI: f64 = 300.0;

/// Highest accepted print resolution.
pub const MAX_DPI: f64 = 2400.0;

/// Largest side (px) of a plain export.
pub const MAX_EXPORT_SIZE: u32 = 8192;

/// Largest side (px) of a print-ready canvas.
pub const MAX_CANVAS_SIZE: u32 = 16_384;

/// Millimetres per inch, the basis of every mm -> px conversion.
pub const MM_PER_INCH: f64 = 25.4;

/// Finished badge diameter at the cutting line (mm).
pub const BADGE_DIAMETER_MM: f64 = 58.0;

/// Image margin extending beyond the cutting line (mm).
pub const BLEED_MM: f64 = 3.0;

/// Inset from the cutting line inside which important content should stay (mm).
pub const SAFE_ZONE_MM: f64 = 3.0;

/// Blank border around the bleed circle holding labels and alignment marks (mm).
pub const LABEL_MARGIN_MM: f64 = 10.0;

/// Quiescence window after the last mutation before a design re-renders.
pub const DEFAULT_DEBOUNCE_MS: u64 = 400;

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 5.0;

/// Lower bound of the natural-fit zoom computed on image load.
pub const MIN_FIT_ZOOM: f64 = 0.5;

pub const MIN_ROTATION_DEG: f64 = -180.0;
pub const MAX_ROTATION_DEG: f64 = 180.0;

/// Upload size cap (20 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 20 * 1024 * 1024;

/// Shorter image side below which uploads are rejected.
pub const MIN_IMAGE_SIDE: u32 = 800;

/// Shorter image side below which uploads carry a quality warning.
pub const RECOMMENDED_IMAGE_SIDE: u32 = 1500;

/// MIME types accepted for upload.
pub const ACCEPTED_MIME_TYPES: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "image/webp"];

/// Smallest replication count for an event order.
pub const DEFAULT_EVENT_MINIMUM: u32 = 20;

/// Flat per-badge event price in cents.
pub const DEFAULT_EVENT_PRICE_CENTS: u64 = 1200;

/// Minimum number of designs to use design-level Rayon parallelism on export.
pub const PARALLEL_DESIGN_THRESHOLD: usize = 4;

/// Dash pattern (on, off) for bleed and safe-zone guides, in multiples of line width.
pub const GUIDE_DASH: [f32; 2] = [5.0, 5.0];

/// Arm length of the corner alignment marks as a fraction of the label margin.
pub const CORNER_MARK_FRACTION: f32 = 0.4;

/// Label font size as a fraction of the label margin.
pub const LABEL_FONT_FRACTION: f32 = 0.2;

/// Minimum pixel count (w*h) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;
