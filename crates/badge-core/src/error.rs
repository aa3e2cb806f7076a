use thiserror::Error;

/// Reasons an upload is refused before it enters the pipeline.
///
/// Messages are shown verbatim to the customer, so each one names the
/// constraint that was violated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Unsupported file type '{mime}'. Please upload a JPEG, PNG or WebP image")]
    UnsupportedFormat { mime: String },

    #[error("File is too large ({size_mb:.1} MB). Maximum allowed size is {max_mb:.0} MB")]
    FileTooLarge { size_mb: f64, max_mb: f64 },

    #[error(
        "Image resolution too low ({width}x{height}). \
         The shorter side must be at least {required}px, this image has {actual}px"
    )]
    ResolutionTooLow {
        width: u32,
        height: u32,
        actual: u32,
        required: u32,
    },

    #[error("Could not read image data, the file may be corrupt: {0}")]
    Corrupt(String),
}

/// Failure while drawing or encoding an artifact for a non-empty design.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("Invalid export size {0}px")]
    InvalidSize(u32),

    #[error("Invalid print DPI {0}")]
    InvalidDpi(f64),

    #[error("Could not allocate a {width}x{height} render surface")]
    Surface { width: u32, height: u32 },

    #[error("Export failed: {0}")]
    Encode(String),
}

/// A session operation refused because it would break a session invariant.
///
/// These are reachable through normal UI interaction, so the session
/// reports them and leaves its state untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConstraintViolation {
    #[error("A session must keep at least one design")]
    LastSlot,

    #[error("Slot index {index} out of range (total: {total})")]
    SlotIndexOutOfRange { index: usize, total: usize },

    #[error("Event orders use a single shared design")]
    EventModeSingleDesign,
}

/// Reasons a session cannot be handed off for checkout.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CheckoutError {
    #[error("Order has no badge designs")]
    NoDesigns,

    #[error("Event orders need at least {minimum} badges (requested {requested})")]
    BelowEventMinimum { requested: u32, minimum: u32 },

    #[error("Design {id} could not be exported: {source}")]
    Render { id: u64, source: RenderError },
}

#[derive(Error, Debug)]
pub enum BadgeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Constraint(#[from] ConstraintViolation),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid DPI: {0}")]
    InvalidDpi(f64),

    #[error("No image loaded")]
    EmptyModel,
}

pub type Result<T> = std::result::Result<T, BadgeError>;
