use image::DynamicImage;
use serde::{Deserialize, Serialize};
use rayon::prelude::*;
use tiny_skia::{ColorU8, IntSize, Pixmap, PixmapRef, PremultipliedColorU8};

use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::error::ValidationError;

/// Pixel dimensions of a bitmap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn shorter_side(&self) -> u32 {
        self.width.min(self.height)
    }

    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            0.0
        } else {
            self.width as f64 / self.height as f64
        }
    }
}

/// Decoded photo owned by exactly one transform model.
///
/// Pixels are stored premultiplied so the compositor can sample them
/// directly. Dropping the value releases the bitmap.
#[derive(Clone)]
pub struct SourceImage {
    pixmap: Pixmap,
}

impl std::fmt::Debug for SourceImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceImage")
            .field("width", &self.pixmap.width())
            .field("height", &self.pixmap.height())
            .finish()
    }
}

impl SourceImage {
    /// Decode encoded image bytes (JPEG, PNG, WebP, ...).
    pub fn decode(bytes: &[u8]) -> Result<Self, ValidationError> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| ValidationError::Corrupt(e.to_string()))?;
        Self::from_dynamic(&img)
    }

    pub fn from_dynamic(img: &DynamicImage) -> Result<Self, ValidationError> {
        let rgba = img.to_rgba8();
        let (w, h) = rgba.dimensions();
        let size = IntSize::from_wh(w, h).ok_or_else(|| {
            ValidationError::Corrupt(format!("image has invalid dimensions {w}x{h}"))
        })?;

        let mut pixmap = Pixmap::new(size.width(), size.height()).ok_or_else(|| {
            ValidationError::Corrupt(format!("could not build a {w}x{h} bitmap"))
        })?;
        let premultiply = |(dst, src): (&mut PremultipliedColorU8, &[u8])| {
            *dst = ColorU8::from_rgba(src[0], src[1], src[2], src[3]).premultiply();
        };
        let pixels = pixmap.pixels_mut();
        if (w as usize * h as usize) >= PARALLEL_PIXEL_THRESHOLD {
            pixels
                .par_iter_mut()
                .zip(rgba.par_chunks_exact(4))
                .for_each(premultiply);
        } else {
            pixels
                .iter_mut()
                .zip(rgba.chunks_exact(4))
                .for_each(premultiply);
        }
        Ok(Self { pixmap })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn natural_size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    pub(crate) fn pixmap(&self) -> PixmapRef<'_> {
        self.pixmap.as_ref()
    }
}
