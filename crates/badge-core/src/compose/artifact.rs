use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};
use rayon::prelude::*;
use tiny_skia::Pixmap;

use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::error::{RenderError, Result};

/// Which export produced an artifact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// Square badge-only export at the configured export size.
    Plain,
    /// Bleed-inclusive export with guides, labels and alignment marks.
    PrintReady,
}

/// Losslessly encoded render output.
#[derive(Clone, PartialEq, Eq)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub width: u32,
    pub height: u32,
    png: Vec<u8>,
}

impl std::fmt::Debug for Artifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Artifact")
            .field("kind", &self.kind)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("png_bytes", &self.png.len())
            .finish()
    }
}

impl Artifact {
    /// Un-premultiply the surface and encode it as PNG.
    pub(crate) fn encode(pixmap: &Pixmap, kind: ArtifactKind) -> std::result::Result<Self, RenderError> {
        let (width, height) = (pixmap.width(), pixmap.height());
        let mut img = RgbaImage::new(width, height);

        let demultiply = |(dst, src): (&mut [u8], &tiny_skia::PremultipliedColorU8)| {
            let c = src.demultiply();
            dst.copy_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        };
        if (width as usize * height as usize) >= PARALLEL_PIXEL_THRESHOLD {
            img.par_chunks_exact_mut(4)
                .zip(pixmap.pixels().par_iter())
                .for_each(demultiply);
        } else {
            img.chunks_exact_mut(4)
                .zip(pixmap.pixels().iter())
                .for_each(demultiply);
        }

        let mut png = Vec::new();
        PngEncoder::new(&mut png)
            .write_image(img.as_raw(), width, height, ExtendedColorType::Rgba8)
            .map_err(|e| RenderError::Encode(e.to_string()))?;

        Ok(Self {
            kind,
            width,
            height,
            png,
        })
    }

    pub fn png_bytes(&self) -> &[u8] {
        &self.png
    }

    pub fn into_png_bytes(self) -> Vec<u8> {
        self.png
    }

    /// `data:image/png;base64,...` form consumed by the web front end.
    pub fn to_data_url(&self) -> String {
        format!("data:image/png;base64,{}", STANDARD.encode(&self.png))
    }

    /// Decode the PNG back into straight-alpha RGBA pixels.
    pub fn to_rgba(&self) -> Result<RgbaImage> {
        Ok(image::load_from_memory(&self.png)?.to_rgba8())
    }
}
