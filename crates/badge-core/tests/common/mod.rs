#![allow(dead_code)]

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

use badge_core::config::DesignerConfig;
use badge_core::source::SourceImage;
use badge_core::transform::TransformModel;

/// Encode an RGBA image built from `f(x, y)` as PNG bytes.
pub fn png_from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> [u8; 4]) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, y| Rgba(f(x, y)));
    encode(img, ImageFormat::Png)
}

/// Single-color PNG, cheap to encode even at upload resolutions.
pub fn solid_png(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    png_from_fn(width, height, |_, _| [rgb[0], rgb[1], rgb[2], 255])
}

pub fn solid_jpeg(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
        width,
        height,
        Rgba([rgb[0], rgb[1], rgb[2], 255]),
    ));
    let mut buf = Cursor::new(Vec::new());
    img.to_rgb8()
        .write_to(&mut buf, ImageFormat::Jpeg)
        .expect("encode jpeg");
    buf.into_inner()
}

fn encode(img: RgbaImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format).expect("encode test image");
    buf.into_inner()
}

pub fn source_from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> [u8; 4]) -> SourceImage {
    let img = RgbaImage::from_fn(width, height, |x, y| Rgba(f(x, y)));
    SourceImage::from_dynamic(&DynamicImage::ImageRgba8(img)).expect("valid test image")
}

pub fn solid_source(width: u32, height: u32, rgb: [u8; 3]) -> SourceImage {
    source_from_fn(width, height, |_, _| [rgb[0], rgb[1], rgb[2], 255])
}

/// Smooth linear gradient: red follows x, green follows y.
pub fn gradient_source(width: u32, height: u32) -> SourceImage {
    source_from_fn(width, height, |x, y| {
        [
            (x * 255 / width.max(2).saturating_sub(1)).min(255) as u8,
            (y * 255 / height.max(2).saturating_sub(1)).min(255) as u8,
            128,
            255,
        ]
    })
}

pub fn loaded_model(image: SourceImage, preview_viewport: u32) -> TransformModel {
    let mut model = TransformModel::new(preview_viewport);
    model.set_image(image);
    model
}

/// Designer settings with a small export so session tests stay fast.
pub fn small_designer() -> DesignerConfig {
    DesignerConfig {
        export_size: 64,
        ..Default::default()
    }
}

/// Largest per-channel difference between two pixels.
pub fn channel_diff(a: &Rgba<u8>, b: &Rgba<u8>) -> u8 {
    a.0.iter()
        .zip(b.0.iter())
        .map(|(x, y)| x.abs_diff(*y))
        .max()
        .unwrap_or(0)
}

/// 2x box downsample.
pub fn downsample_2x(img: &RgbaImage) -> RgbaImage {
    let (w, h) = (img.width() / 2, img.height() / 2);
    RgbaImage::from_fn(w, h, |x, y| {
        let mut acc = [0u32; 4];
        for (dx, dy) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            let p = img.get_pixel(2 * x + dx, 2 * y + dy);
            for c in 0..4 {
                acc[c] += p.0[c] as u32;
            }
        }
        Rgba(acc.map(|v| ((v + 2) / 4) as u8))
    })
}
