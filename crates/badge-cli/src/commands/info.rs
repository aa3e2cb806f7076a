use std::path::PathBuf;

use anyhow::{Context, Result};
use badge_core::config::BadgeConfig;
use badge_core::validate::{ImageValidator, Upload};
use clap::Args;

use super::mime_for_path;

#[derive(Args)]
pub struct InfoArgs {
    /// Input image (JPEG, PNG or WebP)
    pub file: PathBuf,
}

pub fn run(args: &InfoArgs, config: &BadgeConfig) -> Result<()> {
    let bytes = std::fs::read(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let mime = mime_for_path(&args.file);
    let upload = match mime {
        Some(mime) => Upload::new(&bytes, mime),
        None => Upload::sniffed(&bytes),
    };
    let report = ImageValidator::new(config.validation.clone()).validate(upload);

    println!("File:        {}", args.file.display());
    println!("Type:        {}", mime.unwrap_or("(sniffed)"));
    println!("File size:   {:.2} MB", bytes.len() as f64 / (1024.0 * 1024.0));
    if let Some(dims) = report.dimensions {
        println!("Dimensions:  {}x{}", dims.width, dims.height);
        println!("Short side:  {} px", dims.shorter_side());
    }
    if let Some(ratio) = report.aspect_ratio {
        println!("Aspect:      {:.3}", ratio);
    }

    if let Some(ref warning) = report.warning {
        println!("Warning:     {}", warning);
    }
    match report.error {
        Some(err) => {
            println!("Status:      rejected");
            Err(err).with_context(|| format!("{} cannot be used for a badge", args.file.display()))
        }
        None => {
            println!("Status:      accepted");
            Ok(())
        }
    }
}
