use std::path::PathBuf;

use anyhow::{Context, Result};
use badge_core::compose::Compositor;
use badge_core::config::BadgeConfig;
use badge_core::error::BadgeError;
use clap::Args;

use super::{load_model, TransformArgs};

#[derive(Args)]
pub struct RenderArgs {
    /// Input image
    pub file: PathBuf,

    #[command(flatten)]
    pub transform: TransformArgs,

    /// Output side length in pixels (default from config)
    #[arg(long)]
    pub size: Option<u32>,

    /// Output PNG path
    #[arg(short, long, default_value = "badge.png")]
    pub output: PathBuf,
}

pub fn run(args: &RenderArgs, config: &BadgeConfig) -> Result<()> {
    let model = load_model(&args.file, &args.transform, config)?;
    let size = args.size.unwrap_or(config.designer.export_size);

    let compositor = Compositor::new(config.print.clone());
    let artifact = compositor
        .render(&model, size)?
        .ok_or(BadgeError::EmptyModel)?;

    std::fs::write(&args.output, artifact.png_bytes())
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    let t = model.transform();
    println!(
        "Badge {}x{} (zoom {:.2}, offset {:.1},{:.1}, rotation {:.1}\u{00b0}) saved to {}",
        artifact.width,
        artifact.height,
        t.zoom,
        t.position.x,
        t.position.y,
        t.rotation,
        args.output.display()
    );
    Ok(())
}
