use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use badge_core::compose::{Compositor, LabelFont};
use badge_core::config::{BadgeConfig, MarkOptions};
use badge_core::error::BadgeError;
use badge_core::geometry::print_geometry;
use clap::Args;

use super::{load_model, TransformArgs};

#[derive(Args)]
pub struct PrintArgs {
    /// Input image
    pub file: PathBuf,

    #[command(flatten)]
    pub transform: TransformArgs,

    /// Print resolution (default from config)
    #[arg(long)]
    pub dpi: Option<f64>,

    /// Hide the dashed bleed circle
    #[arg(long)]
    pub no_bleed_line: bool,

    /// Hide the cutting circle
    #[arg(long)]
    pub no_cut_line: bool,

    /// Show the dashed safe-zone circle
    #[arg(long)]
    pub safe_zone: bool,

    /// Font for the annotations (default: first system sans-serif, else bundled DejaVu Sans)
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Output PNG path
    #[arg(short, long, default_value = "badge-print.png")]
    pub output: PathBuf,
}

impl PrintArgs {
    fn mark_options(&self, base: &MarkOptions) -> MarkOptions {
        MarkOptions {
            dpi: self.dpi.unwrap_or(base.dpi),
            show_bleed_line: base.show_bleed_line && !self.no_bleed_line,
            show_cut_line: base.show_cut_line && !self.no_cut_line,
            show_safe_zone: base.show_safe_zone || self.safe_zone,
            ..base.clone()
        }
    }
}

pub fn run(args: &PrintArgs, config: &BadgeConfig) -> Result<()> {
    let model = load_model(&args.file, &args.transform, config)?;
    let opts = args.mark_options(&config.print.marks);

    let compositor = Compositor::new(config.print.clone());
    let compositor = match args.font {
        Some(ref path) => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("Failed to read font {}", path.display()))?;
            let font = LabelFont::from_bytes(bytes)
                .ok_or_else(|| anyhow!("{} is not a usable TrueType/OpenType font", path.display()))?;
            compositor.with_font(font)
        }
        None => compositor.with_system_font(),
    };

    let artifact = compositor
        .render_print_ready(&model, &opts)?
        .ok_or(BadgeError::EmptyModel)?;
    std::fs::write(&args.output, artifact.png_bytes())
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    let geometry = print_geometry(opts.dpi, &config.print)?;
    println!(
        "Print badge {}x{} @ {} DPI (cut {} px, bleed {} px) saved to {}",
        artifact.width,
        artifact.height,
        opts.dpi,
        geometry.cutting_diameter_px,
        geometry.bleed_diameter_px,
        args.output.display()
    );
    if !compositor.has_label_font() {
        println!("No font available, labels were omitted");
    }
    Ok(())
}
