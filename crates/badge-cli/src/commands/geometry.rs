use anyhow::Result;
use badge_core::config::BadgeConfig;
use badge_core::geometry::print_geometry;
use clap::Args;

#[derive(Args)]
pub struct GeometryArgs {
    /// Print resolution (default from config)
    #[arg(long)]
    pub dpi: Option<f64>,

    /// Emit JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: &GeometryArgs, config: &BadgeConfig) -> Result<()> {
    let dpi = args.dpi.unwrap_or(config.print.marks.dpi);
    let g = print_geometry(dpi, &config.print)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&g)?);
        return Ok(());
    }

    let p = &config.print;
    println!("DPI:           {}", g.dpi);
    println!(
        "Cut:           {} px ({} mm)",
        g.cutting_diameter_px, p.badge_diameter_mm
    );
    println!(
        "Bleed:         {} px ({} px / {} mm each side)",
        g.bleed_diameter_px, g.bleed_px, p.bleed_mm
    );
    println!(
        "Safe zone:     {} px ({} px / {} mm inset)",
        g.safe_zone_diameter_px, g.safe_margin_px, p.safe_zone_mm
    );
    println!(
        "Label margin:  {} px ({} mm)",
        g.label_margin_px, p.label_margin_mm
    );
    println!("Canvas:        {0}x{0} px", g.canvas_size_px);
    Ok(())
}
