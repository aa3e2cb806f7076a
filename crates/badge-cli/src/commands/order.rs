use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use badge_core::compose::Compositor;
use badge_core::config::BadgeConfig;
use badge_core::design::RenderOutcome;
use badge_core::pricing::SessionMode;
use badge_core::session::Session;
use badge_core::transform::Transform;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use tracing::debug;

use super::accept_image;
use crate::summary::print_order_summary;

#[derive(Args)]
pub struct OrderArgs {
    /// Order description (TOML)
    pub file: PathBuf,

    /// Directory for the badge PNGs and order.json
    #[arg(short, long, default_value = "order")]
    pub output: PathBuf,
}

/// On-disk order description.
///
/// ```toml
/// mode = "event"
/// replication_count = 30
///
/// [[designs]]
/// image = "team.jpg"
/// transform = { zoom = 1.2, rotation = 15.0, position = { x = 20.0, y = -10.0 } }
/// ```
#[derive(Deserialize)]
struct OrderFile {
    #[serde(default)]
    mode: SessionMode,
    replication_count: Option<u32>,
    designs: Vec<OrderDesign>,
}

#[derive(Deserialize)]
struct OrderDesign {
    /// Relative paths resolve against the order file's directory.
    image: PathBuf,
    /// Omitted: keep the natural fit.
    transform: Option<Transform>,
}

pub fn run(args: &OrderArgs, config: &BadgeConfig) -> Result<()> {
    let contents = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read order {}", args.file.display()))?;
    let order: OrderFile = toml::from_str(&contents).context("Invalid order file")?;
    if order.designs.is_empty() {
        bail!("{} lists no designs", args.file.display());
    }
    if order.mode == SessionMode::Event && order.designs.len() > 1 {
        bail!(
            "Event orders print a single design ({} given)",
            order.designs.len()
        );
    }
    let base_dir = args.file.parent().unwrap_or(Path::new("."));

    let compositor = Compositor::new(config.print.clone());
    let mut session = Session::new(order.mode, config.clone(), compositor)?;
    if let Some(count) = order.replication_count {
        let applied = session.set_replication_count(count);
        if applied != count {
            eprintln!(
                "Replication count raised from {} to the event minimum {}",
                count, applied
            );
        }
    }

    let now = Instant::now();
    for (i, entry) in order.designs.iter().enumerate() {
        if i > 0 {
            session.add_slot()?;
        }
        let path = base_dir.join(&entry.image);
        let accepted = accept_image(&path, config)?;
        debug!(path = %path.display(), "Loaded design image");
        let design = session.active_mut();
        design.set_image(accepted.image, now);
        if let Some(ref transform) = entry.transform {
            design.apply(transform, now);
        }
    }

    let pb = ProgressBar::new_spinner();
    pb.set_message(format!("Rendering {} design(s)", session.designs().len()));
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    for (id, outcome) in session.export_all() {
        if let RenderOutcome::Failed(err) = outcome {
            pb.abandon();
            bail!("Design {} failed to render: {}", id, err);
        }
    }
    pb.finish_and_clear();

    let handoff = session.checkout()?;

    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;
    let pb = ProgressBar::new(handoff.artifacts.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg:20} [{bar:40}] {pos}/{len}")?
            .progress_chars("=> "),
    );
    pb.set_message("Writing badges");
    let mut written = Vec::with_capacity(handoff.artifacts.len());
    for item in &handoff.artifacts {
        let path = args.output.join(format!("badge-{}.png", item.design_id.0));
        std::fs::write(&path, item.artifact.png_bytes())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
        pb.inc(1);
    }
    pb.finish_with_message("Done");

    let json_path = args.output.join("order.json");
    let json = serde_json::to_string_pretty(&handoff)?;
    std::fs::write(&json_path, json)
        .with_context(|| format!("Failed to write {}", json_path.display()))?;

    print_order_summary(&handoff, &written, &json_path);
    Ok(())
}
