mod commands;
mod summary;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "badge", about = "Circular photo badge compositing and print export")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Settings file (TOML); defaults apply to anything it leaves out
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate an image and show its metadata
    Info(commands::info::InfoArgs),
    /// Export a plain circular badge
    Render(commands::render::RenderArgs),
    /// Export a print-ready badge with bleed, guides and marks
    Print(commands::print::PrintArgs),
    /// Show print geometry for a DPI
    Geometry(commands::geometry::GeometryArgs),
    /// Print or save the default settings as TOML
    Config(commands::config::ConfigArgs),
    /// Render every design of an order and write the checkout handoff
    Order(commands::order::OrderArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = commands::load_config(cli.config.as_deref())?;

    match &cli.command {
        Commands::Info(args) => commands::info::run(args, &config),
        Commands::Render(args) => commands::render::run(args, &config),
        Commands::Print(args) => commands::print::run(args, &config),
        Commands::Geometry(args) => commands::geometry::run(args, &config),
        Commands::Config(args) => commands::config::run(args, &config),
        Commands::Order(args) => commands::order::run(args, &config),
    }
}
