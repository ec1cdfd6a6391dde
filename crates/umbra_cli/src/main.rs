//! umbra - offline ray tracer for triangle scenes.
//!
//! Renders the built-in demo scene with soft shadows and mirror reflections.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use umbra_core::RenderDesc;

mod output;
mod scene;

#[derive(Parser)]
#[command(name = "umbra")]
#[command(about = "Offline ray tracer with soft shadows and mirrors", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the demo scene to an image
    Render {
        /// JSON render description (defaults are used when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Output file (.png or .ppm)
        #[arg(short, long, default_value = "umbra.png")]
        output: PathBuf,
        /// Test every face for every ray instead of building boxes
        #[arg(long)]
        brute_force: bool,
    },
    /// Print the default render description as JSON
    Defaults,
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Render {
            config,
            output,
            brute_force,
        } => render(config.as_deref(), &output, brute_force),
        Commands::Defaults => {
            println!("{}", serde_json::to_string_pretty(&RenderDesc::default())?);
            Ok(())
        }
    }
}

fn load_desc(config: Option<&Path>) -> Result<RenderDesc> {
    let Some(path) = config else {
        return Ok(RenderDesc::default());
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    RenderDesc::from_json(&json).with_context(|| format!("invalid config {}", path.display()))
}

fn render(config: Option<&Path>, output: &Path, brute_force: bool) -> Result<()> {
    let mut desc = load_desc(config)?;
    if brute_force {
        desc.accel = None;
    }

    let scene = scene::demo_scene().context("failed to build demo scene")?;
    log::info!(
        "Demo scene: {} triangles, {} vertices",
        scene.triangle_count(),
        scene.vertex_count()
    );

    let traced = umbra_tracer::render(&desc, &scene).context("render failed")?;
    let image = if desc.supersample {
        output::supersample_2x2(&traced)
    } else {
        traced
    };

    output::write_image(&image, output)?;
    println!(
        "Rendered {}x{} image to {}",
        image.width,
        image.height,
        output.display()
    );
    Ok(())
}
