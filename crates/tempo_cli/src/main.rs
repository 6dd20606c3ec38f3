//! Tempo CLI
//!
//! Validate, sample and evaluate keyframe animation scenes.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tempo_animation::SceneConfig;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod sample;

#[derive(Parser)]
#[command(name = "tempo")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Tempo keyframe animation CLI", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play every timeline of a scene and print sampled values
    Sample {
        /// Scene file (TOML)
        scene: PathBuf,

        /// Frames per second (defaults to the scene setting)
        #[arg(long)]
        fps: Option<u32>,

        /// Maximum frames to drive (defaults to the scene setting)
        #[arg(long)]
        frames: Option<u64>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Validate a scene and summarize its timelines
    Check {
        /// Scene file (TOML)
        scene: PathBuf,
    },

    /// Print one timeline's value at a given time
    Eval {
        /// Scene file (TOML)
        scene: PathBuf,

        /// Timeline name
        name: String,

        /// Time in seconds
        #[arg(allow_hyphen_values = true)]
        time: f32,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Sample {
            scene,
            fps,
            frames,
            format,
        } => cmd_sample(&scene, fps, frames, format),

        Commands::Check { scene } => cmd_check(&scene),

        Commands::Eval { scene, name, time } => cmd_eval(&scene, &name, time),
    }
}

fn load_scene(path: &Path) -> Result<SceneConfig> {
    SceneConfig::load(path).with_context(|| format!("Failed to load scene {}", path.display()))
}

fn cmd_sample(
    path: &Path,
    fps: Option<u32>,
    frames: Option<u64>,
    format: OutputFormat,
) -> Result<()> {
    let scene = load_scene(path)?;
    let fps = fps.unwrap_or(scene.settings.fps);
    let max_frames = frames.unwrap_or(scene.settings.max_frames);

    info!(
        "Sampling {} timeline(s) at {} fps (max {} frames)",
        scene.timelines.len(),
        fps,
        max_frames
    );

    let run = sample::sample_scene(&scene, fps, max_frames)?;

    match format {
        OutputFormat::Text => print!("{}", sample::format_text(&run)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&run)?),
    }

    if !run.unfinished.is_empty() {
        warn!(
            "Still playing after {} frames: {}",
            run.frames,
            run.unfinished.join(", ")
        );
    }

    Ok(())
}

fn cmd_check(path: &Path) -> Result<()> {
    let scene = load_scene(path)?;
    let timelines = scene.build_timelines()?;

    if timelines.is_empty() {
        warn!("Scene {} defines no timelines", path.display());
    }

    for (name, timeline) in &timelines {
        println!(
            "{:<20} key_frames={:<4} duration={:<8.4} interpolation={:<10} looping={}",
            name,
            timeline.len(),
            timeline.duration(),
            timeline.interpolation(),
            timeline.is_looping()
        );
    }

    info!("{} is valid", path.display());
    Ok(())
}

fn cmd_eval(path: &Path, name: &str, time: f32) -> Result<()> {
    let scene = load_scene(path)?;
    let config = scene
        .timeline(name)
        .with_context(|| format!("No timeline named '{name}' in {}", path.display()))?;
    let timeline = config
        .build()
        .with_context(|| format!("Invalid timeline '{name}'"))?;

    println!("{}", timeline.value_at(time)?);
    Ok(())
}
