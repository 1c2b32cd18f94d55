//! flower-gen - procedural flower painter and 3D model generator
//!
//! `paint` renders the 2D flower image of a record; `model` reconstructs a
//! textured 3D flower and writes it as GLB.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use flower_gen::texture::write_png;
use flower_gen::{
    DrawMode, FlowerParameters, FlowerRecord, NoiseRealizer, PetalParams, build_model, write_glb,
};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Parser)]
#[command(name = "flower-gen")]
#[command(about = "Procedural flower painter and 3D model generator")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where the flower comes from
#[derive(Args)]
struct Source {
    /// Flower record JSON (a fresh random record is generated when omitted)
    #[arg(short, long)]
    record: Option<PathBuf>,

    /// Random seed (default: current time)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Petal radius in pixels for generated records
    #[arg(long, default_value_t = 64)]
    radius: i32,

    /// Number of petal layers for generated records
    #[arg(long, default_value_t = 3)]
    layers: i32,

    /// Write the record used to this path
    #[arg(long)]
    save_record: Option<PathBuf>,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum Mode {
    Trunk,
    Petals,
    Both,
}

impl From<Mode> for DrawMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Trunk => DrawMode::Trunk,
            Mode::Petals => DrawMode::Petals,
            Mode::Both => DrawMode::TrunkAndPetals,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Paint the 2D flower image
    Paint {
        #[command(flatten)]
        source: Source,

        /// Output PNG file
        #[arg(short, long, default_value = "flower.png")]
        output: PathBuf,

        /// What to draw
        #[arg(short, long, value_enum, default_value = "both")]
        mode: Mode,
    },

    /// Build the 3D flower and write it as GLB
    Model {
        #[command(flatten)]
        source: Source,

        /// Output GLB file
        #[arg(short, long, default_value = "flower.glb")]
        output: PathBuf,

        /// Reconstruction parameters (.toml or .json)
        #[arg(short, long)]
        params: Option<PathBuf>,

        /// Identifier embedded in node and scene names
        #[arg(long, default_value = "0")]
        id: String,
    },
}

fn time_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}

/// Load the record, or make a new one from the seeded generator
fn load_record(source: &Source, rng: &mut Pcg32) -> Result<FlowerRecord> {
    let record = match &source.record {
        Some(path) => FlowerRecord::load(path)
            .with_context(|| format!("Failed to load flower record {:?}", path))?,
        None => {
            let petals = PetalParams {
                radius: source.radius,
                num_layers: source.layers,
                ..PetalParams::default()
            };
            petals.validate()?;
            FlowerRecord::random(petals, rng)
        }
    };

    if let Some(path) = &source.save_record {
        save_record(&record, path)?;
    }
    Ok(record)
}

fn save_record(record: &FlowerRecord, path: &Path) -> Result<()> {
    let text = serde_json::to_string_pretty(&record.to_json())?;
    std::fs::write(path, text).with_context(|| format!("Failed to write {:?}", path))?;
    tracing::info!("Saved record to {:?}", path);
    Ok(())
}

fn seeded(source: &Source) -> Pcg32 {
    let seed = source.seed.unwrap_or_else(time_seed);
    tracing::info!("Using seed {}", seed);
    Pcg32::seed_from_u64(seed)
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Paint {
            source,
            output,
            mode,
        } => {
            let mut rng = seeded(&source);
            let record = load_record(&source, &mut rng)?;
            let image = record.paint(&NoiseRealizer, mode.into());
            write_png(&image, &output).with_context(|| format!("Failed to write {:?}", output))?;
            tracing::info!(
                "Painted {}x{} flower -> {:?}",
                image.width,
                image.height,
                output
            );
        }

        Commands::Model {
            source,
            output,
            params,
            id,
        } => {
            let mut rng = seeded(&source);
            let record = load_record(&source, &mut rng)?;
            let params = match params {
                Some(path) => FlowerParameters::load(&path)
                    .with_context(|| format!("Failed to load parameters {:?}", path))?,
                None => FlowerParameters::default(),
            };

            let scene = build_model(&record, &params, &NoiseRealizer, &mut rng, &id)?;
            write_glb(&scene, &output).with_context(|| format!("Failed to write {:?}", output))?;
            tracing::info!("Done! {:?}", output);
        }
    }

    Ok(())
}
