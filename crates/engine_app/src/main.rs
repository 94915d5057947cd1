//! # engine_app — spawning host
//!
//! Runs the spawning subsystem against an in-memory voxel world.
//!
//! ## Startup Sequence
//!
//! 1. Read the scene file (or start from an empty scene).
//! 2. Index the template catalogue.
//! 3. Place spawners and connect players; this arms their cadences.
//! 4. Step simulated time at a fixed rate for the requested duration.

mod clock;
mod config;
mod scheduler;
mod tick;
mod world;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::{JsonCatalogue, SceneConfig};
use tick::{DEFAULT_STEP_MS, SimulationLoop};

#[derive(Parser)]
#[command(name = "engine_app", about = "Simulate mob spawning in a voxel world")]
struct Args {
    /// JSON array of spawnable templates
    #[arg(short, long)]
    catalogue: PathBuf,

    /// JSON scene: spawning config, terrain, spawners and players
    #[arg(short, long)]
    scene: Option<PathBuf>,

    /// Seed for every random draw
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Simulated seconds to run
    #[arg(short, long, default_value_t = 60)]
    duration: u64,

    /// Simulated milliseconds per frame
    #[arg(long, default_value_t = DEFAULT_STEP_MS)]
    step_ms: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("engine_app=info".parse()?)
                .add_directive("engine_spawning=info".parse()?),
        )
        .init();

    let args = Args::parse();

    let scene = match &args.scene {
        Some(path) => SceneConfig::load(path)?,
        None => SceneConfig::default(),
    };
    info!(
        spawners = scene.spawners.len(),
        players = scene.players.len(),
        mode = ?scene.spawning.mode,
        "scene loaded"
    );

    let catalogue = JsonCatalogue::new(&args.catalogue);
    let mut sim = SimulationLoop::from_scene(&scene, &catalogue, args.seed, args.step_ms)
        .with_context(|| format!("indexing catalogue {}", catalogue.path().display()))?;

    let totals = sim.run(args.duration.saturating_mul(1_000));
    for (template, count) in sim.store().census() {
        info!(%template, count, "population");
    }
    for spawner in sim.driver().registry().entities() {
        let children = sim.store().children_of(spawner).count();
        info!(%spawner, children, "spawner offspring");
    }
    info!(
        actions = totals.actions,
        passes = totals.passes,
        throttled = totals.throttled,
        capped = totals.capped,
        spawned = totals.spawned,
        skipped = totals.skipped,
        now_ms = sim.now_ms(),
        entities = sim.store().allocated(),
        "run finished"
    );
    Ok(())
}
