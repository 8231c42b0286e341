//! Reanim engine headless runner.
//!
//! Loads animation definitions, the combo configuration and the image
//! catalog named in `config.ini`, spawns one unit, and runs the fixed-tick
//! schedule for a number of ticks, logging the composed parts. Useful for
//! checking new definitions and combos without a renderer.
//!
//! # Running
//!
//! ```sh
//! RUST_LOG=debug cargo run --release -- --unit zombie --combo walk --ticks 120
//! ```

use std::path::PathBuf;

use bevy_ecs::prelude::*;
use clap::Parser;
use glam::Vec2;
use log::{error, info, warn};

use reanimengine::components::animcommands::AnimCommand;
use reanimengine::components::mapposition::MapPosition;
use reanimengine::components::renderparts::RenderParts;
use reanimengine::components::rootmotion::RootMotion;
use reanimengine::game;
use reanimengine::reanim::compose::bounding_box;
use reanimengine::resources::animinbox::AnimCommandInbox;
use reanimengine::resources::engineconfig::EngineConfig;
use reanimengine::systems::time::update_world_time;

/// Reanim engine
#[derive(Parser)]
#[command(version, about = "Headless runner for multi-part reanimations")]
struct Cli {
    /// Engine configuration file.
    #[arg(long, value_name = "PATH", default_value = "./config.ini")]
    config: PathBuf,

    /// Unit to spawn, as named in the combo configuration.
    #[arg(long)]
    unit: String,

    /// Combo to apply after the unit's initial combo.
    #[arg(long)]
    combo: Option<String>,

    /// Animation to play on the base layer instead of a combo.
    #[arg(long, conflicts_with = "combo")]
    play: Option<String>,

    /// Number of fixed ticks to simulate.
    #[arg(long, default_value_t = 100)]
    ticks: u32,

    /// Spawn position.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    x: f32,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    y: f32,

    /// Log the composed parts every N ticks (0 logs only the last tick).
    #[arg(long, default_value_t = 0)]
    log_every: u32,
}

fn log_parts(world: &World, entity: Entity, tick: u32) {
    let Some(parts) = world.get::<RenderParts>(entity) else {
        return;
    };
    info!(
        "Tick {}: {} parts ({} compositions)",
        tick,
        parts.parts.len(),
        parts.compositions
    );
    for part in &parts.parts {
        info!(
            "  track {:>3} {:<24} pos=({:.2}, {:.2}) scale=({:.2}, {:.2}) rot={:.2} alpha={:.2} z={}",
            part.track,
            part.image,
            part.position.x,
            part.position.y,
            part.scale.x,
            part.scale.y,
            part.rotation,
            part.alpha,
            part.z
        );
    }

    // The figure must stay centered on the entity position.
    let tolerance = world.resource::<EngineConfig>().center_tolerance;
    if let (Some((min, max)), Some(pos)) =
        (bounding_box(&parts.parts), world.get::<MapPosition>(entity))
    {
        let drift = (min + max) * 0.5 - pos.pos;
        if drift.length() > tolerance {
            warn!(
                "Tick {}: figure center is off by ({:.3}, {:.3})",
                tick, drift.x, drift.y
            );
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = EngineConfig::with_path(&cli.config);
    if let Err(e) = config.load_from_file() {
        warn!("{}; using defaults", e);
    }
    let tick_seconds = config.tick_seconds();

    let mut world = match game::setup_world(config) {
        Ok(world) => world,
        Err(e) => {
            error!("Failed to set up world: {}", e);
            std::process::exit(1);
        }
    };

    let entity = match game::spawn_unit(&mut world, &cli.unit, Vec2::new(cli.x, cli.y)) {
        Ok(entity) => entity,
        Err(e) => {
            error!("Failed to spawn unit '{}': {}", cli.unit, e);
            std::process::exit(1);
        }
    };

    {
        let inbox = world.resource::<AnimCommandInbox>();
        if let Some(combo) = &cli.combo {
            inbox.send(entity, AnimCommand::combo(cli.unit.as_str(), combo.as_str()));
        }
        if let Some(name) = &cli.play {
            inbox.send(entity, AnimCommand::play(name.as_str()));
        }
    }

    let mut update = game::build_schedule();
    if let Err(e) = update.initialize(&mut world) {
        error!("Failed to initialize schedule: {}", e);
        std::process::exit(1);
    }

    // --------------- Fixed-tick loop ---------------
    for tick in 1..=cli.ticks {
        update_world_time(&mut world, tick_seconds);
        update.run(&mut world);
        world.clear_trackers();

        if cli.log_every > 0 && tick % cli.log_every == 0 {
            log_parts(&world, entity, tick);
        }
    }
    if cli.log_every == 0 || cli.ticks % cli.log_every != 0 {
        log_parts(&world, entity, cli.ticks);
    }

    if let Some(pos) = world.get::<MapPosition>(entity) {
        info!("Final position: ({:.2}, {:.2})", pos.pos.x, pos.pos.y);
    }
    if let Some(rm) = world.get::<RootMotion>(entity) {
        info!(
            "Root motion on '{}': ({:.2}, {:.2})",
            rm.track, rm.total.x, rm.total.y
        );
    }
}
