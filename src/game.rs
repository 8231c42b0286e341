//! World setup and unit spawning.
//!
//! Loads the asset stores named by [`EngineConfig`], builds the per-tick
//! [`Schedule`], and spawns animated units from their combo configuration.

use bevy_ecs::prelude::*;
use glam::Vec2;
use log::{error, info, warn};

use crate::components::animcommands::{AnimCommand, AnimCommandQueue};
use crate::components::mapposition::MapPosition;
use crate::components::reanimation::Reanimation;
use crate::components::renderparts::RenderParts;
use crate::components::rootmotion::RootMotion;
use crate::events::reanim::log_reanim_finished;
use crate::reanim::error::{ReanimError, Result};
use crate::resources::animinbox::AnimCommandInbox;
use crate::resources::comboconfig::ComboConfig;
use crate::resources::engineconfig::EngineConfig;
use crate::resources::imagestore::ImageStore;
use crate::resources::reanimstore::ReanimStore;
use crate::resources::worldtime::WorldTime;
use crate::systems::animcommands::process_anim_commands;
use crate::systems::compose::compose_render_parts;
use crate::systems::playback::reanim_playback;

/// Per-tick schedule: commands, then playback, then composition.
pub fn build_schedule() -> Schedule {
    let mut update = Schedule::default();
    update.add_systems(process_anim_commands);
    update.add_systems(reanim_playback.after(process_anim_commands));
    update.add_systems(compose_render_parts.after(reanim_playback));
    update
}

/// Insert the resources every reanimation system expects, with empty stores.
pub fn init_resources(world: &mut World, config: EngineConfig) {
    world.insert_resource(WorldTime::default().with_time_scale(config.time_scale));
    world.insert_resource(ReanimStore::new());
    world.insert_resource(ComboConfig::default());
    world.insert_resource(ImageStore::new());
    world.insert_resource(AnimCommandInbox::new());
    world.insert_resource(config);
    world.spawn(Observer::new(log_reanim_finished));
    world.flush();
}

/// Build a world from the asset locations in `config`.
///
/// Malformed definitions are logged and skipped; a missing definitions
/// directory or an unreadable combo file is fatal.
pub fn setup_world(config: EngineConfig) -> Result<World> {
    let mut world = World::new();
    let definitions_dir = config.definitions_dir.clone();
    let combos_path = config.combos_path.clone();
    let images_path = config.images_path.clone();
    init_resources(&mut world, config);

    let mut store = ReanimStore::new();
    let failures = store.load_dir(&definitions_dir)?;
    if !failures.is_empty() {
        warn!(
            "{} reanim definition(s) in {:?} failed to load",
            failures.len(),
            definitions_dir
        );
    }

    let combos = ComboConfig::load_from_file(&combos_path)?;
    for issue in combos.validate(&store) {
        warn!("Combo config: {}", issue);
    }

    let images = match ImageStore::load_from_file(&images_path) {
        Ok(images) => images,
        Err(err) => {
            error!(
                "Failed to load image catalog {:?}: {}; parts will be skipped",
                images_path, err
            );
            ImageStore::new()
        }
    };

    info!(
        "World ready: {} definitions, {} units",
        store.len(),
        combos.units.len()
    );
    world.insert_resource(store);
    world.insert_resource(combos);
    world.insert_resource(images);
    Ok(world)
}

/// Spawn an animated unit at `pos`.
///
/// The unit's initial combo, if any, is queued and takes effect on the next
/// tick.
pub fn spawn_unit(world: &mut World, unit_id: &str, pos: Vec2) -> Result<Entity> {
    let combos = world.resource::<ComboConfig>();
    let unit = combos.unit(unit_id)?.clone();
    let definition = world
        .resource::<ReanimStore>()
        .get(&unit.definition)
        .ok_or_else(|| {
            ReanimError::ConfigInconsistency(format!(
                "unit '{}' uses unknown definition '{}'",
                unit_id, unit.definition
            ))
        })?;

    let always_visible: Vec<usize> = unit
        .always_visible
        .iter()
        .filter_map(|name| {
            let track = definition.track_index(name);
            if track.is_none() {
                warn!("Unit '{}': always-visible track '{}' does not exist", unit_id, name);
            }
            track
        })
        .collect();

    let mut queue = AnimCommandQueue::new();
    if let Some(initial) = &unit.initial_combo {
        queue.push(AnimCommand::combo(unit_id, initial.as_str()));
    }

    let reanim = Reanimation::new(unit_id, definition).with_always_visible(always_visible);
    let mut entity = world.spawn((
        reanim,
        queue,
        RenderParts::new(),
        MapPosition::new(pos.x, pos.y),
    ));
    if let Some(track) = &unit.root_motion_track {
        entity.insert(RootMotion::new(track.as_str()));
    }
    let id = entity.id();
    info!("Spawned unit '{}' as {:?} at {:?}", unit_id, id, pos);
    Ok(id)
}
