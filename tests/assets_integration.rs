//! Loads the bundled demo assets through the same path the runner uses.

use std::path::PathBuf;

use bevy_ecs::prelude::*;
use glam::Vec2;

use reanimengine::components::mapposition::MapPosition;
use reanimengine::components::reanimation::Reanimation;
use reanimengine::components::renderparts::RenderParts;
use reanimengine::game;
use reanimengine::reanim::compose::bounding_box;
use reanimengine::resources::engineconfig::EngineConfig;
use reanimengine::resources::reanimstore::ReanimStore;
use reanimengine::systems::time::update_world_time;

fn demo_config() -> EngineConfig {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let mut config = EngineConfig::with_path(root.join("config.ini"));
    config.load_from_file().unwrap();
    config.definitions_dir = root.join("assets/reanim");
    config.combos_path = root.join("assets/combos.json");
    config.images_path = root.join("assets/images.json");
    config
}

fn run(world: &mut World, schedule: &mut Schedule, ticks: usize, dt: f32) {
    for _ in 0..ticks {
        update_world_time(world, dt);
        schedule.run(world);
        world.clear_trackers();
    }
}

#[test]
fn config_ini_matches_defaults() {
    let config = demo_config();
    assert_eq!(config.tick_rate, 100);
    assert_eq!(config.center_tolerance, 0.01);
}

#[test]
fn demo_units_load_and_stay_centered() {
    let config = demo_config();
    let tolerance = config.center_tolerance;
    let dt = config.tick_seconds();
    let mut world = game::setup_world(config).unwrap();
    assert!(world.resource::<ReanimStore>().contains("zombie"));

    let mut schedule = game::build_schedule();
    let plain = game::spawn_unit(&mut world, "zombie", Vec2::new(300.0, 200.0)).unwrap();
    let cone = game::spawn_unit(&mut world, "zombie_conehead", Vec2::new(500.0, 200.0)).unwrap();

    run(&mut world, &mut schedule, 25, dt);

    for (entity, expected) in [(plain, 5), (cone, 6)] {
        let parts = &world.get::<RenderParts>(entity).unwrap().parts;
        assert_eq!(parts.len(), expected);
        let (min, max) = bounding_box(parts).unwrap();
        let pos = world.get::<MapPosition>(entity).unwrap().pos;
        assert!(((min + max) * 0.5 - pos).length() <= tolerance);
    }
    let reanim = world.get::<Reanimation>(cone).unwrap();
    assert!(reanim.is_track_visible("cone"));
    assert!(!world.get::<Reanimation>(plain).unwrap().is_track_visible("cone"));
}
