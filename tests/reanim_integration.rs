//! Engine tick integration tests for commands, playback, root motion and
//! composition running together through the schedule.

use std::sync::Arc;

use bevy_ecs::prelude::*;
use glam::Vec2;

use reanimengine::components::animcommands::{AnimCommand, AnimCommandQueue};
use reanimengine::components::animstate::BASE_LAYER;
use reanimengine::components::mapposition::MapPosition;
use reanimengine::components::reanimation::Reanimation;
use reanimengine::components::renderparts::RenderParts;
use reanimengine::components::rootmotion::RootMotion;
use reanimengine::components::zindex::{TRACK_Z_STRIDE, ZIndex};
use reanimengine::events::reanim::ReanimFinishedEvent;
use reanimengine::game;
use reanimengine::reanim::compose::bounding_box;
use reanimengine::resources::animinbox::AnimCommandInbox;
use reanimengine::resources::comboconfig::ComboConfig;
use reanimengine::resources::engineconfig::EngineConfig;
use reanimengine::resources::imagestore::ImageStore;
use reanimengine::resources::reanimstore::ReanimStore;
use reanimengine::systems::time::update_world_time;

const EPSILON: f32 = 1e-3;
const TICK: f32 = 0.25;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

// idle = 0..=1, walk = 3..=6, death = 8..=9; _ground moves 10px per frame.
const ZOMBIE: &str = r#"{"fps": 4, "tracks": [
    {"name": "anim_main", "segments": ["idle", "walk", "death"],
     "frames": [{}, {}, {"hidden": true}, {}, {}, {}, {}, {"hidden": true}, {}, {}]},
    {"name": "_ground", "frames": [
        {"x": 0}, {"x": 10}, {"x": 20}, {"x": 30}, {"x": 40},
        {"x": 50}, {"x": 60}, {"x": 70}, {"x": 80}, {"x": 90}]},
    {"name": "body", "frames": [{"image": "IMAGE_BODY"}]},
    {"name": "head", "frames": [{"image": "IMAGE_HEAD", "y": -20}]},
    {"name": "cone", "frames": [{"image": "IMAGE_CONE", "y": -30}]}
]}"#;

const COMBOS: &str = r#"{"units": {
    "zombie": {
        "definition": "zombie",
        "root_motion_track": "_ground",
        "part_groups": {"armor": ["cone"]},
        "initial_combo": "idle",
        "combos": {
            "idle": {"animations": [{"name": "idle"}], "hide": ["armor"]},
            "walk": {"animations": [{"name": "walk"}]},
            "die": {"animations": [{"name": "death", "loop": false}]}
        }
    },
    "zombie_conehead": {
        "definition": "zombie",
        "part_groups": {"armor": ["cone"]},
        "initial_combo": "idle",
        "combos": {
            "idle": {"animations": [{"name": "idle"}], "show": ["armor"]}
        }
    }
}}"#;

#[derive(Resource, Default)]
struct FinishedLog(Vec<String>);

fn make_world() -> World {
    let mut world = World::new();
    game::init_resources(&mut world, EngineConfig::new());

    let mut store = ReanimStore::new();
    store.load_json("zombie", ZOMBIE).unwrap();
    world.insert_resource(store);
    world.insert_resource(ComboConfig::from_json(COMBOS).unwrap());

    let mut images = ImageStore::new();
    images.insert("IMAGE_BODY", 20.0, 40.0);
    images.insert("IMAGE_HEAD", 20.0, 20.0);
    images.insert("IMAGE_CONE", 10.0, 10.0);
    world.insert_resource(images);

    world.init_resource::<FinishedLog>();
    world.add_observer(
        |trigger: On<ReanimFinishedEvent>, mut log: ResMut<FinishedLog>| {
            log.0.push(trigger.event().animation.clone());
        },
    );
    world.flush();
    world
}

fn run_ticks(world: &mut World, schedule: &mut Schedule, ticks: usize) {
    for _ in 0..ticks {
        update_world_time(world, TICK);
        schedule.run(world);
        world.clear_trackers();
    }
}

fn images_of(world: &World, entity: Entity) -> Vec<String> {
    world
        .get::<RenderParts>(entity)
        .unwrap()
        .parts
        .iter()
        .map(|p| p.image.to_string())
        .collect()
}

fn queue(world: &mut World, entity: Entity, cmd: AnimCommand) {
    world.get_mut::<AnimCommandQueue>(entity).unwrap().push(cmd);
}

#[test]
fn initial_combo_is_applied_on_first_tick() {
    let mut world = make_world();
    let mut schedule = game::build_schedule();
    let zombie = game::spawn_unit(&mut world, "zombie", Vec2::ZERO).unwrap();

    run_ticks(&mut world, &mut schedule, 1);

    let reanim = world.get::<Reanimation>(zombie).unwrap();
    assert_eq!(reanim.layer(BASE_LAYER).unwrap().name, "idle");
    assert!(world.get::<AnimCommandQueue>(zombie).unwrap().is_empty());
}

#[test]
fn same_definition_different_unit_config_shows_different_parts() {
    let mut world = make_world();
    let mut schedule = game::build_schedule();
    let plain = game::spawn_unit(&mut world, "zombie", Vec2::ZERO).unwrap();
    let cone = game::spawn_unit(&mut world, "zombie_conehead", Vec2::new(200.0, 0.0)).unwrap();

    run_ticks(&mut world, &mut schedule, 1);

    assert_eq!(images_of(&world, plain), vec!["IMAGE_BODY", "IMAGE_HEAD"]);
    assert_eq!(
        images_of(&world, cone),
        vec!["IMAGE_BODY", "IMAGE_HEAD", "IMAGE_CONE"]
    );

    let a = &world.get::<Reanimation>(plain).unwrap().definition;
    let b = &world.get::<Reanimation>(cone).unwrap().definition;
    assert!(Arc::ptr_eq(a, b));
}

#[test]
fn figure_is_centered_on_entity_position() {
    let mut world = make_world();
    let mut schedule = game::build_schedule();
    let cone = game::spawn_unit(&mut world, "zombie_conehead", Vec2::new(50.0, -25.0)).unwrap();

    run_ticks(&mut world, &mut schedule, 3);

    let parts = &world.get::<RenderParts>(cone).unwrap().parts;
    let (min, max) = bounding_box(parts).unwrap();
    let center = (min + max) * 0.5;
    assert!(approx_eq(center.x, 50.0));
    assert!(approx_eq(center.y, -25.0));
    // body 40 tall plus the cone 30 above it
    assert!(approx_eq(max.y - min.y, 70.0));
}

#[test]
fn part_z_follows_track_order_within_entity_band() {
    let mut world = make_world();
    let mut schedule = game::build_schedule();
    let cone = game::spawn_unit(&mut world, "zombie_conehead", Vec2::ZERO).unwrap();
    world.entity_mut(cone).insert(ZIndex(2));

    run_ticks(&mut world, &mut schedule, 1);

    let z: Vec<i32> = world
        .get::<RenderParts>(cone)
        .unwrap()
        .parts
        .iter()
        .map(|p| p.z)
        .collect();
    let base = 2 * TRACK_Z_STRIDE;
    assert_eq!(z, vec![base + 2, base + 3, base + 4]);
}

#[test]
fn root_motion_moves_entity_and_repeats_last_step_on_wrap() {
    let mut world = make_world();
    let mut schedule = game::build_schedule();
    let zombie = game::spawn_unit(&mut world, "zombie", Vec2::new(100.0, 0.0)).unwrap();
    queue(&mut world, zombie, AnimCommand::combo("zombie", "walk"));

    // three forward steps and one wrap over the 4-frame walk
    run_ticks(&mut world, &mut schedule, 4);

    let rm = world.get::<RootMotion>(zombie).unwrap();
    assert!(approx_eq(rm.total.x, 40.0));
    let pos = world.get::<MapPosition>(zombie).unwrap();
    assert!(approx_eq(pos.pos.x, 140.0));
    assert!(approx_eq(pos.pos.y, 0.0));
}

#[test]
fn rolling_root_motion_matches_track_displacement() {
    // one 13-frame segment; _ground runs from -8 to 96
    let ground: Vec<String> = (0..13)
        .map(|i| format!(r#"{{"x": {}}}"#, -8.0 + i as f32 * 104.0 / 12.0))
        .collect();
    let json = format!(
        r#"{{"fps": 4, "tracks": [
            {{"name": "anim_main", "segments": ["roll"], "frames": [{}]}},
            {{"name": "_ground", "frames": [{}]}},
            {{"name": "body", "frames": [{{"image": "IMAGE_BODY"}}]}}
        ]}}"#,
        vec!["{}"; 13].join(","),
        ground.join(",")
    );
    let mut world = make_world();
    let mut schedule = game::build_schedule();
    world
        .resource_mut::<ReanimStore>()
        .load_json("roll", &json)
        .unwrap();
    let def = world.resource::<ReanimStore>().get("roll").unwrap();
    let track = def.track_index("_ground").unwrap();
    let expected = def.position(track, 12) - def.position(track, 0);

    let mut queue = AnimCommandQueue::new();
    queue.push(AnimCommand::PlayAnimation {
        name: "roll".to_string(),
        looped: false,
    });
    let roller = world
        .spawn((
            Reanimation::new("roll", def),
            queue,
            RenderParts::new(),
            MapPosition::new(0.0, 0.0),
            RootMotion::new("_ground"),
        ))
        .id();

    // 12 steps reach the last frame; the rest only hold it
    run_ticks(&mut world, &mut schedule, 20);

    assert!(world.resource::<FinishedLog>().0.contains(&"roll".to_string()));
    let rm = world.get::<RootMotion>(roller).unwrap();
    assert!(approx_eq(expected.x, 104.0));
    assert!(approx_eq(rm.total.x, expected.x));
    assert!(approx_eq(rm.total.y, 0.0));
    let pos = world.get::<MapPosition>(roller).unwrap();
    assert!(approx_eq(pos.pos.x, 104.0));
}

#[test]
fn idle_does_not_move_without_ground_change() {
    let mut world = make_world();
    let mut schedule = game::build_schedule();
    let zombie = game::spawn_unit(&mut world, "zombie", Vec2::ZERO).unwrap();
    let conehead = game::spawn_unit(&mut world, "zombie_conehead", Vec2::ZERO).unwrap();

    run_ticks(&mut world, &mut schedule, 1);

    // idle steps 0 -> 1 on the ground track
    assert!(approx_eq(world.get::<MapPosition>(zombie).unwrap().pos.x, 10.0));
    // no root motion configured for the conehead
    assert!(world.get::<RootMotion>(conehead).is_none());
    assert!(approx_eq(world.get::<MapPosition>(conehead).unwrap().pos.x, 0.0));
}

#[test]
fn layout_is_not_recomposed_while_frames_are_unchanged() {
    let mut world = make_world();
    let mut schedule = game::build_schedule();
    let zombie = game::spawn_unit(&mut world, "zombie", Vec2::ZERO).unwrap();

    run_ticks(&mut world, &mut schedule, 1);
    queue(
        &mut world,
        zombie,
        AnimCommand::SetPaused {
            layer: BASE_LAYER.to_string(),
            paused: true,
        },
    );
    run_ticks(&mut world, &mut schedule, 1);
    let before = world.get::<RenderParts>(zombie).unwrap().compositions;

    // moving the entity only translates the cached layout
    world.get_mut::<MapPosition>(zombie).unwrap().pos.x += 5.0;
    run_ticks(&mut world, &mut schedule, 5);

    let render = world.get::<RenderParts>(zombie).unwrap();
    assert_eq!(render.compositions, before);
    let (min, max) = bounding_box(&render.parts).unwrap();
    assert!(approx_eq((min.x + max.x) * 0.5, 5.0));
}

#[test]
fn non_looping_animation_finishes_once_and_holds() {
    let mut world = make_world();
    let mut schedule = game::build_schedule();
    let zombie = game::spawn_unit(&mut world, "zombie", Vec2::ZERO).unwrap();
    queue(&mut world, zombie, AnimCommand::combo("zombie", "die"));

    run_ticks(&mut world, &mut schedule, 1);
    assert!(world.resource::<FinishedLog>().0.is_empty());

    run_ticks(&mut world, &mut schedule, 3);
    assert_eq!(world.resource::<FinishedLog>().0, vec!["death".to_string()]);

    let reanim = world.get::<Reanimation>(zombie).unwrap();
    assert!(reanim.is_animation_finished("death"));
    let body = reanim.definition.track_index("body").unwrap();
    assert_eq!(reanim.track_frame(body), Some(9));
    assert!(!world.get::<RenderParts>(zombie).unwrap().is_empty());
}

#[test]
fn inbox_commands_reach_their_entity() {
    let mut world = make_world();
    let mut schedule = game::build_schedule();
    let zombie = game::spawn_unit(&mut world, "zombie", Vec2::ZERO).unwrap();
    let ghost = world.spawn_empty().id();
    world.despawn(ghost);

    let sender = world.resource::<AnimCommandInbox>().sender();
    assert!(sender.send(zombie, AnimCommand::combo("zombie", "walk")));
    assert!(sender.send(ghost, AnimCommand::play("walk")));

    run_ticks(&mut world, &mut schedule, 1);

    let reanim = world.get::<Reanimation>(zombie).unwrap();
    assert_eq!(reanim.layer(BASE_LAYER).unwrap().name, "walk");
    assert!(world.resource::<AnimCommandInbox>().is_empty());
}

#[test]
fn rejected_combo_keeps_current_animation() {
    let mut world = make_world();
    let mut schedule = game::build_schedule();
    let zombie = game::spawn_unit(&mut world, "zombie", Vec2::ZERO).unwrap();
    run_ticks(&mut world, &mut schedule, 1);

    queue(&mut world, zombie, AnimCommand::combo("zombie", "fly"));
    queue(&mut world, zombie, AnimCommand::play("moonwalk"));
    run_ticks(&mut world, &mut schedule, 1);

    let reanim = world.get::<Reanimation>(zombie).unwrap();
    assert_eq!(reanim.layer(BASE_LAYER).unwrap().name, "idle");
    assert_eq!(images_of(&world, zombie), vec!["IMAGE_BODY", "IMAGE_HEAD"]);
}

#[test]
fn missing_images_are_skipped() {
    let mut world = make_world();
    world.insert_resource(ImageStore::new());
    let mut schedule = game::build_schedule();
    let zombie = game::spawn_unit(&mut world, "zombie", Vec2::ZERO).unwrap();

    run_ticks(&mut world, &mut schedule, 2);

    assert!(world.get::<RenderParts>(zombie).unwrap().is_empty());
}

#[test]
fn unknown_unit_cannot_be_spawned() {
    let mut world = make_world();
    assert!(game::spawn_unit(&mut world, "cactus", Vec2::ZERO).is_err());
}
