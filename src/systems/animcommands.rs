//! Animation command processing.
//!
//! The single entry point gameplay code uses to drive animations. Requests
//! arrive through each entity's [`AnimCommandQueue`] (and the shared
//! [`AnimCommandInbox`]) and are consumed exactly once, in submission order,
//! at the start of the tick.
//!
//! # Combos
//!
//! `PlayCombo` looks up a declarative [`ComboDef`] and applies it atomically:
//! every animation it names is validated first, and an unknown name rejects
//! the whole combo, leaving the entity as it was. Directives that reference
//! unknown tracks or part groups are skipped individually with a warning.
//! Layers and overrides the combo does not mention are left untouched.

use std::sync::Arc;

use bevy_ecs::prelude::*;
use log::warn;
use smallvec::SmallVec;

use crate::components::animcommands::{AnimCommand, AnimCommandQueue};
use crate::components::animstate::TrackScope;
use crate::components::reanimation::Reanimation;
use crate::reanim::compiled::ReanimDefinition;
use crate::reanim::error::{ReanimError, Result};
use crate::resources::animinbox::AnimCommandInbox;
use crate::resources::comboconfig::{ComboConfig, ComboDef, UnitConfig};

/// Resolve a track name to its index, if it is a visual track.
fn visual_track(def: &ReanimDefinition, name: &str) -> Option<usize> {
    def.track_index(name).filter(|&i| def.is_visual(i))
}

/// Resolve the tracks of a part group, reporting unknown members.
fn part_group_tracks(
    def: &ReanimDefinition,
    unit: &UnitConfig,
    group: &str,
    warnings: &mut Vec<ReanimError>,
) -> Option<SmallVec<[usize; 8]>> {
    let members = unit.part_groups.get(group)?;
    let mut tracks = SmallVec::new();
    for member in members {
        match visual_track(def, member) {
            Some(track) => tracks.push(track),
            None => warnings.push(ReanimError::ConfigInconsistency(format!(
                "part group '{}' names unknown track '{}'",
                group, member
            ))),
        }
    }
    Some(tracks)
}

/// Resolve a show/hide target, which may be a track or a part group.
fn resolve_target(
    def: &ReanimDefinition,
    unit: &UnitConfig,
    name: &str,
    warnings: &mut Vec<ReanimError>,
) -> SmallVec<[usize; 8]> {
    if let Some(track) = visual_track(def, name) {
        return SmallVec::from_slice(&[track]);
    }
    part_group_tracks(def, unit, name, warnings).unwrap_or_else(|| {
        warnings.push(ReanimError::ConfigInconsistency(format!(
            "unknown track or part group '{}'",
            name
        )));
        SmallVec::new()
    })
}

/// Apply a combo record to an entity.
///
/// Returns the recoverable issues met while applying it. An `Err` means
/// nothing was applied.
pub fn apply_combo(
    reanim: &mut Reanimation,
    unit: &UnitConfig,
    combo: &ComboDef,
) -> Result<Vec<ReanimError>> {
    let def = Arc::clone(&reanim.definition);
    if unit.definition != def.name {
        return Err(ReanimError::ConfigInconsistency(format!(
            "combo targets definition '{}' but entity uses '{}'",
            unit.definition, def.name
        )));
    }
    if let Some(missing) = combo
        .animations
        .iter()
        .find(|d| !def.has_animation(&d.name))
    {
        return Err(ReanimError::UnknownAnimation(format!(
            "'{}' in definition '{}'",
            missing.name, def.name
        )));
    }

    let mut warnings = Vec::new();
    let mut staged = reanim.clone();

    for layer in &combo.stop_layers {
        staged.stop_layer(layer);
    }

    for directive in &combo.animations {
        let scope = if directive.tracks.is_empty() && directive.part_groups.is_empty() {
            TrackScope::All
        } else {
            let mut tracks: SmallVec<[usize; 8]> = SmallVec::new();
            for name in &directive.tracks {
                match visual_track(&def, name) {
                    Some(track) => tracks.push(track),
                    None => warnings.push(ReanimError::ConfigInconsistency(format!(
                        "animation '{}' names unknown track '{}'",
                        directive.name, name
                    ))),
                }
            }
            for group in &directive.part_groups {
                match part_group_tracks(&def, unit, group, &mut warnings) {
                    Some(members) => tracks.extend(members),
                    None => warnings.push(ReanimError::ConfigInconsistency(format!(
                        "animation '{}' names unknown part group '{}'",
                        directive.name, group
                    ))),
                }
            }
            TrackScope::Only(tracks)
        };

        let mut params = match directive.params() {
            Ok(params) => params,
            Err(err) => {
                warnings.push(err);
                continue;
            }
        };
        if directive.random_start {
            let len = def.segments().get(&directive.name).map_or(0, <[usize]>::len);
            if len > 0 {
                params.start_frame = fastrand::usize(..len);
            }
        }

        if let Err(err) = staged.play(&directive.layer, &directive.name, &params, scope) {
            warnings.push(err);
        }
    }

    for name in &combo.show {
        for track in resolve_target(&def, unit, name, &mut warnings) {
            staged.set_track_override(track, true);
        }
    }
    for name in &combo.hide {
        for track in resolve_target(&def, unit, name, &mut warnings) {
            staged.set_track_override(track, false);
        }
    }

    *reanim = staged;
    Ok(warnings)
}

/// Apply one command to an entity.
pub fn apply_anim_command(
    reanim: &mut Reanimation,
    cmd: AnimCommand,
    combos: &ComboConfig,
) -> Result<Vec<ReanimError>> {
    match cmd {
        AnimCommand::PlayAnimation { name, looped } => {
            reanim.play_animation(&name, looped)?;
            Ok(Vec::new())
        }
        AnimCommand::PlayCombo { unit_id, combo } => {
            let (unit, def) = combos.combo(&unit_id, &combo)?;
            apply_combo(reanim, unit, def)
        }
        AnimCommand::SetPaused { layer, paused } => {
            if reanim.set_paused(&layer, paused) {
                Ok(Vec::new())
            } else {
                Err(ReanimError::UnknownAnimation(format!("layer '{}'", layer)))
            }
        }
        AnimCommand::StopLayer { layer } => {
            if reanim.stop_layer(&layer) {
                Ok(Vec::new())
            } else {
                Err(ReanimError::UnknownAnimation(format!("layer '{}'", layer)))
            }
        }
    }
}

/// Consume queued animation commands.
///
/// Contract
/// - Drains [`AnimCommandInbox`] (if present) into per-entity queues.
/// - Applies every queued [`AnimCommand`] once, in order.
/// - Failures are logged and never abort the tick; a failed request leaves
///   the entity's prior state in place.
pub fn process_anim_commands(
    mut query: Query<(Entity, &mut Reanimation, &mut AnimCommandQueue)>,
    combos: Res<ComboConfig>,
    inbox: Option<Res<AnimCommandInbox>>,
) {
    if let Some(inbox) = inbox {
        for (entity, cmd) in inbox.drain() {
            match query.get_mut(entity) {
                Ok((_, _, mut queue)) => queue.push(cmd),
                Err(_) => warn!(
                    "Dropping animation command for non-animated entity {:?}: {:?}",
                    entity, cmd
                ),
            }
        }
    }

    for (entity, mut reanim, mut queue) in query.iter_mut() {
        if queue.is_empty() {
            continue;
        }
        for cmd in queue.drain() {
            match apply_anim_command(&mut reanim, cmd, &combos) {
                Ok(warnings) => {
                    for warning in warnings {
                        warn!("Entity {:?}: {}", entity, warning);
                    }
                }
                Err(err) => warn!("Entity {:?}: {}", entity, err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::animstate::BASE_LAYER;

    fn setup() -> (Reanimation, ComboConfig) {
        let def = ReanimDefinition::from_json(
            "zombie",
            r#"{"fps": 10, "tracks": [
                {"name": "anim_main", "segments": ["idle", "walk", "eat"],
                 "frames": [{}, {}, {"hidden": true}, {}, {}, {}, {"hidden": true}, {}, {}]},
                {"name": "body", "frames": [{"image": "IMAGE_BODY"}]},
                {"name": "head", "frames": [{"image": "IMAGE_HEAD"}]},
                {"name": "cone", "frames": [{"image": "IMAGE_CONE"}]}
            ]}"#,
        )
        .unwrap()
        .shared();
        let combos = ComboConfig::from_json(
            r#"{"units": {
                "zombie": {
                    "definition": "zombie",
                    "part_groups": {"armor": ["cone"], "broken": ["cone", "visor"]},
                    "combos": {
                        "idle": {"animations": [{"name": "idle"}], "hide": ["armor"]},
                        "chew": {"animations": [{"name": "eat", "layer": "head", "tracks": ["head"]}]},
                        "bad": {"animations": [{"name": "idle"}, {"name": "fly"}], "hide": ["armor"]},
                        "sloppy": {"animations": [{"name": "walk", "tracks": ["tail"]}], "show": ["wings", "broken"]},
                        "calm": {"stop_layers": ["head"]},
                        "stalled": {"animations": [
                            {"name": "walk", "speed_scale": -1},
                            {"name": "eat", "layer": "head", "tracks": ["head"]}
                        ]}
                    }
                },
                "zombie_conehead": {
                    "definition": "zombie",
                    "part_groups": {"armor": ["cone"]},
                    "combos": {"idle": {"animations": [{"name": "idle"}], "show": ["armor"]}}
                },
                "peashooter": {
                    "definition": "peashooter",
                    "combos": {"idle": {"animations": [{"name": "idle"}]}}
                }
            }}"#,
        )
        .unwrap();
        (Reanimation::new("zombie", def), combos)
    }

    #[test]
    fn same_definition_different_config_different_visible_set() {
        let (mut plain, combos) = setup();
        let mut cone = plain.clone();
        apply_anim_command(&mut plain, AnimCommand::combo("zombie", "idle"), &combos).unwrap();
        apply_anim_command(&mut cone, AnimCommand::combo("zombie_conehead", "idle"), &combos)
            .unwrap();
        assert!(!plain.is_track_visible("cone"));
        assert!(cone.is_track_visible("cone"));
        assert!(plain.is_track_visible("body") && cone.is_track_visible("body"));
    }

    #[test]
    fn unknown_animation_rejects_whole_combo() {
        let (mut r, combos) = setup();
        apply_anim_command(&mut r, AnimCommand::play("walk"), &combos).unwrap();
        let err = apply_anim_command(&mut r, AnimCommand::combo("zombie", "bad"), &combos)
            .unwrap_err();
        assert!(matches!(err, ReanimError::UnknownAnimation(_)));
        assert_eq!(r.layer(BASE_LAYER).unwrap().name, "walk");
        assert!(r.is_track_visible("cone"));
    }

    #[test]
    fn unknown_unit_or_combo_is_reported() {
        let (mut r, combos) = setup();
        assert!(apply_anim_command(&mut r, AnimCommand::combo("cactus", "idle"), &combos).is_err());
        assert!(apply_anim_command(&mut r, AnimCommand::combo("zombie", "dance"), &combos).is_err());
        assert!(r.layers().is_empty());
    }

    #[test]
    fn combo_for_other_definition_is_rejected() {
        let (mut r, combos) = setup();
        let err = apply_anim_command(&mut r, AnimCommand::combo("peashooter", "idle"), &combos)
            .unwrap_err();
        assert!(matches!(err, ReanimError::ConfigInconsistency(_)));
    }

    #[test]
    fn combos_are_additive() {
        let (mut r, combos) = setup();
        apply_anim_command(&mut r, AnimCommand::combo("zombie", "idle"), &combos).unwrap();
        apply_anim_command(&mut r, AnimCommand::combo("zombie", "chew"), &combos).unwrap();
        assert_eq!(r.layers().len(), 2);
        assert_eq!(r.layer(BASE_LAYER).unwrap().name, "idle");
        // hide override from "idle" survives "chew"
        assert!(!r.is_track_visible("cone"));
        let head = r.definition.track_index("head").unwrap();
        assert_eq!(r.track_frame(head), Some(7));

        apply_anim_command(&mut r, AnimCommand::combo("zombie", "calm"), &combos).unwrap();
        assert_eq!(r.layers().len(), 1);
        assert_eq!(r.track_frame(head), Some(0));
    }

    #[test]
    fn inconsistent_directives_are_skipped_with_warnings() {
        let (mut r, combos) = setup();
        let warnings =
            apply_anim_command(&mut r, AnimCommand::combo("zombie", "sloppy"), &combos).unwrap();
        // "tail" track, "wings" target, "visor" group member
        assert_eq!(warnings.len(), 3);
        assert!(warnings
            .iter()
            .all(|w| matches!(w, ReanimError::ConfigInconsistency(_))));
        assert_eq!(r.layer(BASE_LAYER).unwrap().name, "walk");
        assert!(r.is_track_visible("cone"));
    }

    #[test]
    fn directive_with_bad_speed_is_skipped() {
        let (mut r, combos) = setup();
        apply_anim_command(&mut r, AnimCommand::play("idle"), &combos).unwrap();
        let warnings =
            apply_anim_command(&mut r, AnimCommand::combo("zombie", "stalled"), &combos).unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].to_string().contains("speed_scale"));
        assert_eq!(r.layer(BASE_LAYER).unwrap().name, "idle");
        assert_eq!(r.layer("head").unwrap().name, "eat");
    }

    #[test]
    fn layer_commands_report_unknown_layers() {
        let (mut r, combos) = setup();
        apply_anim_command(&mut r, AnimCommand::play("idle"), &combos).unwrap();
        let pause = AnimCommand::SetPaused {
            layer: BASE_LAYER.to_string(),
            paused: true,
        };
        apply_anim_command(&mut r, pause, &combos).unwrap();
        assert!(r.layer(BASE_LAYER).unwrap().paused);
        let stop = AnimCommand::StopLayer {
            layer: "arms".to_string(),
        };
        assert!(apply_anim_command(&mut r, stop, &combos).is_err());
    }
}
