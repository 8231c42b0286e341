//! Combo configuration resource.
//!
//! Declarative, per-unit records describing which animations to start and
//! which tracks to show or hide when gameplay asks for a named combo. Visual
//! behavior can be retargeted by editing this file without touching code.
//!
//! # Configuration File Format
//!
//! ```json
//! {
//!   "units": {
//!     "zombie": {
//!       "definition": "zombie",
//!       "root_motion_track": "_ground",
//!       "always_visible": ["shadow"],
//!       "part_groups": { "armor": ["cone", "bucket"] },
//!       "initial_combo": "idle",
//!       "combos": {
//!         "idle": {
//!           "animations": [ { "name": "idle", "loop": true, "random_start": true } ],
//!           "hide": ["armor"]
//!         }
//!       }
//!     }
//!   }
//! }
//! ```

use std::path::Path;

use bevy_ecs::prelude::Resource;
use log::info;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::components::animstate::{BASE_LAYER, PlayParams};
use crate::reanim::error::{ReanimError, Result};
use crate::resources::reanimstore::ReanimStore;

fn default_layer() -> String {
    BASE_LAYER.to_string()
}

fn default_true() -> bool {
    true
}

fn default_speed() -> f32 {
    1.0
}

/// One "start this animation" directive of a combo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnimDirective {
    pub name: String,
    #[serde(default = "default_layer")]
    pub layer: String,
    #[serde(default = "default_true", rename = "loop")]
    pub looped: bool,
    #[serde(default = "default_speed")]
    pub speed_scale: f32,
    #[serde(default)]
    pub start_frame: usize,
    #[serde(default)]
    pub delay: f32,
    #[serde(default = "default_true")]
    pub hold_last_frame: bool,
    /// Pick a random start frame so identical units do not move in lockstep.
    #[serde(default)]
    pub random_start: bool,
    #[serde(default)]
    pub fps: Option<f32>,
    /// Tracks this animation drives; every visual track when both lists are empty.
    #[serde(default)]
    pub tracks: Vec<String>,
    #[serde(default)]
    pub part_groups: Vec<String>,
}

impl AnimDirective {
    /// Playback parameters of this directive.
    ///
    /// Speed and fps must be finite and positive; delay must be finite.
    pub fn params(&self) -> Result<PlayParams> {
        let rate_ok = |v: f32| v.is_finite() && v > 0.0;
        if !rate_ok(self.speed_scale) {
            return Err(ReanimError::ConfigInconsistency(format!(
                "animation '{}': speed_scale {} must be finite and positive",
                self.name, self.speed_scale
            )));
        }
        if let Some(fps) = self.fps.filter(|&fps| !rate_ok(fps)) {
            return Err(ReanimError::ConfigInconsistency(format!(
                "animation '{}': fps {} must be finite and positive",
                self.name, fps
            )));
        }
        if !self.delay.is_finite() {
            return Err(ReanimError::ConfigInconsistency(format!(
                "animation '{}': delay {} is not finite",
                self.name, self.delay
            )));
        }
        Ok(PlayParams {
            looped: self.looped,
            speed_scale: self.speed_scale,
            start_frame: self.start_frame,
            delay: self.delay,
            hold_last_frame: self.hold_last_frame,
            fps: self.fps,
        })
    }
}

/// A named bundle of animation and visibility directives.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComboDef {
    #[serde(default)]
    pub animations: Vec<AnimDirective>,
    /// Track or part group names to show.
    #[serde(default)]
    pub show: Vec<String>,
    /// Track or part group names to hide.
    #[serde(default)]
    pub hide: Vec<String>,
    /// Layers to remove before starting `animations`.
    #[serde(default)]
    pub stop_layers: Vec<String>,
}

/// Animation configuration of one unit kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnitConfig {
    /// Key in the [`ReanimStore`].
    pub definition: String,
    #[serde(default)]
    pub root_motion_track: Option<String>,
    #[serde(default)]
    pub always_visible: Vec<String>,
    /// Semantic name → visual track names.
    #[serde(default)]
    pub part_groups: FxHashMap<String, Vec<String>>,
    /// Combo applied when the unit is spawned.
    #[serde(default)]
    pub initial_combo: Option<String>,
    #[serde(default)]
    pub combos: FxHashMap<String, ComboDef>,
}

#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComboConfig {
    #[serde(default)]
    pub units: FxHashMap<String, UnitConfig>,
}

impl ComboConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load the combo configuration from a JSON file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json(&content)?;
        info!(
            "Loaded combo config from {:?}: {} units",
            path.as_ref(),
            config.units.len()
        );
        Ok(config)
    }

    pub fn unit(&self, unit_id: &str) -> Result<&UnitConfig> {
        self.units
            .get(unit_id)
            .ok_or_else(|| ReanimError::UnknownAnimation(format!("unit '{}'", unit_id)))
    }

    /// Look up a combo record for a unit.
    pub fn combo(&self, unit_id: &str, combo: &str) -> Result<(&UnitConfig, &ComboDef)> {
        let unit = self.unit(unit_id)?;
        let def = unit.combos.get(combo).ok_or_else(|| {
            ReanimError::UnknownAnimation(format!("combo '{}' for unit '{}'", combo, unit_id))
        })?;
        Ok((unit, def))
    }

    /// Cross-check every unit against the loaded definitions.
    ///
    /// Returns the inconsistencies found; none of them is fatal, the
    /// offending directives are skipped at runtime.
    pub fn validate(&self, store: &ReanimStore) -> Vec<ReanimError> {
        let mut issues = Vec::new();
        let mut unit_ids: Vec<_> = self.units.keys().collect();
        unit_ids.sort();

        for unit_id in unit_ids {
            let unit = &self.units[unit_id];
            let Some(def) = store.get(&unit.definition) else {
                issues.push(ReanimError::ConfigInconsistency(format!(
                    "unit '{}' uses unknown definition '{}'",
                    unit_id, unit.definition
                )));
                continue;
            };
            let has_track = |name: &str| def.track_index(name).is_some_and(|i| def.is_visual(i));
            let has_name = |name: &str| has_track(name) || unit.part_groups.contains_key(name);

            if let Some(track) = &unit.root_motion_track {
                if def.track_index(track).is_none() {
                    issues.push(ReanimError::ConfigInconsistency(format!(
                        "unit '{}': root motion track '{}' does not exist",
                        unit_id, track
                    )));
                }
            }
            for track in &unit.always_visible {
                if !has_track(track.as_str()) {
                    issues.push(ReanimError::ConfigInconsistency(format!(
                        "unit '{}': always-visible track '{}' does not exist",
                        unit_id, track
                    )));
                }
            }
            for (group, tracks) in &unit.part_groups {
                for track in tracks.iter().filter(|t| !has_track(t.as_str())) {
                    issues.push(ReanimError::ConfigInconsistency(format!(
                        "unit '{}': part group '{}' names unknown track '{}'",
                        unit_id, group, track
                    )));
                }
            }
            if let Some(initial) = &unit.initial_combo {
                if !unit.combos.contains_key(initial) {
                    issues.push(ReanimError::UnknownAnimation(format!(
                        "unit '{}': initial combo '{}'",
                        unit_id, initial
                    )));
                }
            }
            for (combo_name, combo) in &unit.combos {
                for directive in &combo.animations {
                    if let Err(ReanimError::ConfigInconsistency(msg)) = directive.params() {
                        issues.push(ReanimError::ConfigInconsistency(format!(
                            "unit '{}' combo '{}': {}",
                            unit_id, combo_name, msg
                        )));
                    }
                    if !def.has_animation(&directive.name) {
                        issues.push(ReanimError::UnknownAnimation(format!(
                            "unit '{}' combo '{}': '{}'",
                            unit_id, combo_name, directive.name
                        )));
                    }
                    for name in &directive.tracks {
                        if !has_track(name.as_str()) {
                            issues.push(ReanimError::ConfigInconsistency(format!(
                                "unit '{}' combo '{}': unknown track '{}'",
                                unit_id, combo_name, name
                            )));
                        }
                    }
                    for name in &directive.part_groups {
                        if !unit.part_groups.contains_key(name) {
                            issues.push(ReanimError::ConfigInconsistency(format!(
                                "unit '{}' combo '{}': unknown part group '{}'",
                                unit_id, combo_name, name
                            )));
                        }
                    }
                }
                for name in combo.show.iter().chain(&combo.hide) {
                    if !has_name(name.as_str()) {
                        issues.push(ReanimError::ConfigInconsistency(format!(
                            "unit '{}' combo '{}': unknown track or part group '{}'",
                            unit_id, combo_name, name
                        )));
                    }
                }
            }
        }
        issues
    }
}
