//! Per-entity reanimation state.
//!
//! The [`Reanimation`] component ties an entity to a shared
//! [`ReanimDefinition`] and owns everything that changes per tick: the
//! active [`AnimState`] layers and the visibility overrides applied by combos.
//!
//! Gameplay code does not mutate this component directly; it queues
//! [`AnimCommand`](crate::components::animcommands::AnimCommand)s and reads the
//! query helpers ([`Reanimation::is_animation_finished`],
//! [`Reanimation::is_track_visible`]).

use std::sync::Arc;

use arrayvec::ArrayVec;
use bevy_ecs::prelude::Component;
use glam::Vec2;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use crate::components::animstate::{AnimState, BASE_LAYER, PlayParams, TrackScope};
use crate::components::rootmotion::RootMotion;
use crate::reanim::compiled::ReanimDefinition;
use crate::reanim::error::{ReanimError, Result};

/// Maximum number of concurrently running animation layers per entity.
pub const MAX_ANIM_LAYERS: usize = 4;

/// A layer that finished during [`Reanimation::advance`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishedLayer {
    pub layer: String,
    pub animation: String,
}

/// Result of advancing every layer of an entity by one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdvanceOutcome {
    /// Root-motion displacement accumulated this tick.
    pub root_delta: Vec2,
    pub finished: SmallVec<[FinishedLayer; 2]>,
    /// Total logical frame steps taken across all layers.
    pub steps: usize,
}

#[derive(Debug, Clone, Component)]
pub struct Reanimation {
    pub unit_id: String,
    pub definition: Arc<ReanimDefinition>,
    layers: ArrayVec<AnimState, MAX_ANIM_LAYERS>,
    overrides: FxHashMap<usize, bool>,
    always_visible: FxHashSet<usize>,
    revision: u32,
}

impl Reanimation {
    pub fn new(unit_id: impl Into<String>, definition: Arc<ReanimDefinition>) -> Self {
        Self {
            unit_id: unit_id.into(),
            definition,
            layers: ArrayVec::new(),
            overrides: FxHashMap::default(),
            always_visible: FxHashSet::default(),
            revision: 0,
        }
    }

    /// Mark tracks as drawn even when no layer drives them.
    pub fn with_always_visible(mut self, tracks: impl IntoIterator<Item = usize>) -> Self {
        self.always_visible.extend(tracks);
        self.revision = self.revision.wrapping_add(1);
        self
    }

    pub fn layers(&self) -> &[AnimState] {
        &self.layers
    }

    pub fn layer(&self, layer: &str) -> Option<&AnimState> {
        self.layers.iter().find(|s| s.layer == layer)
    }

    /// Bumped whenever the visible set may change for reasons other than frame advance.
    pub fn revision(&self) -> u32 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    /// Build the state for `name` without installing it.
    pub fn prepare(
        &self,
        layer: &str,
        name: &str,
        params: &PlayParams,
        scope: TrackScope,
    ) -> Result<AnimState> {
        let frames = self
            .definition
            .segments()
            .get_shared(name)
            .ok_or_else(|| {
                ReanimError::UnknownAnimation(format!(
                    "'{}' in definition '{}'",
                    name, self.definition.name
                ))
            })?;
        Ok(AnimState::play(
            layer,
            name,
            frames,
            self.definition.fps,
            params,
            scope,
        ))
    }

    /// Install a prepared state, preempting any state on the same layer.
    pub fn install(&mut self, state: AnimState) -> Result<()> {
        if let Some(slot) = self.layers.iter_mut().find(|s| s.layer == state.layer) {
            *slot = state;
        } else if let Err(err) = self.layers.try_push(state) {
            return Err(ReanimError::ConfigInconsistency(format!(
                "no free animation layer for '{}' (max {})",
                err.element().layer,
                MAX_ANIM_LAYERS
            )));
        }
        self.touch();
        Ok(())
    }

    /// Play `name` on `layer`. Unknown names leave the entity untouched.
    pub fn play(
        &mut self,
        layer: &str,
        name: &str,
        params: &PlayParams,
        scope: TrackScope,
    ) -> Result<()> {
        let state = self.prepare(layer, name, params, scope)?;
        self.install(state)
    }

    /// Restart the base layer with `name`, driving every track.
    pub fn play_animation(&mut self, name: &str, looped: bool) -> Result<()> {
        let params = PlayParams {
            looped,
            ..PlayParams::default()
        };
        self.play(BASE_LAYER, name, &params, TrackScope::All)
    }

    pub fn stop_layer(&mut self, layer: &str) -> bool {
        let before = self.layers.len();
        self.layers.retain(|s| s.layer != layer);
        let removed = self.layers.len() != before;
        if removed {
            self.touch();
        }
        removed
    }

    pub fn set_paused(&mut self, layer: &str, paused: bool) -> bool {
        match self.layers.iter_mut().find(|s| s.layer == layer) {
            Some(state) => {
                state.paused = paused;
                true
            }
            None => false,
        }
    }

    /// Force a track shown or hidden until another override replaces it.
    pub fn set_track_override(&mut self, track: usize, visible: bool) {
        if self.overrides.insert(track, visible) != Some(visible) {
            self.touch();
        }
    }

    pub fn clear_track_override(&mut self, track: usize) {
        if self.overrides.remove(&track).is_some() {
            self.touch();
        }
    }

    /// Index of the layer whose frame a track shows, if any.
    ///
    /// Later layers win over earlier ones; invisible layers are skipped so a
    /// finished overlay falls back to the layer underneath.
    pub fn driving_layer(&self, track: usize) -> Option<usize> {
        self.layers
            .iter()
            .enumerate()
            .rev()
            .find(|(_, s)| s.is_visible() && s.scope.covers(track))
            .map(|(i, _)| i)
    }

    /// Physical frame shown by `track` this tick, or `None` when not drawn.
    pub fn track_frame(&self, track: usize) -> Option<usize> {
        if !self.definition.is_visual(track) {
            return None;
        }
        let forced = self.overrides.get(&track).copied();
        if forced == Some(false) {
            return None;
        }
        if let Some(driver) = self.driving_layer(track) {
            return self.layers[driver].physical();
        }
        if forced == Some(true) || self.always_visible.contains(&track) {
            return match self.layers.first() {
                Some(base) => base.physical(),
                None if self.definition.max_frames > 0 => Some(0),
                None => None,
            };
        }
        None
    }

    /// Per-track physical frames, indexed like the definition's tracks.
    pub fn resolve_frames(&self) -> SmallVec<[Option<usize>; 16]> {
        (0..self.definition.tracks().len())
            .map(|track| self.track_frame(track))
            .collect()
    }

    /// Advance all layers by `dt`, extracting root motion from the layer that
    /// drives the root track.
    pub fn advance(&mut self, dt: f32, root_motion: Option<&RootMotion>) -> AdvanceOutcome {
        let mut outcome = AdvanceOutcome::default();
        let root_track = root_motion
            .filter(|rm| rm.enabled)
            .and_then(|rm| self.definition.track_index(&rm.track));
        let root_driver = root_track.and_then(|t| self.driving_layer(t));

        for (index, state) in self.layers.iter_mut().enumerate() {
            let tick = state.tick(dt);
            outcome.steps += tick.steps.len();
            if let (Some(track), true) = (root_track, root_driver == Some(index)) {
                for step in &tick.steps {
                    outcome.root_delta +=
                        RootMotion::step_delta(&self.definition, track, state.frames(), step);
                }
                if tick.cycles > 0 {
                    outcome.root_delta +=
                        RootMotion::cycle_delta(&self.definition, track, state.frames())
                            * tick.cycles as f32;
                }
            }
            if tick.finished {
                outcome.finished.push(FinishedLayer {
                    layer: state.layer.clone(),
                    animation: state.name.clone(),
                });
            }
        }
        if !outcome.finished.is_empty() {
            self.touch();
        }
        outcome
    }

    /// Whether some layer playing `name` has finished.
    pub fn is_animation_finished(&self, name: &str) -> bool {
        self.layers
            .iter()
            .any(|s| s.name == name && s.is_finished())
    }

    /// Whether the named track is drawn at its current frame.
    pub fn is_track_visible(&self, name: &str) -> bool {
        let Some(track) = self.definition.track_index(name) else {
            return false;
        };
        self.track_frame(track)
            .and_then(|physical| self.definition.frame(track, physical))
            .is_some_and(|frame| !frame.hidden)
    }
}
