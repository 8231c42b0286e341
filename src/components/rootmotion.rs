//! Root motion extraction.
//!
//! Entities with a [`RootMotion`] component move by the positional change of
//! a designated track instead of by independent physics. Every logical frame
//! step of the layer driving that track contributes
//! `position(new) - position(previous)` to the entity's
//! [`MapPosition`](crate::components::mapposition::MapPosition).
//!
//! A loop wrap repeats the segment's last forward step rather than jumping
//! back to the start, so walking cycles keep moving forward.

use bevy_ecs::prelude::Component;
use glam::Vec2;

use crate::components::animstate::FrameStep;
use crate::reanim::compiled::ReanimDefinition;

#[derive(Debug, Clone, Component)]
pub struct RootMotion {
    /// Name of the track whose position drives displacement.
    pub track: String,
    pub enabled: bool,
    /// Displacement applied since the component was added.
    pub total: Vec2,
}

impl RootMotion {
    pub fn new(track: impl Into<String>) -> Self {
        Self {
            track: track.into(),
            enabled: true,
            total: Vec2::ZERO,
        }
    }

    /// Displacement contributed by one frame step over `frames` (a segment's
    /// physical frames).
    pub fn step_delta(
        def: &ReanimDefinition,
        track: usize,
        frames: &[usize],
        step: &FrameStep,
    ) -> Vec2 {
        if step.wrapped {
            return match frames {
                [.., before, last] => def.position(track, *last) - def.position(track, *before),
                _ => Vec2::ZERO,
            };
        }
        match (frames.get(step.from), frames.get(step.to)) {
            (Some(&from), Some(&to)) => def.position(track, to) - def.position(track, from),
            _ => Vec2::ZERO,
        }
    }

    /// Displacement of one complete loop: every forward step plus the wrap.
    pub fn cycle_delta(def: &ReanimDefinition, track: usize, frames: &[usize]) -> Vec2 {
        match frames {
            [first, .., before, last] => {
                let forward = def.position(track, *last) - def.position(track, *first);
                forward + def.position(track, *last) - def.position(track, *before)
            }
            [first, last] => {
                (def.position(track, *last) - def.position(track, *first)) * 2.0
            }
            _ => Vec2::ZERO,
        }
    }
}
