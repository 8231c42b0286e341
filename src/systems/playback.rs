//! Playback system.
//!
//! Advances every animation layer of every animated entity by the tick's
//! delta, applies root motion to the entity's position, and triggers a
//! [`ReanimFinishedEvent`] for each layer that finished during the tick.
//!
//! # Schedule position
//!
//! Runs after [`process_anim_commands`](crate::systems::animcommands::process_anim_commands)
//! so requests queued for this tick start advancing immediately, and before
//! [`compose_render_parts`](crate::systems::compose::compose_render_parts).

use bevy_ecs::prelude::*;
use glam::Vec2;

use crate::components::mapposition::MapPosition;
use crate::components::reanimation::Reanimation;
use crate::components::rootmotion::RootMotion;
use crate::events::reanim::ReanimFinishedEvent;
use crate::resources::worldtime::WorldTime;

/// Advance reanimation layers and extract root motion.
///
/// Contract
/// - Reads [`WorldTime`] for the scaled delta.
/// - Mutates [`Reanimation`] layer state.
/// - Adds root-motion displacement to [`MapPosition`] and [`RootMotion::total`].
/// - Triggers [`ReanimFinishedEvent`] once per finished layer.
pub fn reanim_playback(
    mut query: Query<(
        Entity,
        &mut Reanimation,
        Option<&mut RootMotion>,
        Option<&mut MapPosition>,
    )>,
    time: Res<WorldTime>,
    mut commands: Commands,
) {
    for (entity, mut reanim, mut root_motion, position) in query.iter_mut() {
        if reanim.layers().is_empty() {
            continue;
        }
        let outcome = reanim.advance(time.delta, root_motion.as_deref());

        if outcome.root_delta != Vec2::ZERO {
            if let Some(rm) = root_motion.as_mut() {
                rm.total += outcome.root_delta;
            }
            if let Some(mut pos) = position {
                pos.pos += outcome.root_delta;
            }
        }

        for finished in outcome.finished {
            commands.trigger(ReanimFinishedEvent {
                entity,
                layer: finished.layer,
                animation: finished.animation,
            });
        }
    }
}
