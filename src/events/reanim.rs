//! Reanimation notifications.
//!
//! When a non-looping animation layer reaches its last frame, the playback
//! system triggers a [`ReanimFinishedEvent`]. Gameplay collaborators can
//! observe it instead of polling
//! [`Reanimation::is_animation_finished`](crate::components::reanimation::Reanimation::is_animation_finished).
//!
//! # Example
//!
//! ```ignore
//! world.add_observer(|trigger: On<ReanimFinishedEvent>| {
//!     if trigger.event().animation == "death" {
//!         // despawn, drop loot...
//!     }
//! });
//! ```

use bevy_ecs::prelude::*;
use log::debug;

/// Event emitted once when an animation layer finishes.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct ReanimFinishedEvent {
    /// The animated entity.
    pub entity: Entity,
    /// Layer the animation was playing on.
    pub layer: String,
    /// Name of the finished animation.
    pub animation: String,
}

/// Observer that logs finished animations at debug level.
pub fn log_reanim_finished(trigger: On<ReanimFinishedEvent>) {
    let event = trigger.event();
    debug!(
        "Entity {:?} finished '{}' on layer '{}'",
        event.entity, event.animation, event.layer
    );
}
