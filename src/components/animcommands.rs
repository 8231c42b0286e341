//! Animation command queue.
//!
//! Gameplay code never names raw tracks or touches [`AnimState`]s. It queues
//! [`AnimCommand`]s on the entity's [`AnimCommandQueue`] (or posts them
//! through the [`AnimCommandInbox`](crate::resources::animinbox::AnimCommandInbox)),
//! and [`process_anim_commands`](crate::systems::animcommands::process_anim_commands)
//! consumes each request exactly once on the next tick.
//!
//! [`AnimState`]: crate::components::animstate::AnimState

use std::collections::VecDeque;

use bevy_ecs::prelude::Component;

/// Requests understood by the command processor.
#[derive(Debug, Clone, PartialEq)]
pub enum AnimCommand {
    /// Restart the base layer with a named animation driving every track.
    PlayAnimation { name: String, looped: bool },
    /// Apply a configured combo for a unit.
    PlayCombo { unit_id: String, combo: String },
    /// Pause or resume one layer.
    SetPaused { layer: String, paused: bool },
    /// Remove one layer.
    StopLayer { layer: String },
}

impl AnimCommand {
    pub fn play(name: impl Into<String>) -> Self {
        AnimCommand::PlayAnimation {
            name: name.into(),
            looped: true,
        }
    }

    pub fn combo(unit_id: impl Into<String>, combo: impl Into<String>) -> Self {
        AnimCommand::PlayCombo {
            unit_id: unit_id.into(),
            combo: combo.into(),
        }
    }
}

/// Pending requests for one entity, in submission order.
#[derive(Debug, Clone, Default, Component)]
pub struct AnimCommandQueue {
    pending: VecDeque<AnimCommand>,
}

impl AnimCommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, cmd: AnimCommand) {
        self.pending.push_back(cmd);
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Take every pending request; each is handed out once.
    pub fn drain(&mut self) -> impl Iterator<Item = AnimCommand> + '_ {
        self.pending.drain(..)
    }
}
