//! Command inbox for gameplay collaborators.
//!
//! Gameplay systems that do not hold a mutable query on the target entity can
//! post `(Entity, AnimCommand)` pairs through an [`AnimCommandSender`]. The
//! command processor drains the inbox at the start of every tick and appends
//! each request to the target's
//! [`AnimCommandQueue`](crate::components::animcommands::AnimCommandQueue).

use bevy_ecs::prelude::{Entity, Resource};
use crossbeam_channel::{Receiver, Sender, TryIter, unbounded};

use crate::components::animcommands::AnimCommand;

/// Cloneable handle used to post commands into the inbox.
#[derive(Clone)]
pub struct AnimCommandSender {
    tx: Sender<(Entity, AnimCommand)>,
}

impl AnimCommandSender {
    /// Post a command. Returns `false` when the inbox no longer exists.
    pub fn send(&self, entity: Entity, cmd: AnimCommand) -> bool {
        self.tx.send((entity, cmd)).is_ok()
    }
}

#[derive(Resource)]
pub struct AnimCommandInbox {
    tx: Sender<(Entity, AnimCommand)>,
    rx: Receiver<(Entity, AnimCommand)>,
}

impl Default for AnimCommandInbox {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimCommandInbox {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn sender(&self) -> AnimCommandSender {
        AnimCommandSender {
            tx: self.tx.clone(),
        }
    }

    /// Post a command. Returns `false` if the channel is disconnected.
    pub fn send(&self, entity: Entity, cmd: AnimCommand) -> bool {
        self.tx.send((entity, cmd)).is_ok()
    }

    /// Pending requests, without blocking.
    pub fn drain(&self) -> TryIter<'_, (Entity, AnimCommand)> {
        self.rx.try_iter()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}
