//! Per-tick renderable output of an entity.
//!
//! [`RenderParts`] holds the ordered [`RenderPartData`] list the rendering
//! collaborator draws, already translated to the entity's world position.
//! The center-anchored local layout is cached and only recomposed when the
//! frames shown or the visibility configuration change.

use std::sync::Arc;

use bevy_ecs::prelude::Component;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::reanim::compose::RenderPartData;

/// Key identifying a composed layout: visibility revision plus frames per track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LayoutKey {
    pub revision: u32,
    pub frames: SmallVec<[Option<usize>; 16]>,
}

#[derive(Debug, Clone, Default, Component)]
pub struct RenderParts {
    /// World-space parts in draw order.
    pub parts: Vec<RenderPartData>,
    /// Number of times the local layout was recomposed.
    pub compositions: u64,
    pub(crate) key: Option<LayoutKey>,
    pub(crate) local: Vec<RenderPartData>,
    /// Images already reported missing, to avoid repeating the warning each tick.
    pub(crate) reported_missing: FxHashSet<Arc<str>>,
}

impl RenderParts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the cached layout so the next tick recomposes.
    pub fn invalidate(&mut self) {
        self.key = None;
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}
