//! Z-index component for render ordering.
//!
//! The [`ZIndex`] component controls the drawing order of whole entities.
//! Parts of one entity are ordered by track within the band of their
//! entity's z-index.

use bevy_ecs::prelude::Component;

/// Number of z slots reserved for the tracks of one entity.
pub const TRACK_Z_STRIDE: i32 = 1024;

/// Rendering order hint for 2D drawing.
///
/// Higher values are drawn later (on top). Your renderer can sort parts by
/// [`RenderPartData::z`](crate::reanim::compose::RenderPartData::z) to achieve
/// a painter's algorithm.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct ZIndex(pub i32);

impl ZIndex {
    /// Base z for the parts of an entity at this index.
    pub fn part_base(self) -> i32 {
        self.0.saturating_mul(TRACK_Z_STRIDE)
    }
}
