//! ECS components for animated entities.
//!
//! This module groups all component types that can be attached to entities in
//! the game world. Shared, immutable animation data lives in
//! [`crate::resources::reanimstore`]; everything here is owned by a single
//! entity and mutated once per simulation tick.
//!
//! Submodules overview:
//! - [`animcommands`] – queued play/combo requests from gameplay code
//! - [`animstate`] – playback state machine of one animation layer
//! - [`mapposition`] – world-space position (figure center) for an entity
//! - [`reanimation`] – layers, visibility overrides and queries per entity
//! - [`renderparts`] – composed render output and its layout cache
//! - [`rootmotion`] – displacement extracted from a designated track
//! - [`zindex`] – rendering order hint for 2D drawing

pub mod animcommands;
pub mod animstate;
pub mod mapposition;
pub mod reanimation;
pub mod renderparts;
pub mod rootmotion;
pub mod zindex;
