//! Reanim engine library.
//!
//! Multi-part 2D skeletal-style animation: definitions made of named tracks
//! are merged, split into named segments, and played on layered state
//! machines whose resolved frames are composed into center-anchored render
//! parts every tick. Exposes the ECS components, resources, systems, and
//! events for use in integration tests and as a reusable library.

pub mod components;
pub mod events;
pub mod game;
pub mod reanim;
pub mod resources;
pub mod systems;
