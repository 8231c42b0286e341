//! Reanimation definition pipeline.
//!
//! Build-time half of the animation engine. A raw document flows through:
//!
//! 1. [`definition`] – parse JSON into typed tracks and sparse frames
//! 2. [`merge`] – fold sparse frames into fully populated per-frame records
//! 3. [`segments`] – split the shared timeline into named animations
//! 4. [`hierarchy`] – flatten parent-child chains and reject cycles
//! 5. [`compiled`] – bundle everything into an immutable [`ReanimDefinition`]
//!
//! The per-tick half lives in ECS components and systems; [`compose`] holds
//! the pure part-composition routine they call.
//!
//! [`ReanimDefinition`]: compiled::ReanimDefinition

pub mod compiled;
pub mod compose;
pub mod definition;
pub mod error;
pub mod hierarchy;
pub mod merge;
pub mod segments;

pub use compiled::ReanimDefinition;
pub use error::{ReanimError, Result};
