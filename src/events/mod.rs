//! Event types and observers used by the engine.
//!
//! Events provide a decoupled way for the animation core to notify gameplay
//! collaborators without direct dependencies.
//!
//! Submodules:
//! - [`reanim`] – notifications raised by animation playback
pub mod reanim;
