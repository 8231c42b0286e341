//! Engine systems.
//!
//! This module groups all ECS systems that advance animation state and
//! produce render output.
//!
//! Submodules overview
//! - [`animcommands`] – consume queued animation commands and apply combos
//! - [`compose`] – turn resolved track frames into center-anchored render parts
//! - [`playback`] – advance animation layers, extract root motion, emit finish events
//! - [`time`] – update simulation time and delta
//!
//! Per-tick order is fixed: commands, then playback, then composition.

pub mod animcommands;
pub mod compose;
pub mod playback;
pub mod time;
