//! ECS resources made available to systems.
//!
//! This module groups the long-lived data injected into the ECS world and
//! accessed by systems during execution: shared animation definitions,
//! configuration, timing and the command inbox. Each submodule documents the
//! semantics and intended usage of its resource(s).
//!
//! Overview
//! - `animinbox` – channel through which gameplay posts animation commands
//! - `comboconfig` – per-unit combo records loaded from JSON
//! - `engineconfig` – INI-backed engine settings
//! - `imagestore` – known image keys and their sizes
//! - `reanimstore` – built animation definitions shared across entities
//! - `worldtime` – simulation time and delta
pub mod animinbox;
pub mod comboconfig;
pub mod engineconfig;
pub mod imagestore;
pub mod reanimstore;
pub mod worldtime;
