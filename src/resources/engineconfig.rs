//! Engine configuration resource.
//!
//! Manages engine settings loaded from an INI configuration file. Provides
//! defaults for safe startup and methods to load/save configuration.
//!
//! # Configuration File Format
//!
//! ```ini
//! [simulation]
//! tick_rate = 100
//! time_scale = 1.0
//!
//! [assets]
//! definitions_dir = ./assets/reanim
//! combos_path = ./assets/combos.json
//! images_path = ./assets/images.json
//!
//! [render]
//! center_tolerance = 0.01
//! ```

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::info;
use std::path::PathBuf;

use crate::reanim::error::{ReanimError, Result};

/// Default safe values for startup
const DEFAULT_TICK_RATE: u32 = 100;
const DEFAULT_TIME_SCALE: f32 = 1.0;
const DEFAULT_DEFINITIONS_DIR: &str = "./assets/reanim";
const DEFAULT_COMBOS_PATH: &str = "./assets/combos.json";
const DEFAULT_IMAGES_PATH: &str = "./assets/images.json";
const DEFAULT_CENTER_TOLERANCE: f32 = 0.01;
const DEFAULT_CONFIG_PATH: &str = "./config.ini";

/// Engine configuration resource.
///
/// Stores the fixed simulation rate, asset locations and render tolerances.
#[derive(Resource, Debug, Clone)]
pub struct EngineConfig {
    /// Fixed simulation ticks per second.
    pub tick_rate: u32,
    /// Multiplier applied to every tick's delta.
    pub time_scale: f32,
    /// Directory scanned for `*.json` animation definitions.
    pub definitions_dir: PathBuf,
    /// Combo configuration file.
    pub combos_path: PathBuf,
    /// Image catalog file.
    pub images_path: PathBuf,
    /// Allowed distance between a figure's bounds center and its position.
    pub center_tolerance: f32,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            tick_rate: DEFAULT_TICK_RATE,
            time_scale: DEFAULT_TIME_SCALE,
            definitions_dir: PathBuf::from(DEFAULT_DEFINITIONS_DIR),
            combos_path: PathBuf::from(DEFAULT_COMBOS_PATH),
            images_path: PathBuf::from(DEFAULT_IMAGES_PATH),
            center_tolerance: DEFAULT_CENTER_TOLERANCE,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Length of one fixed simulation tick in seconds.
    pub fn tick_seconds(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current (default) values.
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(&mut self) -> Result<()> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| ReanimError::Config(format!("Failed to load config file: {}", e)))?;
        self.apply(&config);

        info!(
            "Loaded config: tick_rate={}, time_scale={}, definitions={:?}, combos={:?}, images={:?}",
            self.tick_rate,
            self.time_scale,
            self.definitions_dir,
            self.combos_path,
            self.images_path
        );

        Ok(())
    }

    /// Load configuration from INI text.
    pub fn load_from_str(&mut self, text: &str) -> Result<()> {
        let mut config = Ini::new();
        config
            .read(text.to_string())
            .map_err(|e| ReanimError::Config(format!("Failed to parse config: {}", e)))?;
        self.apply(&config);
        Ok(())
    }

    fn apply(&mut self, config: &Ini) {
        // [simulation] section
        if let Some(rate) = config.getuint("simulation", "tick_rate").ok().flatten() {
            self.tick_rate = (rate as u32).max(1);
        }
        if let Some(scale) = config.getfloat("simulation", "time_scale").ok().flatten() {
            self.time_scale = scale as f32;
        }

        // [assets] section
        if let Some(dir) = config.get("assets", "definitions_dir") {
            self.definitions_dir = PathBuf::from(dir);
        }
        if let Some(path) = config.get("assets", "combos_path") {
            self.combos_path = PathBuf::from(path);
        }
        if let Some(path) = config.get("assets", "images_path") {
            self.images_path = PathBuf::from(path);
        }

        // [render] section
        if let Some(tol) = config.getfloat("render", "center_tolerance").ok().flatten() {
            self.center_tolerance = tol as f32;
        }
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<()> {
        let mut config = Ini::new();

        // [simulation] section
        config.set("simulation", "tick_rate", Some(self.tick_rate.to_string()));
        config.set("simulation", "time_scale", Some(self.time_scale.to_string()));

        // [assets] section
        config.set(
            "assets",
            "definitions_dir",
            Some(self.definitions_dir.display().to_string()),
        );
        config.set(
            "assets",
            "combos_path",
            Some(self.combos_path.display().to_string()),
        );
        config.set(
            "assets",
            "images_path",
            Some(self.images_path.display().to_string()),
        );

        // [render] section
        config.set(
            "render",
            "center_tolerance",
            Some(self.center_tolerance.to_string()),
        );

        config
            .write(&self.config_path)
            .map_err(|e| ReanimError::Config(format!("Failed to save config file: {}", e)))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }
}
