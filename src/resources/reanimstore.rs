//! Reanimation definition registry.
//!
//! Definitions are parsed, merged and segmented once at load time and stored
//! here behind `Arc`s. Every entity using a definition holds a clone of the
//! same `Arc`; nothing writes to a definition after it is published.

use std::path::Path;
use std::sync::Arc;

use bevy_ecs::prelude::Resource;
use log::{error, info};
use rustc_hash::FxHashMap;

use crate::reanim::compiled::ReanimDefinition;
use crate::reanim::error::{ReanimError, Result};

/// Central registry of built animation definitions keyed by name.
#[derive(Resource, Default)]
pub struct ReanimStore {
    pub definitions: FxHashMap<String, Arc<ReanimDefinition>>,
}

impl ReanimStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a built definition under its own name.
    pub fn insert(&mut self, definition: ReanimDefinition) -> Arc<ReanimDefinition> {
        let shared = Arc::new(definition);
        self.definitions
            .insert(shared.name.clone(), Arc::clone(&shared));
        shared
    }

    pub fn get(&self, name: &str) -> Option<Arc<ReanimDefinition>> {
        self.definitions.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Build and publish a definition from JSON text.
    pub fn load_json(&mut self, name: &str, json: &str) -> Result<Arc<ReanimDefinition>> {
        let definition = ReanimDefinition::from_json(name, json)?;
        Ok(self.insert(definition))
    }

    /// Load one definition file, named after its file stem.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<Arc<ReanimDefinition>> {
        let definition = ReanimDefinition::load_from_file(path.as_ref())?;
        info!(
            "Loaded reanim '{}' from {:?}",
            definition.name,
            path.as_ref()
        );
        Ok(self.insert(definition))
    }

    /// Load every `*.json` file of a directory.
    ///
    /// A malformed document aborts only its own definition; the error is
    /// logged and returned in the list so the loader can decide what to do
    /// with units that depend on it.
    pub fn load_dir(&mut self, dir: impl AsRef<Path>) -> Result<Vec<(String, ReanimError)>> {
        let mut failures = Vec::new();
        let mut paths: Vec<_> = std::fs::read_dir(dir.as_ref())?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        for path in paths {
            if let Err(err) = self.load_file(&path) {
                error!("Failed to load reanim {:?}: {}", path, err);
                failures.push((path.display().to_string(), err));
            }
        }
        Ok(failures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn definitions_are_shared_not_copied() {
        let mut store = ReanimStore::new();
        store
            .load_json("sun", r#"{"tracks": [{"name": "glow", "frames": [{}]}]}"#)
            .unwrap();
        let a = store.get("sun").unwrap();
        let b = store.get("sun").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn malformed_json_is_not_published() {
        let mut store = ReanimStore::new();
        assert!(store.load_json("bad", r#"{"tracks": [{"nom": "x"}]}"#).is_err());
        assert!(!store.contains("bad"));
    }

    #[test]
    fn missing_dir_is_an_io_error() {
        let mut store = ReanimStore::new();
        let err = store.load_dir("/definitely/not/here").unwrap_err();
        assert!(matches!(err, ReanimError::Io(_)));
    }
}
