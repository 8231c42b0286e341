//! Image catalog resource.
//!
//! Image decoding and GPU upload belong to the rendering collaborator. The
//! animation core only needs to know which image keys exist and how large
//! they are, so it can skip parts with missing images and compute the bounds
//! used for center anchoring.
//!
//! # Catalog File Format
//!
//! ```json
//! { "IMAGE_BODY": [64, 96], "IMAGE_HEAD": [48, 48] }
//! ```

use std::path::Path;

use bevy_ecs::prelude::Resource;
use glam::Vec2;
use log::info;
use rustc_hash::FxHashMap;

use crate::reanim::error::Result;

#[derive(Resource, Debug, Clone, Default)]
pub struct ImageStore {
    pub map: FxHashMap<String, Vec2>,
}

impl ImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, width: f32, height: f32) {
        self.map.insert(key.into(), Vec2::new(width, height));
    }

    /// Size in pixels of an image, if known.
    pub fn size(&self, key: &str) -> Option<Vec2> {
        self.map.get(key).copied()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let sizes: FxHashMap<String, [f32; 2]> = serde_json::from_str(json)?;
        Ok(Self {
            map: sizes
                .into_iter()
                .map(|(key, [w, h])| (key, Vec2::new(w, h)))
                .collect(),
        })
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let store = Self::from_json(&content)?;
        info!(
            "Loaded image catalog from {:?}: {} images",
            path.as_ref(),
            store.map.len()
        );
        Ok(store)
    }
}
