//! Built, immutable animation definitions.
//!
//! A [`ReanimDefinition`] is produced once per distinct animation document by
//! running parser → merger → segment builder → chain flattening. It is then
//! wrapped in an `Arc` and shared read-only by every entity using it.

use std::path::Path;
use std::sync::Arc;

use glam::Vec2;
use log::debug;
use rustc_hash::FxHashMap;

use crate::reanim::definition::{ParsedDocument, TrackKind, parse_definition};
use crate::reanim::error::Result;
use crate::reanim::hierarchy::{AncestorChains, build_chains};
use crate::reanim::merge::{MergedFrame, MergedTrack, merge_tracks};
use crate::reanim::segments::{AnimVisiblesMap, build_segments};

/// Fully resolved animation definition shared across entities.
#[derive(Debug, Clone, PartialEq)]
pub struct ReanimDefinition {
    pub name: String,
    pub fps: f32,
    pub max_frames: usize,
    tracks: Vec<MergedTrack>,
    track_index: FxHashMap<String, usize>,
    segments: AnimVisiblesMap,
    chains: AncestorChains,
}

impl ReanimDefinition {
    /// Build a definition from a parsed document.
    pub fn from_document(name: impl Into<String>, doc: &ParsedDocument) -> Result<Self> {
        let name = name.into();
        let segments = build_segments(doc)?;
        let chains = build_chains(doc)?;
        let tracks = merge_tracks(doc);
        let track_index = tracks
            .iter()
            .enumerate()
            .map(|(i, t)| (t.name.clone(), i))
            .collect();

        debug!(
            "Built reanim '{}': {} tracks, {} frames, {} segments at {} fps",
            name,
            tracks.len(),
            doc.max_frames(),
            segments.len(),
            doc.fps
        );

        Ok(Self {
            name,
            fps: doc.fps,
            max_frames: doc.max_frames(),
            tracks,
            track_index,
            segments,
            chains,
        })
    }

    /// Parse and build a definition from JSON text.
    pub fn from_json(name: impl Into<String>, json: &str) -> Result<Self> {
        let doc = parse_definition(json)?;
        Self::from_document(name, &doc)
    }

    /// Load a definition file; the definition is named after the file stem.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content = std::fs::read_to_string(path)?;
        Self::from_json(name, &content)
    }

    /// Convenience for sharing the built definition.
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn tracks(&self) -> &[MergedTrack] {
        &self.tracks
    }

    pub fn track_index(&self, name: &str) -> Option<usize> {
        self.track_index.get(name).copied()
    }

    pub fn track(&self, name: &str) -> Option<&MergedTrack> {
        self.track_index(name).map(|i| &self.tracks[i])
    }

    /// Indices of every drawable track, in z-order.
    pub fn visual_tracks(&self) -> impl Iterator<Item = usize> + '_ {
        self.tracks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.kind == TrackKind::Visual)
            .map(|(i, _)| i)
    }

    pub fn is_visual(&self, track: usize) -> bool {
        self.tracks
            .get(track)
            .is_some_and(|t| t.kind == TrackKind::Visual)
    }

    pub fn segments(&self) -> &AnimVisiblesMap {
        &self.segments
    }

    pub fn has_animation(&self, name: &str) -> bool {
        self.segments.contains(name)
    }

    /// Ancestors of a track, outermost first.
    pub fn ancestors(&self, track: usize) -> &[usize] {
        self.chains.ancestors(track)
    }

    /// Resolved frame of a track at a physical index.
    pub fn frame(&self, track: usize, physical: usize) -> Option<&MergedFrame> {
        self.tracks.get(track).and_then(|t| t.frame(physical))
    }

    /// Resolved (x, y) of a track at a physical index; zero when out of range.
    pub fn position(&self, track: usize, physical: usize) -> Vec2 {
        self.frame(track, physical)
            .map(|f| Vec2::new(f.x, f.y))
            .unwrap_or(Vec2::ZERO)
    }
}
