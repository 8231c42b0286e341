//! Segment builder.
//!
//! Several named animations share one physical timeline. Control tracks mark
//! the boundaries: a frame that explicitly sets `hidden: true` is a sentinel,
//! and each maximal run of non-sentinel frames between sentinels becomes one
//! named segment. Sentinel frames themselves belong to no segment.
//!
//! Rules:
//! - the first frame, if unmarked, opens the first segment;
//! - two consecutive sentinels delimit an empty segment;
//! - frames past the end of a control track join the run still open there;
//! - documents without control tracks get one [`DEFAULT_SEGMENT`] covering
//!   the whole timeline.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::reanim::definition::{DEFAULT_SEGMENT, ParsedDocument, Track};
use crate::reanim::error::{ReanimError, Result};

/// Animation name → ordered physical frame indices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimVisiblesMap {
    segments: FxHashMap<String, Arc<[usize]>>,
    order: Vec<String>,
}

impl AnimVisiblesMap {
    pub fn get(&self, name: &str) -> Option<&[usize]> {
        self.segments.get(name).map(|frames| &**frames)
    }

    /// Shared handle to a segment, cheap to clone into per-entity state.
    pub fn get_shared(&self, name: &str) -> Option<Arc<[usize]>> {
        self.segments.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.segments.contains_key(name)
    }

    /// Segment names in timeline order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn insert(&mut self, name: String, frames: Vec<usize>) {
        self.order.push(name.clone());
        self.segments.insert(name, frames.into());
    }
}

/// Split one control track into runs of physical frames.
fn control_runs(track: &Track, max_frames: usize) -> Vec<Vec<usize>> {
    let len = track.len();
    let mut sentinel = vec![false; len];
    for (at, frame) in track.placed() {
        if frame.hidden == Some(true) {
            sentinel[at] = true;
        }
    }

    let mut runs = Vec::new();
    let mut current: Option<Vec<usize>> = None;
    let mut prev_sentinel = false;
    for (physical, is_sentinel) in sentinel.into_iter().enumerate() {
        if is_sentinel {
            match current.take() {
                Some(run) => runs.push(run),
                None if prev_sentinel => runs.push(Vec::new()),
                None => {}
            }
            prev_sentinel = true;
        } else {
            current.get_or_insert_with(Vec::new).push(physical);
            prev_sentinel = false;
        }
    }
    if let Some(mut run) = current {
        run.extend(len..max_frames);
        runs.push(run);
    }
    runs
}

/// Build the segment map of a parsed document.
pub fn build_segments(doc: &ParsedDocument) -> Result<AnimVisiblesMap> {
    let max_frames = doc.max_frames();
    let mut map = AnimVisiblesMap::default();
    let mut owner: Vec<Option<usize>> = vec![None; max_frames];
    let mut has_control = false;

    for track in doc.tracks.iter().filter(|t| t.is_control()) {
        has_control = true;
        let runs = control_runs(track, max_frames);
        if runs.len() != track.segment_names.len() {
            return Err(ReanimError::parse(format!(
                "mismatched segment markers on '{}': {} runs for {} names",
                track.name,
                runs.len(),
                track.segment_names.len()
            )));
        }
        for (name, run) in track.segment_names.iter().zip(runs) {
            let id = map.len();
            for &physical in &run {
                if let Some(other) = owner[physical] {
                    return Err(ReanimError::parse(format!(
                        "segments '{}' and '{}' overlap at frame {}",
                        map.order[other], name, physical
                    )));
                }
                owner[physical] = Some(id);
            }
            map.insert(name.clone(), run);
        }
    }

    if !has_control {
        map.insert(DEFAULT_SEGMENT.to_string(), (0..max_frames).collect());
    }

    Ok(map)
}
