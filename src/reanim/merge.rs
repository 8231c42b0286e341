//! Track merger.
//!
//! Resolves sparse, delta-encoded frames into one fully populated record per
//! physical frame. Each track is a left-to-right fold carrying the last known
//! value; a track shorter than the document holds its last resolved value
//! until the global max frame count.

use std::sync::Arc;

use crate::reanim::definition::{Frame, ParsedDocument, Track, TrackKind};

/// Fully resolved attributes of a track at one physical frame.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedFrame {
    pub x: f32,
    pub y: f32,
    pub sx: f32,
    pub sy: f32,
    pub rotation: f32,
    pub alpha: f32,
    /// Image key; empty when the track never named an image.
    pub image: Arc<str>,
    pub hidden: bool,
}

impl Default for MergedFrame {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            sx: 1.0,
            sy: 1.0,
            rotation: 0.0,
            alpha: 1.0,
            image: Arc::from(""),
            hidden: false,
        }
    }
}

impl MergedFrame {
    pub fn has_image(&self) -> bool {
        !self.image.is_empty()
    }

    /// Overlay the fields a sparse frame defines.
    fn apply(&mut self, frame: &Frame) {
        if let Some(x) = frame.x {
            self.x = x;
        }
        if let Some(y) = frame.y {
            self.y = y;
        }
        if let Some(sx) = frame.sx {
            self.sx = sx;
        }
        if let Some(sy) = frame.sy {
            self.sy = sy;
        }
        if let Some(rotation) = frame.rotation {
            self.rotation = rotation;
        }
        if let Some(alpha) = frame.alpha {
            self.alpha = alpha;
        }
        if let Some(image) = &frame.image {
            if *image != *self.image {
                self.image = Arc::from(image.as_str());
            }
        }
        if let Some(hidden) = frame.hidden {
            self.hidden = hidden;
        }
    }
}

/// A track resolved over the whole physical timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedTrack {
    pub name: String,
    pub kind: TrackKind,
    pub frames: Vec<MergedFrame>,
}

impl MergedTrack {
    /// Resolved frame at a physical index, clamped to the last frame.
    pub fn frame(&self, physical: usize) -> Option<&MergedFrame> {
        self.frames
            .get(physical)
            .or_else(|| self.frames.last())
    }
}

/// Merge one track into an array of `max_frames` resolved records.
pub fn merge_track(track: &Track, max_frames: usize) -> MergedTrack {
    let mut frames = Vec::with_capacity(max_frames);
    let mut placed = track.placed().peekable();
    let mut current = MergedFrame::default();
    if track.is_empty() {
        current.hidden = true;
    }

    for physical in 0..max_frames {
        while let Some((_, frame)) = placed.next_if(|(at, _)| *at == physical) {
            current.apply(frame);
        }
        frames.push(current.clone());
    }

    MergedTrack {
        name: track.name.clone(),
        kind: track.kind,
        frames,
    }
}

/// Merge every track of a document against the global max frame count.
pub fn merge_tracks(doc: &ParsedDocument) -> Vec<MergedTrack> {
    let max_frames = doc.max_frames();
    doc.tracks
        .iter()
        .map(|track| merge_track(track, max_frames))
        .collect()
}
