//! Animation definition parser.
//!
//! Turns a raw JSON animation document into typed [`Track`]s and the declared
//! frame rate. The parser is pure: it validates structure and placement, but
//! does not resolve held values (see [`crate::reanim::merge`]) or segment
//! boundaries (see [`crate::reanim::segments`]).
//!
//! # Document Format
//!
//! ```json
//! {
//!   "fps": 12.0,
//!   "tracks": [
//!     { "name": "anim_main", "kind": "control", "segments": ["idle", "walk"],
//!       "frames": [ {}, {}, {"hidden": true}, {} ] },
//!     { "name": "body", "frames": [ {"x": 0, "image": "IMAGE_BODY"}, {"x": 10} ] },
//!     { "name": "head", "parent": "body", "frames": [ {"y": -20, "image": "IMAGE_HEAD"} ] }
//!   ]
//! }
//! ```

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::reanim::error::{ReanimError, Result};

/// Frame rate used when a document does not declare one.
pub const DEFAULT_FPS: f32 = 12.0;

/// Segment name synthesized for documents without control tracks.
pub const DEFAULT_SEGMENT: &str = "_default";

/// Name prefix that marks a track as a control track when `kind` is omitted.
pub const CONTROL_PREFIX: &str = "anim_";

/// Upper bound on the physical timeline length. Every frame index must be
/// below it.
pub const MAX_FRAMES: usize = 1 << 16;

/// Whether a track is drawn or only encodes segment boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Visual,
    Control,
}

/// One sparse frame record. Absent fields inherit the last defined value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Frame {
    /// Physical index override; moves the placement cursor to this index.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    /// Horizontal scale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sx: Option<f32>,
    /// Vertical scale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sy: Option<f32>,
    /// Rotation in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f32>,
    /// Image key resolved through the [`ImageStore`](crate::resources::imagestore::ImageStore).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f32>,
    /// Sentinel on control tracks, per-frame visibility on visual tracks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDocument {
    #[serde(default = "default_fps")]
    fps: f32,
    tracks: Vec<RawTrack>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTrack {
    name: String,
    #[serde(default)]
    kind: Option<TrackKind>,
    #[serde(default)]
    parent: Option<String>,
    #[serde(default)]
    segments: Option<Vec<String>>,
    #[serde(default)]
    frames: Vec<Frame>,
}

fn default_fps() -> f32 {
    DEFAULT_FPS
}

/// A parsed track with frames placed on the physical timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub name: String,
    pub kind: TrackKind,
    /// Parent visual track whose offsets are inherited when composing.
    pub parent: Option<String>,
    /// Segment names for the runs of a control track, in timeline order.
    pub segment_names: Vec<String>,
    /// Frames in authoring order.
    pub frames: Vec<Frame>,
    /// Physical index of each frame in `frames`.
    pub placements: Vec<usize>,
}

impl Track {
    /// Number of physical frames covered by this track.
    pub fn len(&self) -> usize {
        self.placements.last().map(|i| i + 1).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn is_control(&self) -> bool {
        self.kind == TrackKind::Control
    }

    /// Iterate `(physical_index, frame)` pairs in timeline order.
    pub fn placed(&self) -> impl Iterator<Item = (usize, &Frame)> {
        self.placements.iter().copied().zip(self.frames.iter())
    }
}

/// Output of the parser: typed tracks plus the declared frame rate.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    pub fps: f32,
    pub tracks: Vec<Track>,
}

impl ParsedDocument {
    /// Global max frame count across all tracks.
    pub fn max_frames(&self) -> usize {
        self.tracks.iter().map(Track::len).max().unwrap_or(0)
    }

    pub fn track(&self, name: &str) -> Option<&Track> {
        self.tracks.iter().find(|t| t.name == name)
    }
}

/// Parse a definition document from JSON text.
pub fn parse_definition(json: &str) -> Result<ParsedDocument> {
    let raw: RawDocument =
        serde_json::from_str(json).map_err(|e| ReanimError::parse(e.to_string()))?;
    build_document(raw)
}

/// Parse a definition document from an already decoded JSON value.
pub fn parse_definition_value(value: serde_json::Value) -> Result<ParsedDocument> {
    let raw: RawDocument =
        serde_json::from_value(value).map_err(|e| ReanimError::parse(e.to_string()))?;
    build_document(raw)
}

fn build_document(raw: RawDocument) -> Result<ParsedDocument> {
    if !raw.fps.is_finite() || raw.fps <= 0.0 {
        return Err(ReanimError::parse(format!("invalid fps {}", raw.fps)));
    }

    let mut names: FxHashSet<String> = FxHashSet::default();
    let mut segment_names: FxHashSet<String> = FxHashSet::default();
    let mut tracks = Vec::with_capacity(raw.tracks.len());

    for raw_track in raw.tracks {
        if raw_track.name.is_empty() {
            return Err(ReanimError::parse("track with empty name"));
        }
        if !names.insert(raw_track.name.clone()) {
            return Err(ReanimError::parse(format!(
                "duplicate track name '{}'",
                raw_track.name
            )));
        }

        let kind = match raw_track.kind {
            Some(kind) => kind,
            None if raw_track.name.starts_with(CONTROL_PREFIX) && raw_track.segments.is_some() => {
                TrackKind::Control
            }
            None => TrackKind::Visual,
        };

        let segments = match (kind, raw_track.segments) {
            (TrackKind::Control, Some(segments)) => segments,
            (TrackKind::Control, None) => {
                return Err(ReanimError::parse(format!(
                    "control track '{}' declares no segment names",
                    raw_track.name
                )));
            }
            (TrackKind::Visual, Some(_)) => {
                return Err(ReanimError::parse(format!(
                    "visual track '{}' cannot declare segments",
                    raw_track.name
                )));
            }
            (TrackKind::Visual, None) => Vec::new(),
        };
        for segment in &segments {
            if segment == DEFAULT_SEGMENT {
                return Err(ReanimError::parse(format!(
                    "segment name '{}' is reserved",
                    DEFAULT_SEGMENT
                )));
            }
            if !segment_names.insert(segment.clone()) {
                return Err(ReanimError::parse(format!(
                    "duplicate segment name '{}'",
                    segment
                )));
            }
        }

        if kind == TrackKind::Control && raw_track.parent.is_some() {
            return Err(ReanimError::parse(format!(
                "control track '{}' cannot have a parent",
                raw_track.name
            )));
        }

        let placements = place_frames(&raw_track.name, &raw_track.frames)?;

        tracks.push(Track {
            name: raw_track.name,
            kind,
            parent: raw_track.parent,
            segment_names: segments,
            frames: raw_track.frames,
            placements,
        });
    }

    // Parent references must point to existing visual tracks. Cycles are
    // rejected later when ancestor chains are flattened.
    for track in &tracks {
        if let Some(parent) = &track.parent {
            match tracks.iter().find(|t| &t.name == parent) {
                Some(p) if p.kind == TrackKind::Visual => {}
                Some(_) => {
                    return Err(ReanimError::parse(format!(
                        "track '{}' has control track '{}' as parent",
                        track.name, parent
                    )));
                }
                None => {
                    return Err(ReanimError::parse(format!(
                        "track '{}' references unknown parent '{}'",
                        track.name, parent
                    )));
                }
            }
        }
    }

    Ok(ParsedDocument {
        fps: raw.fps,
        tracks,
    })
}

/// Assign a physical index to every frame, honoring `index` overrides.
fn place_frames(track: &str, frames: &[Frame]) -> Result<Vec<usize>> {
    let mut placements = Vec::with_capacity(frames.len());
    let mut cursor = 0usize;
    for frame in frames {
        let at = match frame.index {
            Some(i) if !placements.is_empty() && i < cursor => {
                return Err(ReanimError::parse(format!(
                    "track '{}': frame index {} goes backwards (next free index is {})",
                    track, i, cursor
                )));
            }
            Some(i) => i,
            None => cursor,
        };
        if at >= MAX_FRAMES {
            return Err(ReanimError::parse(format!(
                "track '{}': frame index {} exceeds the {} frame limit",
                track, at, MAX_FRAMES
            )));
        }
        placements.push(at);
        cursor = at
            .checked_add(1)
            .ok_or_else(|| ReanimError::parse(format!("track '{}': frame index overflow", track)))?;
    }
    Ok(placements)
}
