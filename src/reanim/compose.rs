//! Transform compositor.
//!
//! Given the physical frame each visible track shows this tick, resolves
//! parent offsets and produces a list of [`RenderPartData`]. The resulting
//! figure is re-centered so the axis-aligned bounds of all drawn parts are
//! centered on the origin; systems then translate the list to the entity's
//! world position.

use std::sync::Arc;

use glam::Vec2;
use smallvec::SmallVec;

use crate::reanim::compiled::ReanimDefinition;

/// One resolved, drawable part of an entity.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPartData {
    /// Track index in the definition.
    pub track: usize,
    pub image: Arc<str>,
    /// Top-left of the image after parent offsets and anchoring.
    pub position: Vec2,
    /// Image size in pixels, before scaling.
    pub size: Vec2,
    pub scale: Vec2,
    /// Rotation in degrees around `position`.
    pub rotation: f32,
    pub alpha: f32,
    /// Draw order; higher values are drawn later.
    pub z: i32,
}

impl RenderPartData {
    /// World corners of the scaled and rotated image quad.
    pub fn corners(&self) -> [Vec2; 4] {
        let w = self.size.x * self.scale.x;
        let h = self.size.y * self.scale.y;
        let rot = Vec2::from_angle(self.rotation.to_radians());
        [
            Vec2::ZERO,
            Vec2::new(w, 0.0),
            Vec2::new(0.0, h),
            Vec2::new(w, h),
        ]
        .map(|c| self.position + rot.rotate(c))
    }
}

/// Result of composing one entity's figure.
#[derive(Debug, Clone, Default)]
pub struct ComposeOutput {
    pub parts: Vec<RenderPartData>,
    /// `(track, image)` pairs whose image is unknown to the image catalog.
    pub missing: SmallVec<[(usize, Arc<str>); 2]>,
}

/// Compose the parts of an entity around the origin.
///
/// `frames[i]` is the physical frame track `i` shows, or `None` when the
/// track is not visible this tick. `image_size` resolves image keys.
pub fn compose_local(
    def: &ReanimDefinition,
    frames: &[Option<usize>],
    image_size: impl Fn(&str) -> Option<Vec2>,
) -> ComposeOutput {
    let mut out = ComposeOutput::default();

    for track in def.visual_tracks() {
        let Some(physical) = frames.get(track).copied().flatten() else {
            continue;
        };
        let Some(frame) = def.frame(track, physical) else {
            continue;
        };
        if frame.hidden || !frame.has_image() {
            continue;
        }
        let Some(size) = image_size(&frame.image) else {
            out.missing.push((track, frame.image.clone()));
            continue;
        };

        // Ancestors that are not drawn this tick still move their children,
        // sampled at the child's frame.
        let offset: Vec2 = def
            .ancestors(track)
            .iter()
            .map(|&ancestor| {
                let at = frames.get(ancestor).copied().flatten().unwrap_or(physical);
                def.position(ancestor, at)
            })
            .sum();

        out.parts.push(RenderPartData {
            track,
            image: frame.image.clone(),
            position: offset + Vec2::new(frame.x, frame.y),
            size,
            scale: Vec2::new(frame.sx, frame.sy),
            rotation: frame.rotation,
            alpha: frame.alpha,
            z: track as i32,
        });
    }

    center_parts(&mut out.parts);
    out
}

/// Axis-aligned bounds `(min, max)` of a set of parts.
pub fn bounding_box(parts: &[RenderPartData]) -> Option<(Vec2, Vec2)> {
    parts
        .iter()
        .flat_map(RenderPartData::corners)
        .fold(None, |acc, c| match acc {
            None => Some((c, c)),
            Some((min, max)) => Some((min.min(c), max.max(c))),
        })
}

/// Translate parts so their bounds are centered on the origin.
pub fn center_parts(parts: &mut [RenderPartData]) {
    if let Some((min, max)) = bounding_box(parts) {
        let center = (min + max) * 0.5;
        for part in parts.iter_mut() {
            part.position -= center;
        }
    }
}
