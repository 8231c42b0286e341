//! Render composition system.
//!
//! Resolves which physical frame each track shows, composes the
//! center-anchored layout (reusing the cached one when nothing changed) and
//! writes world-space [`RenderPartData`](crate::reanim::compose::RenderPartData)
//! into [`RenderParts`] for the rendering collaborator.

use bevy_ecs::prelude::*;
use log::warn;

use crate::components::mapposition::MapPosition;
use crate::components::reanimation::Reanimation;
use crate::components::renderparts::{LayoutKey, RenderParts};
use crate::components::zindex::ZIndex;
use crate::reanim::compose::compose_local;
use crate::reanim::error::ReanimError;
use crate::resources::imagestore::ImageStore;

/// Compose render parts for every animated entity.
///
/// Contract
/// - Reads [`Reanimation`] for the shown frames and [`ImageStore`] for sizes.
/// - Recomposes the local layout only when the frames shown, the visibility
///   revision, or the image catalog changed.
/// - Parts with unknown images are skipped and reported once per image.
pub fn compose_render_parts(
    mut query: Query<(
        Entity,
        &Reanimation,
        &mut RenderParts,
        &MapPosition,
        Option<&ZIndex>,
    )>,
    images: Res<ImageStore>,
) {
    let images_changed = images.is_changed();
    for (entity, reanim, mut render, position, z_index) in query.iter_mut() {
        let render = &mut *render;
        let key = LayoutKey {
            revision: reanim.revision(),
            frames: reanim.resolve_frames(),
        };

        if images_changed || render.key.as_ref() != Some(&key) {
            let out = compose_local(&reanim.definition, &key.frames, |image| images.size(image));
            for (track, image) in out.missing {
                if render.reported_missing.insert(image.clone()) {
                    let err = ReanimError::MissingResource {
                        track: reanim.definition.tracks()[track].name.clone(),
                        image: image.to_string(),
                    };
                    warn!("Entity {:?}: {}", entity, err);
                }
            }
            render.local = out.parts;
            render.key = Some(key);
            render.compositions += 1;
        }

        let base = z_index.copied().unwrap_or_default().part_base();
        render.parts.clear();
        render.parts.extend(render.local.iter().map(|part| {
            let mut part = part.clone();
            part.position += position.pos;
            part.z += base;
            part
        }));
    }
}
