//! Parent-child track chains.
//!
//! Child tracks inherit the offsets of their ancestors. Chains are flattened
//! once at load time into a list of track indices (outermost ancestor first)
//! so the compositor never follows parent pointers per tick.

use rustc_hash::FxHashMap;

use crate::reanim::definition::ParsedDocument;
use crate::reanim::error::{ReanimError, Result};

/// Flattened ancestor chains, one per track, indexed like the document's tracks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AncestorChains {
    chains: Vec<Vec<usize>>,
}

impl AncestorChains {
    /// Ancestors of `track`, outermost first. Empty for root tracks.
    pub fn ancestors(&self, track: usize) -> &[usize] {
        self.chains.get(track).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Resolve every track's ancestor chain, failing on cycles.
pub fn build_chains(doc: &ParsedDocument) -> Result<AncestorChains> {
    let index: FxHashMap<&str, usize> = doc
        .tracks
        .iter()
        .enumerate()
        .map(|(i, t)| (t.name.as_str(), i))
        .collect();

    let parent_of = |i: usize| -> Option<usize> {
        doc.tracks[i]
            .parent
            .as_deref()
            .and_then(|p| index.get(p).copied())
    };

    let mut chains = Vec::with_capacity(doc.tracks.len());
    for start in 0..doc.tracks.len() {
        let mut chain = Vec::new();
        let mut cursor = parent_of(start);
        while let Some(ancestor) = cursor {
            if ancestor == start || chain.contains(&ancestor) {
                return Err(ReanimError::parse(format!(
                    "parent cycle through track '{}'",
                    doc.tracks[start].name
                )));
            }
            chain.push(ancestor);
            cursor = parent_of(ancestor);
        }
        chain.reverse();
        chains.push(chain);
    }

    Ok(AncestorChains { chains })
}
