use std::collections::BTreeMap;

use crate::canvas::buffer::Rgb;

/// A snapshot of edits keyed by grid coordinate, composited over the
/// authoritative image. Shared between the pending layer and the patches
/// carried by optimistic updates.
pub type ImagePatch = BTreeMap<(u32, u32), Rgb>;

/// Local, unconfirmed edits for the current drawing session. At most one
/// entry per coordinate; a later edit to the same cell overwrites the
/// earlier one. Cleared on submit handoff or explicit discard, never
/// persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingEdits {
    edits: ImagePatch,
}

impl PendingEdits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, x: u32, y: u32, color: Rgb) {
        self.edits.insert((x, y), color);
    }

    pub fn get(&self, x: u32, y: u32) -> Option<Rgb> {
        self.edits.get(&(x, y)).copied()
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn clear(&mut self) {
        self.edits.clear();
    }

    /// Iterates in sorted coordinate order. The batch submitter depends on
    /// this being deterministic.
    pub fn iter(&self) -> impl Iterator<Item = ((u32, u32), Rgb)> + '_ {
        self.edits.iter().map(|(&coord, &color)| (coord, color))
    }

    /// Clones the current edits into a patch for an optimistic update.
    pub fn snapshot(&self) -> ImagePatch {
        self.edits.clone()
    }
}
