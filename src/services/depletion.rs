//! Depletion Cache: harvest spots known to be unproductive from where the avatar stands.

use crate::models::Position;
use std::collections::HashSet;

/// Position-keyed set of exhausted harvest targets.
///
/// The cache is spatial, not temporal: it is only valid for the standing
/// spot it was populated at. Any change of the avatar's x, y or z clears it.
#[derive(Debug, Clone, Default)]
pub struct DepletionCache {
    depleted: HashSet<(i32, i32)>,
    anchor: Option<Position>,
}

impl DepletionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_depleted(&mut self, x: i32, y: i32) {
        self.depleted.insert((x, y));
    }

    pub fn is_depleted(&self, x: i32, y: i32) -> bool {
        self.depleted.contains(&(x, y))
    }

    /// Compare `current` with the last observed position and clear on any difference.
    ///
    /// The first observation only records the anchor. Returns true when the
    /// cache was cleared.
    pub fn invalidate_on_move(&mut self, current: Position) -> bool {
        match self.anchor {
            Some(previous) if previous == current => false,
            Some(previous) => {
                tracing::debug!(
                    "Avatar moved {} -> {}, clearing {} depleted spots",
                    previous,
                    current,
                    self.depleted.len()
                );
                self.depleted.clear();
                self.anchor = Some(current);
                true
            }
            None => {
                self.anchor = Some(current);
                false
            }
        }
    }

    pub fn anchor(&self) -> Option<Position> {
        self.anchor
    }

    pub fn len(&self) -> usize {
        self.depleted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.depleted.is_empty()
    }
}
