//! Per-run mutable state shared by the harvesting components.

use crate::models::{Route, Tile};
use crate::services::{DepletionCache, WaypointNavigator};
use crate::world::World;

/// Everything the loop remembers between ticks.
///
/// Owned by the controller and lent to each component call by `&mut`, so no
/// component keeps state of its own.
#[derive(Debug)]
pub struct Session {
    pub cache: DepletionCache,
    pub navigator: WaypointNavigator,
    marked_tile: Option<(i32, i32)>,
}

impl Session {
    pub fn new(route: Route) -> Self {
        Self {
            cache: DepletionCache::new(),
            navigator: WaypointNavigator::new(route),
            marked_tile: None,
        }
    }

    pub fn marked_tile(&self) -> Option<(i32, i32)> {
        self.marked_tile
    }

    /// Highlight `tile`, moving the highlight off the previous one.
    pub fn mark_tile(&mut self, world: &dyn World, tile: &Tile, hue: u16) {
        let position = (tile.x, tile.y);
        if self.marked_tile == Some(position) {
            return;
        }
        self.clear_mark(world);
        world.mark_tile(tile.x, tile.y, hue);
        self.marked_tile = Some(position);
    }

    pub fn clear_mark(&mut self, world: &dyn World) {
        if let Some((x, y)) = self.marked_tile.take() {
            world.unmark_tile(x, y);
        }
    }
}
