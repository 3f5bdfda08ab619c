//! Area Scanner: harvestable objects around the avatar that are still worth trying.

use super::depletion::DepletionCache;
use crate::models::{Area, Position, Tile};
use crate::world::World;
use indexmap::IndexMap;

/// Harvestable tiles within `radius` of `center`, minus depleted spots.
///
/// Tiles are de-duplicated by `(x, y)`; the first one seen in scan order
/// wins and the result keeps scan order. An empty result is normal and means
/// the current site is done.
pub fn scan(
    world: &dyn World,
    center: Position,
    radius: i32,
    cache: &DepletionCache,
) -> Vec<Tile> {
    let mut unique: IndexMap<(i32, i32), Tile> = IndexMap::new();

    for object in world.statics_in_area(Area::around(center, radius)) {
        if !object.harvestable || cache.is_depleted(object.x, object.y) {
            continue;
        }
        let tile = object.tile();
        unique.entry(tile.key()).or_insert(tile);
    }

    tracing::debug!("Scan around {} found {} candidate tiles", center, unique.len());
    unique.into_values().collect()
}
