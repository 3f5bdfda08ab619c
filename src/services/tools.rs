//! Tool Resolver: is a valid harvesting tool currently usable?

use crate::models::{EquipSlot, HarvestProfile, Item};
use crate::world::World;

/// First equipped item whose art id is one of the profile's tools.
///
/// Only hand layers are inspected; a tool sitting in the backpack does not
/// count. The result is never cached: a tool can break or be unequipped
/// between any two actions.
pub fn resolve_tool(world: &dyn World, profile: &HarvestProfile) -> Option<Item> {
    EquipSlot::HANDS
        .iter()
        .filter_map(|slot| world.equipped(*slot))
        .find(|item| profile.is_tool(item.graphic))
}
