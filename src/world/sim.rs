//! In-memory [`World`] used for dry runs and tests.
//!
//! The simulation models just enough of the real environment for the
//! harvesting loop to be exercised end to end: harvest sources with a finite
//! number of charges, items stacked in containers with per-unit weights, a
//! rune book that opens a travel prompt and teleports the avatar, a travel
//! resource that regenerates slowly, and a journal that reports outcomes with
//! the same texts the real environment uses.

use super::World;
use crate::models::{
    Area, EquipSlot, Graphic, HarvestProfile, Item, Load, Position, PromptId, Route, RunConfig,
    Serial, StaticObject, Tile, TravelStyle,
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Raw units added per successful harvest
pub const HARVEST_YIELD: u32 = 10;

/// Weight per unit of raw material
pub const RAW_UNIT_WEIGHT: u32 = 2;

/// Weight per unit of converted material
pub const CONVERTED_UNIT_WEIGHT: u32 = 1;

/// Travel resource spent per confirmed travel
pub const TRAVEL_COST: u32 = 11;

const RESOURCE_CAP: u32 = 100;
const BACKPACK: Serial = Serial(0x4000_0001);

pub const HARVEST_TEXT: &str = "You put some logs into your backpack.";
pub const CONVERT_TEXT: &str = "You saw the logs into boards.";
pub const EMPTY_TEXT: &str = "There is no wood here to harvest.";
pub const INVALID_TEXT: &str = "You can't use an axe on that.";

#[derive(Debug, Clone)]
struct SimSource {
    object: StaticObject,
    charges: u32,
}

#[derive(Debug, Clone)]
struct SimItem {
    item: Item,
    container: Serial,
}

#[derive(Debug)]
struct SimState {
    profile: HarvestProfile,
    position: Position,
    base_load: u32,
    max_load: u32,
    travel_resource: Option<u32>,
    equipment: HashMap<EquipSlot, Item>,
    statics: Vec<SimSource>,
    items: Vec<SimItem>,
    entities: HashMap<Serial, Item>,
    next_serial: u32,
    journal: Vec<String>,
    scripted: VecDeque<String>,
    target_cursor: bool,
    open_prompt: Option<PromptId>,
    prompt_responsive: bool,
    travel_book: Option<Serial>,
    destinations: HashMap<u32, Position>,
    marked: Vec<(i32, i32)>,
    messages: Vec<String>,
    prompt_replies: Vec<u32>,
}

impl SimState {
    fn allocate(&mut self) -> Serial {
        let serial = Serial(self.next_serial);
        self.next_serial += 1;
        serial
    }

    fn unit_weight(&self, graphic: Graphic) -> u32 {
        if graphic == self.profile.raw_graphic {
            RAW_UNIT_WEIGHT
        } else if graphic == self.profile.converted_graphic {
            CONVERTED_UNIT_WEIGHT
        } else {
            0
        }
    }

    fn current_load(&self) -> u32 {
        self.base_load
            + self
                .items
                .iter()
                .filter(|i| i.container == BACKPACK)
                .map(|i| self.unit_weight(i.item.graphic) * i.item.amount)
                .sum::<u32>()
    }

    fn add_to_container(&mut self, container: Serial, graphic: Graphic, amount: u32) -> Serial {
        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|i| i.container == container && i.item.graphic == graphic)
        {
            existing.item.amount += amount;
            return existing.item.serial;
        }
        let serial = self.allocate();
        self.items.push(SimItem {
            item: Item {
                serial,
                graphic,
                amount,
            },
            container,
        });
        serial
    }

    fn take_feedback(&mut self) -> Option<String> {
        self.scripted.pop_front()
    }

    fn is_equipped_tool(&self, serial: Serial) -> bool {
        self.equipment
            .values()
            .any(|item| item.serial == serial && self.profile.is_tool(item.graphic))
    }
}

/// Thread-safe in-memory world.
#[derive(Debug)]
pub struct SimulatedWorld {
    state: Mutex<SimState>,
}

impl SimulatedWorld {
    pub fn new(profile: HarvestProfile) -> Self {
        Self {
            state: Mutex::new(SimState {
                profile,
                position: Position::default(),
                base_load: 0,
                max_load: 400,
                travel_resource: Some(RESOURCE_CAP),
                equipment: HashMap::new(),
                statics: Vec::new(),
                items: Vec::new(),
                entities: HashMap::new(),
                next_serial: 0x4000_0100,
                journal: Vec::new(),
                scripted: VecDeque::new(),
                target_cursor: false,
                open_prompt: None,
                prompt_responsive: true,
                travel_book: None,
                destinations: HashMap::new(),
                marked: Vec::new(),
                messages: Vec::new(),
                prompt_replies: Vec::new(),
            }),
        }
    }

    /// A small lumber world: a home spot plus one grove per stop of `style`'s route.
    ///
    /// Returns the world together with a run configuration pointing at the
    /// simulated rune book and drop container.
    pub fn demo(style: TravelStyle) -> (Self, RunConfig) {
        let world = Self::new(HarvestProfile::lumber());
        let route = style.route();

        world.set_position(Position::new(500, 500, 0));
        world.set_base_load(100);
        world.equip_tool(EquipSlot::TwoHanded, HarvestProfile::AXE);

        let mut destinations = vec![(route.home, Position::new(500, 500, 0))];
        for (index, button) in route.stops.iter().enumerate() {
            let site = Position::new(1000 + 20 * index as i32, 1000, 0);
            destinations.push((*button, site));
            world.add_source(site.x - 1, site.y, 0, 0x0CD0, 3);
            world.add_source(site.x + 1, site.y + 1, 0, 0x0CD3, 3);
            world.add_source(site.x, site.y - 2, 0, 0x0CD6, 2);
        }

        let book = world.set_travel_book(destinations);
        let container = world.add_container();

        let config = RunConfig {
            travel_style: style,
            travel_source: Some(book),
            drop_container: Some(container),
            ..RunConfig::default()
        };
        (world, config)
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // Scenario setup

    pub fn set_position(&self, position: Position) {
        self.lock().position = position;
    }

    pub fn set_base_load(&self, load: u32) {
        self.lock().base_load = load;
    }

    pub fn set_max_load(&self, max: u32) {
        self.lock().max_load = max;
    }

    pub fn set_travel_resource(&self, value: Option<u32>) {
        self.lock().travel_resource = value;
    }

    pub fn equip_tool(&self, slot: EquipSlot, graphic: Graphic) -> Serial {
        let mut state = self.lock();
        let serial = state.allocate();
        state.equipment.insert(
            slot,
            Item {
                serial,
                graphic,
                amount: 1,
            },
        );
        serial
    }

    pub fn unequip(&self, slot: EquipSlot) {
        self.lock().equipment.remove(&slot);
    }

    /// Add a harvestable static with `charges` successful harvests left.
    pub fn add_source(&self, x: i32, y: i32, z: i32, graphic: Graphic, charges: u32) {
        self.lock().statics.push(SimSource {
            object: StaticObject {
                x,
                y,
                z,
                graphic,
                harvestable: true,
            },
            charges,
        });
    }

    /// Add scenery that is not a harvest source.
    pub fn add_scenery(&self, x: i32, y: i32, z: i32, graphic: Graphic) {
        self.lock().statics.push(SimSource {
            object: StaticObject {
                x,
                y,
                z,
                graphic,
                harvestable: false,
            },
            charges: 0,
        });
    }

    pub fn add_backpack_item(&self, graphic: Graphic, amount: u32) -> Serial {
        self.lock().add_to_container(BACKPACK, graphic, amount)
    }

    /// Put a stack straight into `container`, merging with a matching stack.
    pub fn add_container_item(&self, container: Serial, graphic: Graphic, amount: u32) -> Serial {
        self.lock().add_to_container(container, graphic, amount)
    }

    /// Add a container or carrier entity that items can be moved into.
    pub fn add_container(&self) -> Serial {
        let mut state = self.lock();
        let serial = state.allocate();
        state.entities.insert(
            serial,
            Item {
                serial,
                graphic: 0x0E75,
                amount: 1,
            },
        );
        serial
    }

    /// Make an entity unresolvable, as if it walked off or was deleted.
    pub fn remove_entity(&self, serial: Serial) {
        self.lock().entities.remove(&serial);
    }

    /// Register a rune book whose buttons teleport to the given positions.
    pub fn set_travel_book(&self, destinations: Vec<(u32, Position)>) -> Serial {
        let serial = self.add_container();
        let mut state = self.lock();
        state.travel_book = Some(serial);
        state.destinations = destinations.into_iter().collect();
        serial
    }

    /// When false, using the rune book never opens its prompt.
    pub fn set_prompt_responsive(&self, responsive: bool) {
        self.lock().prompt_responsive = responsive;
    }

    /// Queue a journal text to be reported instead of the next targeted action's result.
    pub fn script_feedback(&self, text: &str) {
        self.lock().scripted.push_back(text.to_string());
    }

    // Inspection

    pub fn messages(&self) -> Vec<String> {
        self.lock().messages.clone()
    }

    pub fn marked_tiles(&self) -> Vec<(i32, i32)> {
        self.lock().marked.clone()
    }

    pub fn prompt_replies(&self) -> Vec<u32> {
        self.lock().prompt_replies.clone()
    }

    /// Total units of `graphic` directly inside `container`.
    pub fn count_in(&self, container: Serial, graphic: Graphic) -> u32 {
        self.lock()
            .items
            .iter()
            .filter(|i| i.container == container && i.item.graphic == graphic)
            .map(|i| i.item.amount)
            .sum()
    }

    pub fn count_in_backpack(&self, graphic: Graphic) -> u32 {
        self.count_in(BACKPACK, graphic)
    }

    pub fn source_charges(&self, x: i32, y: i32) -> Option<u32> {
        self.lock()
            .statics
            .iter()
            .find(|s| s.object.harvestable && s.object.x == x && s.object.y == y)
            .map(|s| s.charges)
    }
}

impl Default for SimulatedWorld {
    fn default() -> Self {
        Self::new(HarvestProfile::lumber())
    }
}

impl World for SimulatedWorld {
    fn position(&self) -> Position {
        self.lock().position
    }

    fn load(&self) -> Load {
        let state = self.lock();
        Load::new(state.current_load(), state.max_load)
    }

    fn travel_resource(&self) -> Option<u32> {
        let mut state = self.lock();
        let current = state.travel_resource;
        // Regenerates one point per observation.
        if let Some(value) = state.travel_resource.as_mut() {
            *value = (*value + 1).min(RESOURCE_CAP);
        }
        current
    }

    fn equipped(&self, slot: EquipSlot) -> Option<Item> {
        self.lock().equipment.get(&slot).copied()
    }

    fn backpack(&self) -> Serial {
        BACKPACK
    }

    fn find_in_backpack(&self, graphic: Graphic) -> Option<Item> {
        self.lock()
            .items
            .iter()
            .find(|i| i.container == BACKPACK && i.item.graphic == graphic)
            .map(|i| i.item)
    }

    fn find_item(&self, serial: Serial) -> Option<Item> {
        let state = self.lock();
        state
            .entities
            .get(&serial)
            .copied()
            .or_else(|| {
                state
                    .items
                    .iter()
                    .find(|i| i.item.serial == serial)
                    .map(|i| i.item)
            })
            .or_else(|| {
                state
                    .equipment
                    .values()
                    .find(|item| item.serial == serial)
                    .copied()
            })
    }

    fn items_in_container(&self, container: Serial, _recursive: bool) -> Vec<Item> {
        // The simulation never nests containers.
        self.lock()
            .items
            .iter()
            .filter(|i| i.container == container)
            .map(|i| i.item)
            .collect()
    }

    fn statics_in_area(&self, area: Area) -> Vec<StaticObject> {
        self.lock()
            .statics
            .iter()
            .filter(|s| area.contains(s.object.x, s.object.y))
            .map(|s| s.object)
            .collect()
    }

    fn use_object(&self, serial: Serial) {
        let mut state = self.lock();
        if state.is_equipped_tool(serial) {
            state.target_cursor = true;
        } else if state.travel_book == Some(serial) && state.prompt_responsive {
            state.open_prompt = Some(Route::TRAVEL_PROMPT);
        }
    }

    fn has_target_cursor(&self) -> bool {
        self.lock().target_cursor
    }

    fn target_item(&self, serial: Serial) {
        let mut state = self.lock();
        if !state.target_cursor {
            return;
        }
        state.target_cursor = false;

        if let Some(text) = state.take_feedback() {
            state.journal.push(text);
            return;
        }

        let raw = state.profile.raw_graphic;
        let converted = state.profile.converted_graphic;
        let position = state
            .items
            .iter()
            .position(|i| i.item.serial == serial && i.container == BACKPACK && i.item.graphic == raw);

        match position {
            Some(index) => {
                let removed = state.items.remove(index);
                state.add_to_container(BACKPACK, converted, removed.item.amount);
                state.journal.push(CONVERT_TEXT.to_string());
            }
            None => state.journal.push(INVALID_TEXT.to_string()),
        }
    }

    fn target_tile(&self, tile: &Tile) {
        let mut state = self.lock();
        if !state.target_cursor {
            return;
        }
        state.target_cursor = false;

        if let Some(text) = state.take_feedback() {
            state.journal.push(text);
            return;
        }

        let source = state.statics.iter().position(|s| {
            s.object.harvestable
                && s.object.x == tile.x
                && s.object.y == tile.y
                && s.object.graphic == tile.kind
        });

        let text = match source {
            None => INVALID_TEXT,
            Some(index) if state.statics[index].charges == 0 => EMPTY_TEXT,
            Some(index) => {
                state.statics[index].charges -= 1;
                let raw = state.profile.raw_graphic;
                state.add_to_container(BACKPACK, raw, HARVEST_YIELD);
                HARVEST_TEXT
            }
        };
        state.journal.push(text.to_string());
    }

    fn move_item(&self, item: Serial, container: Serial, amount: u32) {
        let mut state = self.lock();
        let Some(index) = state.items.iter().position(|i| i.item.serial == item) else {
            return;
        };

        let graphic = state.items[index].item.graphic;
        let available = state.items[index].item.amount;
        if amount >= available {
            state.items.remove(index);
            state.add_to_container(container, graphic, available);
        } else {
            state.items[index].item.amount -= amount;
            state.add_to_container(container, graphic, amount);
        }
    }

    fn prompt_open(&self, prompt: PromptId) -> bool {
        self.lock().open_prompt == Some(prompt)
    }

    fn reply_prompt(&self, prompt: PromptId, button: u32) {
        let mut state = self.lock();
        if state.open_prompt != Some(prompt) {
            return;
        }
        state.open_prompt = None;
        state.prompt_replies.push(button);

        if let Some(destination) = state.destinations.get(&button).copied() {
            state.position = destination;
            if let Some(value) = state.travel_resource.as_mut() {
                *value = value.saturating_sub(TRAVEL_COST);
            }
        }
    }

    fn clear_journal(&self) {
        self.lock().journal.clear();
    }

    fn journal(&self) -> Vec<String> {
        self.lock().journal.clone()
    }

    fn mark_tile(&self, x: i32, y: i32, _hue: u16) {
        self.lock().marked.push((x, y));
    }

    fn unmark_tile(&self, x: i32, y: i32) {
        self.lock().marked.retain(|m| *m != (x, y));
    }

    fn system_message(&self, text: &str) {
        self.lock().messages.push(text.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_harvest_adds_raw_material_and_weight() {
        let world = SimulatedWorld::default();
        let axe = world.equip_tool(EquipSlot::RightHand, HarvestProfile::AXE);
        world.add_source(1, 1, 0, 0x0CD0, 1);

        world.use_object(axe);
        assert!(world.has_target_cursor());
        world.target_tile(&Tile::new(1, 1, 0, 0x0CD0));

        assert_eq!(world.count_in_backpack(HarvestProfile::LOGS), HARVEST_YIELD);
        assert_eq!(world.load().current, HARVEST_YIELD * RAW_UNIT_WEIGHT);
        assert_eq!(world.journal(), vec![HARVEST_TEXT.to_string()]);

        world.use_object(axe);
        world.target_tile(&Tile::new(1, 1, 0, 0x0CD0));
        assert_eq!(world.journal().last().map(String::as_str), Some(EMPTY_TEXT));
    }

    #[test]
    fn test_convert_raw_into_lighter_material() {
        let world = SimulatedWorld::default();
        let axe = world.equip_tool(EquipSlot::RightHand, HarvestProfile::AXE);
        let logs = world.add_backpack_item(HarvestProfile::LOGS, 20);

        world.use_object(axe);
        world.target_item(logs);

        assert_eq!(world.count_in_backpack(HarvestProfile::LOGS), 0);
        assert_eq!(world.count_in_backpack(HarvestProfile::BOARDS), 20);
        assert_eq!(world.load().current, 20 * CONVERTED_UNIT_WEIGHT);
    }

    #[test]
    fn test_travel_book_prompt_and_teleport() {
        let world = SimulatedWorld::default();
        let book = world.set_travel_book(vec![(50, Position::new(9, 9, 0))]);

        world.use_object(book);
        assert!(world.prompt_open(Route::TRAVEL_PROMPT));
        world.reply_prompt(Route::TRAVEL_PROMPT, 50);

        assert_eq!(world.position(), Position::new(9, 9, 0));
        assert!(!world.prompt_open(Route::TRAVEL_PROMPT));
        assert_eq!(world.prompt_replies(), vec![50]);
    }

    #[test]
    fn test_partial_move_splits_stack() {
        let world = SimulatedWorld::default();
        let chest = world.add_container();
        let boards = world.add_backpack_item(HarvestProfile::BOARDS, 30);

        world.move_item(boards, chest, 10);

        assert_eq!(world.count_in_backpack(HarvestProfile::BOARDS), 20);
        assert_eq!(world.count_in(chest, HarvestProfile::BOARDS), 10);
    }

    #[test]
    fn test_demo_world_is_configured() {
        let (world, config) = SimulatedWorld::demo(TravelStyle::Magery);
        assert!(config.travel_source.is_some());
        assert!(config.drop_container.is_some());
        assert!(world.equipped(EquipSlot::TwoHanded).is_some());
        assert_eq!(world.position(), Position::new(500, 500, 0));
    }
}
