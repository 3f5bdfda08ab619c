//! Capability layer over the externally controlled virtual world.
//!
//! The harvesting core never talks to a game client directly. Everything it
//! needs (avatar state, equipment, spatial queries, storage queries, action
//! primitives, the feedback journal and prompts) is expressed by the
//! [`World`] trait. A hosting environment implements it; [`SimulatedWorld`]
//! is an in-memory implementation used for dry runs and tests.
//!
//! All action primitives are fire-and-forget: they return immediately and
//! their effect is observed later through queries or the journal.

pub mod sim;

pub use sim::SimulatedWorld;

use crate::models::{Area, EquipSlot, Graphic, Item, Load, Position, PromptId, Serial, StaticObject, Tile};

#[cfg_attr(test, mockall::automock)]
pub trait World {
    // Avatar state

    fn position(&self) -> Position;

    fn load(&self) -> Load;

    /// Resource pool consumed by travel; `None` when the environment cannot report it.
    fn travel_resource(&self) -> Option<u32>;

    // Equipment and storage

    fn equipped(&self, slot: EquipSlot) -> Option<Item>;

    fn backpack(&self) -> Serial;

    /// First item of `graphic` in personal storage.
    fn find_in_backpack(&self, graphic: Graphic) -> Option<Item>;

    /// Resolve a handle; `None` once the entity is gone or out of range.
    fn find_item(&self, serial: Serial) -> Option<Item>;

    fn items_in_container(&self, container: Serial, recursive: bool) -> Vec<Item>;

    // Spatial query

    fn statics_in_area(&self, area: Area) -> Vec<StaticObject>;

    // Action primitives

    fn use_object(&self, serial: Serial);

    /// True while the environment waits for a target to be supplied.
    fn has_target_cursor(&self) -> bool;

    fn target_item(&self, serial: Serial);

    fn target_tile(&self, tile: &Tile);

    fn move_item(&self, item: Serial, container: Serial, amount: u32);

    fn prompt_open(&self, prompt: PromptId) -> bool;

    fn reply_prompt(&self, prompt: PromptId, button: u32);

    // Feedback channel

    fn clear_journal(&self);

    /// Journal entries received since the last clear, oldest first.
    fn journal(&self) -> Vec<String>;

    // Observation only

    fn mark_tile(&self, x: i32, y: i32, hue: u16);

    fn unmark_tile(&self, x: i32, y: i32);

    fn system_message(&self, text: &str);
}
