//! Value types shared between the world capability layer and the harvesting services.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Visual identity of an object (item art id or static art id).
pub type Graphic = u32;

/// Unique handle of a world entity (item, container or mobile).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Serial(pub u32);

impl fmt::Display for Serial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

/// Avatar position in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Position {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// A harvestable object's position and visual identity, as produced by one scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tile {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub kind: Graphic,
}

impl Tile {
    pub fn new(x: i32, y: i32, z: i32, kind: Graphic) -> Self {
        Self { x, y, z, kind }
    }

    /// The planar key used for de-duplication and depletion tracking.
    pub fn key(&self) -> (i32, i32) {
        (self.x, self.y)
    }
}

/// A static world object returned by a spatial query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticObject {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub graphic: Graphic,
    pub harvestable: bool,
}

impl StaticObject {
    pub fn tile(&self) -> Tile {
        Tile::new(self.x, self.y, self.z, self.graphic)
    }
}

/// Inclusive rectangular region of the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Area {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Area {
    /// Square of `radius` tiles around `center`.
    pub fn around(center: Position, radius: i32) -> Self {
        Self {
            x1: center.x - radius,
            y1: center.y - radius,
            x2: center.x + radius,
            y2: center.y + radius,
        }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x1 && x <= self.x2 && y >= self.y1 && y <= self.y2
    }
}

/// Handle to an item with its art id and stack size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Item {
    pub serial: Serial,
    pub graphic: Graphic,
    pub amount: u32,
}

/// Equipment layers that can hold a harvesting tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EquipSlot {
    RightHand,
    LeftHand,
    OneHanded,
    TwoHanded,
}

impl EquipSlot {
    /// Hand layers in the order they are inspected.
    pub const HANDS: [EquipSlot; 4] = [
        EquipSlot::RightHand,
        EquipSlot::LeftHand,
        EquipSlot::OneHanded,
        EquipSlot::TwoHanded,
    ];
}

/// Current and maximum carried load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Load {
    pub current: u32,
    pub max: u32,
}

impl Load {
    pub fn new(current: u32, max: u32) -> Self {
        Self { current, max }
    }

    /// True once `current` is within `buffer` units of `max`.
    ///
    /// Monotonic in `current` for a fixed `max` and `buffer`.
    pub fn is_over(&self, buffer: u32) -> bool {
        self.current >= self.max.saturating_sub(buffer)
    }
}

impl fmt::Display for Load {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.current, self.max)
    }
}

/// Identity of an interactive prompt (gump) opened by the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PromptId(pub u32);
