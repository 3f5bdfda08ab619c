//! Data models for the AutoHarvest application.
//!
//! This module contains the core data structures used throughout the application:
//! - [`types`]: positions, tiles, items, loads and other values exchanged with the [`World`](crate::world::World)
//! - [`HarvestProfile`]: tool, raw material and converted material identities
//! - [`RunConfig`]: per-avatar user configuration (travel style, rune book, drop container, carrier)
//! - [`HarvestSettings`] / [`AppSettings`]: tuning and process settings loaded at startup
//! - [`RunStatus`]: observable session status held by [`StatusManager`](crate::state::StatusManager)
//!
//! # Architecture Note
//!
//! The models are designed to be:
//! - **Serializable**: configuration structs derive `Serialize`/`Deserialize` for YAML persistence
//! - **Plain values**: nothing in here performs I/O or talks to the world

pub mod config;
pub mod profile;
pub mod status;
pub mod types;

pub use config::{AppSettings, HarvestSettings, Route, RunConfig, TravelStyle};
pub use profile::HarvestProfile;
pub use status::{LoopPhase, RunMode, RunStatus};
pub use types::{
    Area, EquipSlot, Graphic, Item, Load, Position, PromptId, Serial, StaticObject, Tile,
};
