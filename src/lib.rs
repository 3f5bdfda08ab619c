// AutoHarvest - waypoint-driven automatic resource gathering
//
// This is the library crate containing the harvesting core. It drives a single
// avatar through an external world that is reached only through the World
// capability trait. The binary crate (main.rs) runs it against a simulated world.

pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod session;
pub mod state;
pub mod world;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use controller::{HarvestController, TickReport};
pub use error::{HarvestError, HarvestResult};
pub use metrics::HarvestMetrics;
pub use models::{AppSettings, HarvestSettings, RunConfig, RunMode, TravelStyle};
pub use state::{RunControl, StatusChange, StatusManager};
pub use world::{SimulatedWorld, World};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
