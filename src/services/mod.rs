//! Services module - the harvesting components driven by the control loop.
//!
//! Every component is a plain function (or, for the navigator, a small
//! struct) over a [`HarvestContext`] and the run's [`Session`](crate::session::Session).
//! None of them talks to a game client directly; all world access goes
//! through the [`World`] capability trait, and all waiting goes through
//! [`RunControl`] so pause and stop are observed everywhere.
//!
//! # Components
//!
//! - [`tools`]: is a harvesting tool equipped?
//! - [`scanner`]: candidate harvest tiles around the avatar
//! - [`depletion`]: spots known to be empty from the current standing spot
//! - [`harvest`]: one attempt against one tile, plus journal classification
//! - [`converter`]: raw material into its lighter processed form
//! - [`capacity`]: overweight detection, offloading and unload trips
//! - [`navigator`]: wrapping route cursor and rune book travel

pub mod capacity;
pub mod converter;
pub mod depletion;
pub mod harvest;
pub mod navigator;
pub mod scanner;
pub mod tools;

pub use capacity::{CapacityResolution, is_over_capacity};
pub use depletion::DepletionCache;
pub use harvest::{Feedback, HarvestOutcome, classify};
pub use navigator::WaypointNavigator;
pub use scanner::scan;
pub use tools::resolve_tool;

use crate::metrics::HarvestMetrics;
use crate::models::{HarvestProfile, HarvestSettings, RunConfig};
use crate::state::{RunControl, StatusManager};
use crate::world::World;

/// Borrowed view of everything a component needs except the session.
#[derive(Clone, Copy)]
pub struct HarvestContext<'a> {
    pub world: &'a dyn World,
    pub control: &'a RunControl,
    pub settings: &'a HarvestSettings,
    pub profile: &'a HarvestProfile,
    pub config: &'a RunConfig,
    pub status: &'a StatusManager,
    pub metrics: &'a HarvestMetrics,
}

impl HarvestContext<'_> {
    /// User-facing message: log it, echo it in the world, publish it as status.
    pub fn say(&self, text: &str) {
        tracing::info!("{}", text);
        self.world.system_message(text);
        self.status.announce(text);
    }
}
