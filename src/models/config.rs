use super::types::{PromptId, Serial};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Travel discipline used with the rune book.
///
/// Each style drives a different button range of the same book, so switching
/// style swaps both the home button and every stop at once (see [`Route`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelStyle {
    #[default]
    Magery,
    Chivalry,
}

impl TravelStyle {
    pub fn route(self) -> Route {
        match self {
            TravelStyle::Magery => Route::new(50, (51..=65).collect()),
            TravelStyle::Chivalry => Route::new(75, (76..=90).collect()),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TravelStyle::Magery => "Mage",
            TravelStyle::Chivalry => "Chiv",
        }
    }
}

/// Home button plus the ordered, wrapping list of harvesting stops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub home: u32,
    pub stops: Vec<u32>,
}

impl Route {
    /// Prompt the rune book answers travel requests with.
    pub const TRAVEL_PROMPT: PromptId = PromptId(0x59);

    pub fn new(home: u32, stops: Vec<u32>) -> Self {
        Self { home, stops }
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }
}

/// User-facing run configuration, persisted per avatar.
///
/// Mutated only through explicit user action and saved right after every
/// mutation by [`crate::config::ConfigManager::update`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "StoredRunConfig")]
pub struct RunConfig {
    pub travel_style: TravelStyle,

    /// Rune book holding the home and harvesting runes
    #[serde(serialize_with = "optional_serial::serialize")]
    pub travel_source: Option<Serial>,

    #[serde(serialize_with = "optional_serial::serialize")]
    pub drop_container: Option<Serial>,

    /// Pack animal or other mobile container used to offload converted material
    #[serde(serialize_with = "optional_serial::serialize")]
    pub secondary_carrier: Option<Serial>,

    pub use_secondary_carrier: bool,
}

/// On-disk shape of [`RunConfig`], including the legacy JSON keys.
///
/// Legacy blobs store the travel style as `use_sacred_journey`; an explicit
/// `travel_style` wins when both are present.
#[derive(Deserialize)]
struct StoredRunConfig {
    #[serde(default)]
    travel_style: Option<TravelStyle>,

    #[serde(default)]
    use_sacred_journey: Option<bool>,

    #[serde(default, alias = "runebook_serial", with = "optional_serial")]
    travel_source: Option<Serial>,

    #[serde(default, alias = "drop_container_serial", with = "optional_serial")]
    drop_container: Option<Serial>,

    #[serde(default, alias = "giant_beetle_serial", with = "optional_serial")]
    secondary_carrier: Option<Serial>,

    #[serde(default, alias = "use_giant_beetle")]
    use_secondary_carrier: bool,
}

impl From<StoredRunConfig> for RunConfig {
    fn from(stored: StoredRunConfig) -> Self {
        let travel_style = stored.travel_style.unwrap_or(match stored.use_sacred_journey {
            Some(true) => TravelStyle::Chivalry,
            _ => TravelStyle::Magery,
        });

        Self {
            travel_style,
            travel_source: stored.travel_source,
            drop_container: stored.drop_container,
            secondary_carrier: stored.secondary_carrier,
            use_secondary_carrier: stored.use_secondary_carrier,
        }
    }
}

impl RunConfig {
    pub fn route(&self) -> Route {
        self.travel_style.route()
    }

    /// Carrier to offload to, if the feature is enabled and a target is set.
    pub fn active_carrier(&self) -> Option<Serial> {
        if self.use_secondary_carrier {
            self.secondary_carrier
        } else {
            None
        }
    }
}

/// Serials are stored as plain integers where `0` means "unset".
mod optional_serial {
    use super::Serial;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Serial>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u32(value.map(|serial| serial.0).unwrap_or(0))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Serial>, D::Error> {
        let raw = Option::<u32>::deserialize(d)?;
        Ok(raw.filter(|v| *v != 0).map(Serial))
    }
}

/// Timing and tuning knobs for the harvesting loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestSettings {
    pub search_radius: i32,
    pub overweight_buffer: u32,
    pub poll_interval_ms: u64,
    pub target_timeout_ms: u64,
    pub harvest_settle_ms: u64,
    pub convert_settle_ms: u64,
    pub retry_delay_ms: u64,
    pub move_settle_ms: u64,
    pub prompt_timeout_ms: u64,
    pub travel_settle_ms: u64,
    pub pre_travel_wait_ms: u64,
    pub tick_rest_ms: u64,
    pub idle_wait_ms: u64,
    pub resource_poll_ms: u64,
    pub min_travel_resource: u32,
    pub journal_window: usize,
    pub mark_hue: u16,
}

impl Default for HarvestSettings {
    fn default() -> Self {
        Self {
            search_radius: 2,
            overweight_buffer: 50,
            poll_interval_ms: 100,
            target_timeout_ms: 2000,
            harvest_settle_ms: 1000,
            convert_settle_ms: 850,
            retry_delay_ms: 600,
            move_settle_ms: 600,
            prompt_timeout_ms: 2000,
            travel_settle_ms: 4500,
            pre_travel_wait_ms: 800,
            tick_rest_ms: 200,
            idle_wait_ms: 2000,
            resource_poll_ms: 250,
            min_travel_resource: 20,
            journal_window: 20,
            mark_hue: 96,
        }
    }
}

impl HarvestSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn target_timeout(&self) -> Duration {
        Duration::from_millis(self.target_timeout_ms)
    }

    pub fn harvest_settle(&self) -> Duration {
        Duration::from_millis(self.harvest_settle_ms)
    }

    pub fn convert_settle(&self) -> Duration {
        Duration::from_millis(self.convert_settle_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn move_settle(&self) -> Duration {
        Duration::from_millis(self.move_settle_ms)
    }

    pub fn prompt_timeout(&self) -> Duration {
        Duration::from_millis(self.prompt_timeout_ms)
    }

    pub fn travel_settle(&self) -> Duration {
        Duration::from_millis(self.travel_settle_ms)
    }

    pub fn pre_travel_wait(&self) -> Duration {
        Duration::from_millis(self.pre_travel_wait_ms)
    }

    pub fn tick_rest(&self) -> Duration {
        Duration::from_millis(self.tick_rest_ms)
    }

    pub fn idle_wait(&self) -> Duration {
        Duration::from_millis(self.idle_wait_ms)
    }

    pub fn resource_poll(&self) -> Duration {
        Duration::from_millis(self.resource_poll_ms)
    }
}

/// Process-level settings, loaded once at startup from file and environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub log_dir: String,
    pub debug: bool,
    pub console: bool,

    /// Directory holding per-avatar run configuration
    pub data_dir: String,

    /// Name of the controlled avatar; scopes the persisted run configuration
    pub avatar: String,

    pub harvest: HarvestSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            log_dir: "logs".to_string(),
            debug: false,
            console: true,
            data_dir: "AutoHarvest Data".to_string(),
            avatar: "default".to_string(),
            harvest: HarvestSettings::default(),
        }
    }
}
