mod settings;
mod store;

pub use settings::{ENV_PREFIX, SETTINGS_FILE, load_app_settings};
pub use store::{FileSettingsStore, MemorySettingsStore, SettingsStore};

use crate::error::HarvestResult;
use crate::models::RunConfig;

/// Key the run configuration blob is stored under
pub const RUN_CONFIG_KEY: &str = "auto_harvest_config";

/// Loads and persists the per-avatar [`RunConfig`].
///
/// Loading never fails: a missing, empty or unreadable blob falls back to
/// defaults with a warning. Every mutation made through
/// [`update`](Self::update) is written back immediately.
pub struct ConfigManager {
    store: Box<dyn SettingsStore>,
    key: String,
}

impl ConfigManager {
    pub fn new(store: impl SettingsStore + 'static) -> Self {
        Self {
            store: Box::new(store),
            key: RUN_CONFIG_KEY.to_string(),
        }
    }

    /// Parse a stored blob. Accepts YAML and legacy JSON; empty means defaults.
    pub fn parse_run_config(blob: &str) -> Result<RunConfig, serde_yaml_ng::Error> {
        if blob.trim().is_empty() {
            return Ok(RunConfig::default());
        }
        serde_yaml_ng::from_str(blob)
    }

    pub fn load_run_config(&self) -> RunConfig {
        let blob = match self.store.load(&self.key) {
            Ok(Some(blob)) => blob,
            Ok(None) => {
                tracing::info!("No saved run configuration, using defaults");
                return RunConfig::default();
            }
            Err(e) => {
                tracing::warn!("Could not read run configuration, using defaults: {}", e);
                return RunConfig::default();
            }
        };

        match Self::parse_run_config(&blob) {
            Ok(config) => {
                tracing::info!(
                    "Loaded run configuration: style={}, book={}, container={}",
                    config.travel_style.label(),
                    config.travel_source.is_some(),
                    config.drop_container.is_some()
                );
                config
            }
            Err(e) => {
                tracing::warn!("Run configuration is corrupt, using defaults: {}", e);
                RunConfig::default()
            }
        }
    }

    pub fn save_run_config(&self, config: &RunConfig) -> HarvestResult<()> {
        let blob = serde_yaml_ng::to_string(config)?;
        self.store.save(&self.key, &blob)?;
        tracing::debug!("Saved run configuration");
        Ok(())
    }

    /// Apply `change` and persist. `config` is left untouched if saving fails.
    pub fn update<F>(&self, config: &mut RunConfig, change: F) -> HarvestResult<()>
    where
        F: FnOnce(&mut RunConfig),
    {
        let mut updated = config.clone();
        change(&mut updated);
        self.save_run_config(&updated)?;
        *config = updated;
        Ok(())
    }
}

impl std::fmt::Debug for ConfigManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigManager").field("key", &self.key).finish()
    }
}
