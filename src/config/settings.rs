use crate::models::AppSettings;
use anyhow::{Context, Result};
use camino::Utf8Path;
use config::{Config, Environment, File, FileFormat};

/// Name of the optional settings file inside the data directory
pub const SETTINGS_FILE: &str = "AutoHarvest.yaml";

/// Environment prefix; nested keys use `__`, e.g. `AUTOHARVEST_HARVEST__SEARCH_RADIUS=3`
pub const ENV_PREFIX: &str = "AUTOHARVEST";

/// Load process settings from `<dir>/AutoHarvest.yaml` overlaid with the environment.
///
/// A missing file is not an error; every field has a default.
pub fn load_app_settings(dir: &Utf8Path) -> Result<AppSettings> {
    let path = dir.join(SETTINGS_FILE);

    let layered = Config::builder()
        .add_source(File::new(path.as_str(), FileFormat::Yaml).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .with_context(|| format!("Failed to read settings from {}", path))?;

    let settings: AppSettings = layered
        .try_deserialize()
        .with_context(|| format!("Failed to parse settings from {}", path))?;

    tracing::debug!("Loaded settings for avatar {}", settings.avatar);
    Ok(settings)
}
