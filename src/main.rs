//! AutoHarvest - waypoint-driven automatic resource gathering
//!
//! Entry point for a dry run against the in-memory [`SimulatedWorld`].
//!
//! # Execution Flow
//!
//! 1. Load settings from `AutoHarvest Data/AutoHarvest.yaml` and `AUTOHARVEST_*` variables
//! 2. Initialize logging → logs/autoharvest.<date>
//! 3. Build a current-thread tokio runtime
//! 4. Load the avatar's run configuration, seeding it from the demo world on first run
//! 5. Run the harvest loop until Ctrl-C
//! 6. Log the metrics summary
//!
//! A hosting environment that talks to a live world replaces step 4's world
//! with its own [`World`](autoharvest::World) implementation.

use anyhow::{Context, Result};
use autoharvest::config::{FileSettingsStore, load_app_settings};
use autoharvest::{APP_NAME, ConfigManager, HarvestController, RunControl, RunMode, SimulatedWorld, VERSION};
use camino::Utf8Path;

fn main() -> Result<()> {
    let settings = load_app_settings(Utf8Path::new("AutoHarvest Data"))?;

    let _guard = autoharvest::logging::setup_logging_with_console(
        &settings.log_dir,
        "autoharvest",
        settings.debug,
        settings.console,
    )?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;

    let config_manager = ConfigManager::new(FileSettingsStore::for_avatar(
        &settings.data_dir,
        &settings.avatar,
    ));
    let saved = config_manager.load_run_config();

    let (world, demo_config) = SimulatedWorld::demo(saved.travel_style);
    // Handles from a previous session mean nothing in a fresh simulation.
    let config = autoharvest::RunConfig {
        travel_style: saved.travel_style,
        use_secondary_carrier: false,
        ..demo_config
    };
    config_manager.save_run_config(&config)?;

    let control = RunControl::new(RunMode::Running)
        .with_poll_interval(settings.harvest.poll_interval());
    let mut controller =
        HarvestController::with_config(world, control.clone(), settings.harvest.clone(), config_manager, config);

    let result = runtime.block_on(async {
        let stopper = control.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Ctrl-C received, stopping");
                stopper.stop();
            }
        });

        controller.run().await
    });

    tracing::info!("Shutdown complete");
    result.context("Harvest loop failed")
}
