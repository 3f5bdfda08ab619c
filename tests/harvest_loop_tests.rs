//! Integration tests for the harvest control loop against the simulated world
//!
//! These tests drive whole ticks through HarvestController and verify:
//! - Tool loss halts and pauses the run
//! - Journal feedback is turned into depleted / retry / success outcomes
//! - Site exhaustion advances the waypoint cursor, failed travel does not
//! - Over-capacity handling converts, offloads and unloads at home
//! - Stopping the run unwinds cleanly

use autoharvest::config::MemorySettingsStore;
use autoharvest::models::{EquipSlot, HarvestProfile, LoopPhase, Position};
use autoharvest::services::CapacityResolution;
use autoharvest::{
    ConfigManager, HarvestController, HarvestSettings, RunConfig, RunControl, RunMode, SimulatedWorld,
    TickReport, TravelStyle, World,
};
use std::sync::atomic::Ordering;
use tokio::time::{Duration, sleep, timeout};

const SITE: Position = Position { x: 100, y: 100, z: 0 };

fn controller(world: SimulatedWorld, config: RunConfig) -> HarvestController<SimulatedWorld> {
    HarvestController::with_config(
        world,
        RunControl::new(RunMode::Running),
        HarvestSettings::default(),
        ConfigManager::new(MemorySettingsStore::new()),
        config,
    )
}

/// Avatar standing at SITE with an axe and nothing configured.
fn bare_site() -> SimulatedWorld {
    let world = SimulatedWorld::new(HarvestProfile::lumber());
    world.set_position(SITE);
    world.equip_tool(EquipSlot::TwoHanded, HarvestProfile::AXE);
    world
}

#[tokio::test(start_paused = true)]
async fn test_missing_tool_pauses_run() {
    let world = SimulatedWorld::new(HarvestProfile::lumber());
    world.set_position(SITE);
    world.add_source(101, 100, 0, 0x0CD0, 5);
    let mut controller = controller(world, RunConfig::default());

    let report = controller.tick().await.unwrap();

    assert_eq!(report, TickReport::NoTool);
    assert_eq!(controller.control().mode(), RunMode::Paused);
    assert!(
        controller
            .world()
            .messages()
            .contains(&"Equip an axe to continue.".to_string())
    );
    assert_eq!(controller.world().count_in_backpack(HarvestProfile::LOGS), 0);
}

#[tokio::test(start_paused = true)]
async fn test_no_wood_marks_tile_depleted() {
    let world = bare_site();
    world.add_source(101, 100, 0, 0x0CD0, 0);
    let mut controller = controller(world, RunConfig::default());

    let report = controller.tick().await.unwrap();

    assert_eq!(report, TickReport::SiteExhausted { traveled: false });
    assert!(controller.session().cache.is_depleted(101, 100));
    assert_eq!(controller.metrics().depleted.load(Ordering::Relaxed), 1);

    // Still standing in the same spot: the tile is not tried again.
    let report = controller.tick().await.unwrap();
    assert_eq!(report, TickReport::SiteExhausted { traveled: false });
    assert_eq!(controller.metrics().depleted.load(Ordering::Relaxed), 1);
}

#[tokio::test(start_paused = true)]
async fn test_moving_clears_depleted_tiles() {
    let world = bare_site();
    world.add_source(101, 100, 0, 0x0CD0, 0);
    let mut controller = controller(world, RunConfig::default());
    controller.tick().await.unwrap();
    assert!(controller.session().cache.is_depleted(101, 100));

    controller.world().set_position(Position::new(100, 101, 0));
    controller.tick().await.unwrap();

    assert_eq!(controller.metrics().depleted.load(Ordering::Relaxed), 2);
}

#[tokio::test(start_paused = true)]
async fn test_rate_limit_is_retry_not_depleted() {
    let world = bare_site();
    world.add_source(101, 100, 0, 0x0CD0, 5);
    world.add_source(99, 100, 0, 0x0CD3, 5);
    world.script_feedback("You must wait to perform another action.");
    let mut controller = controller(world, RunConfig::default());

    let report = controller.tick().await.unwrap();

    assert_eq!(report, TickReport::Harvested { successes: 1 });
    assert!(controller.session().cache.is_empty());
    assert_eq!(controller.metrics().retries.load(Ordering::Relaxed), 1);
    assert_eq!(controller.world().source_charges(101, 100), Some(5));
    assert_eq!(controller.world().source_charges(99, 100), Some(4));
}

#[tokio::test(start_paused = true)]
async fn test_successful_harvest_fills_backpack() {
    let world = bare_site();
    world.add_source(101, 100, 0, 0x0CD0, 5);
    world.add_source(100, 102, 0, 0x0CD3, 5);
    world.add_scenery(99, 99, 0, 0x0E75);
    let mut controller = controller(world, RunConfig::default());

    let report = controller.tick().await.unwrap();

    assert_eq!(report, TickReport::Harvested { successes: 2 });
    assert_eq!(controller.world().count_in_backpack(HarvestProfile::LOGS), 20);
    assert_eq!(controller.status().snapshot().phase, LoopPhase::Attempting);
    assert!(controller.session().marked_tile().is_some());
}

#[tokio::test(start_paused = true)]
async fn test_batch_stops_once_capacity_is_reached() {
    let world = bare_site();
    world.set_max_load(100);
    world.set_base_load(30);
    world.add_source(101, 100, 0, 0x0CD0, 5);
    world.add_source(99, 100, 0, 0x0CD3, 5);
    let mut controller = controller(world, RunConfig::default());

    let report = controller.tick().await.unwrap();

    assert_eq!(report, TickReport::CapacityReached { successes: 1 });
    assert_eq!(controller.world().source_charges(101, 100), Some(4));
    assert_eq!(controller.world().source_charges(99, 100), Some(5));
    assert_eq!(controller.world().count_in_backpack(HarvestProfile::LOGS), 10);
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_site_advances_to_next_stop() {
    let (world, config) = SimulatedWorld::demo(TravelStyle::Magery);
    let mut controller = controller(world, config);
    assert_eq!(controller.session().navigator.cursor(), 0);

    let report = controller.tick().await.unwrap();

    assert_eq!(report, TickReport::SiteExhausted { traveled: true });
    assert_eq!(controller.session().navigator.cursor(), 1);
    assert_eq!(controller.world().prompt_replies(), vec![52]);
    assert_eq!(controller.world().position(), Position::new(1020, 1000, 0));
    assert_eq!(controller.status().snapshot().waypoint_index, 1);
}

#[tokio::test(start_paused = true)]
async fn test_unresponsive_travel_keeps_cursor() {
    let (world, config) = SimulatedWorld::demo(TravelStyle::Magery);
    world.set_prompt_responsive(false);
    let mut controller = controller(world, config);

    let report = controller.tick().await.unwrap();

    assert_eq!(report, TickReport::SiteExhausted { traveled: false });
    assert_eq!(controller.session().navigator.cursor(), 0);
    assert!(controller.world().prompt_replies().is_empty());
    assert!(
        controller
            .world()
            .messages()
            .iter()
            .any(|m| m.contains("did not open"))
    );
}

#[tokio::test(start_paused = true)]
async fn test_over_capacity_converts_and_offloads() {
    let world = bare_site();
    let carrier = world.add_container();
    world.set_max_load(300);
    world.set_base_load(100);
    world.add_backpack_item(HarvestProfile::LOGS, 80);
    let config = RunConfig {
        secondary_carrier: Some(carrier),
        use_secondary_carrier: true,
        ..RunConfig::default()
    };
    let mut controller = controller(world, config);

    let report = controller.tick().await.unwrap();

    assert_eq!(report, TickReport::OverCapacity(CapacityResolution::Relieved));
    assert_eq!(controller.world().count_in(carrier, HarvestProfile::BOARDS), 80);
    assert_eq!(controller.world().count_in_backpack(HarvestProfile::LOGS), 0);
}

#[tokio::test(start_paused = true)]
async fn test_over_capacity_without_way_home() {
    let (world, config) = SimulatedWorld::demo(TravelStyle::Magery);
    world.set_base_load(390);
    world.set_prompt_responsive(false);
    let mut controller = controller(world, config);

    let report = controller.tick().await.unwrap();

    assert_eq!(report, TickReport::OverCapacity(CapacityResolution::Stranded));
    assert!(
        controller
            .world()
            .messages()
            .contains(&"Unable to travel home.".to_string())
    );
    assert_eq!(controller.session().navigator.cursor(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_paused_tick_waits_for_resume() {
    let world = bare_site();
    world.add_source(101, 100, 0, 0x0CD0, 5);
    let mut controller = controller(world, RunConfig::default());
    controller.control().pause();

    let blocked = timeout(Duration::from_secs(30), controller.tick()).await;
    assert!(blocked.is_err());
    assert_eq!(controller.world().count_in_backpack(HarvestProfile::LOGS), 0);
    assert_eq!(controller.status().snapshot().phase, LoopPhase::Paused);

    controller.control().resume();
    let report = controller.tick().await.unwrap();
    assert_eq!(report, TickReport::Harvested { successes: 1 });
}

#[tokio::test(start_paused = true)]
async fn test_stop_before_run_returns_ok() {
    let (world, config) = SimulatedWorld::demo(TravelStyle::Magery);
    let mut controller = controller(world, config);
    controller.control().stop();

    controller.run().await.unwrap();

    assert_eq!(controller.status().snapshot().mode, RunMode::Stopped);
    assert!(controller.world().prompt_replies().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_demo_world_runs_until_stopped() {
    let (world, config) = SimulatedWorld::demo(TravelStyle::Chivalry);
    let mut controller = controller(world, config);

    let stopper = controller.control().clone();
    tokio::spawn(async move {
        sleep(Duration::from_secs(600)).await;
        stopper.stop();
    });

    controller.run().await.unwrap();

    let metrics = controller.metrics();
    assert!(metrics.harvests.load(Ordering::Relaxed) > 0);
    assert!(metrics.travels.load(Ordering::Relaxed) > 0);
    assert!(controller.session().marked_tile().is_none());
    assert!(controller.world().prompt_replies().iter().all(|b| (75..=90).contains(b)));
}
