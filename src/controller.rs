//! Harvest Control Loop.
//!
//! [`HarvestController`] owns the world handle, the run configuration and the
//! per-run [`Session`], and drives one tick at a time:
//!
//! 1. Wait while paused; refresh position and load; clear the depletion
//!    cache if the avatar moved.
//! 2. No tool: announce it and force-pause.
//! 3. Over capacity: convert, offload, and if needed unload at home.
//! 4. Scan; an empty scan means the site is exhausted.
//! 5. Attempt every tile in scan order; zero successes also exhausts the site.
//!
//! Leaving a site relieves the load first, then travels to the next stop.

use crate::config::ConfigManager;
use crate::error::HarvestResult;
use crate::metrics::HarvestMetrics;
use crate::models::{HarvestProfile, HarvestSettings, LoopPhase, RunConfig, RunMode, Serial, TravelStyle};
use crate::services::{
    CapacityResolution, HarvestContext, HarvestOutcome, capacity, harvest, is_over_capacity, resolve_tool,
    scan,
};
use crate::session::Session;
use crate::state::{RunControl, StatusManager};
use crate::world::World;
use std::sync::Arc;

/// What a single tick ended with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickReport {
    /// No tool equipped; the run was paused
    NoTool,
    OverCapacity(CapacityResolution),
    /// Nothing left here; `traveled` tells whether the next stop was reached
    SiteExhausted { traveled: bool },
    /// Capacity was reached partway through the tile batch
    CapacityReached { successes: usize },
    Harvested { successes: usize },
}

pub struct HarvestController<W: World> {
    world: W,
    control: RunControl,
    settings: HarvestSettings,
    profile: HarvestProfile,
    config_manager: ConfigManager,
    config: RunConfig,
    status: StatusManager,
    metrics: Arc<HarvestMetrics>,
    session: Session,
}

impl<W: World> HarvestController<W> {
    /// Build a controller, loading the avatar's saved run configuration.
    pub fn new(world: W, control: RunControl, settings: HarvestSettings, config_manager: ConfigManager) -> Self {
        let config = config_manager.load_run_config();
        Self::with_config(world, control, settings, config_manager, config)
    }

    /// Build a controller around an already loaded configuration.
    pub fn with_config(
        world: W,
        control: RunControl,
        settings: HarvestSettings,
        config_manager: ConfigManager,
        config: RunConfig,
    ) -> Self {
        let session = Session::new(config.route());
        let status = StatusManager::new();
        status.set_mode(control.mode());
        status.set_waypoint(session.navigator.cursor(), session.navigator.route().len());

        Self {
            world,
            control,
            settings,
            profile: HarvestProfile::lumber(),
            config_manager,
            config,
            status,
            metrics: Arc::new(HarvestMetrics::new()),
            session,
        }
    }

    pub fn with_profile(mut self, profile: HarvestProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn control(&self) -> &RunControl {
        &self.control
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn status(&self) -> &StatusManager {
        &self.status
    }

    pub fn metrics(&self) -> Arc<HarvestMetrics> {
        Arc::clone(&self.metrics)
    }

    // Configuration operations; each one persists immediately.

    /// Switch travel style, replacing home and stops together.
    pub fn set_travel_style(&mut self, style: TravelStyle) -> HarvestResult<()> {
        self.config_manager
            .update(&mut self.config, |config| config.travel_style = style)?;
        self.session.navigator.set_route(self.config.route());
        self.status.set_waypoint(
            self.session.navigator.cursor(),
            self.session.navigator.route().len(),
        );
        tracing::info!("Travel style set to {}", style.label());
        Ok(())
    }

    pub fn set_travel_source(&mut self, book: Option<Serial>) -> HarvestResult<()> {
        self.config_manager
            .update(&mut self.config, |config| config.travel_source = book)
    }

    pub fn set_drop_container(&mut self, container: Option<Serial>) -> HarvestResult<()> {
        self.config_manager
            .update(&mut self.config, |config| config.drop_container = container)
    }

    pub fn set_secondary_carrier(&mut self, carrier: Option<Serial>) -> HarvestResult<()> {
        self.config_manager
            .update(&mut self.config, |config| config.secondary_carrier = carrier)
    }

    /// Flip carrier offloading on or off, returning the new setting.
    pub fn toggle_secondary_carrier(&mut self) -> HarvestResult<bool> {
        self.config_manager.update(&mut self.config, |config| {
            config.use_secondary_carrier = !config.use_secondary_carrier
        })?;
        Ok(self.config.use_secondary_carrier)
    }

    /// Run ticks until the control flag is stopped.
    ///
    /// The status snapshot starts fresh for every run.
    pub async fn run(&mut self) -> HarvestResult<()> {
        self.status.reset();
        self.status.set_mode(self.control.mode());
        self.status.set_waypoint(
            self.session.navigator.cursor(),
            self.session.navigator.route().len(),
        );
        tracing::info!(
            "Harvest loop started ({} travel, {} stops)",
            self.config.travel_style.label(),
            self.session.navigator.route().len()
        );

        loop {
            match self.tick().await {
                Ok(report) => tracing::debug!("Tick finished: {:?}", report),
                Err(e) if e.is_stopped() => break,
                Err(e) => {
                    tracing::error!("Harvest loop failed: {}", e);
                    return Err(e);
                }
            }
        }

        self.session.clear_mark(&self.world);
        self.status.set_mode(RunMode::Stopped);
        self.status.set_phase(LoopPhase::Paused);
        tracing::info!("Harvest loop stopped");
        self.metrics.log_summary();
        Ok(())
    }

    /// One pass of the loop; see the module docs for the order of checks.
    pub async fn tick(&mut self) -> HarvestResult<TickReport> {
        let Self {
            world,
            control,
            settings,
            profile,
            config,
            status,
            metrics,
            session,
            ..
        } = self;
        let ctx = HarvestContext {
            world: &*world,
            control: &*control,
            settings: &*settings,
            profile: &*profile,
            config: &*config,
            status: &*status,
            metrics: &**metrics,
        };

        if !control.is_running() {
            status.set_mode(control.mode());
            status.set_phase(LoopPhase::Paused);
        }
        control.checkpoint().await?;
        status.set_mode(RunMode::Running);

        let position = ctx.world.position();
        session.cache.invalidate_on_move(position);
        status.observe(position, ctx.world.load());

        if resolve_tool(ctx.world, ctx.profile).is_none() {
            return Ok(halt_without_tool(&ctx, session));
        }

        if is_over_capacity(ctx.world.load(), settings.overweight_buffer) {
            status.set_phase(LoopPhase::OverCapacity);
            let resolution = capacity::handle_over_capacity(&ctx, session).await?;
            return Ok(TickReport::OverCapacity(resolution));
        }

        status.set_phase(LoopPhase::Scanning);
        let tiles = scan(ctx.world, position, settings.search_radius, &session.cache);
        if tiles.is_empty() {
            ctx.say("No trees nearby. Moving on.");
            let traveled = leave_site(&ctx, session).await?;
            return Ok(TickReport::SiteExhausted { traveled });
        }

        status.set_phase(LoopPhase::Attempting);
        let mut successes = 0;
        for tile in &tiles {
            control.checkpoint().await?;

            match harvest::attempt(&ctx, session, tile).await? {
                HarvestOutcome::NoTool => return Ok(halt_without_tool(&ctx, session)),
                HarvestOutcome::Success => successes += 1,
                HarvestOutcome::Retry | HarvestOutcome::Depleted => {}
            }

            if is_over_capacity(ctx.world.load(), settings.overweight_buffer) {
                return Ok(TickReport::CapacityReached { successes });
            }
        }

        if successes == 0 {
            ctx.say("Trees here are depleted. Moving to the next stop.");
            let traveled = leave_site(&ctx, session).await?;
            return Ok(TickReport::SiteExhausted { traveled });
        }

        control.responsive_wait(settings.tick_rest()).await?;
        Ok(TickReport::Harvested { successes })
    }
}

fn halt_without_tool(ctx: &HarvestContext<'_>, session: &mut Session) -> TickReport {
    session.clear_mark(ctx.world);
    ctx.say(&format!("Equip an {} to continue.", ctx.profile.tool_name));
    ctx.control.pause();
    ctx.status.set_mode(RunMode::Paused);
    ctx.status.set_phase(LoopPhase::Paused);
    TickReport::NoTool
}

/// Relieve the load, unloading at home if needed, then travel to the next stop.
///
/// Returns whether the next stop was reached. A failed travel idles briefly
/// so an unreachable stop does not turn into a tight retry loop.
async fn leave_site(ctx: &HarvestContext<'_>, session: &mut Session) -> HarvestResult<bool> {
    session.clear_mark(ctx.world);
    ctx.status.set_phase(LoopPhase::SiteExhausted);

    let still_over = capacity::relieve(ctx).await?;
    if still_over && !capacity::unload_trip(ctx, session).await? {
        ctx.control.responsive_wait(ctx.settings.idle_wait()).await?;
        return Ok(false);
    }

    ctx.control.responsive_wait(ctx.settings.pre_travel_wait()).await?;
    let traveled = session.navigator.travel_to_next(ctx).await?;
    if !traveled {
        ctx.control.responsive_wait(ctx.settings.idle_wait()).await?;
    }

    ctx.metrics.log_periodic();
    Ok(traveled)
}
