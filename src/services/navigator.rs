//! Waypoint Navigator: a wrapping cursor over the route plus rune book travel.

use super::HarvestContext;
use crate::error::{HarvestError, HarvestResult};
use crate::models::Route;
use crate::state::WaitOutcome;

/// Cursor over the ordered harvesting stops of a [`Route`].
///
/// The cursor only ever moves forward and wraps after the last stop. It is
/// committed only after a travel has actually been carried out.
#[derive(Debug, Clone)]
pub struct WaypointNavigator {
    route: Route,
    cursor: usize,
}

impl WaypointNavigator {
    pub fn new(route: Route) -> Self {
        Self { route, cursor: 0 }
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Replace home and stops together. The cursor is kept when still in range.
    pub fn set_route(&mut self, route: Route) {
        if self.cursor >= route.len() {
            self.cursor = 0;
        }
        self.route = route;
    }

    pub fn current_stop(&self) -> Option<u32> {
        self.route.stops.get(self.cursor).copied()
    }

    fn next_index(&self) -> Option<usize> {
        if self.route.is_empty() {
            None
        } else {
            Some((self.cursor + 1) % self.route.len())
        }
    }

    /// Move to the next stop, wrapping to the first after the last. No-op on an empty route.
    pub fn advance(&mut self) {
        if let Some(next) = self.next_index() {
            self.cursor = next;
        }
    }

    pub async fn travel_home(&self, ctx: &HarvestContext<'_>) -> HarvestResult<bool> {
        travel(ctx, self.route.home, "home").await
    }

    /// Travel to the stop under the cursor without moving it.
    pub async fn travel_to_current(&self, ctx: &HarvestContext<'_>) -> HarvestResult<bool> {
        let Some(button) = self.current_stop() else {
            ctx.say("No harvesting stops configured.");
            return Ok(false);
        };
        let traveled = travel(ctx, button, "current stop").await?;
        if traveled {
            ctx.status.set_waypoint(self.cursor, self.route.len());
        }
        Ok(traveled)
    }

    /// Travel to the following stop, committing the cursor only on success.
    pub async fn travel_to_next(&mut self, ctx: &HarvestContext<'_>) -> HarvestResult<bool> {
        let Some(next) = self.next_index() else {
            ctx.say("No harvesting stops configured.");
            return Ok(false);
        };

        let traveled = travel(ctx, self.route.stops[next], "next stop").await?;
        if traveled {
            self.cursor = next;
            ctx.status.set_waypoint(self.cursor, self.route.len());
            tracing::info!("Arrived at stop {}/{}", self.cursor + 1, self.route.len());
        }
        Ok(traveled)
    }
}

/// Block until the travel resource reaches the configured minimum.
///
/// A world that cannot report the resource never blocks travel. The shortage
/// is announced once per wait.
pub async fn wait_for_travel_resource(ctx: &HarvestContext<'_>) -> HarvestResult<()> {
    let minimum = ctx.settings.min_travel_resource;
    let mut announced = false;

    let outcome = ctx
        .control
        .suspend_until(
            || match ctx.world.travel_resource() {
                None => true,
                Some(value) if value >= minimum => true,
                Some(value) => {
                    if !announced {
                        ctx.say(&format!("Waiting for mana to travel ({value}/{minimum})."));
                        announced = true;
                    }
                    false
                }
            },
            ctx.settings.resource_poll(),
            None,
        )
        .await;

    match outcome {
        WaitOutcome::Cancelled => Err(HarvestError::Stopped),
        WaitOutcome::Satisfied | WaitOutcome::TimedOut => Ok(()),
    }
}

/// Open the rune book and press `button`; false when the travel did not happen.
async fn travel(ctx: &HarvestContext<'_>, button: u32, label: &str) -> HarvestResult<bool> {
    let Some(book) = ctx.config.travel_source else {
        ctx.say("No rune book configured for travel.");
        ctx.metrics.record_travel_failure();
        return Ok(false);
    };
    if ctx.world.find_item(book).is_none() {
        ctx.say("Rune book not found.");
        ctx.metrics.record_travel_failure();
        return Ok(false);
    }

    wait_for_travel_resource(ctx).await?;

    tracing::debug!("Using rune book {} for {} (button {})", book, label, button);
    ctx.world.use_object(book);

    match ctx
        .control
        .settle_until(
            || ctx.world.prompt_open(Route::TRAVEL_PROMPT),
            ctx.settings.prompt_timeout(),
        )
        .await
    {
        WaitOutcome::Satisfied => {}
        WaitOutcome::TimedOut => {
            ctx.say(&format!("Rune book did not open; travel to {label} skipped."));
            ctx.metrics.record_travel_failure();
            return Ok(false);
        }
        WaitOutcome::Cancelled => return Err(HarvestError::Stopped),
    }

    ctx.world.reply_prompt(Route::TRAVEL_PROMPT, button);
    ctx.control.settle(ctx.settings.travel_settle()).await?;
    ctx.metrics.record_travel();
    tracing::info!("Traveled to {} (button {})", label, button);

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Position, TravelStyle};
    use crate::services::fixture::Fixture;
    use crate::world::World;
    use proptest::prelude::*;
    use std::sync::atomic::Ordering;

    fn with_book(fixture: &mut Fixture) {
        let route = TravelStyle::Magery.route();
        let mut destinations = vec![(route.home, Position::new(500, 500, 0))];
        destinations.extend(
            route
                .stops
                .iter()
                .enumerate()
                .map(|(i, button)| (*button, Position::new(1000 + i as i32, 1000, 0))),
        );
        fixture.config.travel_source = Some(fixture.world.set_travel_book(destinations));
    }

    #[test]
    fn test_advance_wraps_after_last_stop() {
        let mut navigator = WaypointNavigator::new(TravelStyle::Magery.route());
        for _ in 0..14 {
            navigator.advance();
        }
        assert_eq!(navigator.cursor(), 14);
        assert_eq!(navigator.current_stop(), Some(65));

        navigator.advance();
        assert_eq!(navigator.cursor(), 0);
        assert_eq!(navigator.current_stop(), Some(51));
    }

    #[test]
    fn test_advance_on_empty_route_is_noop() {
        let mut navigator = WaypointNavigator::new(Route::new(50, Vec::new()));
        navigator.advance();
        assert_eq!(navigator.cursor(), 0);
        assert_eq!(navigator.current_stop(), None);
    }

    #[test]
    fn test_set_route_replaces_home_and_stops() {
        let mut navigator = WaypointNavigator::new(TravelStyle::Magery.route());
        navigator.advance();
        navigator.advance();

        navigator.set_route(TravelStyle::Chivalry.route());

        assert_eq!(navigator.route().home, 75);
        assert_eq!(navigator.cursor(), 2);
        assert_eq!(navigator.current_stop(), Some(78));

        navigator.set_route(Route::new(50, vec![51]));
        assert_eq!(navigator.cursor(), 0);
    }

    proptest! {
        #[test]
        fn prop_cursor_equals_advances_mod_len(len in 1usize..40, advances in 0usize..200) {
            let stops = (0..len as u32).collect();
            let mut navigator = WaypointNavigator::new(Route::new(999, stops));
            for _ in 0..advances {
                navigator.advance();
            }
            prop_assert_eq!(navigator.cursor(), advances % len);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_travel_to_next_commits_cursor() {
        let mut fixture = Fixture::new();
        with_book(&mut fixture);
        let mut navigator = WaypointNavigator::new(TravelStyle::Magery.route());

        let traveled = navigator.travel_to_next(&fixture.ctx()).await.unwrap();

        assert!(traveled);
        assert_eq!(navigator.cursor(), 1);
        assert_eq!(fixture.world.prompt_replies(), vec![52]);
        assert_eq!(fixture.status.snapshot().waypoint_index, 1);
        assert_eq!(fixture.metrics.travels.load(Ordering::Relaxed), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unresponsive_book_keeps_cursor() {
        let mut fixture = Fixture::new();
        with_book(&mut fixture);
        fixture.world.set_prompt_responsive(false);
        let mut navigator = WaypointNavigator::new(TravelStyle::Magery.route());

        assert!(!navigator.travel_home(&fixture.ctx()).await.unwrap());
        assert!(!navigator.travel_to_next(&fixture.ctx()).await.unwrap());

        assert_eq!(navigator.cursor(), 0);
        assert!(fixture.world.prompt_replies().is_empty());
        assert!(fixture.world.messages().iter().any(|m| m.contains("did not open")));
        assert_eq!(fixture.metrics.travel_failures.load(Ordering::Relaxed), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_book_configuration() {
        let fixture = Fixture::new();
        let navigator = WaypointNavigator::new(TravelStyle::Magery.route());

        assert!(!navigator.travel_home(&fixture.ctx()).await.unwrap());
        assert!(fixture.world.messages().iter().any(|m| m.contains("No rune book")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_book_out_of_reach() {
        let mut fixture = Fixture::new();
        with_book(&mut fixture);
        if let Some(book) = fixture.config.travel_source {
            fixture.world.remove_entity(book);
        }
        let navigator = WaypointNavigator::new(TravelStyle::Magery.route());

        assert!(!navigator.travel_home(&fixture.ctx()).await.unwrap());
        assert!(fixture.world.messages().iter().any(|m| m.contains("not found")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_for_travel_resource() {
        let mut fixture = Fixture::new();
        with_book(&mut fixture);
        fixture.world.set_travel_resource(Some(15));
        let navigator = WaypointNavigator::new(TravelStyle::Magery.route());

        assert!(navigator.travel_home(&fixture.ctx()).await.unwrap());

        let waiting: Vec<_> = fixture
            .world
            .messages()
            .into_iter()
            .filter(|m| m.contains("Waiting for mana"))
            .collect();
        assert_eq!(waiting.len(), 1);
        assert_eq!(fixture.world.position(), Position::new(500, 500, 0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_resource_does_not_block() {
        let mut fixture = Fixture::new();
        with_book(&mut fixture);
        fixture.world.set_travel_resource(None);
        let navigator = WaypointNavigator::new(TravelStyle::Magery.route());

        assert!(navigator.travel_home(&fixture.ctx()).await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_during_resource_wait() {
        let mut fixture = Fixture::new();
        with_book(&mut fixture);
        fixture.world.set_travel_resource(Some(0));
        fixture.control.stop();
        let navigator = WaypointNavigator::new(TravelStyle::Magery.route());

        let result = navigator.travel_home(&fixture.ctx()).await;

        assert!(matches!(result, Err(HarvestError::Stopped)));
    }
}
