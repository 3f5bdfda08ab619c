// Harvest metrics module
//
// Lightweight counters for what the control loop did, logged periodically and
// on shutdown.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Run-wide harvest counters
///
/// Uses atomic operations so the binary can read a summary through a shared
/// `Arc` while the loop keeps recording.
#[derive(Debug)]
pub struct HarvestMetrics {
    /// Attempts classified as a successful harvest
    pub harvests: AtomicU64,

    /// Attempts rejected by the world's rate limit
    pub retries: AtomicU64,

    /// Tiles marked depleted (no resource or invalid target)
    pub depleted: AtomicU64,

    /// Raw material stacks converted
    pub conversions: AtomicU64,

    /// Units moved onto the secondary carrier
    pub offloaded: AtomicU64,

    /// Units moved into the drop container
    pub deposited: AtomicU64,

    pub travels: AtomicU64,

    pub travel_failures: AtomicU64,

    /// Round trips home caused by being over capacity
    pub unload_trips: AtomicU64,

    start_time: Instant,
}

impl HarvestMetrics {
    pub fn new() -> Self {
        Self {
            harvests: AtomicU64::new(0),
            retries: AtomicU64::new(0),
            depleted: AtomicU64::new(0),
            conversions: AtomicU64::new(0),
            offloaded: AtomicU64::new(0),
            deposited: AtomicU64::new(0),
            travels: AtomicU64::new(0),
            travel_failures: AtomicU64::new(0),
            unload_trips: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_success(&self) {
        self.harvests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_retry(&self) {
        self.retries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_depleted(&self) {
        self.depleted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_conversion(&self) {
        self.conversions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_offload(&self, amount: u32) {
        self.offloaded.fetch_add(u64::from(amount), Ordering::Relaxed);
    }

    pub fn record_deposit(&self, amount: u32) {
        self.deposited.fetch_add(u64::from(amount), Ordering::Relaxed);
    }

    pub fn record_travel(&self) {
        self.travels.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_travel_failure(&self) {
        self.travel_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unload_trip(&self) {
        self.unload_trips.fetch_add(1, Ordering::Relaxed);
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Share of classified attempts that produced material, 0.0 when none ran.
    pub fn success_rate(&self) -> f64 {
        let harvests = self.harvests.load(Ordering::Relaxed);
        let total = harvests + self.retries.load(Ordering::Relaxed) + self.depleted.load(Ordering::Relaxed);
        if total > 0 {
            harvests as f64 / total as f64
        } else {
            0.0
        }
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        tracing::info!("=== Harvest Metrics Summary ===");
        tracing::info!("Uptime: {:.2}s", self.uptime().as_secs_f64());
        tracing::info!(
            "Attempts: {} harvested, {} retried, {} depleted ({:.0}% success)",
            self.harvests.load(Ordering::Relaxed),
            self.retries.load(Ordering::Relaxed),
            self.depleted.load(Ordering::Relaxed),
            self.success_rate() * 100.0
        );
        tracing::info!(
            "Material: {} conversions, {} offloaded, {} deposited",
            self.conversions.load(Ordering::Relaxed),
            self.offloaded.load(Ordering::Relaxed),
            self.deposited.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Travel: {} jumps, {} failures, {} unload trips",
            self.travels.load(Ordering::Relaxed),
            self.travel_failures.load(Ordering::Relaxed),
            self.unload_trips.load(Ordering::Relaxed)
        );
    }

    /// One-line progress, logged whenever the loop leaves a site.
    pub fn log_periodic(&self) {
        tracing::info!(
            "Metrics: {} harvests, {} travels, {} unload trips, uptime {:.0}s",
            self.harvests.load(Ordering::Relaxed),
            self.travels.load(Ordering::Relaxed),
            self.unload_trips.load(Ordering::Relaxed),
            self.uptime().as_secs_f64()
        );
    }
}

impl Default for HarvestMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = HarvestMetrics::new();
        assert_eq!(metrics.harvests.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.travels.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_record_attempts() {
        let metrics = HarvestMetrics::new();

        metrics.record_success();
        metrics.record_success();
        metrics.record_retry();
        metrics.record_depleted();

        assert_eq!(metrics.harvests.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.retries.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.depleted.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.success_rate(), 0.5);
    }

    #[test]
    fn test_success_rate_without_attempts() {
        assert_eq!(HarvestMetrics::new().success_rate(), 0.0);
    }

    #[test]
    fn test_material_amounts_accumulate() {
        let metrics = HarvestMetrics::new();

        metrics.record_offload(120);
        metrics.record_offload(30);
        metrics.record_deposit(500);

        assert_eq!(metrics.offloaded.load(Ordering::Relaxed), 150);
        assert_eq!(metrics.deposited.load(Ordering::Relaxed), 500);
    }

    #[test]
    fn test_travel_counters() {
        let metrics = HarvestMetrics::new();

        metrics.record_travel();
        metrics.record_travel_failure();
        metrics.record_unload_trip();

        assert_eq!(metrics.travels.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.travel_failures.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.unload_trips.load(Ordering::Relaxed), 1);
    }
}
