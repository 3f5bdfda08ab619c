// State management module
//
// This module provides the StatusManager, which wraps RunStatus with
// thread-safe access and emits change events for observers, and RunControl,
// the run/pause flag shared with the control loop.

pub mod run_control;

pub use run_control::{RunControl, WaitOutcome};

use crate::models::{Load, LoopPhase, Position, RunMode, RunStatus, Tile};
use crate::services::harvest::HarvestOutcome;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::broadcast;

/// Change events emitted when the run status is modified
///
/// These events notify observers (status displays, log shippers) about
/// progress without requiring them to poll the status.
#[derive(Clone, Debug, PartialEq)]
pub enum StatusChange {
    /// Run/pause flag changed
    ModeChanged { mode: RunMode },

    /// Control loop entered a new phase
    PhaseChanged { phase: LoopPhase },

    /// Waypoint cursor or route changed
    WaypointChanged { index: usize, count: usize },

    /// One harvest attempt was classified
    TileAttempted { tile: Tile, outcome: HarvestOutcome },

    /// User-facing status message
    Message { text: String },

    /// Status has been reset
    StatusReset,
}

/// Thread-safe run status with event emission
///
/// # Usage
///
/// - [`read()`](Self::read) for reading fields through a closure
/// - [`update()`](Self::update) for mutations with automatic event emission
/// - [`subscribe()`](Self::subscribe) for listening to status changes
pub struct StatusManager {
    status: Arc<RwLock<RunStatus>>,

    /// Broadcast channel for status change events
    status_tx: broadcast::Sender<StatusChange>,
}

impl StatusManager {
    /// Create a new StatusManager with a broadcast buffer of 100 events
    pub fn new() -> Self {
        let (status_tx, _) = broadcast::channel(100);
        Self {
            status: Arc::new(RwLock::new(RunStatus::default())),
            status_tx,
        }
    }

    /// Clone of the current status.
    pub fn snapshot(&self) -> RunStatus {
        self.status
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&RunStatus) -> R,
    {
        let status = self.status.read().unwrap_or_else(PoisonError::into_inner);
        f(&status)
    }

    /// Apply `update_fn`, detect what changed, and emit the matching events.
    ///
    /// Returns the events that were emitted.
    pub fn update<F>(&self, update_fn: F) -> Vec<StatusChange>
    where
        F: FnOnce(&mut RunStatus),
    {
        let mut status = self.status.write().unwrap_or_else(PoisonError::into_inner);
        let old_status = status.clone();

        update_fn(&mut status);

        let changes = Self::detect_changes(&old_status, &status);
        for change in &changes {
            // Nobody listening is fine
            let _ = self.status_tx.send(change.clone());
        }

        changes
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StatusChange> {
        self.status_tx.subscribe()
    }

    fn emit(&self, change: StatusChange) -> StatusChange {
        let _ = self.status_tx.send(change.clone());
        change
    }

    fn detect_changes(old: &RunStatus, new: &RunStatus) -> Vec<StatusChange> {
        let mut changes = Vec::new();

        if old.mode != new.mode {
            changes.push(StatusChange::ModeChanged { mode: new.mode });
        }

        if old.phase != new.phase {
            changes.push(StatusChange::PhaseChanged { phase: new.phase });
        }

        if old.waypoint_index != new.waypoint_index || old.waypoint_count != new.waypoint_count {
            changes.push(StatusChange::WaypointChanged {
                index: new.waypoint_index,
                count: new.waypoint_count,
            });
        }

        if let Some(text) = &new.last_message
            && old.last_message != new.last_message
        {
            changes.push(StatusChange::Message { text: text.clone() });
        }

        changes
    }

    // Convenience methods for common updates

    pub fn set_mode(&self, mode: RunMode) -> Vec<StatusChange> {
        self.update(|status| status.mode = mode)
    }

    pub fn set_phase(&self, phase: LoopPhase) -> Vec<StatusChange> {
        self.update(|status| status.phase = phase)
    }

    pub fn set_waypoint(&self, index: usize, count: usize) -> Vec<StatusChange> {
        self.update(|status| {
            status.waypoint_index = index;
            status.waypoint_count = count;
        })
    }

    /// Record the avatar's position and load as seen at the top of a tick.
    pub fn observe(&self, position: Position, load: Load) -> Vec<StatusChange> {
        self.update(|status| {
            status.position = Some(position);
            status.load = Some(load);
        })
    }

    pub fn record_attempt(&self, tile: Tile, outcome: HarvestOutcome) -> Vec<StatusChange> {
        let mut changes = self.update(|status| status.current_tile = Some(tile));
        changes.push(self.emit(StatusChange::TileAttempted { tile, outcome }));
        changes
    }

    /// Publish a user-facing message; repeated texts are still emitted.
    pub fn announce(&self, text: impl Into<String>) -> Vec<StatusChange> {
        let text = text.into();
        let mut status = self.status.write().unwrap_or_else(PoisonError::into_inner);
        status.last_message = Some(text.clone());
        drop(status);
        vec![self.emit(StatusChange::Message { text })]
    }

    pub fn reset(&self) -> Vec<StatusChange> {
        let mut changes = self.update(|status| status.reset());
        changes.push(self.emit(StatusChange::StatusReset));
        changes
    }
}

impl Default for StatusManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for StatusManager {
    fn clone(&self) -> Self {
        Self {
            status: Arc::clone(&self.status),
            status_tx: self.status_tx.clone(),
        }
    }
}
