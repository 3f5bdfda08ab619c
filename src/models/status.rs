use super::types::{Load, Position, Tile};
use std::fmt;

/// Run/pause signal shared between the control loop and whoever drives it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    Running,
    #[default]
    Paused,
    /// Terminal: the loop exits at its next suspension point
    Stopped,
}

/// Where the main control loop currently is within a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopPhase {
    #[default]
    Paused,
    Scanning,
    Attempting,
    OverCapacity,
    SiteExhausted,
}

impl fmt::Display for LoopPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoopPhase::Paused => "paused",
            LoopPhase::Scanning => "scanning",
            LoopPhase::Attempting => "attempting",
            LoopPhase::OverCapacity => "over capacity",
            LoopPhase::SiteExhausted => "site exhausted",
        };
        f.write_str(name)
    }
}

/// Observable snapshot of a harvesting session.
///
/// Owned by [`crate::state::StatusManager`]; the control loop never reads
/// decisions back out of it, it is purely for observers.
#[derive(Clone, Debug, Default)]
pub struct RunStatus {
    pub mode: RunMode,
    pub phase: LoopPhase,
    pub position: Option<Position>,
    pub load: Option<Load>,
    pub current_tile: Option<Tile>,
    pub waypoint_index: usize,
    pub waypoint_count: usize,
    pub last_message: Option<String>,
}

impl RunStatus {
    pub fn is_running(&self) -> bool {
        self.mode == RunMode::Running
    }

    /// Short one-line summary for status displays.
    pub fn summary(&self) -> String {
        let mut line = format!("{}", self.phase);
        if self.waypoint_count > 0 {
            line.push_str(&format!(
                " | stop {}/{}",
                self.waypoint_index + 1,
                self.waypoint_count
            ));
        }
        if let Some(load) = self.load {
            line.push_str(&format!(" | load {}", load));
        }
        line
    }

    /// Reset per-session fields, keeping nothing from the previous run.
    pub fn reset(&mut self) {
        *self = RunStatus::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_status() {
        let status = RunStatus::default();
        assert!(!status.is_running());
        assert_eq!(status.phase, LoopPhase::Paused);
        assert_eq!(status.summary(), "paused");
    }

    #[test]
    fn test_summary_with_waypoint_and_load() {
        let status = RunStatus {
            phase: LoopPhase::Attempting,
            waypoint_index: 2,
            waypoint_count: 15,
            load: Some(Load::new(300, 400)),
            ..RunStatus::default()
        };
        assert_eq!(status.summary(), "attempting | stop 3/15 | load 300/400");
    }
}
