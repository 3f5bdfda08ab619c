//! Harvest Attempt State Machine and feedback classification.
//!
//! One attempt issues a single tool use against one scanned tile, waits for
//! the world to report back through the journal, and classifies that text
//! into exactly one [`HarvestOutcome`].

use super::HarvestContext;
use super::tools::resolve_tool;
use crate::error::{HarvestError, HarvestResult};
use crate::models::Tile;
use crate::session::Session;
use crate::state::WaitOutcome;

/// Rate limiting by the world; the same tile is simply tried again later.
pub const WAIT_TEXTS: &[&str] = &["You must wait to perform another action"];

/// Tool does not apply to the targeted object.
pub const INVALID_TOOL_TEXTS: &[&str] = &["You can't use an axe on that."];

/// Nothing left to gather at the targeted spot, or it cannot be reached.
pub const NO_RESOURCE_TEXTS: &[&str] = &[
    "There is no wood here to harvest",
    "There is no wood here to chop",
    "There's not enough wood here to harvest.",
    "You cannot see that",
    "That is too far away",
];

/// Result of one harvest attempt, consumed by the control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarvestOutcome {
    Success,
    Retry,
    Depleted,
    /// No usable tool; the whole loop must halt
    NoTool,
}

/// What the journal said about the last action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    RateLimited,
    InvalidTarget,
    NoResource,
    Clear,
}

impl Feedback {
    /// Invalid targets and empty spots share the depleted semantics: neither
    /// is worth retrying from the current standing spot.
    pub fn outcome(self) -> HarvestOutcome {
        match self {
            Feedback::RateLimited => HarvestOutcome::Retry,
            Feedback::InvalidTarget | Feedback::NoResource => HarvestOutcome::Depleted,
            Feedback::Clear => HarvestOutcome::Success,
        }
    }
}

pub struct FeedbackRule {
    pub feedback: Feedback,
    pub patterns: &'static [&'static str],
}

/// Pattern sets in priority order; the first rule with any match wins.
pub const FEEDBACK_RULES: [FeedbackRule; 3] = [
    FeedbackRule {
        feedback: Feedback::RateLimited,
        patterns: WAIT_TEXTS,
    },
    FeedbackRule {
        feedback: Feedback::InvalidTarget,
        patterns: INVALID_TOOL_TEXTS,
    },
    FeedbackRule {
        feedback: Feedback::NoResource,
        patterns: NO_RESOURCE_TEXTS,
    },
];

/// Classify the last `window` journal lines.
///
/// Matching is case-sensitive substring containment. Total: anything no
/// rule recognises is [`Feedback::Clear`].
pub fn classify<S: AsRef<str>>(journal: &[S], window: usize) -> Feedback {
    let recent = &journal[journal.len().saturating_sub(window)..];

    FEEDBACK_RULES
        .iter()
        .find(|rule| {
            recent.iter().any(|line| {
                let line = line.as_ref();
                rule.patterns.iter().any(|pattern| line.contains(pattern))
            })
        })
        .map(|rule| rule.feedback)
        .unwrap_or(Feedback::Clear)
}

/// Perform one tool use against `tile` and classify the result.
///
/// Side effects are limited to the depletion cache (depleted outcomes), the
/// tile marker, and elapsed time.
pub async fn attempt(
    ctx: &HarvestContext<'_>,
    session: &mut Session,
    tile: &Tile,
) -> HarvestResult<HarvestOutcome> {
    let Some(tool) = resolve_tool(ctx.world, ctx.profile) else {
        ctx.say(&format!("No equipped {} found for harvesting.", ctx.profile.tool_name));
        return Ok(HarvestOutcome::NoTool);
    };

    session.mark_tile(ctx.world, tile, ctx.settings.mark_hue);
    ctx.world.clear_journal();
    ctx.world.use_object(tool.serial);

    match ctx
        .control
        .settle_until(|| ctx.world.has_target_cursor(), ctx.settings.target_timeout())
        .await
    {
        WaitOutcome::Satisfied => ctx.world.target_tile(tile),
        WaitOutcome::TimedOut => {
            tracing::debug!("No target cursor after using tool on ({}, {})", tile.x, tile.y);
        }
        WaitOutcome::Cancelled => return Err(HarvestError::Stopped),
    }

    ctx.control.settle(ctx.settings.harvest_settle()).await?;

    let feedback = classify(&ctx.world.journal(), ctx.settings.journal_window);
    match feedback {
        Feedback::RateLimited => {
            ctx.metrics.record_retry();
            ctx.control.settle(ctx.settings.retry_delay()).await?;
        }
        Feedback::InvalidTarget | Feedback::NoResource => {
            session.cache.mark_depleted(tile.x, tile.y);
            ctx.metrics.record_depleted();
        }
        Feedback::Clear => ctx.metrics.record_success(),
    }

    let outcome = feedback.outcome();
    tracing::debug!(
        "Attempt at ({}, {}, {}) kind 0x{:04X}: {:?} ({:?})",
        tile.x,
        tile.y,
        tile.z,
        tile.kind,
        outcome,
        feedback
    );
    ctx.status.record_attempt(*tile, outcome);

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_no_wood_is_depleted() {
        let journal = vec!["There is no wood here to harvest".to_string()];
        assert_eq!(classify(&journal, 20), Feedback::NoResource);
        assert_eq!(classify(&journal, 20).outcome(), HarvestOutcome::Depleted);
    }

    #[test]
    fn test_must_wait_is_retry() {
        let journal = ["You must wait to perform another action"];
        assert_eq!(classify(&journal, 20).outcome(), HarvestOutcome::Retry);
    }

    #[test]
    fn test_invalid_tool_is_depleted() {
        let journal = ["You can't use an axe on that."];
        assert_eq!(classify(&journal, 20), Feedback::InvalidTarget);
        assert_eq!(classify(&journal, 20).outcome(), HarvestOutcome::Depleted);
    }

    #[test]
    fn test_rate_limit_has_priority() {
        let journal = [
            "There is no wood here to harvest",
            "You must wait to perform another action",
        ];
        assert_eq!(classify(&journal, 20), Feedback::RateLimited);
    }

    #[test]
    fn test_invalid_tool_beats_no_resource() {
        let journal = ["That is too far away", "You can't use an axe on that."];
        assert_eq!(classify(&journal, 20), Feedback::InvalidTarget);
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let journal = ["there is no wood here to harvest"];
        assert_eq!(classify(&journal, 20), Feedback::Clear);
    }

    #[test]
    fn test_lines_outside_window_are_ignored() {
        let journal = [
            "You must wait to perform another action",
            "You put some logs into your backpack.",
            "You hack at the tree for a while.",
        ];
        assert_eq!(classify(&journal, 2), Feedback::Clear);
        assert_eq!(classify(&journal, 3), Feedback::RateLimited);
    }

    #[test]
    fn test_empty_journal_is_success() {
        let journal: [&str; 0] = [];
        assert_eq!(classify(&journal, 20).outcome(), HarvestOutcome::Success);
    }

    proptest! {
        #[test]
        fn prop_classification_is_total(lines in proptest::collection::vec(".*", 0..8), window in 0usize..10) {
            let outcome = classify(&lines, window).outcome();
            prop_assert!(matches!(
                outcome,
                HarvestOutcome::Success | HarvestOutcome::Retry | HarvestOutcome::Depleted
            ));
        }
    }
}
