//! Material Converter: process raw material in the backpack into its lighter form.

use super::HarvestContext;
use super::harvest::{Feedback, classify};
use super::tools::resolve_tool;
use crate::error::{HarvestError, HarvestResult};
use crate::state::WaitOutcome;

/// Convert every raw stack in the backpack, one stack per tool use.
///
/// Stops when no raw material remains, when the tool disappears, or when a
/// conversion leaves the stack untouched twice in a row. Returns the number
/// of conversions that were not rate limited.
pub async fn convert_all(ctx: &HarvestContext<'_>) -> HarvestResult<u32> {
    if resolve_tool(ctx.world, ctx.profile).is_none() {
        ctx.say(&format!("No equipped {} found to convert material.", ctx.profile.tool_name));
        return Ok(0);
    }

    let mut conversions = 0;
    let mut stalled = None;

    loop {
        ctx.control.checkpoint().await?;

        let Some(tool) = resolve_tool(ctx.world, ctx.profile) else {
            tracing::warn!("Tool lost while converting");
            break;
        };
        let Some(raw) = ctx.world.find_in_backpack(ctx.profile.raw_graphic) else {
            break;
        };

        ctx.world.clear_journal();
        ctx.world.use_object(tool.serial);
        match ctx
            .control
            .settle_until(|| ctx.world.has_target_cursor(), ctx.settings.target_timeout())
            .await
        {
            WaitOutcome::Satisfied => ctx.world.target_item(raw.serial),
            WaitOutcome::TimedOut => tracing::debug!("No target cursor for conversion"),
            WaitOutcome::Cancelled => return Err(HarvestError::Stopped),
        }
        ctx.control.settle(ctx.settings.convert_settle()).await?;

        if classify(&ctx.world.journal(), ctx.settings.journal_window) == Feedback::RateLimited {
            ctx.control.settle(ctx.settings.retry_delay()).await?;
            continue;
        }

        let left = ctx.world.find_in_backpack(ctx.profile.raw_graphic);
        if left == Some(raw) {
            if stalled == Some(raw) {
                tracing::warn!("Stack {} is not converting, giving up", raw.serial);
                break;
            }
            stalled = Some(raw);
            continue;
        }

        stalled = None;
        conversions += 1;
        ctx.metrics.record_conversion();
    }

    if conversions > 0 {
        tracing::info!("Converted {} stacks", conversions);
    }
    Ok(conversions)
}
