//! Capacity Manager: overweight detection, offloading, and unload trips home.

use super::HarvestContext;
use super::converter::convert_all;
use crate::error::HarvestResult;
use crate::models::{Load, Serial};
use crate::session::Session;

/// How an over-capacity condition was dealt with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityResolution {
    /// Converting and offloading in the field was enough
    Relieved,
    /// Went home and unloaded; `returned` tells whether travel back to the stop worked
    Unloaded { returned: bool },
    /// Could not get home; still over capacity
    Stranded,
}

/// Whether `load` is within `buffer` of the maximum.
pub fn is_over_capacity(load: Load, buffer: u32) -> bool {
    load.is_over(buffer)
}

fn over_capacity(ctx: &HarvestContext<'_>) -> bool {
    is_over_capacity(ctx.world.load(), ctx.settings.overweight_buffer)
}

/// Convert raw material and offload it to the carrier. Returns true when still over capacity.
pub async fn relieve(ctx: &HarvestContext<'_>) -> HarvestResult<bool> {
    convert_all(ctx).await?;
    offload_to_carrier(ctx).await?;
    Ok(over_capacity(ctx))
}

/// Move every converted stack from the backpack onto the secondary carrier.
///
/// Does nothing unless the carrier feature is enabled and configured. Returns
/// the number of units moved.
pub async fn offload_to_carrier(ctx: &HarvestContext<'_>) -> HarvestResult<u32> {
    let Some(carrier) = ctx.config.active_carrier() else {
        return Ok(0);
    };
    if ctx.world.find_item(carrier).is_none() {
        ctx.say("Pack animal not found; skipping offload.");
        return Ok(0);
    }

    let mut moved = 0;
    let mut last = None;
    loop {
        ctx.control.checkpoint().await?;

        let Some(stack) = ctx.world.find_in_backpack(ctx.profile.converted_graphic) else {
            break;
        };
        if last == Some(stack) {
            ctx.say("Pack animal is full.");
            break;
        }

        ctx.world.move_item(stack.serial, carrier, stack.amount);
        ctx.control.responsive_wait(ctx.settings.move_settle()).await?;

        moved += stack.amount;
        ctx.metrics.record_offload(stack.amount);
        last = Some(stack);
    }

    if moved > 0 {
        tracing::info!("Offloaded {} units to carrier {}", moved, carrier);
    }
    Ok(moved)
}

/// Empty harvested material into the drop container at home.
///
/// Both raw and converted material leave the backpack; converted material
/// also leaves the carrier when it is in use. With no container configured
/// the material simply stays where it is.
pub async fn deposit(ctx: &HarvestContext<'_>) -> HarvestResult<u32> {
    let Some(container) = ctx.config.drop_container else {
        tracing::debug!("No drop container configured, keeping material");
        return Ok(0);
    };
    if ctx.world.find_item(container).is_none() {
        ctx.say("Drop container not found.");
        return Ok(0);
    }

    ctx.world.use_object(container);
    ctx.control.settle(ctx.settings.move_settle()).await?;

    let backpack = ctx.world.backpack();
    let mut deposited = move_matching(ctx, backpack, container, |graphic| {
        ctx.profile.is_material(graphic)
    })
    .await?;

    if let Some(carrier) = ctx.config.active_carrier()
        && ctx.world.find_item(carrier).is_some()
    {
        let converted = ctx.profile.converted_graphic;
        deposited += move_matching(ctx, carrier, container, |graphic| graphic == converted).await?;
    }

    tracing::info!("Deposited {} units into {}", deposited, container);
    Ok(deposited)
}

async fn move_matching<F>(
    ctx: &HarvestContext<'_>,
    from: Serial,
    to: Serial,
    wanted: F,
) -> HarvestResult<u32>
where
    F: Fn(u32) -> bool,
{
    let mut moved = 0;
    for item in ctx.world.items_in_container(from, true) {
        if !wanted(item.graphic) {
            continue;
        }
        ctx.control.checkpoint().await?;
        ctx.world.move_item(item.serial, to, item.amount);
        ctx.control.responsive_wait(ctx.settings.move_settle()).await?;
        moved += item.amount;
        ctx.metrics.record_deposit(item.amount);
    }
    Ok(moved)
}

/// Travel home, convert, offload and deposit. False when home could not be reached.
pub async fn unload_trip(ctx: &HarvestContext<'_>, session: &mut Session) -> HarvestResult<bool> {
    if !session.navigator.travel_home(ctx).await? {
        ctx.say("Unable to travel home.");
        return Ok(false);
    }
    ctx.metrics.record_unload_trip();

    convert_all(ctx).await?;
    offload_to_carrier(ctx).await?;
    deposit(ctx).await?;
    Ok(true)
}

/// Bring the load back under the limit, going home if field measures are not enough.
///
/// After a successful unload the avatar travels back to the stop it left,
/// without advancing the cursor.
pub async fn handle_over_capacity(
    ctx: &HarvestContext<'_>,
    session: &mut Session,
) -> HarvestResult<CapacityResolution> {
    let load = ctx.world.load();
    tracing::info!("Over capacity at {}, relieving", load);
    session.clear_mark(ctx.world);

    if !relieve(ctx).await? {
        return Ok(CapacityResolution::Relieved);
    }

    ctx.say("Overweight: heading home to unload.");
    if !unload_trip(ctx, session).await? {
        ctx.control.responsive_wait(ctx.settings.idle_wait()).await?;
        return Ok(CapacityResolution::Stranded);
    }

    ctx.control.responsive_wait(ctx.settings.pre_travel_wait()).await?;
    let returned = session.navigator.travel_to_current(ctx).await?;
    Ok(CapacityResolution::Unloaded { returned })
}
