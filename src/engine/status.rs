//! Status initializer and recovery ticking.

use tracing::debug;

use super::dice::{roll_between, Dice};
use crate::types::ActorTradeStatus;

/// Fresh randomized status for an actor entering the trading system.
///
/// Draws inventory in [0, 99], reputation in [50, 89] and suspicion in
/// [0, 19], in that order. Everything else starts at zero.
pub fn init_status<D: Dice + ?Sized>(actor_id: &str, dice: &mut D) -> ActorTradeStatus {
    let inventory = roll_between(dice, 0, 99);
    let reputation = roll_between(dice, 50, 89) as u8;
    let suspicion = roll_between(dice, 0, 19) as u8;

    debug!(actor_id, inventory, reputation, suspicion, "Trade status initialised");

    ActorTradeStatus {
        inventory,
        reputation,
        suspicion,
        ..ActorTradeStatus::empty(actor_id)
    }
}

/// Let `days` pass for a wounded actor. Clears the wound once the
/// countdown reaches zero; healthy actors come back unchanged.
pub fn advance_recovery(status: &ActorTradeStatus, days: u32) -> ActorTradeStatus {
    if !status.is_stabbed && status.days_until_healed == 0 {
        return status.clone();
    }

    let remaining = status.days_until_healed.saturating_sub(days);
    if remaining == 0 {
        debug!(actor_id = %status.actor_id, "Actor healed");
        ActorTradeStatus {
            days_until_healed: 0,
            is_stabbed: false,
            stabbed_by: None,
            ..status.clone()
        }
    } else {
        ActorTradeStatus {
            days_until_healed: remaining,
            ..status.clone()
        }
    }
}
