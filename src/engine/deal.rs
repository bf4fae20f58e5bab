//! Deal processor.
//!
//! Resolves one attempted deal between a seller and a buyer into exactly
//! one outcome and returns new status snapshots for both. Nothing here
//! touches the caller's stored records or any global state.
//!
//! Draws are taken in a fixed order so a seeded source replays a deal
//! exactly: price variation, outcome roll, stabbing roll (violence only),
//! witnessed roll. A rejected deal consumes no draws.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use tracing::debug;
use uuid::Uuid;

use super::dice::Dice;
use super::status::init_status;
use crate::types::{
    bump_score, ActorTradeStatus, DealOutcome, DealRequest, DealResolution, InjuryKind,
    TradeConfig, TradeDeal, TradeError,
};

/// Unit prices never drop below this.
pub const PRICE_FLOOR: Decimal = dec!(0.50);
/// Price factor applied when the buyer talks the seller down.
pub const NEGOTIATED_FACTOR: Decimal = dec!(0.70);
/// Violence multiplier during risky hours.
pub const NIGHT_RISK_MULTIPLIER: f64 = 1.5;
/// Share of violent deals that end in a stabbing.
pub const STABBING_SHARE: f64 = 0.70;
/// Chance that a deal has a witness.
pub const WITNESS_PROBABILITY: f64 = 0.30;

const STAB_VICTIM_SUSPICION: u8 = 15;
const STAB_AGGRESSOR_SUSPICION: u8 = 25;
const STAB_AGGRESSOR_WANTED: u8 = 20;
const ARREST_WANTED: u8 = 35;
const ARREST_SUSPICION: u8 = 50;
const NEGOTIATION_REPUTATION: u8 = 5;

/// Whether `hour` falls in the high-risk window [22, 24) ∪ [0, 6).
pub fn is_risky_hour(hour: u32) -> bool {
    let hour = hour % 24;
    hour >= 22 || hour < 6
}

/// Scalar applied to the violence probability for the given hour.
pub fn time_risk_multiplier(config: &TradeConfig, hour: u32) -> f64 {
    if config.time_of_day_factor && is_risky_hour(hour) {
        NIGHT_RISK_MULTIPLIER
    } else {
        1.0
    }
}

/// Pick the outcome for roll `r`.
///
/// The probabilities are independent absolute thresholds checked in order
/// (violence, arrest, negotiation), not a cumulative partition of [0, 1).
/// With the default values the arrest branch can never fire because its
/// threshold sits below the violence threshold.
pub fn select_outcome(config: &TradeConfig, r: f64, risk_multiplier: f64) -> DealOutcome {
    if r < config.violence_probability * risk_multiplier {
        DealOutcome::Violence
    } else if r < config.arrest_probability {
        DealOutcome::Arrest
    } else if r < config.negotiation_probability {
        DealOutcome::Negotiated
    } else {
        DealOutcome::Success
    }
}

/// Unit price for a uniform draw `u`: `base * (1 + variation)` where the
/// variation spans `[-price_variation, +price_variation)` in 0.01% steps,
/// floored at [`PRICE_FLOOR`].
///
/// Fails with [`TradeError::Overflow`] only for a base price beyond what
/// [`TradeConfig::validate`] accepts.
pub fn unit_price(config: &TradeConfig, u: f64) -> Result<Decimal, TradeError> {
    let variation = (u * 2.0 - 1.0) * config.price_variation;
    let variation = Decimal::from_f64(variation)
        .unwrap_or(Decimal::ZERO)
        .round_dp(4);
    let price = config
        .base_price
        .checked_mul(Decimal::ONE + variation)
        .ok_or_else(|| TradeError::Overflow(format!("unit price for base {}", config.base_price)))?;
    Ok(price.max(PRICE_FLOOR))
}

/// Resolve one deal.
///
/// Returns `Err` for a zero quantity, and [`TradeError::Overflow`] when an
/// amount leaves `Decimal` range, which a validated config cannot reach.
/// A seller who cannot cover the quantity, or a buyer whose inventory
/// cannot hold it, gets a [`DealOutcome::Rejected`] deal and both statuses
/// back unchanged.
pub fn process_deal<D: Dice + ?Sized>(
    config: &TradeConfig,
    seller: &ActorTradeStatus,
    buyer: &ActorTradeStatus,
    request: &DealRequest,
    dice: &mut D,
) -> Result<DealResolution, TradeError> {
    let quantity = request.quantity;
    if quantity == 0 {
        return Err(TradeError::InvalidQuantity);
    }

    if !seller.can_supply(quantity) {
        debug!(
            seller = %request.seller.id,
            inventory = seller.inventory,
            quantity,
            "Deal rejected: insufficient inventory"
        );
        let details = format!(
            "{} only has {} units, cannot sell {}",
            request.seller.name, seller.inventory, quantity
        );
        return Ok(rejected(request, seller, buyer, details));
    }

    if buyer.inventory.checked_add(quantity).is_none() {
        debug!(
            buyer = %request.buyer.id,
            inventory = buyer.inventory,
            quantity,
            "Deal rejected: buyer inventory full"
        );
        let details = format!(
            "{} already holds {} units, cannot take {} more",
            request.buyer.name, buyer.inventory, quantity
        );
        return Ok(rejected(request, seller, buyer, details));
    }

    let price = unit_price(config, dice.roll())?;
    let risk = time_risk_multiplier(config, request.hour);
    let outcome = select_outcome(config, dice.roll(), risk);
    let qty = Decimal::from(quantity);

    let (deal_price, total, profit, injury, details, new_seller, new_buyer) = match outcome {
        DealOutcome::Violence => {
            if dice.roll() < STABBING_SHARE {
                let buyer_after = ActorTradeStatus {
                    is_stabbed: true,
                    stabbed_by: Some(request.seller.name.clone()),
                    times_stabbed: buyer.times_stabbed + 1,
                    days_until_healed: config.recovery_days,
                    suspicion: bump_score(buyer.suspicion, STAB_VICTIM_SUSPICION),
                    ..buyer.clone()
                };
                let seller_after = ActorTradeStatus {
                    suspicion: bump_score(seller.suspicion, STAB_AGGRESSOR_SUSPICION),
                    wanted_level: bump_score(seller.wanted_level, STAB_AGGRESSOR_WANTED),
                    ..seller.clone()
                };
                let details = format!(
                    "{} stabbed {} during the deal ({} damage, {} days to recover)",
                    request.seller.name,
                    request.buyer.name,
                    config.stabbing_damage,
                    config.recovery_days
                );
                (
                    price,
                    Decimal::ZERO,
                    None,
                    Some(InjuryKind::Stabbing),
                    details,
                    seller_after,
                    buyer_after,
                )
            } else {
                let details = format!(
                    "The deal between {} and {} turned into a serious fight",
                    request.seller.name, request.buyer.name
                );
                (
                    price,
                    Decimal::ZERO,
                    None,
                    Some(InjuryKind::Serious),
                    details,
                    seller.clone(),
                    buyer.clone(),
                )
            }
        }
        DealOutcome::Arrest => {
            let seller_after = ActorTradeStatus {
                wanted_level: bump_score(seller.wanted_level, ARREST_WANTED),
                suspicion: bump_score(seller.suspicion, ARREST_SUSPICION),
                ..seller.clone()
            };
            let details = format!(
                "Police caught {} selling to {}",
                request.seller.name, request.buyer.name
            );
            (
                price,
                Decimal::ZERO,
                None,
                None,
                details,
                seller_after,
                buyer.clone(),
            )
        }
        // success or negotiated
        _ => {
            let negotiated = outcome == DealOutcome::Negotiated;
            let charged = if negotiated {
                price * NEGOTIATED_FACTOR
            } else {
                price
            };
            let (total, profit) = settle(charged, config.base_price, qty)?;
            let (seller_after, mut buyer_after) = transfer(seller, buyer, quantity, total, profit)?;
            let details = if negotiated {
                buyer_after.reputation = bump_score(buyer.reputation, NEGOTIATION_REPUTATION);
                format!(
                    "{} talked {} down to {:.2} per unit for {} units",
                    request.buyer.name, request.seller.name, charged, quantity
                )
            } else {
                format!(
                    "{} sold {} units to {} at {:.2} each",
                    request.seller.name, quantity, request.buyer.name, charged
                )
            };
            (
                charged,
                total,
                Some(profit),
                Some(InjuryKind::None),
                details,
                seller_after,
                buyer_after,
            )
        }
    };

    let witnessed = dice.roll() < WITNESS_PROBABILITY;

    debug!(
        seller = %request.seller.id,
        buyer = %request.buyer.id,
        quantity,
        outcome = %outcome,
        unit_price = %deal_price,
        total = %total,
        witnessed,
        "Deal resolved"
    );

    let deal = new_deal(request, deal_price, total, outcome, profit, injury, details, witnessed);
    Ok(DealResolution {
        deal,
        seller: new_seller,
        buyer: new_buyer,
    })
}

/// Total paid and seller profit for `qty` units charged at `charged`.
fn settle(charged: Decimal, base_price: Decimal, qty: Decimal) -> Result<(Decimal, Decimal), TradeError> {
    let overflow = || TradeError::Overflow(format!("{qty} units at {charged}"));
    let total = charged.checked_mul(qty).ok_or_else(overflow)?;
    let cost = base_price.checked_mul(qty).ok_or_else(overflow)?;
    let profit = total.checked_sub(cost).ok_or_else(overflow)?;
    Ok((total, profit))
}

/// Move `quantity` units and `total` money between the two parties.
///
/// The guard has already checked that the buyer can hold the units.
fn transfer(
    seller: &ActorTradeStatus,
    buyer: &ActorTradeStatus,
    quantity: u32,
    total: Decimal,
    profit: Decimal,
) -> Result<(ActorTradeStatus, ActorTradeStatus), TradeError> {
    let total_profit = seller
        .total_profit
        .checked_add(profit)
        .ok_or_else(|| TradeError::Overflow(format!("profit of {}", seller.actor_id)))?;
    let total_spent = buyer
        .total_spent
        .checked_add(total)
        .ok_or_else(|| TradeError::Overflow(format!("spending of {}", buyer.actor_id)))?;

    let seller_after = ActorTradeStatus {
        inventory: seller.inventory - quantity,
        total_sold: seller.total_sold + u64::from(quantity),
        total_profit,
        successful_deals: seller.successful_deals + 1,
        ..seller.clone()
    };
    let buyer_after = ActorTradeStatus {
        inventory: buyer.inventory + quantity,
        total_bought: buyer.total_bought + u64::from(quantity),
        total_spent,
        ..buyer.clone()
    };
    Ok((seller_after, buyer_after))
}

/// A rejected deal: nothing priced, nothing moved, no witness.
fn rejected(
    request: &DealRequest,
    seller: &ActorTradeStatus,
    buyer: &ActorTradeStatus,
    details: String,
) -> DealResolution {
    let deal = new_deal(
        request,
        Decimal::ZERO,
        Decimal::ZERO,
        DealOutcome::Rejected,
        None,
        None,
        details,
        false,
    );
    DealResolution {
        deal,
        seller: seller.clone(),
        buyer: buyer.clone(),
    }
}

#[allow(clippy::too_many_arguments)]
/// The id and timestamp come from uuid v4 and the wall clock, not from the
/// dice, so replaying a seed reproduces everything about a deal but those
/// two fields.
fn new_deal(
    request: &DealRequest,
    unit_price: Decimal,
    total_price: Decimal,
    outcome: DealOutcome,
    profit: Option<Decimal>,
    injury: Option<InjuryKind>,
    details: String,
    witnessed: bool,
) -> TradeDeal {
    TradeDeal {
        id: format!("deal-{}", Uuid::new_v4()),
        timestamp: Utc::now(),
        seller_id: request.seller.id.clone(),
        seller_name: request.seller.name.clone(),
        buyer_id: request.buyer.id.clone(),
        buyer_name: request.buyer.name.clone(),
        quantity: request.quantity,
        unit_price,
        total_price,
        outcome,
        profit,
        injury,
        details,
        witnessed,
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// A validated config paired with its own seeded generator.
///
/// Two engines built with the same config and seed resolve the same
/// sequence of deals identically.
pub struct DealEngine {
    config: TradeConfig,
    rng: StdRng,
}

impl DealEngine {
    /// Engine seeded from OS entropy.
    pub fn new(config: TradeConfig) -> Result<Self, TradeError> {
        config.validate()?;
        Ok(Self {
            config,
            rng: StdRng::from_entropy(),
        })
    }

    /// Engine with a fixed seed (for reproducible runs and tests).
    pub fn with_seed(config: TradeConfig, seed: u64) -> Result<Self, TradeError> {
        config.validate()?;
        Ok(Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn config(&self) -> &TradeConfig {
        &self.config
    }

    pub fn process(
        &mut self,
        seller: &ActorTradeStatus,
        buyer: &ActorTradeStatus,
        request: &DealRequest,
    ) -> Result<DealResolution, TradeError> {
        process_deal(&self.config, seller, buyer, request, &mut self.rng)
    }

    pub fn init_status(&mut self, actor_id: &str) -> ActorTradeStatus {
        init_status(actor_id, &mut self.rng)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
