//! Aggregate statistics over a set of actor statuses.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::ActorTradeStatus;

/// Summary across every actor in a trading population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeStats {
    pub actor_count: usize,
    pub mean_inventory: f64,
    pub total_successful_deals: u64,
    pub total_violent_deals: u64,
    /// Sum of every actor's `times_stabbed`.
    pub total_stabbings: u64,
    pub total_profit: Decimal,
    /// Actors currently stabbed.
    pub wounded_count: usize,
    pub mean_suspicion: f64,
    /// 0 for an empty population.
    pub max_wanted_level: u8,
}

impl fmt::Display for TradeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "actors={} avg_inv={:.1} deals={} violent={} stabbings={} profit={:.2} wounded={} avg_sus={:.1} max_wanted={}",
            self.actor_count,
            self.mean_inventory,
            self.total_successful_deals,
            self.total_violent_deals,
            self.total_stabbings,
            self.total_profit,
            self.wounded_count,
            self.mean_suspicion,
            self.max_wanted_level,
        )
    }
}

/// Compute [`TradeStats`]. Means divide by `max(count, 1)` so an empty
/// set yields zeros.
pub fn stats<'a, I>(statuses: I) -> TradeStats
where
    I: IntoIterator<Item = &'a ActorTradeStatus>,
{
    let mut actor_count = 0usize;
    let mut inventory_sum = 0u64;
    let mut suspicion_sum = 0u64;
    let mut total_successful_deals = 0u64;
    let mut total_violent_deals = 0u64;
    let mut total_stabbings = 0u64;
    let mut total_profit = Decimal::ZERO;
    let mut wounded_count = 0usize;
    let mut max_wanted_level = 0u8;

    for s in statuses {
        actor_count += 1;
        inventory_sum += u64::from(s.inventory);
        suspicion_sum += u64::from(s.suspicion);
        total_successful_deals += u64::from(s.successful_deals);
        total_violent_deals += u64::from(s.violent_deals);
        total_stabbings += u64::from(s.times_stabbed);
        total_profit += s.total_profit;
        if s.is_stabbed {
            wounded_count += 1;
        }
        max_wanted_level = max_wanted_level.max(s.wanted_level);
    }

    let divisor = actor_count.max(1) as f64;

    TradeStats {
        actor_count,
        mean_inventory: inventory_sum as f64 / divisor,
        total_successful_deals,
        total_violent_deals,
        total_stabbings,
        total_profit,
        wounded_count,
        mean_suspicion: suspicion_sum as f64 / divisor,
        max_wanted_level,
    }
}
