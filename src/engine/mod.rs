//! Deal engine: config factory, status initializer, deal processor and
//! aggregator. Pure computation over explicit inputs; no I/O.

pub mod params;
pub mod dice;
pub mod status;
pub mod deal;
pub mod stats;

pub use deal::{process_deal, DealEngine};
pub use dice::{Dice, ScriptedDice};
pub use params::default_config;
pub use stats::{stats, TradeStats};
pub use status::{advance_recovery, init_status};
