//! Shared types for the trade engine.
//!
//! These types form the data model used across all modules: the tunable
//! parameters, the per-actor status record, and the immutable deal record.
//! The engine, registry and storage layers all depend on them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound for reputation, suspicion and wanted level.
pub const SCORE_MAX: u8 = 100;

/// Hour used when the caller does not supply one.
pub const DEFAULT_HOUR: u32 = 12;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Process-wide tunable parameters. Read-only input to every deal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradeConfig {
    /// Feature flag for the trading system as a whole.
    pub enabled: bool,
    /// Chance per simulated round that any deal happens (0–1).
    pub trading_intensity: f64,

    // -- economics --
    /// Reference unit price; profit is measured against it.
    pub base_price: Decimal,
    /// Maximum relative price swing, e.g. 0.30 = ±30%.
    pub price_variation: f64,
    pub margin_target: f64,

    // -- outcome probabilities (success is the implicit remainder) --
    pub violence_probability: f64,
    pub arrest_probability: f64,
    pub negotiation_probability: f64,

    // -- violence severity --
    pub stabbing_damage: u32,
    pub recovery_days: u32,
    pub stabbing_fatality: f64,

    // -- environment --
    pub base_police_presence: f64,
    /// Raise violence risk during night hours.
    pub time_of_day_factor: bool,
}

impl Default for TradeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            trading_intensity: 0.5,
            base_price: dec!(2.5),
            price_variation: 0.30,
            margin_target: 0.40,
            violence_probability: 0.15,
            arrest_probability: 0.10,
            negotiation_probability: 0.25,
            stabbing_damage: 5,
            recovery_days: 7,
            stabbing_fatality: 0.05,
            base_police_presence: 0.20,
            time_of_day_factor: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Actor status
// ---------------------------------------------------------------------------

/// Persistent trading status of one actor.
///
/// Owned by the caller's registry and keyed by `actor_id`. The engine never
/// mutates a stored record; it returns fresh snapshots instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorTradeStatus {
    pub actor_id: String,
    /// Units currently held.
    pub inventory: u32,
    pub total_sold: u64,
    pub total_bought: u64,
    /// Lifetime profit as seller, measured against the base price. Signed.
    pub total_profit: Decimal,
    /// Lifetime spend as buyer.
    pub total_spent: Decimal,
    pub successful_deals: u32,
    pub violent_deals: u32,
    pub times_stabbed: u32,
    pub is_stabbed: bool,
    /// Name of whoever stabbed this actor, while wounded.
    pub stabbed_by: Option<String>,
    pub days_until_healed: u32,
    /// Standing with peers (0–100).
    pub reputation: u8,
    /// Police attention (0–100).
    pub suspicion: u8,
    /// Active pursuit (0–100).
    pub wanted_level: u8,
}

impl fmt::Display for ActorTradeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | inv={} sold={} bought={} profit={:.2} | rep={} sus={} wanted={}{}",
            self.actor_id,
            self.inventory,
            self.total_sold,
            self.total_bought,
            self.total_profit,
            self.reputation,
            self.suspicion,
            self.wanted_level,
            if self.is_stabbed {
                format!(" | wounded ({}d left)", self.days_until_healed)
            } else {
                String::new()
            },
        )
    }
}

impl ActorTradeStatus {
    /// A zeroed status. Fresh actors should go through
    /// [`init_status`](crate::engine::status::init_status) instead.
    pub fn empty(actor_id: &str) -> Self {
        Self {
            actor_id: actor_id.to_string(),
            inventory: 0,
            total_sold: 0,
            total_bought: 0,
            total_profit: Decimal::ZERO,
            total_spent: Decimal::ZERO,
            successful_deals: 0,
            violent_deals: 0,
            times_stabbed: 0,
            is_stabbed: false,
            stabbed_by: None,
            days_until_healed: 0,
            reputation: 0,
            suspicion: 0,
            wanted_level: 0,
        }
    }

    /// Whether the actor is holding at least `quantity` units.
    pub fn can_supply(&self, quantity: u32) -> bool {
        quantity <= self.inventory
    }
}

/// Add `delta` to a bounded score, saturating at [`SCORE_MAX`].
pub fn bump_score(score: u8, delta: u8) -> u8 {
    score.saturating_add(delta).min(SCORE_MAX)
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// How a deal resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DealOutcome {
    Rejected,
    Success,
    Negotiated,
    Violence,
    Arrest,
}

impl DealOutcome {
    pub const ALL: &'static [DealOutcome] = &[
        DealOutcome::Rejected,
        DealOutcome::Success,
        DealOutcome::Negotiated,
        DealOutcome::Violence,
        DealOutcome::Arrest,
    ];

    /// Whether goods and money change hands.
    pub fn is_transfer(&self) -> bool {
        matches!(self, DealOutcome::Success | DealOutcome::Negotiated)
    }
}

impl fmt::Display for DealOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DealOutcome::Rejected => write!(f, "rejected"),
            DealOutcome::Success => write!(f, "success"),
            DealOutcome::Negotiated => write!(f, "negotiated"),
            DealOutcome::Violence => write!(f, "violence"),
            DealOutcome::Arrest => write!(f, "arrest"),
        }
    }
}

impl std::str::FromStr for DealOutcome {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rejected" => Ok(DealOutcome::Rejected),
            "success" => Ok(DealOutcome::Success),
            "negotiated" => Ok(DealOutcome::Negotiated),
            "violence" => Ok(DealOutcome::Violence),
            "arrest" => Ok(DealOutcome::Arrest),
            _ => Err(anyhow::anyhow!("Unknown deal outcome: {s}")),
        }
    }
}

/// Classification of the violence sub-case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InjuryKind {
    None,
    Minor,
    Serious,
    Stabbing,
}

impl fmt::Display for InjuryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InjuryKind::None => write!(f, "none"),
            InjuryKind::Minor => write!(f, "minor"),
            InjuryKind::Serious => write!(f, "serious"),
            InjuryKind::Stabbing => write!(f, "stabbing"),
        }
    }
}

// ---------------------------------------------------------------------------
// Deal request / record
// ---------------------------------------------------------------------------

/// Who an actor is, as far as a deal record is concerned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorIdentity {
    pub id: String,
    pub name: String,
}

impl ActorIdentity {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
        }
    }
}

/// Input to a single deal.
#[derive(Debug, Clone)]
pub struct DealRequest {
    pub seller: ActorIdentity,
    pub buyer: ActorIdentity,
    pub quantity: u32,
    /// Hour of day (0–23); values past 23 wrap.
    pub hour: u32,
}

impl DealRequest {
    pub fn new(seller: ActorIdentity, buyer: ActorIdentity, quantity: u32) -> Self {
        Self {
            seller,
            buyer,
            quantity,
            hour: DEFAULT_HOUR,
        }
    }

    pub fn at_hour(mut self, hour: u32) -> Self {
        self.hour = hour;
        self
    }
}

/// Immutable record of one attempted deal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeDeal {
    /// `deal-<uuid v4>`. Not drawn from the dice, so it differs between
    /// replays of the same seed, as does `timestamp`.
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub seller_id: String,
    pub seller_name: String,
    pub buyer_id: String,
    pub buyer_name: String,
    pub quantity: u32,
    /// Unit price actually charged (after any discount).
    pub unit_price: Decimal,
    pub total_price: Decimal,
    pub outcome: DealOutcome,
    /// Seller profit against the base price; only set when goods moved.
    pub profit: Option<Decimal>,
    pub injury: Option<InjuryKind>,
    pub details: String,
    /// Whether anyone saw it happen.
    pub witnessed: bool,
}

impl fmt::Display for TradeDeal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} -> {} x{} @ {:.2} = {:.2}{} | {}",
            self.outcome,
            self.seller_name,
            self.buyer_name,
            self.quantity,
            self.unit_price,
            self.total_price,
            if self.witnessed { " (witnessed)" } else { "" },
            self.details,
        )
    }
}

/// Everything `process_deal` hands back to the caller.
#[derive(Debug, Clone)]
pub struct DealResolution {
    pub deal: TradeDeal,
    pub seller: ActorTradeStatus,
    pub buyer: ActorTradeStatus,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Contract violations at the engine and registry boundary.
///
/// Insufficient inventory is not an error; it resolves to
/// [`DealOutcome::Rejected`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TradeError {
    #[error("Deal quantity must be positive")]
    InvalidQuantity,

    #[error("Invalid trade configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown actor: {0}")]
    UnknownActor(String),

    #[error("Actor {0} cannot trade with themselves")]
    SelfDeal(String),

    #[error("Deal amount out of range: {0}")]
    Overflow(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
