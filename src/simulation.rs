//! Round-based trade simulation.
//!
//! Drives the engine through the registry: every round is one in-game
//! hour, in which two random actors may strike a deal. Used by the binary
//! and as a soak test for the engine invariants.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info, warn};

use crate::engine::dice::{roll_between, Dice};
use crate::engine::stats::TradeStats;
use crate::registry::TradeRegistry;
use crate::types::{DealOutcome, TradeConfig, TradeError};

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// How long and how hard to run a simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Rounds to play; one round is one in-game hour.
    pub rounds: u32,
    /// Fixed seed for reproducible runs. `None` seeds from entropy.
    pub seed: Option<u64>,
    /// Largest quantity a single deal asks for.
    pub max_quantity: u32,
    /// Hour of day the first round starts at.
    pub start_hour: u32,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            rounds: 48,
            seed: None,
            max_quantity: 10,
            start_hour: 8,
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// What happened over a simulation run.
#[derive(Debug, Clone)]
pub struct SimulationReport {
    pub rounds: u32,
    pub idle_rounds: u32,
    pub outcomes: HashMap<DealOutcome, u32>,
    pub witnessed: u32,
    pub stats: TradeStats,
}

impl SimulationReport {
    fn empty(stats: TradeStats) -> Self {
        Self {
            rounds: 0,
            idle_rounds: 0,
            outcomes: HashMap::new(),
            witnessed: 0,
            stats,
        }
    }

    pub fn count(&self, outcome: DealOutcome) -> u32 {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    /// Deals attempted (including rejections).
    pub fn deals(&self) -> u32 {
        self.outcomes.values().sum()
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: Vec<String> = DealOutcome::ALL
            .iter()
            .map(|o| format!("{o}={}", self.count(*o)))
            .collect();
        write!(
            f,
            "rounds={} idle={} deals={} [{}] witnessed={} | {}",
            self.rounds,
            self.idle_rounds,
            self.deals(),
            counts.join(" "),
            self.witnessed,
            self.stats,
        )
    }
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

pub struct Simulation {
    config: TradeConfig,
    settings: SimulationSettings,
}

impl Simulation {
    pub fn new(config: TradeConfig, settings: SimulationSettings) -> Result<Self, TradeError> {
        config.validate()?;
        Ok(Self { config, settings })
    }

    /// Play every round against `registry`, committing each deal.
    ///
    /// Does nothing when trading is disabled in the config.
    pub fn run<D: Dice + ?Sized>(
        &self,
        registry: &mut TradeRegistry,
        dice: &mut D,
    ) -> Result<SimulationReport, TradeError> {
        if !self.config.enabled {
            warn!("Trading is disabled in config; skipping simulation");
            return Ok(SimulationReport::empty(registry.stats()));
        }

        let mut report = SimulationReport::empty(registry.stats());
        let max_quantity = self.settings.max_quantity.max(1);

        for round in 0..self.settings.rounds {
            let hour = (self.settings.start_hour + round) % 24;
            if round > 0 && hour == 0 {
                registry.advance_day(1);
                debug!(round, "A day passed");
            }
            report.rounds += 1;

            let ids = registry.actor_ids();
            if ids.len() < 2 || dice.roll() >= self.config.trading_intensity {
                report.idle_rounds += 1;
                continue;
            }

            let seller_idx = roll_between(&mut *dice, 0, ids.len() as u32 - 1) as usize;
            // pick from the others so seller != buyer
            let mut buyer_idx = roll_between(&mut *dice, 0, ids.len() as u32 - 2) as usize;
            if buyer_idx >= seller_idx {
                buyer_idx += 1;
            }
            let quantity = roll_between(&mut *dice, 1, max_quantity);

            let deal = registry.execute(
                &self.config,
                &ids[seller_idx],
                &ids[buyer_idx],
                quantity,
                hour,
                &mut *dice,
            )?;

            info!(
                round,
                hour,
                seller = %deal.seller_name,
                buyer = %deal.buyer_name,
                quantity,
                outcome = %deal.outcome,
                total = %deal.total_price,
                "{}",
                deal.details
            );

            *report.outcomes.entry(deal.outcome).or_insert(0) += 1;
            if deal.witnessed {
                report.witnessed += 1;
            }
        }

        report.stats = registry.stats();
        info!(
            rounds = report.rounds,
            deals = report.deals(),
            idle = report.idle_rounds,
            "Simulation complete"
        );
        Ok(report)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
