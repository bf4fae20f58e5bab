//! Actor registry, the caller-side owner of trade statuses.
//!
//! Holds the authoritative status for every actor plus the deal log.
//! Every deal goes through `&mut self`, so two deals touching the same
//! actor can never read the same stale inventory.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::engine::dice::Dice;
use crate::engine::stats::{stats, TradeStats};
use crate::engine::status::{advance_recovery, init_status};
use crate::engine::process_deal;
use crate::types::{ActorIdentity, ActorTradeStatus, DealRequest, TradeConfig, TradeDeal, TradeError};

/// An actor known to the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisteredActor {
    pub name: String,
    pub status: ActorTradeStatus,
}

/// Authoritative actor statuses and the append-only deal log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeRegistry {
    actors: BTreeMap<String, RegisteredActor>,
    deals: Vec<TradeDeal>,
}

impl TradeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an actor, initialising a fresh status on first join.
    /// Joining again is a no-op and returns the existing status.
    pub fn join<D: Dice + ?Sized>(&mut self, id: &str, name: &str, dice: &mut D) -> &ActorTradeStatus {
        let actor = self.actors.entry(id.to_string()).or_insert_with(|| {
            let status = init_status(id, dice);
            info!(actor_id = id, name, inventory = status.inventory, "Actor joined trading");
            RegisteredActor {
                name: name.to_string(),
                status,
            }
        });
        &actor.status
    }

    /// Drop an actor. Their past deals stay in the log.
    pub fn remove(&mut self, id: &str) -> Option<RegisteredActor> {
        self.actors.remove(id)
    }

    pub fn status(&self, id: &str) -> Option<&ActorTradeStatus> {
        self.actors.get(id).map(|a| &a.status)
    }

    pub fn identity(&self, id: &str) -> Option<ActorIdentity> {
        self.actors.get(id).map(|a| ActorIdentity::new(id, &a.name))
    }

    pub fn actor_ids(&self) -> Vec<String> {
        self.actors.keys().cloned().collect()
    }

    pub fn statuses(&self) -> impl Iterator<Item = &ActorTradeStatus> {
        self.actors.values().map(|a| &a.status)
    }

    pub fn deals(&self) -> &[TradeDeal] {
        &self.deals
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    /// Run one deal and commit its result: both statuses are replaced and
    /// the deal is appended to the log.
    pub fn execute<D: Dice + ?Sized>(
        &mut self,
        config: &TradeConfig,
        seller_id: &str,
        buyer_id: &str,
        quantity: u32,
        hour: u32,
        dice: &mut D,
    ) -> Result<&TradeDeal, TradeError> {
        if seller_id == buyer_id {
            return Err(TradeError::SelfDeal(seller_id.to_string()));
        }
        let seller = self
            .actors
            .get(seller_id)
            .ok_or_else(|| TradeError::UnknownActor(seller_id.to_string()))?;
        let buyer = self
            .actors
            .get(buyer_id)
            .ok_or_else(|| TradeError::UnknownActor(buyer_id.to_string()))?;

        let request = DealRequest::new(
            ActorIdentity::new(seller_id, &seller.name),
            ActorIdentity::new(buyer_id, &buyer.name),
            quantity,
        )
        .at_hour(hour);

        let resolution = process_deal(config, &seller.status, &buyer.status, &request, dice)?;

        debug!(
            deal_id = %resolution.deal.id,
            outcome = %resolution.deal.outcome,
            "Committing deal"
        );

        if let Some(actor) = self.actors.get_mut(seller_id) {
            actor.status = resolution.seller;
        }
        if let Some(actor) = self.actors.get_mut(buyer_id) {
            actor.status = resolution.buyer;
        }
        self.deals.push(resolution.deal);

        // just pushed
        Ok(&self.deals[self.deals.len() - 1])
    }

    /// Let `days` pass for every actor's recovery countdown.
    pub fn advance_day(&mut self, days: u32) {
        for actor in self.actors.values_mut() {
            actor.status = advance_recovery(&actor.status, days);
        }
    }

    pub fn stats(&self) -> TradeStats {
        stats(self.statuses())
    }
}
