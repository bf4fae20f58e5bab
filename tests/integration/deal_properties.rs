//! Engine properties over many seeded deals.
//!
//! Chains thousands of deals between a small population and checks the
//! invariants that must hold after every single one.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use trade_sim::engine::{init_status, process_deal, stats, DealEngine, ScriptedDice};
use trade_sim::types::*;

fn enabled() -> TradeConfig {
    TradeConfig {
        enabled: true,
        ..TradeConfig::default()
    }
}

fn identity(i: usize) -> ActorIdentity {
    ActorIdentity::new(&format!("npc-{i}"), &format!("NPC {i}"))
}

fn in_bounds(s: &ActorTradeStatus) -> bool {
    s.reputation <= SCORE_MAX && s.suspicion <= SCORE_MAX && s.wanted_level <= SCORE_MAX
}

#[test]
fn chained_deals_keep_invariants() {
    // No restocking: units are conserved, so some sellers run short and
    // rejections show up alongside every other outcome.
    let cfg = TradeConfig {
        // make arrest reachable so every branch gets exercised
        violence_probability: 0.10,
        arrest_probability: 0.20,
        negotiation_probability: 0.40,
        ..enabled()
    };
    let mut rng = StdRng::seed_from_u64(2026);
    let mut pick = StdRng::seed_from_u64(7);
    let mut actors: Vec<ActorTradeStatus> =
        (0..6).map(|i| init_status(&format!("npc-{i}"), &mut rng)).collect();
    let mut seen = std::collections::HashSet::new();

    for round in 0..5000u32 {
        let s = pick.gen_range(0..actors.len());
        let mut b = pick.gen_range(0..actors.len() - 1);
        if b >= s {
            b += 1;
        }
        let quantity = pick.gen_range(1..=15);
        let req = DealRequest::new(identity(s), identity(b), quantity).at_hour(round % 24);

        let seller = actors[s].clone();
        let buyer = actors[b].clone();
        let res = process_deal(&cfg, &seller, &buyer, &req, &mut rng).unwrap();
        seen.insert(res.deal.outcome);

        assert!(in_bounds(&res.seller), "seller out of bounds: {}", res.seller);
        assert!(in_bounds(&res.buyer), "buyer out of bounds: {}", res.buyer);

        match res.deal.outcome {
            DealOutcome::Rejected => {
                assert!(quantity > seller.inventory);
                assert_eq!(res.deal.total_price, Decimal::ZERO);
                assert_eq!(res.seller, seller);
                assert_eq!(res.buyer, buyer);
            }
            DealOutcome::Success | DealOutcome::Negotiated => {
                assert_eq!(res.seller.inventory, seller.inventory - quantity);
                assert_eq!(res.buyer.inventory, buyer.inventory + quantity);
                assert_eq!(
                    res.deal.total_price,
                    res.deal.unit_price * Decimal::from(quantity)
                );
                assert!(res.deal.unit_price >= dec!(0.35));
                assert_eq!(
                    res.seller.total_profit - seller.total_profit,
                    res.deal.profit.unwrap()
                );
                assert_eq!(res.buyer.total_spent - buyer.total_spent, res.deal.total_price);
            }
            DealOutcome::Violence | DealOutcome::Arrest => {
                assert_eq!(res.seller.inventory, seller.inventory);
                assert_eq!(res.buyer.inventory, buyer.inventory);
                assert_eq!(res.seller.total_profit, seller.total_profit);
                assert_eq!(res.seller.total_spent, seller.total_spent);
                assert_eq!(res.buyer.total_profit, buyer.total_profit);
                assert_eq!(res.buyer.total_spent, buyer.total_spent);
                assert_eq!(res.deal.total_price, Decimal::ZERO);
            }
        }

        actors[s] = res.seller;
        actors[b] = res.buyer;
    }

    for outcome in DealOutcome::ALL {
        assert!(seen.contains(outcome), "never saw {outcome}");
    }

    let summary = stats(&actors);
    assert_eq!(summary.actor_count, 6);
    assert!(summary.max_wanted_level <= 100);
}

#[test]
fn same_seed_same_deal() {
    let seller = ActorTradeStatus {
        inventory: 40,
        ..ActorTradeStatus::empty("s")
    };
    let buyer = ActorTradeStatus::empty("b");
    let req = DealRequest::new(identity(0), identity(1), 6).at_hour(2);

    for seed in 0..50 {
        let a = process_deal(&enabled(), &seller, &buyer, &req, &mut StdRng::seed_from_u64(seed)).unwrap();
        let b = process_deal(&enabled(), &seller, &buyer, &req, &mut StdRng::seed_from_u64(seed)).unwrap();
        // id and timestamp are minted fresh per deal; everything else replays
        assert_ne!(a.deal.id, b.deal.id);
        let replayed = TradeDeal {
            id: a.deal.id.clone(),
            timestamp: a.deal.timestamp,
            ..b.deal
        };
        assert_eq!(replayed, a.deal);
        assert_eq!(a.seller, b.seller);
        assert_eq!(a.buyer, b.buyer);
    }
}

#[test]
fn scenario_forced_success() {
    let seller = ActorTradeStatus {
        inventory: 10,
        ..ActorTradeStatus::empty("s")
    };
    let buyer = ActorTradeStatus {
        inventory: 4,
        ..ActorTradeStatus::empty("b")
    };
    let req = DealRequest::new(identity(0), identity(1), 5);
    // zero variation, outcome roll above every threshold, not witnessed
    let mut dice = ScriptedDice::new(vec![0.5, 0.99, 0.99]);

    let res = process_deal(&enabled(), &seller, &buyer, &req, &mut dice).unwrap();

    assert_eq!(res.deal.outcome, DealOutcome::Success);
    assert_eq!(res.deal.total_price, dec!(12.5));
    assert_eq!(res.seller.inventory, 5);
    assert_eq!(res.buyer.inventory, 9);
    assert_eq!(res.seller.total_profit, Decimal::ZERO);
}

#[test]
fn scenario_insufficient_inventory() {
    let seller = ActorTradeStatus {
        inventory: 3,
        reputation: 70,
        ..ActorTradeStatus::empty("s")
    };
    let buyer = ActorTradeStatus {
        inventory: 12,
        ..ActorTradeStatus::empty("b")
    };
    let req = DealRequest::new(identity(0), identity(1), 5);
    let res = process_deal(&enabled(), &seller, &buyer, &req, &mut StdRng::seed_from_u64(1)).unwrap();

    assert_eq!(res.deal.outcome, DealOutcome::Rejected);
    assert_eq!(res.deal.total_price, Decimal::ZERO);
    assert_eq!(res.seller, seller);
    assert_eq!(res.buyer, buyer);
}

#[test]
fn default_thresholds_never_arrest() {
    // Absolute thresholds: arrest (0.10) sits below violence (0.15), so the
    // default config can never produce an arrest.
    let mut engine = DealEngine::with_seed(enabled(), 99).unwrap();
    let seller = ActorTradeStatus {
        inventory: u32::MAX / 2,
        ..ActorTradeStatus::empty("s")
    };
    let buyer = ActorTradeStatus::empty("b");
    for i in 0..3000 {
        let req = DealRequest::new(identity(0), identity(1), 1).at_hour(i % 24);
        let res = engine.process(&seller, &buyer, &req).unwrap();
        assert_ne!(res.deal.outcome, DealOutcome::Arrest);
    }
}

#[test]
fn stats_on_empty_population() {
    let summary = stats(&Vec::<ActorTradeStatus>::new());
    assert_eq!(summary.actor_count, 0);
    assert_eq!(summary.mean_inventory, 0.0);
    assert_eq!(summary.mean_suspicion, 0.0);
    assert_eq!(summary.max_wanted_level, 0);
}
