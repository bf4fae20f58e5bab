//! Registry, simulation and storage working together.

use rand::rngs::StdRng;
use rand::SeedableRng;

use trade_sim::config::AppConfig;
use trade_sim::registry::TradeRegistry;
use trade_sim::simulation::{Simulation, SimulationSettings};
use trade_sim::storage;
use trade_sim::types::{DealOutcome, TradeConfig};

fn temp_path() -> String {
    let mut p = std::env::temp_dir();
    p.push(format!("trade_sim_it_{}.json", uuid::Uuid::new_v4()));
    p.to_string_lossy().to_string()
}

#[test]
fn simulate_save_resume() {
    let cfg = AppConfig::parse(
        r#"
[simulation]
rounds = 96
seed = 5

[trade]
enabled = true
trading_intensity = 0.8

[[actors]]
id = "a"
name = "Ana"
[[actors]]
id = "b"
name = "Beto"
[[actors]]
id = "c"
name = "Carla"
"#,
    )
    .unwrap();

    let mut rng = StdRng::seed_from_u64(cfg.simulation.seed.unwrap());
    let mut registry = TradeRegistry::new();
    for actor in &cfg.actors {
        registry.join(&actor.id, &actor.name, &mut rng);
    }

    let sim = Simulation::new(cfg.trade.clone(), cfg.simulation.clone()).unwrap();
    let report = sim.run(&mut registry, &mut rng).unwrap();
    assert_eq!(report.rounds, 96);
    assert_eq!(report.deals() as usize, registry.deals().len());
    assert!(report.deals() > 0);

    // units only move between actors, never appear or vanish
    let moved: u64 = registry
        .deals()
        .iter()
        .filter(|d| d.outcome.is_transfer())
        .map(|d| u64::from(d.quantity))
        .sum();
    let sold: u64 = registry.statuses().map(|s| s.total_sold).sum();
    let bought: u64 = registry.statuses().map(|s| s.total_bought).sum();
    assert_eq!(moved, sold);
    assert_eq!(sold, bought);

    let path = temp_path();
    storage::save_registry(&registry, Some(&path)).unwrap();
    let mut resumed = storage::load_registry(Some(&path)).unwrap().unwrap();
    assert_eq!(resumed.actor_ids(), registry.actor_ids());
    assert_eq!(resumed.deals().len(), registry.deals().len());
    for id in registry.actor_ids() {
        let (a, b) = (resumed.status(&id).unwrap(), registry.status(&id).unwrap());
        assert_eq!(a.inventory, b.inventory);
        assert_eq!(a.total_sold, b.total_sold);
        assert_eq!(a.successful_deals, b.successful_deals);
        assert_eq!(a.times_stabbed, b.times_stabbed);
        assert_eq!(a.wanted_level, b.wanted_level);
    }

    // a second run continues from the saved statuses
    let more = Simulation::new(
        cfg.trade.clone(),
        SimulationSettings { rounds: 24, ..cfg.simulation.clone() },
    )
    .unwrap()
    .run(&mut resumed, &mut rng)
    .unwrap();
    assert_eq!(resumed.deals().len(), registry.deals().len() + more.deals() as usize);

    storage::delete_state(Some(&path)).unwrap();
}

#[test]
fn rejected_deals_are_logged_but_change_nothing() {
    let cfg = TradeConfig { enabled: true, ..TradeConfig::default() };
    let mut rng = StdRng::seed_from_u64(3);
    let mut registry = TradeRegistry::new();
    registry.join("a", "Ana", &mut rng);
    registry.join("b", "Beto", &mut rng);

    let before_a = registry.status("a").unwrap().clone();
    let before_b = registry.status("b").unwrap().clone();
    let too_many = before_a.inventory + 1;

    let deal = registry.execute(&cfg, "a", "b", too_many, 12, &mut rng).unwrap();
    assert_eq!(deal.outcome, DealOutcome::Rejected);
    assert_eq!(registry.status("a").unwrap(), &before_a);
    assert_eq!(registry.status("b").unwrap(), &before_b);
    assert_eq!(registry.deals().len(), 1);
}
