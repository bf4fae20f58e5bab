//! trade_sim: street trade deal engine
//!
//! Entry point. Loads configuration, initialises structured logging,
//! restores the registry from disk (or creates a fresh one), enrols the
//! configured actors, plays the simulation and saves the result.

use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use trade_sim::config;
use trade_sim::registry::TradeRegistry;
use trade_sim::simulation::Simulation;
use trade_sim::storage;

fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());
    let cfg = config::AppConfig::load(&config_path)?;

    init_logging();

    info!(
        config = %config_path,
        rounds = cfg.simulation.rounds,
        seed = ?cfg.simulation.seed,
        actors = cfg.actors.len(),
        enabled = cfg.trade.enabled,
        "trade_sim starting up"
    );

    let mut rng = match cfg.simulation.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    // -- Restore or create registry --------------------------------------

    let state_file = cfg.storage.state_file.as_str();
    let mut registry = match storage::load_registry(Some(state_file))? {
        Some(r) => {
            info!(actors = r.len(), deals = r.deals().len(), "Resumed from saved state");
            r
        }
        None => {
            info!("Fresh start");
            TradeRegistry::new()
        }
    };

    for actor in &cfg.actors {
        registry.join(&actor.id, &actor.name, &mut rng);
    }

    if registry.len() < 2 {
        warn!(actors = registry.len(), "Need at least two actors to trade");
    }

    // -- Run -------------------------------------------------------------

    let simulation = Simulation::new(cfg.trade.clone(), cfg.simulation.clone())?;
    let report = simulation.run(&mut registry, &mut rng)?;

    storage::save_registry(&registry, Some(state_file))?;

    for status in registry.statuses() {
        info!("{status}");
    }
    info!(
        deals = report.deals(),
        idle = report.idle_rounds,
        witnessed = report.witnessed,
        wounded = report.stats.wounded_count,
        max_wanted = report.stats.max_wanted_level,
        total_profit = format!("{:.2}", report.stats.total_profit),
        "Run finished"
    );
    println!("{report}");

    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("trade_sim=info"));

    let json_logging = std::env::var("TRADE_SIM_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
