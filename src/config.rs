//! Configuration loading from TOML.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs. The
//! `[trade]` table maps onto [`TradeConfig`] with every missing field
//! falling back to the factory defaults.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;

use crate::simulation::SimulationSettings;
use crate::storage::DEFAULT_STATE_FILE;
use crate::types::TradeConfig;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub simulation: SimulationSettings,
    #[serde(default)]
    pub trade: TradeConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub actors: Vec<ActorEntry>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub state_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_file: DEFAULT_STATE_FILE.to_string(),
        }
    }
}

/// An actor to enrol in trading at startup.
#[derive(Debug, Deserialize, Clone)]
pub struct ActorEntry {
    pub id: String,
    pub name: String,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::parse(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Parse and validate configuration from a TOML string.
    pub fn parse(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Trade parameters in range, actor ids unique and non-empty.
    pub fn validate(&self) -> Result<()> {
        self.trade.validate()?;

        let mut seen = HashSet::new();
        for actor in &self.actors {
            if actor.id.trim().is_empty() {
                bail!("Actor id must not be empty (name: {})", actor.name);
            }
            if !seen.insert(actor.id.as_str()) {
                bail!("Duplicate actor id: {}", actor.id);
            }
        }
        Ok(())
    }
}
