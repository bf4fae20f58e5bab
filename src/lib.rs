//! trade_sim: street trade deal engine
//!
//! Library crate exposing the engine and its callers (registry, storage,
//! simulation) for use by integration tests and the binary entry point.

pub mod config;
pub mod types;
pub mod engine;
pub mod registry;
pub mod storage;
pub mod simulation;
