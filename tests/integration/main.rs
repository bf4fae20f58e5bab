//! Integration tests against the public `trade_sim` API.

mod deal_properties;
mod registry_flow;
