//! Config factory and validation for [`TradeConfig`].

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::types::{TradeConfig, TradeError};

/// Highest accepted base price. Keeps `base * 1.3 * u32::MAX` and the
/// running totals well inside `Decimal` range.
pub const MAX_BASE_PRICE: Decimal = dec!(1000000);

/// Baseline tunables. Trading ships disabled; callers opt in.
pub fn default_config() -> TradeConfig {
    TradeConfig::default()
}

impl TradeConfig {
    /// Check the parameter invariants: probability-like fields in [0, 1],
    /// base price within [0, [`MAX_BASE_PRICE`]].
    pub fn validate(&self) -> Result<(), TradeError> {
        let unit_fields = [
            ("trading_intensity", self.trading_intensity),
            ("price_variation", self.price_variation),
            ("margin_target", self.margin_target),
            ("violence_probability", self.violence_probability),
            ("arrest_probability", self.arrest_probability),
            ("negotiation_probability", self.negotiation_probability),
            ("stabbing_fatality", self.stabbing_fatality),
            ("base_police_presence", self.base_police_presence),
        ];

        for (name, value) in unit_fields {
            // NaN fails the range check too
            if !(0.0..=1.0).contains(&value) {
                return Err(TradeError::InvalidConfig(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }

        if self.base_price < Decimal::ZERO {
            return Err(TradeError::InvalidConfig(format!(
                "base_price must be non-negative, got {}",
                self.base_price
            )));
        }
        if self.base_price > MAX_BASE_PRICE {
            return Err(TradeError::InvalidConfig(format!(
                "base_price must not exceed {MAX_BASE_PRICE}, got {}",
                self.base_price
            )));
        }

        Ok(())
    }
}
