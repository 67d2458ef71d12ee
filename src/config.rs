//! Tunable constants of the engine.
//!
//! Every value has a default matching the rules the simulators publish, so
//! `EngineConfig::default()` is what callers normally want. A JSON document
//! may override any subset of fields:
//!
//! ```rust
//! use br_loan_sim::config::EngineConfig;
//!
//! let config = EngineConfig::from_json_str(r#"{ "cet": { "max_iterations": 50 } }"#).unwrap();
//! assert_eq!(config.cet.max_iterations, 50);
//! assert_eq!(config.grace.grace_periods, 18);
//! ```

use std::fs;
use std::path::Path;

use anyhow::Context;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{FinancingError, FinancingResult};
use crate::types::{Money, Rate};

/// IOF rates for individuals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IofConfig {
    /// Daily aliquot (0.0082% per day).
    pub daily_rate: Rate,
    /// Flat aliquot charged once on the operation (0.38%).
    pub fixed_rate: Rate,
    /// Calendar approximation used to turn periods into days.
    pub days_per_period: u32,
    /// The daily component stops accruing after this many days.
    pub max_days: u32,
}

impl Default for IofConfig {
    fn default() -> Self {
        IofConfig {
            daily_rate: dec!(0.000082),
            fixed_rate: dec!(0.0038),
            days_per_period: 30,
            max_days: 365,
        }
    }
}

/// Newton-Raphson settings for the CET solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CetSolverConfig {
    pub initial_guess: Rate,
    /// Stop once `|f(i)|` (in currency units) falls below this.
    pub tolerance: Money,
    pub max_iterations: u32,
    /// A step that lands on a negative rate restarts from here.
    pub rate_floor: Rate,
    /// Exponent of the annualization `(1 + i)^k - 1`.
    pub periods_per_year: u32,
}

impl Default for CetSolverConfig {
    fn default() -> Self {
        CetSolverConfig {
            initial_guess: dec!(0.02),
            tolerance: dec!(0.0001),
            max_iterations: 100,
            rate_floor: dec!(0.001),
            periods_per_year: 12,
        }
    }
}

/// FIES-style deferred repayment rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GracePeriodConfig {
    /// Months of interest-only payments after graduation.
    pub grace_periods: u32,
    pub months_per_semester: u32,
}

impl Default for GracePeriodConfig {
    fn default() -> Self {
        GracePeriodConfig {
            grace_periods: 18,
            months_per_semester: 6,
        }
    }
}

/// Monthly spreads added to the base rate of the vehicle simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateAdjustmentConfig {
    pub car_spread: Rate,
    pub motorcycle_spread: Rate,
    pub truck_spread: Rate,
    pub utility_spread: Rate,
    /// Extra spread for used vehicles, on top of the category spread.
    pub used_surcharge: Rate,
}

impl Default for RateAdjustmentConfig {
    fn default() -> Self {
        RateAdjustmentConfig {
            car_spread: Decimal::ZERO,
            motorcycle_spread: dec!(0.003),
            truck_spread: dec!(0.002),
            utility_spread: dec!(0.001),
            used_surcharge: dec!(0.002),
        }
    }
}

/// Leasing versus financing comparison settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeasingConfig {
    /// Cost differences up to this amount are reported as a tie.
    pub tie_tolerance: Money,
}

impl Default for LeasingConfig {
    fn default() -> Self {
        LeasingConfig {
            tie_tolerance: dec!(0.01),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub iof: IofConfig,
    pub cet: CetSolverConfig,
    pub grace: GracePeriodConfig,
    pub rates: RateAdjustmentConfig,
    pub leasing: LeasingConfig,
}

impl EngineConfig {
    /// Parses a (possibly partial) JSON document and validates the result.
    pub fn from_json_str(input: &str) -> anyhow::Result<Self> {
        let config: EngineConfig =
            serde_json::from_str(input).context("Failed to parse engine configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file {}", path.display()))?;
        Self::from_json_str(&raw)
            .with_context(|| format!("Invalid configuration in {}", path.display()))
    }

    pub fn validate(&self) -> FinancingResult<()> {
        if self.iof.daily_rate < Decimal::ZERO || self.iof.fixed_rate < Decimal::ZERO {
            return Err(FinancingError::Config("IOF rates cannot be negative".into()));
        }
        if self.iof.days_per_period == 0 || self.iof.max_days == 0 {
            return Err(FinancingError::Config(
                "IOF day counts must be at least 1".into(),
            ));
        }
        if self.cet.tolerance <= Decimal::ZERO {
            return Err(FinancingError::Config(
                "CET tolerance must be positive".into(),
            ));
        }
        if self.cet.max_iterations == 0 {
            return Err(FinancingError::Config(
                "CET solver needs at least one iteration".into(),
            ));
        }
        if self.cet.rate_floor <= Decimal::ZERO || self.cet.initial_guess <= Decimal::ZERO {
            return Err(FinancingError::Config(
                "CET rate floor and initial guess must be positive".into(),
            ));
        }
        if self.cet.periods_per_year == 0 {
            return Err(FinancingError::Config(
                "periods_per_year must be at least 1".into(),
            ));
        }
        if self.grace.months_per_semester == 0 {
            return Err(FinancingError::Config(
                "months_per_semester must be at least 1".into(),
            ));
        }
        if self.leasing.tie_tolerance < Decimal::ZERO {
            return Err(FinancingError::Config(
                "Tie tolerance cannot be negative".into(),
            ));
        }
        Ok(())
    }
}
