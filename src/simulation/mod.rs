//! Product simulators. Each one composes the IOF calculator, the Price table
//! and, optionally, the CET solver for one product shape:
//!
//! - [`financing`]: plain financing (vehicles, solar panels, payroll loans).
//! - [`balloon`]: financing with a deferred final installment (VFG).
//! - [`grace_period`]: FIES-style student loan with utilization, grace and
//!   amortization phases.
//! - [`leasing`]: leasing versus traditional financing.

pub mod balloon;
pub mod financing;
pub mod grace_period;
pub mod leasing;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cet::EffectiveRate;
use crate::config::EngineConfig;
use crate::error::{FinancingError, FinancingResult};
use crate::iof::TaxResult;
use crate::types::{InstallmentRecord, Money, Rate};

/// Outcome of a financing simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Amount the borrower receives.
    pub principal: Money,
    /// Principal plus opening fee plus IOF: what the installments repay.
    pub financed_total: Money,
    pub installment_amount: Money,
    pub total_paid: Money,
    /// `total_paid - financed_total`.
    pub total_interest: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax: Option<TaxResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_rate: Option<EffectiveRate>,
    pub schedule: Vec<InstallmentRecord>,
}

impl SimulationResult {
    pub fn tax_amount(&self) -> Money {
        self.tax.as_ref().map(|t| t.amount).unwrap_or(Decimal::ZERO)
    }
}

/// Runs simulations against one [`EngineConfig`].
///
/// The simulator holds no state besides its configuration; every call
/// builds a fresh result.
#[derive(Debug, Clone, Default)]
pub struct Simulator {
    config: EngineConfig,
}

impl Simulator {
    /// # Errors
    ///
    /// Returns `Config` if the configuration does not validate.
    pub fn new(config: EngineConfig) -> FinancingResult<Self> {
        config.validate()?;
        Ok(Simulator { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

pub(crate) fn require_positive(field: &str, value: Money) -> FinancingResult<()> {
    if value <= Decimal::ZERO {
        return Err(FinancingError::invalid(field, "must be greater than zero"));
    }
    Ok(())
}

pub(crate) fn require_non_negative(field: &str, value: Money) -> FinancingResult<()> {
    if value < Decimal::ZERO {
        return Err(FinancingError::invalid(field, "cannot be negative"));
    }
    Ok(())
}

/// `value` must be a percentage in the open interval (0, 100).
pub(crate) fn require_percentage(field: &str, value: Rate) -> FinancingResult<()> {
    if value <= Decimal::ZERO || value >= Decimal::ONE_HUNDRED {
        return Err(FinancingError::invalid(field, "must be between 0 and 100 (exclusive)"));
    }
    Ok(())
}

pub(crate) fn percent_of(amount: Money, percentage: Rate) -> Money {
    amount * percentage / Decimal::ONE_HUNDRED
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CetSolverConfig;

    #[test]
    fn test_simulator_rejects_invalid_config() {
        let config = EngineConfig {
            cet: CetSolverConfig {
                max_iterations: 0,
                ..CetSolverConfig::default()
            },
            ..EngineConfig::default()
        };
        assert!(matches!(Simulator::new(config), Err(FinancingError::Config(_))));
    }

    #[test]
    fn test_percentage_bounds() {
        assert!(require_percentage("pct", Decimal::ZERO).is_err());
        assert!(require_percentage("pct", Decimal::ONE_HUNDRED).is_err());
        assert!(require_percentage("pct", Decimal::from(30)).is_ok());
    }
}
