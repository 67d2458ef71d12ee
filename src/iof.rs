//! IOF (Imposto sobre Operações Financeiras) for credit operations.
//!
//! The tax has a daily component, accrued over the term of the operation up
//! to a one year cap, and a flat component charged once. Each period of the
//! simulated loan counts as 30 days.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::IofConfig;
use crate::types::Money;

/// Computed transaction tax with its breakdown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxResult {
    /// Total tax to add to the financed amount.
    pub amount: Money,
    pub daily_component: Money,
    pub fixed_component: Money,
    /// Days the daily component accrued over, after the cap.
    pub days: u32,
}

impl TaxResult {
    pub fn zero() -> Self {
        TaxResult::default()
    }
}

impl IofConfig {
    /// Computes the IOF due on `financed_amount` for a loan of
    /// `term_in_periods` periods. Returns zero when `enabled` is false.
    ///
    /// Input validation is the caller's job: a non-positive amount yields a
    /// zero or negative tax.
    pub fn compute(&self, financed_amount: Money, term_in_periods: u32, enabled: bool) -> TaxResult {
        if !enabled {
            return TaxResult::zero();
        }

        let days = term_in_periods
            .saturating_mul(self.days_per_period)
            .min(self.max_days);

        let daily_component = financed_amount * self.daily_rate * Decimal::from(days);
        let fixed_component = financed_amount * self.fixed_rate;

        TaxResult {
            amount: daily_component + fixed_component,
            daily_component,
            fixed_component,
            days,
        }
    }
}

/// Computes the IOF with the default aliquots (0.0082% a day capped at 365
/// days, plus 0.38% flat).
///
/// ```rust
/// use br_loan_sim::compute_transaction_tax;
/// use rust_decimal_macros::dec;
///
/// let tax = compute_transaction_tax(dec!(10_000), 12, true);
/// assert_eq!(tax.amount, dec!(333.2));
/// ```
pub fn compute_transaction_tax(financed_amount: Money, term_in_periods: u32, enabled: bool) -> TaxResult {
    IofConfig::default().compute(financed_amount, term_in_periods, enabled)
}
