//! CET (Custo Efetivo Total): the periodic rate that discounts the
//! contracted installments back to the amount the borrower actually
//! received. Fees and IOF financed into the loan push it above the nominal
//! rate.

use log::{debug, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::CetSolverConfig;
use crate::error::{FinancingError, FinancingResult};
use crate::rates::annualize_periodic_rate;
use crate::types::{Money, Rate};

/// Result of a CET solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectiveRate {
    /// Periodic rate as a fraction.
    pub periodic_rate: Rate,
    /// Periodic rate as a percentage (1.65 for 1.65% a month).
    pub monthly_rate: Rate,
    /// Compounded yearly rate as a percentage.
    pub annual_rate: Rate,
    /// Newton steps taken.
    pub iterations: u32,
    /// False when the iteration budget ran out first; the rates are then the
    /// last estimate and should be shown as approximate.
    pub converged: bool,
}

impl CetSolverConfig {
    /// Solves the CET for a level stream of `number_of_periods` installments.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if `net_amount_received` or
    /// `installment_amount` is not positive, or `number_of_periods` is zero.
    pub fn solve(
        &self,
        net_amount_received: Money,
        installment_amount: Money,
        number_of_periods: u32,
    ) -> FinancingResult<EffectiveRate> {
        if installment_amount <= Decimal::ZERO {
            return Err(FinancingError::invalid(
                "installment_amount",
                "must be greater than zero",
            ));
        }
        if number_of_periods == 0 {
            return Err(FinancingError::invalid(
                "number_of_periods",
                "must be at least 1",
            ));
        }
        let flows = vec![installment_amount; number_of_periods as usize];
        self.solve_for_flows(net_amount_received, &flows)
    }

    /// Solves the CET for an arbitrary stream where `flows[k]` is paid at the
    /// end of period `k + 1`.
    ///
    /// Newton-Raphson on `f(i) = Σ flow_k / (1 + i)^k - net`. A start or a
    /// step at or below zero is moved to `rate_floor`. Running out of
    /// iterations is not an error: the last estimate comes back with
    /// `converged == false`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if `net_amount_received` is not positive,
    /// `flows` is empty, any flow is negative, or every flow is zero.
    pub fn solve_for_flows(&self, net_amount_received: Money, flows: &[Money]) -> FinancingResult<EffectiveRate> {
        if net_amount_received <= Decimal::ZERO {
            return Err(FinancingError::invalid(
                "net_amount_received",
                "must be greater than zero",
            ));
        }
        if flows.is_empty() {
            return Err(FinancingError::invalid("flows", "at least one payment is required"));
        }
        if flows.iter().any(|flow| *flow < Decimal::ZERO) {
            return Err(FinancingError::invalid("flows", "payments cannot be negative"));
        }
        if flows.iter().all(|flow| flow.is_zero()) {
            return Err(FinancingError::invalid("flows", "at least one payment must be positive"));
        }

        let mut rate = if self.initial_guess > Decimal::ZERO {
            self.initial_guess
        } else {
            self.rate_floor
        };
        let mut converged = false;
        let mut iterations = 0;

        while iterations < self.max_iterations {
            let (npv, derivative) = present_value_and_slope(rate, net_amount_received, flows);

            if npv.abs() < self.tolerance {
                converged = true;
                break;
            }
            if derivative.is_zero() {
                break;
            }

            rate -= npv / derivative;
            if rate < Decimal::ZERO {
                rate = self.rate_floor;
            }
            iterations += 1;
        }

        let undiscounted_total: Money = flows.iter().sum();
        if converged {
            debug!("CET converged to {rate} after {iterations} iterations");
        } else if undiscounted_total < net_amount_received {
            warn!(
                "CET root is below zero: payments of {undiscounted_total} do not cover \
                 {net_amount_received} received; returning floored estimate {rate}"
            );
        } else {
            warn!(
                "CET did not converge after {iterations} iterations; returning estimate {rate}"
            );
        }

        Ok(EffectiveRate {
            periodic_rate: rate,
            monthly_rate: rate * Decimal::ONE_HUNDRED,
            annual_rate: annualize_periodic_rate(rate, self.periods_per_year)?,
            iterations,
            converged,
        })
    }
}

/// `f(i)` and `f'(i)` of the CET equation in a single pass.
fn present_value_and_slope(rate: Rate, net_amount_received: Money, flows: &[Money]) -> (Money, Decimal) {
    let discount_step = Decimal::ONE / (Decimal::ONE + rate);
    let mut discount = Decimal::ONE;
    let mut npv = -net_amount_received;
    let mut derivative = Decimal::ZERO;

    for (k, flow) in flows.iter().enumerate() {
        let period = Decimal::from(k as u64 + 1);
        discount *= discount_step;
        npv += flow * discount;
        derivative -= period * flow * discount * discount_step;
    }

    (npv, derivative)
}

/// Solves the CET with the default solver settings (2% initial guess,
/// 1e-4 tolerance, 100 iterations).
///
/// ```rust
/// use br_loan_sim::solve_effective_rate;
/// use rust_decimal_macros::dec;
///
/// let cet = solve_effective_rate(dec!(1000), dec!(1020), 1).unwrap();
/// assert!(cet.converged);
/// assert_eq!(cet.monthly_rate.round_dp(4), dec!(2));
/// ```
pub fn solve_effective_rate(
    net_amount_received: Money,
    installment_amount: Money,
    number_of_periods: u32,
) -> FinancingResult<EffectiveRate> {
    CetSolverConfig::default().solve(net_amount_received, installment_amount, number_of_periods)
}
