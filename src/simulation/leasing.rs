//! Leasing versus traditional financing of the same asset.
//!
//! Leasing finances the asset net of its residual value (VRG), which is paid
//! at the end to keep the asset, and is exempt from IOF. Financing runs a
//! plain Price table on the asset net of the down payment. Business filers
//! can deduct leasing installments as an operating expense.

use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{FinancingError, FinancingResult};
use crate::simulation::financing::LoanParameters;
use crate::simulation::{SimulationResult, Simulator, percent_of, require_non_negative, require_positive};
use crate::types::{Money, Rate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeasingParameters {
    pub asset_value: Money,
    /// Paid up front in both alternatives, so it does not enter the costs.
    #[serde(default)]
    pub down_payment: Money,
    /// Residual value as a percentage of the asset value.
    pub residual_percentage: Rate,
    pub leasing_rate: Rate,
    pub financing_rate: Rate,
    pub number_of_periods: u32,
    /// Charge IOF on the financing alternative.
    #[serde(default)]
    pub include_tax: bool,
    #[serde(default)]
    pub business_filer: bool,
    /// Share of the leasing installments recovered through the deduction,
    /// as a percentage.
    #[serde(default)]
    pub tax_deduction_percentage: Rate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Winner {
    Leasing,
    Financing,
    Tie,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeasingComparisonResult {
    pub leasing: SimulationResult,
    pub financing: SimulationResult,
    pub residual_value: Money,
    /// Leasing installments plus the residual value.
    pub leasing_total_cost: Money,
    pub financing_total_cost: Money,
    /// `financing_total_cost - leasing_total_cost`; positive when leasing is
    /// cheaper.
    pub difference: Money,
    pub winner: Winner,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_benefit: Option<Money>,
    pub leasing_cost_after_benefit: Money,
    pub winner_after_benefit: Winner,
}

impl Simulator {
    /// # Errors
    ///
    /// Returns `InvalidParameter` when the asset value is not positive, the
    /// down payment is negative or leaves nothing to finance, the residual
    /// or deduction percentages are out of range, or either Price table
    /// rejects its inputs.
    pub fn compare_leasing(&self, params: &LeasingParameters) -> FinancingResult<LeasingComparisonResult> {
        debug!(
            "Comparing leasing and financing of {} over {} periods",
            params.asset_value, params.number_of_periods
        );
        require_positive("asset_value", params.asset_value)?;
        require_non_negative("down_payment", params.down_payment)?;
        if params.residual_percentage < Decimal::ZERO || params.residual_percentage >= Decimal::ONE_HUNDRED {
            return Err(FinancingError::invalid(
                "residual_percentage",
                "must be at least 0 and below 100",
            ));
        }
        if params.tax_deduction_percentage < Decimal::ZERO
            || params.tax_deduction_percentage > Decimal::ONE_HUNDRED
        {
            return Err(FinancingError::invalid(
                "tax_deduction_percentage",
                "must be between 0 and 100",
            ));
        }

        let financing_principal = params.asset_value - params.down_payment;
        if financing_principal <= Decimal::ZERO {
            return Err(FinancingError::invalid(
                "down_payment",
                "must be lower than the asset value",
            ));
        }
        let residual_value = percent_of(params.asset_value, params.residual_percentage);
        let leasing_principal = financing_principal - residual_value;
        if leasing_principal <= Decimal::ZERO {
            return Err(FinancingError::invalid(
                "residual_percentage",
                "residual value leaves nothing to lease after the down payment",
            ));
        }

        let leasing = self.simulate_financing(&LoanParameters::new(
            leasing_principal,
            params.leasing_rate,
            params.number_of_periods,
        ))?;
        let financing = self.simulate_financing(&LoanParameters {
            include_tax: params.include_tax,
            ..LoanParameters::new(financing_principal, params.financing_rate, params.number_of_periods)
        })?;

        let leasing_total_cost = leasing.total_paid + residual_value;
        let financing_total_cost = financing.total_paid;
        let tie_tolerance = self.config().leasing.tie_tolerance;

        let tax_benefit = params
            .business_filer
            .then(|| percent_of(leasing.total_paid, params.tax_deduction_percentage));
        let leasing_cost_after_benefit = leasing_total_cost - tax_benefit.unwrap_or(Decimal::ZERO);

        Ok(LeasingComparisonResult {
            residual_value,
            leasing_total_cost,
            financing_total_cost,
            difference: financing_total_cost - leasing_total_cost,
            winner: classify(leasing_total_cost, financing_total_cost, tie_tolerance),
            tax_benefit,
            leasing_cost_after_benefit,
            winner_after_benefit: classify(leasing_cost_after_benefit, financing_total_cost, tie_tolerance),
            leasing,
            financing,
        })
    }
}

fn classify(leasing_cost: Money, financing_cost: Money, tie_tolerance: Money) -> Winner {
    let difference = financing_cost - leasing_cost;
    if difference.abs() <= tie_tolerance {
        Winner::Tie
    } else if difference > Decimal::ZERO {
        Winner::Leasing
    } else {
        Winner::Financing
    }
}

/// Runs [`Simulator::compare_leasing`] with the default configuration.
pub fn compare_leasing(params: &LeasingParameters) -> FinancingResult<LeasingComparisonResult> {
    Simulator::default().compare_leasing(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn params() -> LeasingParameters {
        LeasingParameters {
            asset_value: dec!(150000),
            down_payment: dec!(30000),
            residual_percentage: dec!(20),
            leasing_rate: dec!(0.012),
            financing_rate: dec!(0.016),
            number_of_periods: 36,
            include_tax: true,
            business_filer: false,
            tax_deduction_percentage: Decimal::ZERO,
        }
    }

    #[test]
    fn test_principals() {
        let result = compare_leasing(&params()).unwrap();

        assert_eq!(result.residual_value, dec!(30000));
        assert_eq!(result.leasing.principal, dec!(90000));
        assert_eq!(result.financing.principal, dec!(120000));
        assert!(result.leasing.tax.is_none());
        assert!(result.financing.tax_amount() > Decimal::ZERO);
    }

    #[test]
    fn test_costs_and_winner() {
        let result = compare_leasing(&params()).unwrap();

        assert_eq!(result.leasing_total_cost, result.leasing.total_paid + dec!(30000));
        assert_eq!(result.financing_total_cost, result.financing.total_paid);
        assert_eq!(
            result.difference,
            result.financing_total_cost - result.leasing_total_cost
        );
        // Lower rate and no IOF make leasing the cheaper option here.
        assert_eq!(result.winner, Winner::Leasing);
        assert!(result.tax_benefit.is_none());
        assert_eq!(result.leasing_cost_after_benefit, result.leasing_total_cost);
        assert_eq!(result.winner_after_benefit, Winner::Leasing);
    }

    #[test]
    fn test_deduction_can_flip_the_winner() {
        let expensive_leasing = LeasingParameters {
            leasing_rate: dec!(0.022),
            include_tax: false,
            ..params()
        };
        let plain = compare_leasing(&expensive_leasing).unwrap();
        assert_eq!(plain.winner, Winner::Financing);

        let business = LeasingParameters {
            business_filer: true,
            tax_deduction_percentage: dec!(34),
            ..expensive_leasing
        };
        let result = compare_leasing(&business).unwrap();
        let benefit = result.tax_benefit.unwrap();

        assert_eq!(benefit, result.leasing.total_paid * dec!(34) / dec!(100));
        assert_eq!(result.winner, Winner::Financing);
        assert_eq!(result.winner_after_benefit, Winner::Leasing);
    }

    #[test]
    fn test_identical_alternatives_tie() {
        let same = LeasingParameters {
            down_payment: Decimal::ZERO,
            residual_percentage: Decimal::ZERO,
            leasing_rate: dec!(0.015),
            financing_rate: dec!(0.015),
            include_tax: false,
            ..params()
        };
        let result = compare_leasing(&same).unwrap();

        assert_eq!(result.difference, Decimal::ZERO);
        assert_eq!(result.winner, Winner::Tie);
    }

    #[rstest]
    #[case(dec!(100), dec!(1000), Winner::Leasing)]
    #[case(dec!(1000), dec!(100), Winner::Financing)]
    #[case(dec!(100), dec!(100.01), Winner::Tie)]
    #[case(dec!(100.01), dec!(100), Winner::Tie)]
    #[case(dec!(100), dec!(100.02), Winner::Leasing)]
    fn test_classify(#[case] leasing: Decimal, #[case] financing: Decimal, #[case] expected: Winner) {
        assert_eq!(classify(leasing, financing, dec!(0.01)), expected);
    }

    #[test]
    fn test_residual_consuming_the_asset_is_rejected() {
        let too_much = LeasingParameters {
            residual_percentage: dec!(85),
            ..params()
        };
        match compare_leasing(&too_much) {
            Err(FinancingError::InvalidParameter { field, .. }) => assert_eq!(field, "residual_percentage"),
            other => panic!("expected InvalidParameter, got {other:?}"),
        }
    }
}
