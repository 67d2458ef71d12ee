use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::FinancingResult;
use crate::price::generate_schedule;
use crate::simulation::{SimulationResult, Simulator, require_non_negative, require_positive};
use crate::types::{Money, Rate};

/// Input parameters for a plain financing simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanParameters {
    /// Amount the borrower receives.
    pub principal: Money,
    /// Rate per period as a fraction (0.015 for 1.5%).
    pub periodic_rate: Rate,
    pub number_of_periods: u32,
    /// Flat fee (TAC) financed together with the principal.
    #[serde(default)]
    pub opening_fee: Option<Money>,
    /// Add IOF to the financed amount.
    #[serde(default)]
    pub include_tax: bool,
    /// Solve the CET against `principal`.
    #[serde(default)]
    pub compute_effective_rate: bool,
}

impl LoanParameters {
    pub fn new(principal: Money, periodic_rate: Rate, number_of_periods: u32) -> Self {
        LoanParameters {
            principal,
            periodic_rate,
            number_of_periods,
            opening_fee: None,
            include_tax: false,
            compute_effective_rate: false,
        }
    }
}

impl Simulator {
    /// Plain financing: IOF is computed on principal plus fee, the Price
    /// table runs on the tax-inclusive total and the CET, when requested,
    /// compares the installments with what the borrower actually received.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for a non-positive principal, a negative
    /// fee, or anything the Price table or the CET solver rejects.
    pub fn simulate_financing(&self, params: &LoanParameters) -> FinancingResult<SimulationResult> {
        debug!(
            "Simulating financing of {} at {} over {} periods",
            params.principal, params.periodic_rate, params.number_of_periods
        );
        require_positive("principal", params.principal)?;
        let opening_fee = params.opening_fee.unwrap_or(Decimal::ZERO);
        require_non_negative("opening_fee", opening_fee)?;

        let base_amount = params.principal + opening_fee;
        let tax = params
            .include_tax
            .then(|| self.config().iof.compute(base_amount, params.number_of_periods, true));
        let financed_total = base_amount + tax.as_ref().map(|t| t.amount).unwrap_or(Decimal::ZERO);

        let schedule = generate_schedule(financed_total, params.periodic_rate, params.number_of_periods)?;

        let effective_rate = if params.compute_effective_rate {
            Some(self.config().cet.solve(
                params.principal,
                schedule.installment_amount,
                params.number_of_periods,
            )?)
        } else {
            None
        };

        Ok(SimulationResult {
            principal: params.principal,
            financed_total,
            installment_amount: schedule.installment_amount,
            total_paid: schedule.total_paid,
            total_interest: schedule.total_interest,
            tax,
            effective_rate,
            schedule: schedule.records,
        })
    }
}

/// Runs [`Simulator::simulate_financing`] with the default configuration.
pub fn simulate_financing(params: &LoanParameters) -> FinancingResult<SimulationResult> {
    Simulator::default().simulate_financing(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FinancingError;
    use crate::iof::compute_transaction_tax;
    use rust_decimal_macros::dec;

    #[test]
    fn test_without_tax_matches_price_table() {
        let result = simulate_financing(&LoanParameters::new(dec!(40000), dec!(0.015), 48)).unwrap();

        assert_eq!(result.financed_total, dec!(40000));
        assert_eq!(result.installment_amount.round_dp(2), dec!(1175.00));
        assert_eq!(result.total_interest.round(), dec!(16400));
        assert!(result.tax.is_none());
        assert!(result.effective_rate.is_none());
        assert_eq!(result.schedule.len(), 48);
    }

    #[test]
    fn test_fee_and_tax_are_financed() {
        let params = LoanParameters {
            opening_fee: Some(dec!(800)),
            include_tax: true,
            compute_effective_rate: true,
            ..LoanParameters::new(dec!(40000), dec!(0.015), 48)
        };
        let result = simulate_financing(&params).unwrap();

        let expected_tax = compute_transaction_tax(dec!(40800), 48, true);
        assert_eq!(result.tax_amount(), expected_tax.amount);
        assert_eq!(result.financed_total, dec!(40800) + expected_tax.amount);

        let schedule_principal: Decimal = result.schedule.iter().map(|r| r.principal_portion).sum();
        assert!((schedule_principal - result.financed_total).abs() < dec!(0.000001));

        let cet = result.effective_rate.unwrap();
        assert!(cet.converged);
        assert!(cet.monthly_rate > dec!(1.5));
    }

    #[test]
    fn test_zero_rate_has_no_interest() {
        let result = simulate_financing(&LoanParameters::new(dec!(10000), Decimal::ZERO, 10)).unwrap();

        assert_eq!(result.installment_amount, dec!(1000));
        assert_eq!(result.total_interest, Decimal::ZERO);
    }

    #[test]
    fn test_negative_fee_is_rejected() {
        let params = LoanParameters {
            opening_fee: Some(dec!(-1)),
            ..LoanParameters::new(dec!(10000), dec!(0.01), 12)
        };
        assert!(matches!(
            simulate_financing(&params),
            Err(FinancingError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_zero_principal_is_rejected() {
        let err = simulate_financing(&LoanParameters::new(Decimal::ZERO, dec!(0.01), 12)).unwrap_err();
        assert_eq!(err, FinancingError::invalid("principal", "must be greater than zero"));
    }

    #[test]
    fn test_parameters_from_json() {
        let params: LoanParameters = serde_json::from_str(
            r#"{ "principal": "25000", "periodic_rate": "0.0189", "number_of_periods": 36, "include_tax": true }"#,
        )
        .unwrap();
        assert_eq!(params.opening_fee, None);
        assert!(params.include_tax);
        assert!(!params.compute_effective_rate);
    }
}
