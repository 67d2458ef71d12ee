//! Balloon (VFG, valor final garantido) financing: part of the principal is
//! held back and repaid in a single final installment, lowering the regular
//! ones.

use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::FinancingResult;
use crate::price::generate_schedule;
use crate::simulation::{
    SimulationResult, Simulator, percent_of, require_non_negative, require_percentage,
    require_positive,
};
use crate::types::{InstallmentRecord, Money, Rate, RecordKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalloonParameters {
    pub principal: Money,
    pub periodic_rate: Rate,
    /// Regular installments before the balloon.
    pub number_of_periods: u32,
    /// Share of the principal deferred to the balloon, as a percentage.
    /// The simulator offers 10 to 50.
    pub balloon_percentage: Rate,
    #[serde(default)]
    pub opening_fee: Option<Money>,
    #[serde(default)]
    pub include_tax: bool,
    #[serde(default)]
    pub compute_effective_rate: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalloonSimulationResult {
    #[serde(flatten)]
    pub simulation: SimulationResult,
    pub balloon_installment_amount: Money,
    pub balloon_percentage: Rate,
    /// Principal repaid through the regular installments, before fee and IOF.
    pub amortizing_principal: Money,
}

impl Simulator {
    /// Runs the Price table on the principal net of the balloon (plus fee and
    /// IOF) and appends the balloon as a final bullet record.
    ///
    /// IOF is charged on the whole operation, since the held-back principal
    /// is still credit extended to the borrower. The balloon accrues no
    /// interest of its own. Regular rows report the outstanding balance
    /// including the balloon, so the balance closes at zero on the balloon
    /// row.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for a non-positive principal, a negative
    /// fee, a balloon percentage outside (0, 100), or anything the Price
    /// table or the CET solver rejects.
    pub fn simulate_balloon(&self, params: &BalloonParameters) -> FinancingResult<BalloonSimulationResult> {
        debug!(
            "Simulating balloon financing of {} with {}% deferred",
            params.principal, params.balloon_percentage
        );
        require_positive("principal", params.principal)?;
        require_percentage("balloon_percentage", params.balloon_percentage)?;
        let opening_fee = params.opening_fee.unwrap_or(Decimal::ZERO);
        require_non_negative("opening_fee", opening_fee)?;

        let balloon = percent_of(params.principal, params.balloon_percentage);
        let amortizing_principal = params.principal - balloon;

        let tax = params.include_tax.then(|| {
            self.config()
                .iof
                .compute(params.principal + opening_fee, params.number_of_periods, true)
        });
        let tax_amount = tax.as_ref().map(|t| t.amount).unwrap_or(Decimal::ZERO);
        let amortizing_total = amortizing_principal + opening_fee + tax_amount;

        let schedule = generate_schedule(amortizing_total, params.periodic_rate, params.number_of_periods)?;

        let mut records: Vec<InstallmentRecord> = schedule
            .records
            .into_iter()
            .map(|record| InstallmentRecord {
                remaining_balance: record.remaining_balance + balloon,
                ..record
            })
            .collect();
        records.push(InstallmentRecord {
            index: params.number_of_periods + 1,
            payment_amount: balloon,
            interest_portion: Decimal::ZERO,
            principal_portion: balloon,
            remaining_balance: Decimal::ZERO,
            kind: RecordKind::Balloon,
        });

        let effective_rate = if params.compute_effective_rate {
            let flows: Vec<Money> = records.iter().map(|r| r.payment_amount).collect();
            Some(self.config().cet.solve_for_flows(params.principal, &flows)?)
        } else {
            None
        };

        let financed_total = params.principal + opening_fee + tax_amount;
        let total_paid = schedule.total_paid + balloon;

        Ok(BalloonSimulationResult {
            simulation: SimulationResult {
                principal: params.principal,
                financed_total,
                installment_amount: schedule.installment_amount,
                total_paid,
                total_interest: total_paid - financed_total,
                tax,
                effective_rate,
                schedule: records,
            },
            balloon_installment_amount: balloon,
            balloon_percentage: params.balloon_percentage,
            amortizing_principal,
        })
    }
}

/// Runs [`Simulator::simulate_balloon`] with the default configuration.
pub fn simulate_balloon(params: &BalloonParameters) -> FinancingResult<BalloonSimulationResult> {
    Simulator::default().simulate_balloon(params)
}
