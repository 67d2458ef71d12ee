//! FIES-style student financing.
//!
//! The loan runs in three phases:
//!
//! 1. Utilization, while the course runs: the student pays the share of the
//!    tuition that is not financed (co-participation).
//! 2. Grace, a fixed span after graduation: only interest on the financed
//!    total is paid, the balance stays put.
//! 3. Amortization: a Price table over the financed total, lasting a
//!    multiple of the course duration.

use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{FinancingError, FinancingResult};
use crate::price::generate_schedule;
use crate::simulation::{Simulator, percent_of, require_non_negative, require_positive};
use crate::types::{InstallmentRecord, Money, Rate, RecordKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GracePeriodParameters {
    /// Full monthly tuition.
    pub monthly_course_fee: Money,
    /// Share of the tuition covered by the loan, as a percentage in (0, 100].
    pub financed_percentage: Rate,
    pub course_duration_semesters: u32,
    pub monthly_rate: Rate,
    /// Amortization lasts `course months * amortization_multiplier`.
    pub amortization_multiplier: u32,
}

/// One phase of the repayment timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseSummary {
    pub periods: u32,
    /// Payment due in each period of the phase.
    pub payment: Money,
    pub total: Money,
}

impl PhaseSummary {
    fn level(periods: u32, payment: Money) -> Self {
        PhaseSummary {
            periods,
            payment,
            total: payment * Decimal::from(periods),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GracePeriodSimulationResult {
    pub utilization: PhaseSummary,
    pub grace: PhaseSummary,
    pub amortization: PhaseSummary,
    /// Tuition paid by the loan over the whole course.
    pub financed_total: Money,
    /// Full tuition over the whole course.
    pub course_total_cost: Money,
    pub total_paid: Money,
    /// `total_paid - course_total_cost`.
    pub total_interest: Money,
    /// Every payment of the three phases, indexed continuously.
    pub schedule: Vec<InstallmentRecord>,
}

impl Simulator {
    /// # Errors
    ///
    /// Returns `InvalidParameter` for a non-positive fee, a financed
    /// percentage outside (0, 100], zero semesters or multiplier, a negative
    /// rate, or a timeline too long to count.
    pub fn simulate_grace_period(
        &self,
        params: &GracePeriodParameters,
    ) -> FinancingResult<GracePeriodSimulationResult> {
        debug!(
            "Simulating student financing: {} semesters, {}% financed",
            params.course_duration_semesters, params.financed_percentage
        );
        require_positive("monthly_course_fee", params.monthly_course_fee)?;
        require_non_negative("monthly_rate", params.monthly_rate)?;
        if params.financed_percentage <= Decimal::ZERO
            || params.financed_percentage > Decimal::ONE_HUNDRED
        {
            return Err(FinancingError::invalid(
                "financed_percentage",
                "must be greater than 0 and at most 100",
            ));
        }
        if params.course_duration_semesters == 0 {
            return Err(FinancingError::invalid(
                "course_duration_semesters",
                "must be at least 1",
            ));
        }
        if params.amortization_multiplier == 0 {
            return Err(FinancingError::invalid(
                "amortization_multiplier",
                "must be at least 1",
            ));
        }

        let rules = &self.config().grace;
        let course_months = params
            .course_duration_semesters
            .checked_mul(rules.months_per_semester)
            .ok_or_else(|| FinancingError::invalid("course_duration_semesters", "too long"))?;
        let amortization_periods = course_months
            .checked_mul(params.amortization_multiplier)
            .ok_or_else(|| FinancingError::invalid("amortization_multiplier", "too long"))?;

        let financed_monthly = percent_of(params.monthly_course_fee, params.financed_percentage);
        let co_participation = params.monthly_course_fee - financed_monthly;
        let financed_total = financed_monthly * Decimal::from(course_months);
        let course_total_cost = params.monthly_course_fee * Decimal::from(course_months);

        let utilization = PhaseSummary::level(course_months, co_participation);
        let grace = PhaseSummary::level(rules.grace_periods, financed_total * params.monthly_rate);

        let price = generate_schedule(financed_total, params.monthly_rate, amortization_periods)?;
        let amortization = PhaseSummary {
            periods: amortization_periods,
            payment: price.installment_amount,
            total: price.total_paid,
        };

        let timeline_len = course_months
            .saturating_add(rules.grace_periods)
            .saturating_add(amortization_periods);
        let mut schedule = Vec::with_capacity(timeline_len as usize);
        for month in 1..=course_months {
            schedule.push(InstallmentRecord {
                index: month,
                payment_amount: co_participation,
                interest_portion: Decimal::ZERO,
                principal_portion: Decimal::ZERO,
                remaining_balance: financed_monthly * Decimal::from(month),
                kind: RecordKind::CoParticipation,
            });
        }
        for month in 1..=rules.grace_periods {
            schedule.push(InstallmentRecord {
                index: course_months + month,
                payment_amount: grace.payment,
                interest_portion: grace.payment,
                principal_portion: Decimal::ZERO,
                remaining_balance: financed_total,
                kind: RecordKind::InterestOnly,
            });
        }
        let offset = course_months + rules.grace_periods;
        schedule.extend(price.records.into_iter().map(|record| InstallmentRecord {
            index: offset + record.index,
            ..record
        }));

        let total_paid = utilization.total + grace.total + amortization.total;

        Ok(GracePeriodSimulationResult {
            utilization,
            grace,
            amortization,
            financed_total,
            course_total_cost,
            total_paid,
            total_interest: total_paid - course_total_cost,
            schedule,
        })
    }
}

/// Runs [`Simulator::simulate_grace_period`] with the default configuration.
pub fn simulate_grace_period(params: &GracePeriodParameters) -> FinancingResult<GracePeriodSimulationResult> {
    Simulator::default().simulate_grace_period(params)
}
