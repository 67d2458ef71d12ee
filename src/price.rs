//! Price table (Sistema Francês de Amortização): fixed installments whose
//! split between interest and amortization shifts over time.

use rust_decimal::{Decimal, MathematicalOps};

use crate::error::{FinancingError, FinancingResult};
use crate::types::{AmortizationSchedule, InstallmentRecord, Money, Rate, RecordKind};

/// Calculates the fixed installment of a Price table.
///
/// The formula is: PMT = P * i * [(1 + i)^n / ((1 + i)^n – 1)]
///
/// The annuity factor in brackets is taken first so the intermediate
/// products stay near `P * i`, even for long terms at high rates. Once
/// `(1 + i)^n` no longer fits a `Decimal` the factor is 1 to every
/// representable digit and the installment is plain interest on `P`.
///
/// A zero rate makes the denominator vanish; the installment is then the
/// plain division `P / n`.
///
/// # Errors
///
/// Returns `InvalidParameter` if `number_of_periods` is zero, `total_financed`
/// is not positive, `periodic_rate` is negative, or `P * i` itself overflows.
pub fn fixed_installment(
    total_financed: Money,
    periodic_rate: Rate,
    number_of_periods: u32,
) -> FinancingResult<Money> {
    validate(total_financed, periodic_rate, number_of_periods)?;

    let periods = Decimal::from(number_of_periods);
    if periodic_rate.is_zero() {
        return Ok(total_financed / periods);
    }

    let annuity_factor = match (Decimal::ONE + periodic_rate).checked_powu(number_of_periods.into()) {
        Some(i_plus_1_pow_n) => {
            let growth = i_plus_1_pow_n - Decimal::ONE;
            if growth.is_zero() {
                // Rate too small to register after compounding.
                return Ok(total_financed / periods);
            }
            i_plus_1_pow_n
                .checked_div(growth)
                .ok_or_else(|| FinancingError::invalid("periodic_rate", "annuity factor overflows"))?
        }
        None => Decimal::ONE,
    };

    total_financed
        .checked_mul(periodic_rate)
        .and_then(|interest| interest.checked_mul(annuity_factor))
        .ok_or_else(|| FinancingError::invalid("total_financed", "installment overflows"))
}

/// Builds the full Price table for `total_financed`.
///
/// The last period amortizes whatever balance is left, so the schedule
/// always closes at exactly zero; that row's payment is its interest plus
/// that balance.
///
/// ```rust
/// use br_loan_sim::generate_schedule;
/// use rust_decimal_macros::dec;
///
/// let schedule = generate_schedule(dec!(40_000), dec!(0.015), 48).unwrap();
/// assert_eq!(schedule.installment_amount.round_dp(2), dec!(1175.00));
/// assert_eq!(schedule.records.len(), 48);
/// assert_eq!(schedule.final_balance(), dec!(0));
/// ```
///
/// # Errors
///
/// Same conditions as [`fixed_installment`].
pub fn generate_schedule(
    total_financed: Money,
    periodic_rate: Rate,
    number_of_periods: u32,
) -> FinancingResult<AmortizationSchedule> {
    let installment_amount = fixed_installment(total_financed, periodic_rate, number_of_periods)?;

    let mut current_balance = total_financed;
    let mut records = Vec::with_capacity(number_of_periods as usize);

    for index in 1..=number_of_periods {
        let interest_payment = current_balance * periodic_rate;
        let (amortization, payment) = if index == number_of_periods {
            (current_balance, current_balance + interest_payment)
        } else {
            (installment_amount - interest_payment, installment_amount)
        };
        current_balance = (current_balance - amortization).max(Decimal::ZERO);

        records.push(InstallmentRecord {
            index,
            payment_amount: payment,
            interest_portion: interest_payment,
            principal_portion: amortization,
            remaining_balance: current_balance,
            kind: RecordKind::Ordinary,
        });
    }

    let total_paid = installment_amount * Decimal::from(number_of_periods);

    Ok(AmortizationSchedule {
        installment_amount,
        total_paid,
        total_interest: total_paid - total_financed,
        records,
    })
}

fn validate(total_financed: Money, periodic_rate: Rate, number_of_periods: u32) -> FinancingResult<()> {
    if number_of_periods == 0 {
        return Err(FinancingError::invalid(
            "number_of_periods",
            "must be at least 1",
        ));
    }
    if total_financed <= Decimal::ZERO {
        return Err(FinancingError::invalid(
            "total_financed",
            "must be greater than zero",
        ));
    }
    if periodic_rate < Decimal::ZERO {
        return Err(FinancingError::invalid("periodic_rate", "cannot be negative"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::normalize_annual_interest_rate;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[test]
    fn test_price_table_happy_path() {
        let monthly_rate = normalize_annual_interest_rate(dec!(12));
        let schedule = generate_schedule(dec!(12000), monthly_rate, 12).unwrap();

        assert_eq!(schedule.installment_amount.round_dp(2), dec!(1062.74));
        assert_eq!(schedule.total_paid.round_dp(2), dec!(12752.94));
        assert_eq!(schedule.records.len(), 12);
    }

    #[test]
    fn test_vehicle_scenario() {
        let schedule = generate_schedule(dec!(40000), dec!(0.015), 48).unwrap();

        assert_eq!(schedule.installment_amount.round_dp(2), dec!(1175.00));
        assert_eq!(schedule.total_interest.round(), dec!(16400));

        let first = &schedule.records[0];
        assert_eq!(first.index, 1);
        assert_eq!(first.interest_portion, dec!(600));
        assert_eq!(
            first.principal_portion.round_dp(2),
            (schedule.installment_amount - dec!(600)).round_dp(2)
        );
    }

    #[test]
    fn test_zero_rate_is_linear() {
        let schedule = generate_schedule(dec!(10000), Decimal::ZERO, 10).unwrap();

        assert_eq!(schedule.installment_amount, dec!(1000));
        assert_eq!(schedule.total_paid, dec!(10000));
        assert_eq!(schedule.total_interest, Decimal::ZERO);
        assert!(schedule.records.iter().all(|r| r.interest_portion.is_zero()));
        assert_eq!(schedule.records[4].remaining_balance, dec!(5000));
        assert_eq!(schedule.final_balance(), Decimal::ZERO);
    }

    #[test]
    fn test_single_period() {
        let schedule = generate_schedule(dec!(1000), dec!(0.02), 1).unwrap();

        assert_eq!(schedule.installment_amount, dec!(1020));
        assert_eq!(schedule.records[0].payment_amount, dec!(1020));
        assert_eq!(schedule.records[0].principal_portion, dec!(1000));
        assert_eq!(schedule.final_balance(), Decimal::ZERO);
    }

    #[rstest]
    #[case(dec!(1000), dec!(0.01), 0, "number_of_periods")]
    #[case(dec!(0), dec!(0.01), 12, "total_financed")]
    #[case(dec!(-500), dec!(0.01), 12, "total_financed")]
    #[case(dec!(1000), dec!(-0.01), 12, "periodic_rate")]
    fn test_invalid_parameters(
        #[case] total: Decimal,
        #[case] rate: Decimal,
        #[case] periods: u32,
        #[case] expected_field: &str,
    ) {
        match generate_schedule(total, rate, periods) {
            Err(FinancingError::InvalidParameter { field, .. }) => assert_eq!(field, expected_field),
            other => panic!("expected InvalidParameter, got {other:?}"),
        }
    }

    #[rstest]
    #[case(dec!(1_000_000), dec!(0.1), 600)]
    #[case(dec!(2_000_000), dec!(0.05), 1200)]
    #[case(dec!(500_000), dec!(1), 360)]
    fn test_long_high_rate_terms(#[case] total: Decimal, #[case] rate: Decimal, #[case] periods: u32) {
        let schedule = generate_schedule(total, rate, periods).unwrap();

        // Amortization is negligible for most of the term, so the installment
        // converges to the interest on the principal.
        assert_eq!(schedule.installment_amount.round_dp(2), (total * rate).round_dp(2));
        assert_eq!(schedule.records.len(), periods as usize);
        assert_eq!(schedule.final_balance(), Decimal::ZERO);
        assert!(schedule.total_interest > Decimal::ZERO);
    }

    proptest! {
        #[test]
        fn prop_schedule_is_consistent(
            principal in 1_000u32..2_000_000,
            rate_bp in 0u32..500,
            periods in 1u32..=240,
        ) {
            let principal = Decimal::from(principal);
            let rate = Decimal::new(rate_bp.into(), 4);
            let schedule = generate_schedule(principal, rate, periods).unwrap();

            prop_assert_eq!(schedule.records.len(), periods as usize);
            prop_assert_eq!(
                schedule.total_paid,
                schedule.installment_amount * Decimal::from(periods)
            );

            let tolerance = principal * dec!(0.000001);
            prop_assert!((schedule.total_amortized() - principal).abs() <= tolerance);

            let mut previous = principal;
            for record in &schedule.records {
                prop_assert!(record.remaining_balance <= previous);
                prop_assert!(
                    (record.payment_amount - record.interest_portion - record.principal_portion).abs()
                        < dec!(0.000000000001)
                );
                previous = record.remaining_balance;
            }
            prop_assert!(schedule.final_balance().abs() <= dec!(0.000001));
        }
    }
}
