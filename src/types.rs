use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Currency amounts (BRL).
pub type Money = Decimal;

/// Rates as decimal fractions per period (0.015 = 1.5%), unless a field says
/// it holds a percentage.
pub type Rate = Decimal;

/// What a schedule row represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// Regular Price installment: interest plus amortization.
    Ordinary,
    /// Bullet repayment of the held-back principal.
    Balloon,
    /// Student share of the tuition while the course is running.
    CoParticipation,
    /// Interest paid during a grace period; the balance does not move.
    InterestOnly,
}

/// Represents the payment details for a single period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentRecord {
    /// 1-based position in the schedule.
    pub index: u32,
    pub payment_amount: Money,
    /// The portion of the payment that covers interest.
    pub interest_portion: Money,
    /// The portion of the payment that goes towards reducing the principal.
    pub principal_portion: Money,
    /// The remaining balance of the loan after the payment, never negative.
    pub remaining_balance: Money,
    pub kind: RecordKind,
}

/// A Price table: the fixed installment plus the period-by-period breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    /// The fixed installment amount.
    pub installment_amount: Money,
    /// `installment_amount * number_of_periods`.
    pub total_paid: Money,
    /// `total_paid - financed amount`.
    pub total_interest: Money,
    pub records: Vec<InstallmentRecord>,
}

impl AmortizationSchedule {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sum of the principal portions of every row.
    pub fn total_amortized(&self) -> Money {
        self.records.iter().map(|r| r.principal_portion).sum()
    }

    /// Balance after the last row, zero for an empty schedule.
    pub fn final_balance(&self) -> Money {
        self.records
            .last()
            .map(|r| r.remaining_balance)
            .unwrap_or(Decimal::ZERO)
    }
}
