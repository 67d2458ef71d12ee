//! Rate conversions and the per-category rate adjustment used by the vehicle
//! simulator.

use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};

use crate::config::RateAdjustmentConfig;
use crate::error::{FinancingError, FinancingResult};
use crate::types::Rate;

/// Normalizes an annual interest rate percentage to a monthly decimal factor.
///
/// This function converts a rate like 10.5% per year into its equivalent monthly
/// rate for use in compound interest calculations.
pub fn normalize_annual_interest_rate(input: Decimal) -> Rate {
    let base = Decimal::ONE + input / Decimal::ONE_HUNDRED;
    let exponent = Decimal::ONE / Decimal::from(12);

    base.powd(exponent) - Decimal::ONE
}

/// Compounds a periodic rate (fraction) over a year and returns it as a
/// percentage: `((1 + i)^periods_per_year - 1) * 100`.
///
/// # Errors
///
/// Returns `InvalidParameter` when the rate is at or below -100% or the
/// power overflows.
pub fn annualize_periodic_rate(periodic_rate: Rate, periods_per_year: u32) -> FinancingResult<Rate> {
    let base = Decimal::ONE + periodic_rate;
    if base <= Decimal::ZERO {
        return Err(FinancingError::invalid(
            "periodic_rate",
            "must be greater than -100%",
        ));
    }
    let compounded = base.checked_powu(periods_per_year.into()).ok_or_else(|| {
        FinancingError::invalid("periodic_rate", "too large to annualize")
    })?;

    Ok((compounded - Decimal::ONE) * Decimal::ONE_HUNDRED)
}

/// Vehicle categories offered by the financing simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleCategory {
    Car,
    Motorcycle,
    Truck,
    Utility,
}

impl RateAdjustmentConfig {
    /// Base rate plus the category spread, plus the used-vehicle surcharge
    /// when `is_used`.
    pub fn adjusted_rate(&self, category: VehicleCategory, is_used: bool, base_rate: Rate) -> Rate {
        let spread = match category {
            VehicleCategory::Car => self.car_spread,
            VehicleCategory::Motorcycle => self.motorcycle_spread,
            VehicleCategory::Truck => self.truck_spread,
            VehicleCategory::Utility => self.utility_spread,
        };
        let surcharge = if is_used { self.used_surcharge } else { Decimal::ZERO };

        base_rate + spread + surcharge
    }
}

/// Monthly rate the vehicle simulator should use for `category`, with the
/// default spreads. Callers recompute it whenever the selection changes.
pub fn adjusted_rate(category: VehicleCategory, is_used: bool, base_rate: Rate) -> Rate {
    RateAdjustmentConfig::default().adjusted_rate(category, is_used, base_rate)
}
