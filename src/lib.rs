//! `br_loan_sim` is the calculation engine behind brazilian loan simulators.
//!
//! It provides the pieces every simulator shares:
//! - **Price table (Sistema Francês de Amortização)**: fixed installments and the
//!   period-by-period split between interest and amortization.
//! - **IOF**: the tax on financial operations, a daily accrual capped at one year
//!   plus a flat charge.
//! - **CET (Custo Efetivo Total)**: the effective rate implied by the installments
//!   against the amount actually received, solved with Newton-Raphson.
//!
//! On top of them sit the product simulators: plain financing, balloon (VFG)
//! financing, FIES-style student loans with a grace period, and leasing versus
//! financing comparisons.
//!
//! ## Usage
//!
//! Add `br_loan_sim` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! br_loan_sim = "0.1.0"
//! rust_decimal = "1.39.0"
//! rust_decimal_macros = "1.39.0"
//! ```
//!
//! Then, use `simulate_financing` to get the installment, the schedule and the CET:
//!
//! ```rust
//! use br_loan_sim::{simulate_financing, LoanParameters};
//! use rust_decimal_macros::dec;
//!
//! fn main() {
//!     let params = LoanParameters {
//!         opening_fee: Some(dec!(800)),
//!         include_tax: true,
//!         compute_effective_rate: true,
//!         ..LoanParameters::new(dec!(40_000), dec!(0.015), 48)
//!     };
//!
//!     match simulate_financing(&params) {
//!         Ok(result) => {
//!             println!("Installment: {:.2}", result.installment_amount);
//!             println!("Total paid:  {:.2}", result.total_paid);
//!             println!("IOF:         {:.2}", result.tax_amount());
//!             if let Some(cet) = &result.effective_rate {
//!                 println!("CET:         {:.2}% a.m. / {:.2}% a.a.", cet.monthly_rate, cet.annual_rate);
//!             }
//!         }
//!         Err(e) => {
//!             eprintln!("Error simulating financing: {}", e);
//!         }
//!     }
//! }
//! ```

pub mod cet;
pub mod config;
pub mod error;
pub mod iof;
pub mod price;
pub mod rates;
pub mod simulation;
pub mod types;

pub use cet::{EffectiveRate, solve_effective_rate};
pub use config::EngineConfig;
pub use error::{FinancingError, FinancingResult};
pub use iof::{TaxResult, compute_transaction_tax};
pub use price::{fixed_installment, generate_schedule};
pub use rates::{VehicleCategory, adjusted_rate, annualize_periodic_rate, normalize_annual_interest_rate};
pub use simulation::balloon::{BalloonParameters, BalloonSimulationResult, simulate_balloon};
pub use simulation::financing::{LoanParameters, simulate_financing};
pub use simulation::grace_period::{
    GracePeriodParameters, GracePeriodSimulationResult, PhaseSummary, simulate_grace_period,
};
pub use simulation::leasing::{LeasingComparisonResult, LeasingParameters, Winner, compare_leasing};
pub use simulation::{SimulationResult, Simulator};
pub use types::{AmortizationSchedule, InstallmentRecord, Money, Rate, RecordKind};
