//! Loan amortization and payoff-projection engine.
//!
//! Pure, deterministic functions over `rust_decimal::Decimal`: fixed
//! payment quotes, month-by-month schedules, closed-form payoff projection
//! and the payment needed to keep a payoff horizon after a rate change.
//! The reference date is always an explicit argument.

#[cfg(feature = "loans")]
pub mod api;
pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "loans")]
pub mod loans;

#[cfg(feature = "debts")]
pub mod debts;

#[cfg(feature = "budget")]
pub mod budget;

pub use error::PayoffError;
pub use types::*;

/// Standard result type for all payoff operations
pub type PayoffOutcome<T> = Result<T, PayoffError>;
