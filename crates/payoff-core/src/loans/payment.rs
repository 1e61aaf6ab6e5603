use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::PayoffError;
use crate::time_value::{annuity_payment, monthly_rate, round_currency};
use crate::types::{Money, RatePercent};
use crate::PayoffOutcome;

/// Terms of a fixed-payment amortizing loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Money,
    /// Annual rate in percent (5 = 5% APR).
    pub annual_rate_percent: RatePercent,
    pub term_months: u32,
}

impl LoanTerms {
    pub fn new(principal: Money, annual_rate_percent: RatePercent, term_months: u32) -> Self {
        Self {
            principal,
            annual_rate_percent,
            term_months,
        }
    }

    pub fn validate(&self) -> PayoffOutcome<()> {
        if self.principal < Decimal::ZERO {
            return Err(PayoffError::invalid(
                "principal",
                "Principal must be non-negative",
            ));
        }
        if self.annual_rate_percent < Decimal::ZERO {
            return Err(PayoffError::invalid(
                "annual_rate_percent",
                "Interest rate must be non-negative",
            ));
        }
        if self.term_months == 0 {
            return Err(PayoffError::invalid(
                "term_months",
                "Term must be at least 1 month",
            ));
        }
        Ok(())
    }
}

/// Fixed monthly payment for a loan, rounded to cents.
///
/// `principal · r / (1 − (1 + r)^−n)` with `r = APR / 100 / 12`; a zero
/// rate degenerates to `principal / n`.
pub fn compute_monthly_payment(terms: &LoanTerms) -> PayoffOutcome<Money> {
    terms.validate()?;
    let rate = monthly_rate(terms.annual_rate_percent);
    let payment = annuity_payment(terms.principal, rate, terms.term_months)?;
    Ok(round_currency(payment))
}
