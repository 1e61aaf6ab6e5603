use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PayoffError;
use crate::time_value::{monthly_rate, round_currency};
use crate::types::{Money, RatePercent, HORIZON_MONTHS};
use crate::PayoffOutcome;

/// Input to the month-by-month simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationInput {
    pub balance: Money,
    /// Annual rate in percent (5 = 5% APR).
    pub annual_rate_percent: RatePercent,
    pub monthly_payment: Money,
}

impl AmortizationInput {
    pub fn new(balance: Money, annual_rate_percent: RatePercent, monthly_payment: Money) -> Self {
        Self {
            balance,
            annual_rate_percent,
            monthly_payment,
        }
    }

    pub fn validate(&self) -> PayoffOutcome<()> {
        if self.balance <= Decimal::ZERO {
            return Err(PayoffError::invalid("balance", "Balance must be positive"));
        }
        if self.annual_rate_percent < Decimal::ZERO {
            return Err(PayoffError::invalid(
                "annual_rate_percent",
                "Interest rate must be non-negative",
            ));
        }
        if self.monthly_payment <= Decimal::ZERO {
            return Err(PayoffError::invalid(
                "monthly_payment",
                "Monthly payment must be positive",
            ));
        }
        Ok(())
    }
}

/// One simulated month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    pub month: u32,
    pub payment: Money,
    pub principal_portion: Money,
    pub interest_portion: Money,
    pub remaining_balance: Money,
    pub cumulative_interest: Money,
}

/// A complete schedule that ends with a zero balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub rows: Vec<AmortizationRow>,
    pub months: u32,
    pub total_payments: Money,
    pub total_interest: Money,
}

impl AmortizationSchedule {
    /// Copy with every amount rounded to `dp` places, for display.
    pub fn rounded(&self, dp: u32) -> Self {
        let round = |v: Money| {
            if dp == 2 {
                round_currency(v)
            } else {
                v.round_dp(dp)
            }
        };
        Self {
            rows: self
                .rows
                .iter()
                .map(|r| AmortizationRow {
                    month: r.month,
                    payment: round(r.payment),
                    principal_portion: round(r.principal_portion),
                    interest_portion: round(r.interest_portion),
                    remaining_balance: round(r.remaining_balance),
                    cumulative_interest: round(r.cumulative_interest),
                })
                .collect(),
            months: self.months,
            total_payments: round(self.total_payments),
            total_interest: round(self.total_interest),
        }
    }
}

/// Simulate the loan month by month until the balance reaches zero.
///
/// Fails with `PaymentTooLow` as soon as a payment would not cover the
/// month's interest, and with `PayoffExceedsHorizon` when the balance is
/// still outstanding after `HORIZON_MONTHS`. No partial schedule is
/// returned in either case.
pub fn simulate_amortization(input: &AmortizationInput) -> PayoffOutcome<AmortizationSchedule> {
    input.validate()?;

    let rate = monthly_rate(input.annual_rate_percent);
    let mut balance = input.balance;
    let mut cumulative_interest = Decimal::ZERO;
    let mut total_payments = Decimal::ZERO;
    let mut rows = Vec::new();

    for month in 1..=HORIZON_MONTHS {
        let interest = balance * rate;
        if input.monthly_payment - interest <= Decimal::ZERO {
            debug!(month, %interest, payment = %input.monthly_payment, "payment does not cover interest");
            return Err(PayoffError::PaymentTooLow {
                payment: input.monthly_payment,
                interest,
            });
        }

        let owed = balance + interest;
        let payment = input.monthly_payment.min(owed);
        let principal = payment - interest;
        // A capped payment settles the loan outright.
        balance = if payment < input.monthly_payment {
            Decimal::ZERO
        } else {
            (balance - principal).max(Decimal::ZERO)
        };

        cumulative_interest += interest;
        total_payments += payment;
        rows.push(AmortizationRow {
            month,
            payment,
            principal_portion: principal,
            interest_portion: interest,
            remaining_balance: balance,
            cumulative_interest,
        });

        if balance.is_zero() {
            return Ok(AmortizationSchedule {
                months: month,
                rows,
                total_payments,
                total_interest: cumulative_interest,
            });
        }
    }

    debug!(%balance, "balance outstanding at horizon");
    Err(PayoffError::PayoffExceedsHorizon {
        horizon_months: HORIZON_MONTHS,
    })
}
