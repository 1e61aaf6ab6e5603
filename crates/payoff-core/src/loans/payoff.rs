use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PayoffError;
use crate::loans::schedule::{simulate_amortization, AmortizationInput};
use crate::time_value::{add_months, monthly_rate, remaining_balance, whole_periods};
use crate::types::{Money, RatePercent, HORIZON_MONTHS};
use crate::PayoffOutcome;

/// When a loan is repaid under a fixed monthly payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoffResult {
    pub payoff_date: NaiveDate,
    pub total_interest: Money,
    pub total_months: u32,
    /// Best-effort days into the final month covered by the last, possibly
    /// partial, payment. Month precision is the guaranteed contract.
    pub extra_days: u32,
}

impl PayoffResult {
    /// `PMT × months − balance`: ignores the smaller final payment, so it
    /// overstates interest by up to one payment.
    pub fn approximate_total_interest(&self, balance: Money, monthly_payment: Money) -> Money {
        monthly_payment * Decimal::from(self.total_months) - balance
    }
}

fn validate(
    balance: Money,
    annual_rate_percent: RatePercent,
    monthly_payment: Money,
) -> PayoffOutcome<()> {
    AmortizationInput::new(balance, annual_rate_percent, monthly_payment).validate()
}

/// Whole months until payoff, without any calendar.
pub fn months_to_payoff(
    balance: Money,
    annual_rate_percent: RatePercent,
    monthly_payment: Money,
) -> PayoffOutcome<u32> {
    validate(balance, annual_rate_percent, monthly_payment)?;
    let rate = monthly_rate(annual_rate_percent);

    let months = whole_periods(balance, rate, monthly_payment)?;
    if months > HORIZON_MONTHS {
        debug!(months, "closed-form payoff beyond horizon");
        return Err(PayoffError::PayoffExceedsHorizon {
            horizon_months: HORIZON_MONTHS,
        });
    }
    Ok(months)
}

/// Project the payoff date and interest cost with the closed-form annuity
/// formulas, dating months from `as_of`.
pub fn project_payoff(
    balance: Money,
    annual_rate_percent: RatePercent,
    monthly_payment: Money,
    as_of: NaiveDate,
) -> PayoffOutcome<PayoffResult> {
    let months = months_to_payoff(balance, annual_rate_percent, monthly_payment)?;
    let rate = monthly_rate(annual_rate_percent);

    // Balance entering the final month, then what is owed on it.
    let before_final = remaining_balance(balance, rate, monthly_payment, months - 1)?;
    let final_payment = (before_final * (Decimal::ONE + rate)).min(monthly_payment);
    let total_paid = monthly_payment * Decimal::from(months - 1) + final_payment;

    build_result(
        as_of,
        months,
        total_paid - balance,
        final_payment,
        monthly_payment,
    )
}

/// Same projection, derived by running the monthly simulator to completion.
pub fn project_payoff_simulated(
    balance: Money,
    annual_rate_percent: RatePercent,
    monthly_payment: Money,
    as_of: NaiveDate,
) -> PayoffOutcome<PayoffResult> {
    let schedule = simulate_amortization(&AmortizationInput::new(
        balance,
        annual_rate_percent,
        monthly_payment,
    ))?;
    let final_payment = schedule
        .rows
        .last()
        .map(|r| r.payment)
        .unwrap_or(monthly_payment);

    build_result(
        as_of,
        schedule.months,
        schedule.total_interest,
        final_payment,
        monthly_payment,
    )
}

fn build_result(
    as_of: NaiveDate,
    months: u32,
    total_interest: Money,
    final_payment: Money,
    monthly_payment: Money,
) -> PayoffOutcome<PayoffResult> {
    let payoff_date = add_months(as_of, months)?;
    let final_month_start = add_months(as_of, months - 1)?;
    let span = (payoff_date - final_month_start).num_days();

    let fraction = (final_payment / monthly_payment).clamp(Decimal::ZERO, Decimal::ONE);
    let extra_days = (fraction * Decimal::from(span))
        .ceil()
        .to_u32()
        .unwrap_or(0);

    Ok(PayoffResult {
        payoff_date,
        total_interest,
        total_months: months,
        extra_days,
    })
}
