use chrono::{Months, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::error::PayoffError;
use crate::types::{Money, MonthlyRate, RatePercent, HORIZON_MONTHS};
use crate::PayoffOutcome;

/// Remaining balances at or below this are treated as fully repaid when
/// snapping the closed-form period count.
const BALANCE_EPSILON: Decimal = dec!(0.000000001);

/// Convert an annual percentage rate to the simple monthly rate (APR / 100 / 12).
pub fn monthly_rate(annual_rate_percent: RatePercent) -> MonthlyRate {
    annual_rate_percent / dec!(1200)
}

/// Round a currency amount to cents, half away from zero.
pub fn round_currency(amount: Money) -> Money {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// (1 + r)^n
pub fn growth_factor(rate: MonthlyRate, periods: u32) -> PayoffOutcome<Decimal> {
    (Decimal::ONE + rate)
        .checked_powi(i64::from(periods))
        .ok_or_else(|| {
            PayoffError::invalid(
                "annual_rate_percent",
                format!("rate overflows when compounded over {periods} months"),
            )
        })
}

/// Level payment that amortizes `principal` over `periods` months (unrounded).
pub fn annuity_payment(
    principal: Money,
    rate: MonthlyRate,
    periods: u32,
) -> PayoffOutcome<Money> {
    if periods == 0 {
        return Err(PayoffError::invalid(
            "term_months",
            "Number of months must be at least 1",
        ));
    }

    if rate.is_zero() {
        return Ok(principal / Decimal::from(periods));
    }

    let factor = growth_factor(rate, periods)?;
    let denominator = factor - Decimal::ONE;
    if denominator.is_zero() {
        return Err(PayoffError::invalid(
            "annual_rate_percent",
            "rate too small to amortize over the term",
        ));
    }

    Ok(principal * rate * factor / denominator)
}

/// Balance left after `periods` level payments of `payment`.
///
/// May be negative when the payments overshoot the loan. Overflow means the
/// balance has grown past anything repayable within the horizon.
pub fn remaining_balance(
    principal: Money,
    rate: MonthlyRate,
    payment: Money,
    periods: u32,
) -> PayoffOutcome<Money> {
    let beyond_horizon = || PayoffError::PayoffExceedsHorizon {
        horizon_months: HORIZON_MONTHS,
    };

    if rate.is_zero() {
        return payment
            .checked_mul(Decimal::from(periods))
            .and_then(|paid| principal.checked_sub(paid))
            .ok_or_else(beyond_horizon);
    }
    let factor = (Decimal::ONE + rate)
        .checked_powi(i64::from(periods))
        .ok_or_else(beyond_horizon)?;
    let grown = principal.checked_mul(factor).ok_or_else(beyond_horizon)?;
    let repaid = payment
        .checked_mul(factor - Decimal::ONE)
        .and_then(|v| v.checked_div(rate))
        .ok_or_else(beyond_horizon)?;
    grown.checked_sub(repaid).ok_or_else(beyond_horizon)
}

/// Fractional number of months for `payment` to retire `principal`:
/// `-ln(1 - B·r/PMT) / ln(1 + r)`, or `B / PMT` at a zero rate.
pub fn fractional_periods(
    principal: Money,
    rate: MonthlyRate,
    payment: Money,
) -> PayoffOutcome<Decimal> {
    if payment <= Decimal::ZERO {
        return Err(PayoffError::invalid(
            "monthly_payment",
            "Payment must be positive",
        ));
    }

    if rate.is_zero() {
        return Ok(principal / payment);
    }

    let interest = principal
        .checked_mul(rate)
        .ok_or_else(|| PayoffError::invalid("balance", "monthly interest overflows"))?;
    if payment <= interest {
        return Err(PayoffError::PaymentTooLow { payment, interest });
    }

    let log_term = (Decimal::ONE - interest / payment)
        .checked_ln()
        .ok_or_else(|| PayoffError::invalid("monthly_payment", "logarithm undefined"))?;
    let log_growth = (Decimal::ONE + rate)
        .checked_ln()
        .ok_or_else(|| PayoffError::invalid("annual_rate_percent", "logarithm undefined"))?;
    if log_growth.is_zero() {
        return Ok(principal / payment);
    }

    Ok(-log_term / log_growth)
}

/// Whole months to pay off `principal`, taking the ceiling of the closed form
/// and snapping it against the exact balance recurrence so that the final
/// month is the first one whose closing balance is zero.
pub fn whole_periods(
    principal: Money,
    rate: MonthlyRate,
    payment: Money,
) -> PayoffOutcome<u32> {
    let raw = fractional_periods(principal, rate, payment)?.round_dp(8).ceil();
    // Past one month beyond the horizon the snap cannot bring it back inside.
    if raw > Decimal::from(HORIZON_MONTHS + 1) {
        return Err(PayoffError::PayoffExceedsHorizon {
            horizon_months: HORIZON_MONTHS,
        });
    }
    let estimate = raw
        .to_u32()
        .ok_or_else(|| PayoffError::invalid("monthly_payment", "period count out of range"))?
        .max(1);

    let mut months = estimate;
    if months > 1 && remaining_balance(principal, rate, payment, months - 1)? <= BALANCE_EPSILON {
        months -= 1;
    } else if remaining_balance(principal, rate, payment, months)? > BALANCE_EPSILON {
        months += 1;
    }
    Ok(months)
}

/// Add calendar months, clamping the day to the target month's last day.
pub fn add_months(date: NaiveDate, months: u32) -> PayoffOutcome<NaiveDate> {
    date.checked_add_months(Months::new(months))
        .ok_or_else(|| PayoffError::DateError(format!("{date} + {months} months overflows")))
}
