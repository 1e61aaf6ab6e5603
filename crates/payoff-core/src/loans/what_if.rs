//! What-if solvers layered on the payoff projection: the payment that keeps
//! a payoff horizon after a rate change, the effect of paying extra each
//! month, and a sweep across candidate rates.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::error::PayoffError;
use crate::loans::payoff::{months_to_payoff, project_payoff, PayoffResult};
use crate::time_value::{annuity_payment, monthly_rate, round_currency};
use crate::types::{with_metadata, ComputationOutput, Money, RatePercent};
use crate::PayoffOutcome;

// ---------------------------------------------------------------------------
// Required payment after a rate change
// ---------------------------------------------------------------------------

/// Monthly payment at `new_rate` that pays the loan off in the same number
/// of months `current_payment` takes at `old_rate`, rounded to cents.
///
/// Errors from projecting the original plan propagate unchanged.
pub fn required_payment(
    balance: Money,
    old_rate: RatePercent,
    new_rate: RatePercent,
    current_payment: Money,
) -> PayoffOutcome<Money> {
    let original_months = months_to_payoff(balance, old_rate, current_payment)?;
    if new_rate < Decimal::ZERO {
        return Err(PayoffError::invalid(
            "new_rate",
            "Interest rate must be non-negative",
        ));
    }

    let payment = annuity_payment(balance, monthly_rate(new_rate), original_months)?;
    debug!(original_months, %payment, "required payment solved");
    Ok(round_currency(payment))
}

// ---------------------------------------------------------------------------
// Extra payment impact
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtraPaymentInput {
    pub balance: Money,
    pub annual_rate_percent: RatePercent,
    pub monthly_payment: Money,
    /// Added on top of `monthly_payment` every month.
    pub extra_monthly: Money,
    pub as_of: NaiveDate,
}

/// A projection that may legitimately have no answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProjectionOutcome {
    PaidOff(PayoffResult),
    Unpayable { code: String, message: String },
}

impl ProjectionOutcome {
    pub(crate) fn from_result(result: PayoffOutcome<PayoffResult>) -> PayoffOutcome<Self> {
        match result {
            Ok(payoff) => Ok(ProjectionOutcome::PaidOff(payoff)),
            Err(e @ PayoffError::PaymentTooLow { .. })
            | Err(e @ PayoffError::PayoffExceedsHorizon { .. }) => {
                Ok(ProjectionOutcome::Unpayable {
                    code: e.code().to_string(),
                    message: e.to_string(),
                })
            }
            Err(e) => Err(e),
        }
    }

    pub fn payoff(&self) -> Option<&PayoffResult> {
        match self {
            ProjectionOutcome::PaidOff(p) => Some(p),
            ProjectionOutcome::Unpayable { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtraPaymentImpact {
    pub baseline: ProjectionOutcome,
    pub accelerated: PayoffResult,
    pub accelerated_payment: Money,
    /// Present only when the baseline itself pays off.
    pub months_saved: Option<u32>,
    pub interest_saved: Option<Money>,
}

/// Compare the payoff of the current plan with the plan plus an extra
/// monthly amount. Only the accelerated plan must pay off.
pub fn extra_payment_impact(
    input: &ExtraPaymentInput,
) -> PayoffOutcome<ComputationOutput<ExtraPaymentImpact>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.extra_monthly < Decimal::ZERO {
        return Err(PayoffError::invalid(
            "extra_monthly",
            "Extra payment must be non-negative",
        ));
    }
    if input.extra_monthly.is_zero() {
        warnings.push("Extra payment is zero; both plans are identical".into());
    }

    let accelerated_payment = input.monthly_payment + input.extra_monthly;
    let accelerated = project_payoff(
        input.balance,
        input.annual_rate_percent,
        accelerated_payment,
        input.as_of,
    )?;

    let baseline = ProjectionOutcome::from_result(project_payoff(
        input.balance,
        input.annual_rate_percent,
        input.monthly_payment,
        input.as_of,
    ))?;

    let (months_saved, interest_saved) = match baseline.payoff() {
        Some(base) => (
            Some(base.total_months.saturating_sub(accelerated.total_months)),
            Some(round_currency(base.total_interest - accelerated.total_interest)),
        ),
        None => {
            warnings.push("Current payment never pays off the balance; savings are unbounded".into());
            (None, None)
        }
    };

    let output = ExtraPaymentImpact {
        baseline,
        accelerated,
        accelerated_payment,
        months_saved,
        interest_saved,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Extra Payment Impact (closed-form annuity projection)",
        input,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Rate scenarios
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateScenarioInput {
    pub balance: Money,
    /// Rate the current payment was set against.
    pub current_rate_percent: RatePercent,
    pub monthly_payment: Money,
    pub candidate_rates: Vec<RatePercent>,
    pub as_of: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateScenarioOutcome {
    pub annual_rate_percent: RatePercent,
    /// The current payment at this rate.
    pub projection: ProjectionOutcome,
    /// Payment keeping the current payoff horizon at this rate, when the
    /// current plan has one.
    pub required_payment: Option<Money>,
}

/// Project the current payment across several candidate rates.
pub fn rate_scenarios(
    input: &RateScenarioInput,
) -> PayoffOutcome<ComputationOutput<Vec<RateScenarioOutcome>>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.candidate_rates.is_empty() {
        return Err(PayoffError::invalid(
            "candidate_rates",
            "At least one candidate rate is required",
        ));
    }

    let current_horizon = match months_to_payoff(
        input.balance,
        input.current_rate_percent,
        input.monthly_payment,
    ) {
        Ok(months) => Some(months),
        Err(e @ PayoffError::InvalidInput { .. }) => return Err(e),
        Err(e) => {
            warnings.push(format!("Current plan has no payoff: {e}"));
            None
        }
    };

    let mut outcomes = Vec::with_capacity(input.candidate_rates.len());
    for &rate in &input.candidate_rates {
        if rate < Decimal::ZERO {
            return Err(PayoffError::invalid(
                "candidate_rates",
                format!("Rate {rate} must be non-negative"),
            ));
        }
        let projection = ProjectionOutcome::from_result(project_payoff(
            input.balance,
            rate,
            input.monthly_payment,
            input.as_of,
        ))?;
        let required = match current_horizon {
            Some(_) => Some(required_payment(
                input.balance,
                input.current_rate_percent,
                rate,
                input.monthly_payment,
            )?),
            None => None,
        };
        outcomes.push(RateScenarioOutcome {
            annual_rate_percent: rate,
            projection,
            required_payment: required,
        });
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Rate Scenario Sweep",
        input,
        warnings,
        elapsed,
        outcomes,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loans::payment::{compute_monthly_payment, LoanTerms};
    use rust_decimal_macros::dec;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    #[test]
    fn test_required_payment_same_rate_is_level_payment() {
        let payment = required_payment(dec!(10000), dec!(6), dec!(6), dec!(304.22)).unwrap();
        assert_eq!(payment, dec!(304.22));
    }

    #[test]
    fn test_required_payment_higher_rate() {
        // 36 months at 9%: ≈ 318.00
        let payment = required_payment(dec!(10000), dec!(6), dec!(9), dec!(304.22)).unwrap();
        assert!(payment > dec!(304.22));
        assert!((payment - dec!(318.00)).abs() <= dec!(0.02));
    }

    #[test]
    fn test_required_payment_zero_new_rate() {
        let payment = required_payment(dec!(1200), dec!(0), dec!(0), dec!(100)).unwrap();
        assert_eq!(payment, dec!(100.00));
        let payment = required_payment(dec!(10000), dec!(6), dec!(0), dec!(304.22)).unwrap();
        assert_eq!(payment, round_currency(dec!(10000) / dec!(36)));
    }

    #[test]
    fn test_required_payment_propagates_original_error() {
        let err = required_payment(dec!(1000), dec!(24), dec!(5), dec!(15)).unwrap_err();
        assert!(matches!(err, PayoffError::PaymentTooLow { .. }));
    }

    #[test]
    fn test_required_payment_round_trip() {
        let payment = compute_monthly_payment(&LoanTerms::new(dec!(20000), dec!(5), 48)).unwrap();
        assert_eq!(payment, dec!(460.59));
        let new_payment = required_payment(dec!(20000), dec!(5), dec!(8), payment).unwrap();
        assert_eq!(new_payment, dec!(488.26));
        let months = months_to_payoff(dec!(20000), dec!(8), new_payment).unwrap();
        assert!(months.abs_diff(48) <= 1);
    }

    #[test]
    fn test_extra_payment_saves_time_and_interest() {
        let out = extra_payment_impact(&ExtraPaymentInput {
            balance: dec!(18500),
            annual_rate_percent: dec!(19.99),
            monthly_payment: dec!(450),
            extra_monthly: dec!(150),
            as_of: as_of(),
        })
        .unwrap();
        let impact = out.result;
        assert!(impact.months_saved.unwrap() > 0);
        assert!(impact.interest_saved.unwrap() > Decimal::ZERO);
        assert_eq!(impact.accelerated_payment, dec!(600));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_extra_payment_rescues_unpayable_plan() {
        let out = extra_payment_impact(&ExtraPaymentInput {
            balance: dec!(1000),
            annual_rate_percent: dec!(24),
            monthly_payment: dec!(15),
            extra_monthly: dec!(35),
            as_of: as_of(),
        })
        .unwrap();
        let impact = out.result;
        assert!(matches!(impact.baseline, ProjectionOutcome::Unpayable { ref code, .. } if code == "payment_too_low"));
        assert_eq!(impact.months_saved, None);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_extra_payment_still_too_low() {
        let result = extra_payment_impact(&ExtraPaymentInput {
            balance: dec!(1000),
            annual_rate_percent: dec!(24),
            monthly_payment: dec!(10),
            extra_monthly: dec!(5),
            as_of: as_of(),
        });
        assert!(matches!(result, Err(PayoffError::PaymentTooLow { .. })));
    }

    #[test]
    fn test_negative_extra_rejected() {
        let result = extra_payment_impact(&ExtraPaymentInput {
            balance: dec!(1000),
            annual_rate_percent: dec!(5),
            monthly_payment: dec!(100),
            extra_monthly: dec!(-1),
            as_of: as_of(),
        });
        assert!(matches!(result, Err(PayoffError::InvalidInput { .. })));
    }

    #[test]
    fn test_rate_scenarios_mixed_outcomes() {
        let out = rate_scenarios(&RateScenarioInput {
            balance: dec!(1000),
            current_rate_percent: dec!(12),
            monthly_payment: dec!(20),
            candidate_rates: vec![dec!(0), dec!(12), dec!(24)],
            as_of: as_of(),
        })
        .unwrap();
        let rows = out.result;
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].projection.payoff().unwrap().total_months, 50);
        assert!(rows[1].projection.payoff().is_some());
        // 24% accrues exactly the payment; no payoff
        assert!(rows[2].projection.payoff().is_none());
        assert!(rows.iter().all(|r| r.required_payment.is_some()));
        assert!(rows[2].required_payment.unwrap() > dec!(20));
    }

    #[test]
    fn test_rate_scenarios_requires_candidates() {
        let result = rate_scenarios(&RateScenarioInput {
            balance: dec!(1000),
            current_rate_percent: dec!(12),
            monthly_payment: dec!(20),
            candidate_rates: vec![],
            as_of: as_of(),
        });
        assert!(result.is_err());
    }
}
