use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::PayoffError;
use crate::loans::payoff::{project_payoff, PayoffResult};
use crate::loans::what_if::ProjectionOutcome;
use crate::time_value::{monthly_rate, round_currency};
use crate::types::{with_metadata, ComputationOutput, Money, RatePercent};
use crate::PayoffOutcome;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Fixed-term loans track progress against the amount borrowed; revolving
/// lines against their limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DebtKind {
    FixedTerm { original_amount: Money },
    Revolving { debt_limit: Money },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtRecord {
    pub name: String,
    pub kind: DebtKind,
    pub balance: Money,
    pub interest_rate_percent: RatePercent,
    pub min_payment: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtPortfolioInput {
    pub debts: Vec<DebtRecord>,
    pub as_of: NaiveDate,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtSummary {
    pub name: String,
    pub balance: Money,
    /// Interest accruing this month on the current balance.
    pub monthly_interest: Money,
    /// Share of a fixed-term loan already repaid, in percent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_paid: Option<Decimal>,
    /// Share of a revolving limit in use, in percent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utilization_percent: Option<Decimal>,
    /// Payoff when paying only the minimum.
    pub projection: ProjectionOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtPortfolioSummary {
    pub debts: Vec<DebtSummary>,
    pub total_balance: Money,
    pub total_min_payment: Money,
    pub total_monthly_interest: Money,
    /// Balance-weighted annual rate, in percent.
    pub weighted_average_rate: RatePercent,
    /// Sum of projected interest; absent when any debt never pays off.
    pub total_projected_interest: Option<Money>,
    /// Date the last debt is repaid at minimum payments.
    pub debt_free_date: Option<NaiveDate>,
    pub unpayable_debts: Vec<String>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Summarise a set of debts: progress, current interest cost and the payoff
/// each reaches at its minimum payment.
pub fn summarize_debts(
    input: &DebtPortfolioInput,
) -> PayoffOutcome<ComputationOutput<DebtPortfolioSummary>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.debts.is_empty() {
        return Err(PayoffError::invalid("debts", "At least one debt is required"));
    }

    let mut debts = Vec::with_capacity(input.debts.len());
    let mut total_balance = Decimal::ZERO;
    let mut total_min_payment = Decimal::ZERO;
    let mut total_monthly_interest = Decimal::ZERO;
    let mut rate_weight = Decimal::ZERO;
    let mut total_projected_interest = Some(Decimal::ZERO);
    let mut debt_free_date: Option<NaiveDate> = Some(input.as_of);
    let mut unpayable_debts = Vec::new();

    for debt in &input.debts {
        validate_debt(debt)?;

        let monthly_interest = round_currency(debt.balance * monthly_rate(debt.interest_rate_percent));
        let (percent_paid, utilization_percent) = progress(debt, &mut warnings);
        let projection = project_debt(debt, input.as_of)?;

        match projection.payoff() {
            Some(payoff) => {
                total_projected_interest = total_projected_interest.map(|t| t + payoff.total_interest);
                debt_free_date = debt_free_date.map(|d| d.max(payoff.payoff_date));
            }
            None => {
                total_projected_interest = None;
                debt_free_date = None;
                unpayable_debts.push(debt.name.clone());
                warnings.push(format!(
                    "{}: minimum payment never repays the balance",
                    debt.name
                ));
            }
        }

        total_balance += debt.balance;
        total_min_payment += debt.min_payment;
        total_monthly_interest += monthly_interest;
        rate_weight += debt.balance * debt.interest_rate_percent;

        debts.push(DebtSummary {
            name: debt.name.clone(),
            balance: debt.balance,
            monthly_interest,
            percent_paid,
            utilization_percent,
            projection,
        });
    }

    let weighted_average_rate = if total_balance.is_zero() {
        Decimal::ZERO
    } else {
        (rate_weight / total_balance).round_dp(4)
    };

    let output = DebtPortfolioSummary {
        debts,
        total_balance,
        total_min_payment,
        total_monthly_interest,
        weighted_average_rate,
        total_projected_interest: total_projected_interest.map(round_currency),
        debt_free_date,
        unpayable_debts,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Debt Portfolio Summary (minimum-payment payoff)",
        &serde_json::json!({
            "debts": input.debts.len(),
            "as_of": input.as_of,
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn validate_debt(debt: &DebtRecord) -> PayoffOutcome<()> {
    let field = |name: &str| format!("{}.{name}", debt.name);
    if debt.balance < Decimal::ZERO {
        return Err(PayoffError::invalid(&field("balance"), "Balance must be non-negative"));
    }
    if debt.interest_rate_percent < Decimal::ZERO {
        return Err(PayoffError::invalid(
            &field("interest_rate_percent"),
            "Interest rate must be non-negative",
        ));
    }
    if debt.min_payment < Decimal::ZERO {
        return Err(PayoffError::invalid(
            &field("min_payment"),
            "Minimum payment must be non-negative",
        ));
    }
    match debt.kind {
        DebtKind::FixedTerm { original_amount } if original_amount <= Decimal::ZERO => Err(
            PayoffError::invalid(&field("original_amount"), "Original amount must be positive"),
        ),
        DebtKind::Revolving { debt_limit } if debt_limit <= Decimal::ZERO => Err(
            PayoffError::invalid(&field("debt_limit"), "Debt limit must be positive"),
        ),
        _ => Ok(()),
    }
}

fn progress(debt: &DebtRecord, warnings: &mut Vec<String>) -> (Option<Decimal>, Option<Decimal>) {
    match debt.kind {
        DebtKind::FixedTerm { original_amount } => {
            let paid = (Decimal::ONE - debt.balance / original_amount) * dec!(100);
            if paid < Decimal::ZERO {
                warnings.push(format!(
                    "{}: balance exceeds the original amount",
                    debt.name
                ));
            }
            (Some(paid.max(Decimal::ZERO).round_dp(2)), None)
        }
        DebtKind::Revolving { debt_limit } => {
            let used = debt.balance / debt_limit * dec!(100);
            if used > dec!(100) {
                warnings.push(format!("{}: balance is over the limit", debt.name));
            }
            (None, Some(used.round_dp(2)))
        }
    }
}

fn project_debt(debt: &DebtRecord, as_of: NaiveDate) -> PayoffOutcome<ProjectionOutcome> {
    if debt.balance.is_zero() {
        return Ok(ProjectionOutcome::PaidOff(PayoffResult {
            payoff_date: as_of,
            total_interest: Decimal::ZERO,
            total_months: 0,
            extra_days: 0,
        }));
    }
    if debt.min_payment.is_zero() {
        let e = PayoffError::PaymentTooLow {
            payment: Decimal::ZERO,
            interest: debt.balance * monthly_rate(debt.interest_rate_percent),
        };
        return Ok(ProjectionOutcome::Unpayable {
            code: e.code().to_string(),
            message: e.to_string(),
        });
    }
    ProjectionOutcome::from_result(project_payoff(
        debt.balance,
        debt.interest_rate_percent,
        debt.min_payment,
        as_of,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    fn car_loan() -> DebtRecord {
        DebtRecord {
            name: "Car".into(),
            kind: DebtKind::FixedTerm {
                original_amount: dec!(20000),
            },
            balance: dec!(15000),
            interest_rate_percent: dec!(6),
            min_payment: dec!(400),
        }
    }

    fn credit_card() -> DebtRecord {
        DebtRecord {
            name: "Card".into(),
            kind: DebtKind::Revolving {
                debt_limit: dec!(5000),
            },
            balance: dec!(2500),
            interest_rate_percent: dec!(24),
            min_payment: dec!(100),
        }
    }

    #[test]
    fn test_progress_metrics() {
        let out = summarize_debts(&DebtPortfolioInput {
            debts: vec![car_loan(), credit_card()],
            as_of: as_of(),
        })
        .unwrap();
        let summary = out.result;
        assert_eq!(summary.debts[0].percent_paid, Some(dec!(25)));
        assert_eq!(summary.debts[0].utilization_percent, None);
        assert_eq!(summary.debts[1].utilization_percent, Some(dec!(50)));
        assert_eq!(summary.debts[1].monthly_interest, dec!(50));
        assert_eq!(summary.debts[0].monthly_interest, dec!(75));
    }

    #[test]
    fn test_totals_and_weighted_rate() {
        let out = summarize_debts(&DebtPortfolioInput {
            debts: vec![car_loan(), credit_card()],
            as_of: as_of(),
        })
        .unwrap();
        let summary = out.result;
        assert_eq!(summary.total_balance, dec!(17500));
        assert_eq!(summary.total_min_payment, dec!(500));
        assert_eq!(summary.total_monthly_interest, dec!(125));
        // (15000*6 + 2500*24) / 17500
        assert_eq!(summary.weighted_average_rate, dec!(8.5714));
        assert!(summary.total_projected_interest.unwrap() > Decimal::ZERO);
        assert!(summary.unpayable_debts.is_empty());
    }

    #[test]
    fn test_debt_free_date_is_latest_payoff() {
        let out = summarize_debts(&DebtPortfolioInput {
            debts: vec![car_loan(), credit_card()],
            as_of: as_of(),
        })
        .unwrap();
        let summary = out.result;
        let latest = summary
            .debts
            .iter()
            .filter_map(|d| d.projection.payoff())
            .map(|p| p.payoff_date)
            .max();
        assert_eq!(summary.debt_free_date, latest);
    }

    #[test]
    fn test_unpayable_debt_reported_not_failed() {
        let mut card = credit_card();
        card.min_payment = dec!(40);
        let out = summarize_debts(&DebtPortfolioInput {
            debts: vec![car_loan(), card],
            as_of: as_of(),
        })
        .unwrap();
        let summary = out.result;
        assert_eq!(summary.unpayable_debts, vec!["Card".to_string()]);
        assert_eq!(summary.debt_free_date, None);
        assert_eq!(summary.total_projected_interest, None);
        assert!(out.warnings.iter().any(|w| w.contains("Card")));
    }

    #[test]
    fn test_zero_balance_is_paid_off() {
        let mut car = car_loan();
        car.balance = Decimal::ZERO;
        car.min_payment = Decimal::ZERO;
        let out = summarize_debts(&DebtPortfolioInput {
            debts: vec![car],
            as_of: as_of(),
        })
        .unwrap();
        let summary = out.result;
        assert_eq!(summary.debts[0].percent_paid, Some(dec!(100)));
        assert_eq!(summary.debt_free_date, Some(as_of()));
        assert_eq!(summary.weighted_average_rate, Decimal::ZERO);
    }

    #[test]
    fn test_over_limit_warns() {
        let mut card = credit_card();
        card.balance = dec!(5500);
        card.min_payment = dec!(300);
        let out = summarize_debts(&DebtPortfolioInput {
            debts: vec![card],
            as_of: as_of(),
        })
        .unwrap();
        assert_eq!(out.result.debts[0].utilization_percent, Some(dec!(110)));
        assert!(out.warnings.iter().any(|w| w.contains("over the limit")));
    }

    #[test]
    fn test_rejects_empty_and_invalid() {
        assert!(summarize_debts(&DebtPortfolioInput {
            debts: vec![],
            as_of: as_of(),
        })
        .is_err());

        let mut card = credit_card();
        card.kind = DebtKind::Revolving {
            debt_limit: Decimal::ZERO,
        };
        let err = summarize_debts(&DebtPortfolioInput {
            debts: vec![card],
            as_of: as_of(),
        })
        .unwrap_err();
        assert!(matches!(err, PayoffError::InvalidInput { ref field, .. } if field == "Card.debt_limit"));
    }

    #[test]
    fn test_record_deserializes_tagged_kind() {
        let record: DebtRecord = serde_json::from_value(serde_json::json!({
            "name": "Visa",
            "kind": { "type": "revolving", "debt_limit": "3000" },
            "balance": "1200",
            "interest_rate_percent": "21.9",
            "min_payment": "35"
        }))
        .unwrap();
        assert_eq!(record.kind, DebtKind::Revolving { debt_limit: dec!(3000) });
    }
}
