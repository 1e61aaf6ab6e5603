use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::PayoffError;
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::PayoffOutcome;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
}

/// Budgeting tag on an expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Essentials,
    Savings,
    NonEssentials,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub date: NaiveDate,
    pub amount: Money,
    pub kind: TransactionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<Classification>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> PayoffOutcome<Self> {
        if !(1..=12).contains(&month) {
            return Err(PayoffError::invalid("month", "Month must be between 1 and 12"));
        }
        Ok(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlySummaryInput {
    pub transactions: Vec<TransactionRecord>,
    pub period: YearMonth,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlySeriesInput {
    pub transactions: Vec<TransactionRecord>,
    pub from: YearMonth,
    pub to: YearMonth,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationTotal {
    /// `None` collects expenses without a classification.
    pub classification: Option<Classification>,
    pub total: Money,
    /// Share of the month's expenses, in percent.
    pub share_percent: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub period: YearMonth,
    pub income: Money,
    pub expense: Money,
    pub net: Money,
    /// Net as a percentage of income; absent without income.
    pub savings_rate_percent: Option<Decimal>,
    pub transaction_count: usize,
    pub by_classification: Vec<ClassificationTotal>,
}

const BUCKETS: [Option<Classification>; 4] = [
    Some(Classification::Essentials),
    Some(Classification::Savings),
    Some(Classification::NonEssentials),
    None,
];

/// Longest range `monthly_series` will aggregate.
const MAX_SERIES_MONTHS: usize = 600;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Aggregate one calendar month of transactions.
pub fn summarize_month(
    input: &MonthlySummaryInput,
) -> PayoffOutcome<ComputationOutput<MonthlySummary>> {
    let start = Instant::now();
    let mut warnings = Vec::new();

    validate_transactions(&input.transactions)?;
    let period = YearMonth::new(input.period.year, input.period.month)?;
    let summary = aggregate(&input.transactions, period);

    if summary.transaction_count == 0 {
        warnings.push(format!(
            "No transactions recorded for {}-{:02}",
            period.year, period.month
        ));
    } else if summary.net < Decimal::ZERO {
        warnings.push("Expenses exceed income for the month".into());
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Monthly Income/Expense Summary",
        &serde_json::json!({ "period": period, "transactions": input.transactions.len() }),
        warnings,
        elapsed,
        summary,
    ))
}

/// Aggregate every month from `from` through `to`, inclusive.
pub fn monthly_series(
    input: &MonthlySeriesInput,
) -> PayoffOutcome<ComputationOutput<Vec<MonthlySummary>>> {
    let start = Instant::now();

    validate_transactions(&input.transactions)?;
    let from = YearMonth::new(input.from.year, input.from.month)?;
    let to = YearMonth::new(input.to.year, input.to.month)?;
    if from > to {
        return Err(PayoffError::invalid("from", "Range start must not be after its end"));
    }

    let mut series = Vec::new();
    let mut period = from;
    while period <= to {
        if series.len() == MAX_SERIES_MONTHS {
            return Err(PayoffError::invalid(
                "to",
                format!("Range is limited to {MAX_SERIES_MONTHS} months"),
            ));
        }
        series.push(aggregate(&input.transactions, period));
        period = period.next();
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Monthly Income/Expense Series",
        &serde_json::json!({ "from": from, "to": to }),
        Vec::new(),
        elapsed,
        series,
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn validate_transactions(transactions: &[TransactionRecord]) -> PayoffOutcome<()> {
    for (i, t) in transactions.iter().enumerate() {
        if t.amount <= Decimal::ZERO {
            return Err(PayoffError::invalid(
                &format!("transactions[{i}].amount"),
                "Amount must be positive",
            ));
        }
    }
    Ok(())
}

fn aggregate(transactions: &[TransactionRecord], period: YearMonth) -> MonthlySummary {
    let mut income = Decimal::ZERO;
    let mut expense = Decimal::ZERO;
    let mut bucket_totals = [Decimal::ZERO; 4];
    let mut transaction_count = 0;

    for t in transactions.iter().filter(|t| YearMonth::of(t.date) == period) {
        transaction_count += 1;
        match t.kind {
            TransactionKind::Income => income += t.amount,
            TransactionKind::Expense => {
                expense += t.amount;
                let idx = BUCKETS
                    .iter()
                    .position(|b| *b == t.classification)
                    .unwrap_or(BUCKETS.len() - 1);
                bucket_totals[idx] += t.amount;
            }
        }
    }

    let net = income - expense;
    let savings_rate_percent = if income.is_zero() {
        None
    } else {
        Some((net / income * dec!(100)).round_dp(2))
    };

    let by_classification = BUCKETS
        .iter()
        .zip(bucket_totals)
        .map(|(classification, total)| ClassificationTotal {
            classification: *classification,
            total,
            share_percent: if expense.is_zero() {
                Decimal::ZERO
            } else {
                (total / expense * dec!(100)).round_dp(2)
            },
        })
        .collect();

    MonthlySummary {
        period,
        income,
        expense,
        net,
        savings_rate_percent,
        transaction_count,
        by_classification,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn txn(
        y: i32,
        m: u32,
        d: u32,
        amount: Decimal,
        kind: TransactionKind,
        classification: Option<Classification>,
    ) -> TransactionRecord {
        TransactionRecord {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            amount,
            kind,
            classification,
        }
    }

    fn sample() -> Vec<TransactionRecord> {
        use Classification::*;
        use TransactionKind::*;
        vec![
            txn(2025, 3, 1, dec!(4000), Income, None),
            txn(2025, 3, 3, dec!(1500), Expense, Some(Essentials)),
            txn(2025, 3, 10, dec!(500), Expense, Some(Savings)),
            txn(2025, 3, 20, dec!(300), Expense, Some(NonEssentials)),
            txn(2025, 3, 31, dec!(200), Expense, None),
            txn(2025, 4, 1, dec!(4000), Income, None),
            txn(2025, 2, 28, dec!(80), Expense, Some(NonEssentials)),
        ]
    }

    #[test]
    fn test_month_totals() {
        let out = summarize_month(&MonthlySummaryInput {
            transactions: sample(),
            period: YearMonth { year: 2025, month: 3 },
        })
        .unwrap();
        let s = out.result;
        assert_eq!(s.transaction_count, 5);
        assert_eq!(s.income, dec!(4000));
        assert_eq!(s.expense, dec!(2500));
        assert_eq!(s.net, dec!(1500));
        assert_eq!(s.savings_rate_percent, Some(dec!(37.5)));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_classification_shares() {
        let out = summarize_month(&MonthlySummaryInput {
            transactions: sample(),
            period: YearMonth { year: 2025, month: 3 },
        })
        .unwrap();
        let shares: Vec<(Option<Classification>, Decimal)> = out
            .result
            .by_classification
            .iter()
            .map(|c| (c.classification, c.share_percent))
            .collect();
        assert_eq!(
            shares,
            vec![
                (Some(Classification::Essentials), dec!(60)),
                (Some(Classification::Savings), dec!(20)),
                (Some(Classification::NonEssentials), dec!(12)),
                (None, dec!(8)),
            ]
        );
    }

    #[test]
    fn test_empty_month_warns() {
        let out = summarize_month(&MonthlySummaryInput {
            transactions: sample(),
            period: YearMonth { year: 2025, month: 7 },
        })
        .unwrap();
        assert_eq!(out.result.transaction_count, 0);
        assert_eq!(out.result.savings_rate_percent, None);
        assert!(out.result.by_classification.iter().all(|c| c.share_percent.is_zero()));
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_overspend_warns() {
        let out = summarize_month(&MonthlySummaryInput {
            transactions: sample(),
            period: YearMonth { year: 2025, month: 2 },
        })
        .unwrap();
        assert_eq!(out.result.net, dec!(-80));
        assert!(out.warnings[0].contains("exceed"));
    }

    #[test]
    fn test_series_spans_year_end() {
        let out = monthly_series(&MonthlySeriesInput {
            transactions: sample(),
            from: YearMonth { year: 2024, month: 11 },
            to: YearMonth { year: 2025, month: 4 },
        })
        .unwrap();
        let periods: Vec<(i32, u32)> = out.result.iter().map(|s| (s.period.year, s.period.month)).collect();
        assert_eq!(
            periods,
            vec![(2024, 11), (2024, 12), (2025, 1), (2025, 2), (2025, 3), (2025, 4)]
        );
        assert_eq!(out.result[5].income, dec!(4000));
    }

    #[test]
    fn test_rejects_bad_month_and_amount() {
        assert!(summarize_month(&MonthlySummaryInput {
            transactions: vec![],
            period: YearMonth { year: 2025, month: 13 },
        })
        .is_err());

        let err = summarize_month(&MonthlySummaryInput {
            transactions: vec![txn(2025, 1, 1, dec!(-5), TransactionKind::Expense, None)],
            period: YearMonth { year: 2025, month: 1 },
        })
        .unwrap_err();
        assert!(matches!(err, PayoffError::InvalidInput { ref field, .. } if field == "transactions[0].amount"));
    }

    #[test]
    fn test_rejects_reversed_range() {
        let result = monthly_series(&MonthlySeriesInput {
            transactions: vec![],
            from: YearMonth { year: 2025, month: 5 },
            to: YearMonth { year: 2025, month: 4 },
        });
        assert!(result.is_err());
    }
}
