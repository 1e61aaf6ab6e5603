use chrono::Datelike;
use clap::Args;
use serde::Deserialize;
use serde_json::Value;

use payoff_core::budget::monthly::{
    monthly_series, summarize_month, MonthlySeriesInput, MonthlySummaryInput, TransactionRecord,
    YearMonth,
};

use super::resolve_as_of;
use crate::input;

/// Arguments for monthly income/expense summaries
#[derive(Args)]
pub struct BudgetArgs {
    /// Path to JSON/YAML file with a `transactions` list
    #[arg(long)]
    pub input: Option<String>,

    /// Calendar year of a single month (defaults to the current month)
    #[arg(long, requires = "month")]
    pub year: Option<i32>,

    /// Month number 1-12 for a single month
    #[arg(long, requires = "year")]
    pub month: Option<u32>,

    /// First month of a series (YYYY-MM)
    #[arg(long, requires = "to", conflicts_with_all = ["year", "month"])]
    pub from: Option<String>,

    /// Last month of a series (YYYY-MM), inclusive
    #[arg(long, requires = "from")]
    pub to: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TransactionsFile {
    transactions: Vec<TransactionRecord>,
}

/// Parse `YYYY-MM`.
fn parse_year_month(text: &str) -> Result<YearMonth, Box<dyn std::error::Error>> {
    let (year, month) = text
        .trim()
        .split_once('-')
        .ok_or_else(|| format!("'{text}' is not in YYYY-MM form"))?;
    Ok(YearMonth::new(year.parse()?, month.parse()?)?)
}

pub fn run_budget(args: BudgetArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let file: TransactionsFile = if let Some(ref path) = args.input {
        input::file::read_request(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("--input <file.json> or stdin required for budget summaries".into());
    };

    if let (Some(from), Some(to)) = (&args.from, &args.to) {
        let result = monthly_series(&MonthlySeriesInput {
            transactions: file.transactions,
            from: parse_year_month(from)?,
            to: parse_year_month(to)?,
        })?;
        return Ok(serde_json::to_value(result)?);
    }

    let period = match (args.year, args.month) {
        (Some(year), Some(month)) => YearMonth::new(year, month)?,
        _ => {
            let today = resolve_as_of(None);
            YearMonth::new(today.year(), today.month())?
        }
    };
    let result = summarize_month(&MonthlySummaryInput {
        transactions: file.transactions,
        period,
    })?;
    Ok(serde_json::to_value(result)?)
}
