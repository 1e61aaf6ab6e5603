use chrono::NaiveDate;
use clap::Args;
use serde::Deserialize;
use serde_json::Value;

use payoff_core::debts::portfolio::{summarize_debts, DebtPortfolioInput, DebtRecord};

use super::resolve_as_of;
use crate::input;

/// Arguments for a debt portfolio summary
#[derive(Args)]
pub struct DebtsArgs {
    /// Path to JSON/YAML file with a `debts` list
    #[arg(long)]
    pub input: Option<String>,

    /// Reference date (YYYY-MM-DD); overrides `as_of` in the file, defaults to today
    #[arg(long)]
    pub as_of: Option<NaiveDate>,
}

/// On-disk shape: the reference date is optional, unlike the engine input.
#[derive(Debug, Deserialize)]
struct DebtsFile {
    debts: Vec<DebtRecord>,
    #[serde(default)]
    as_of: Option<NaiveDate>,
}

impl DebtsFile {
    fn into_input(self, as_of: Option<NaiveDate>) -> DebtPortfolioInput {
        DebtPortfolioInput {
            debts: self.debts,
            as_of: resolve_as_of(as_of.or(self.as_of)),
        }
    }
}

pub fn run_debts(args: DebtsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let file: DebtsFile = if let Some(ref path) = args.input {
        input::file::read_request(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("--input <file.json> or stdin required for debt summaries".into());
    };

    let result = summarize_debts(&file.into_input(args.as_of))?;
    Ok(serde_json::to_value(result)?)
}
