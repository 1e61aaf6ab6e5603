use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use payoff_core::api::{self, DebtChartRequest, LoanQuoteRequest, NumericField, PayoffScenarioRequest};
use payoff_core::loans::payoff::{months_to_payoff, project_payoff_simulated};
use payoff_core::loans::schedule::simulate_amortization;
use payoff_core::loans::what_if::{self, ExtraPaymentInput, RateScenarioInput};

use super::resolve_as_of;
use crate::input;

fn field(value: Option<Decimal>) -> Option<NumericField> {
    value.map(NumericField::from)
}

// ---------------------------------------------------------------------------
// quote
// ---------------------------------------------------------------------------

/// Arguments for a fixed monthly payment quote
#[derive(Args)]
pub struct QuoteArgs {
    /// Path to JSON/YAML request file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount borrowed
    #[arg(long, alias = "loan-amount")]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent (5 = 5% APR)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Term in months
    #[arg(long)]
    pub term_months: Option<u32>,
}

fn quote_request(args: &QuoteArgs) -> Result<LoanQuoteRequest, Box<dyn std::error::Error>> {
    let principal = args
        .principal
        .ok_or("--principal is required (or provide --input)")?;
    let rate = args.rate.ok_or("--rate is required (or provide --input)")?;
    let term = args
        .term_months
        .ok_or("--term-months is required (or provide --input)")?;
    Ok(LoanQuoteRequest {
        loan_amount: field(Some(principal)),
        interest_rate: field(Some(rate)),
        term_months: Some(NumericField::Text(term.to_string())),
    })
}

pub fn run_quote(args: QuoteArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: LoanQuoteRequest = if let Some(ref path) = args.input {
        input::file::read_request(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        quote_request(&args)?
    };

    let response = api::quote_loan(&request)?;
    Ok(serde_json::to_value(response)?)
}

// ---------------------------------------------------------------------------
// schedule
// ---------------------------------------------------------------------------

/// Arguments for a month-by-month amortization schedule
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to JSON/YAML request file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Outstanding balance
    #[arg(long)]
    pub balance: Option<Decimal>,

    /// Annual interest rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Monthly payment
    #[arg(long, alias = "min-payment")]
    pub payment: Option<Decimal>,

    /// Emit full-precision amounts instead of cents
    #[arg(long)]
    pub exact: bool,
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: DebtChartRequest = if let Some(ref path) = args.input {
        input::file::read_request(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        DebtChartRequest {
            balance: field(Some(args.balance.ok_or("--balance is required (or provide --input)")?)),
            interest_rate: field(Some(args.rate.ok_or("--rate is required (or provide --input)")?)),
            min_payment: field(Some(args.payment.ok_or("--payment is required (or provide --input)")?)),
        }
    };

    let schedule = simulate_amortization(&request.to_input()?)?;
    let schedule = if args.exact { schedule } else { schedule.rounded(2) };
    Ok(serde_json::to_value(schedule.rows)?)
}

// ---------------------------------------------------------------------------
// payoff
// ---------------------------------------------------------------------------

/// Arguments for a payoff projection
#[derive(Args)]
pub struct PayoffArgs {
    /// Path to JSON/YAML request file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Outstanding balance
    #[arg(long)]
    pub balance: Option<Decimal>,

    /// Annual interest rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Monthly payment
    #[arg(long)]
    pub payment: Option<Decimal>,

    /// Also solve the payment that keeps the same payoff month at this rate
    #[arg(long)]
    pub new_rate: Option<Decimal>,

    /// Reference date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub as_of: Option<NaiveDate>,

    /// Derive the projection by simulating every month
    #[arg(long)]
    pub simulate: bool,
}

fn payoff_request(args: &PayoffArgs) -> Result<PayoffScenarioRequest, Box<dyn std::error::Error>> {
    Ok(PayoffScenarioRequest {
        balance: field(Some(args.balance.ok_or("--balance is required (or provide --input)")?)),
        interest_rate: field(Some(args.rate.ok_or("--rate is required (or provide --input)")?)),
        payment: field(Some(args.payment.ok_or("--payment is required (or provide --input)")?)),
        new_rate: field(args.new_rate),
        as_of: args.as_of,
    })
}

pub fn run_payoff(args: PayoffArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: PayoffScenarioRequest = if let Some(ref path) = args.input {
        input::file::read_request(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        payoff_request(&args)?
    };
    let request = with_as_of_override(request, args.as_of);

    let today = resolve_as_of(request.as_of);
    if args.simulate {
        let balance = api::require_decimal("balance", request.balance.as_ref())?;
        let rate = api::require_decimal("interestRate", request.interest_rate.as_ref())?;
        let payment = api::require_decimal("payment", request.payment.as_ref())?;
        let result = project_payoff_simulated(balance, rate, payment, today)?;
        return Ok(serde_json::to_value(result)?);
    }

    Ok(serde_json::to_value(api::payoff_scenario(&request, today)?)?)
}

/// `--as-of` wins over an `asOf` carried in the request.
fn with_as_of_override(
    mut request: PayoffScenarioRequest,
    as_of: Option<NaiveDate>,
) -> PayoffScenarioRequest {
    request.as_of = as_of.or(request.as_of);
    request
}

// ---------------------------------------------------------------------------
// required-payment
// ---------------------------------------------------------------------------

/// Arguments for the payment needed to keep a payoff horizon at a new rate
#[derive(Args)]
pub struct RequiredPaymentArgs {
    /// Outstanding balance
    #[arg(long)]
    pub balance: Decimal,

    /// Current annual rate in percent
    #[arg(long)]
    pub old_rate: Decimal,

    /// New annual rate in percent
    #[arg(long)]
    pub new_rate: Decimal,

    /// Current monthly payment
    #[arg(long)]
    pub payment: Decimal,
}

pub fn run_required_payment(args: RequiredPaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let months = months_to_payoff(args.balance, args.old_rate, args.payment)?;
    let required =
        what_if::required_payment(args.balance, args.old_rate, args.new_rate, args.payment)?;
    Ok(json!({
        "required_payment": required.to_string(),
        "months": months,
        "old_rate": args.old_rate.to_string(),
        "new_rate": args.new_rate.to_string(),
    }))
}

// ---------------------------------------------------------------------------
// extra-payment
// ---------------------------------------------------------------------------

/// Arguments for the extra-payment impact comparison
#[derive(Args)]
pub struct ExtraPaymentArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Outstanding balance
    #[arg(long)]
    pub balance: Option<Decimal>,

    /// Annual interest rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Current monthly payment
    #[arg(long)]
    pub payment: Option<Decimal>,

    /// Extra amount paid every month
    #[arg(long)]
    pub extra: Option<Decimal>,

    /// Reference date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub as_of: Option<NaiveDate>,
}

pub fn run_extra_payment(args: ExtraPaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let extra_input: ExtraPaymentInput = if let Some(ref path) = args.input {
        input::file::read_request(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        ExtraPaymentInput {
            balance: args.balance.ok_or("--balance is required (or provide --input)")?,
            annual_rate_percent: args.rate.ok_or("--rate is required (or provide --input)")?,
            monthly_payment: args.payment.ok_or("--payment is required (or provide --input)")?,
            extra_monthly: args.extra.ok_or("--extra is required (or provide --input)")?,
            as_of: resolve_as_of(args.as_of),
        }
    };

    let result = what_if::extra_payment_impact(&extra_input)?;
    Ok(serde_json::to_value(result)?)
}

// ---------------------------------------------------------------------------
// rate-scenarios
// ---------------------------------------------------------------------------

/// Arguments for a sweep of the current payment across candidate rates
#[derive(Args)]
pub struct RateScenarioArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Outstanding balance
    #[arg(long)]
    pub balance: Option<Decimal>,

    /// Current annual rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Current monthly payment
    #[arg(long)]
    pub payment: Option<Decimal>,

    /// Candidate annual rates (comma-separated, e.g. "4.5,6,7.25")
    #[arg(long, value_delimiter = ',')]
    pub rates: Option<Vec<Decimal>>,

    /// Reference date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub as_of: Option<NaiveDate>,
}

pub fn run_rate_scenarios(args: RateScenarioArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let scenario_input: RateScenarioInput = if let Some(ref path) = args.input {
        input::file::read_request(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        RateScenarioInput {
            balance: args.balance.ok_or("--balance is required (or provide --input)")?,
            current_rate_percent: args.rate.ok_or("--rate is required (or provide --input)")?,
            monthly_payment: args.payment.ok_or("--payment is required (or provide --input)")?,
            candidate_rates: args.rates.ok_or("--rates is required (or provide --input)")?,
            as_of: resolve_as_of(args.as_of),
        }
    };

    let result = what_if::rate_scenarios(&scenario_input)?;
    Ok(serde_json::to_value(result)?)
}
