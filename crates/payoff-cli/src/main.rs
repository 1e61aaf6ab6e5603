mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::budget::BudgetArgs;
use commands::debts::DebtsArgs;
use commands::loans::{
    ExtraPaymentArgs, PayoffArgs, QuoteArgs, RateScenarioArgs, RequiredPaymentArgs, ScheduleArgs,
};

/// Loan amortization and debt payoff projections
#[derive(Parser)]
#[command(
    name = "payoff",
    version,
    about = "Loan amortization and debt payoff projections",
    long_about = "A CLI for loan payment quotes, amortization schedules and payoff \
                  projections with decimal precision. Supports what-if analysis for \
                  extra payments and rate changes, debt portfolio summaries, and \
                  monthly budget aggregation."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log engine decisions to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Quote the fixed monthly payment for a new loan
    Quote(QuoteArgs),
    /// Month-by-month amortization schedule at a fixed payment
    Schedule(ScheduleArgs),
    /// Project the payoff date and total interest
    Payoff(PayoffArgs),
    /// Payment needed to keep the payoff month after a rate change
    RequiredPayment(RequiredPaymentArgs),
    /// Compare payoff with and without an extra monthly payment
    ExtraPayment(ExtraPaymentArgs),
    /// Project the current payment across candidate rates
    RateScenarios(RateScenarioArgs),
    /// Summarize a portfolio of debts at minimum payments
    Debts(DebtsArgs),
    /// Monthly income/expense summaries
    Budget(BudgetArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "payoff_core=debug"
    } else {
        "payoff_core=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Quote(args) => commands::loans::run_quote(args),
        Commands::Schedule(args) => commands::loans::run_schedule(args),
        Commands::Payoff(args) => commands::loans::run_payoff(args),
        Commands::RequiredPayment(args) => commands::loans::run_required_payment(args),
        Commands::ExtraPayment(args) => commands::loans::run_extra_payment(args),
        Commands::RateScenarios(args) => commands::loans::run_rate_scenarios(args),
        Commands::Debts(args) => commands::debts::run_debts(args),
        Commands::Budget(args) => commands::budget::run_budget(args),
        Commands::Version => {
            println!("payoff {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
