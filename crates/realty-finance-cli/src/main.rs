mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::collateral::{CollateralArgs, LtvArgs, ValuateArgs};
use commands::lending::{AmortizeArgs, DaysToMonthsArgs, PaymentArgs};

/// Loan amortization and collateral valuation
#[derive(Parser)]
#[command(
    name = "rfa",
    version,
    about = "Loan amortization and collateral valuation for property lending",
    long_about = "A CLI for real-estate lending calculations with decimal precision. \
                  Supports level-payment amortization schedules with prepayment, \
                  hedonic property valuation, and loan-to-value ceilings."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log computation details to stderr (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Level monthly payment for a loan
    Payment(PaymentArgs),
    /// Full amortization schedule with optional extra principal
    Amortize(AmortizeArgs),
    /// Estimate property value with hedonic adjustments
    Valuate(ValuateArgs),
    /// Maximum loan for a collateral value at an LTV percentage
    Ltv(LtvArgs),
    /// Value a property and derive the maximum loan it supports
    Collateral(CollateralArgs),
    /// Convert days (or a date range) to approximate months
    DaysToMonths(DaysToMonthsArgs),
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

fn init_logging(verbose: bool) {
    let default_directive = if verbose {
        "rfa=debug,realty_finance_core=debug"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Payment(args) => commands::lending::run_payment(args),
        Commands::Amortize(args) => commands::lending::run_amortize(args),
        Commands::Valuate(args) => commands::collateral::run_valuate(args),
        Commands::Ltv(args) => commands::collateral::run_ltv(args),
        Commands::Collateral(args) => commands::collateral::run_collateral(args),
        Commands::DaysToMonths(args) => commands::lending::run_days_to_months(args),
        Commands::Version => {
            println!("rfa {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
