use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use realty_finance_core::lending::amortization::{self, LoanInput};
use realty_finance_core::time_value;

use crate::input;

/// Arguments for the level monthly payment
#[derive(Args)]
pub struct PaymentArgs {
    /// Amount borrowed
    #[arg(long)]
    pub principal: Decimal,

    /// Annual interest rate as a percentage (e.g. 11 for 11%)
    #[arg(long)]
    pub annual_rate_pct: Decimal,

    /// Loan term in months
    #[arg(long)]
    pub months: u32,
}

/// Arguments for an amortization schedule
#[derive(Args)]
pub struct AmortizeArgs {
    /// Amount borrowed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate as a percentage (e.g. 11 for 11%)
    #[arg(long)]
    pub annual_rate_pct: Option<Decimal>,

    /// Loan term in months
    #[arg(long)]
    pub months: Option<u32>,

    /// Extra principal paid every month
    #[arg(long)]
    pub extra_per_month: Option<Decimal>,

    /// Only print the first N schedule rows (totals still cover the whole loan)
    #[arg(long)]
    pub rows: Option<usize>,

    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for converting a day count to approximate months
#[derive(Args)]
pub struct DaysToMonthsArgs {
    /// Number of days
    #[arg(long, conflicts_with_all = ["from", "to"], allow_hyphen_values = true)]
    pub days: Option<i64>,

    /// Start date (YYYY-MM-DD)
    #[arg(long, requires = "to")]
    pub from: Option<NaiveDate>,

    /// End date (YYYY-MM-DD)
    #[arg(long, requires = "from")]
    pub to: Option<NaiveDate>,
}

pub fn run_payment(args: PaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let payment = time_value::monthly_payment(args.principal, args.annual_rate_pct, args.months)?;
    Ok(json!({
        "monthlyPayment": payment,
        "monthlyRate": time_value::monthly_rate(args.annual_rate_pct),
    }))
}

pub fn run_amortize(args: AmortizeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan: LoanInput = match input::load(args.input.as_deref())? {
        Some(loan) => loan,
        None => LoanInput {
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            annual_rate_pct: args
                .annual_rate_pct
                .ok_or("--annual-rate-pct is required (or provide --input)")?,
            months: args
                .months
                .ok_or("--months is required (or provide --input)")?,
            extra_per_month: args.extra_per_month.unwrap_or(Decimal::ZERO),
        },
    };

    let mut result = amortization::compute_amortization(&loan)?;
    if let Some(rows) = args.rows {
        result.result.schedule.truncate(rows);
    }
    Ok(serde_json::to_value(result)?)
}

pub fn run_days_to_months(args: DaysToMonthsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let (days, months) = match (args.days, args.from, args.to) {
        (Some(days), _, _) => (days, time_value::days_to_months(days)),
        (None, Some(from), Some(to)) => {
            ((to - from).num_days(), time_value::months_between(from, to))
        }
        _ => return Err("--days or --from/--to is required".into()),
    };
    Ok(json!({ "days": days, "months": months }))
}
