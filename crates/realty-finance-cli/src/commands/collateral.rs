use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use realty_finance_core::collateral::ltv::{self, CollateralInput, DEFAULT_LTV_PCT};
use realty_finance_core::collateral::valuation::{self, ValuationInput};

use crate::input;

/// Property attributes shared by `valuate` and `collateral`
#[derive(Args)]
pub struct PropertyArgs {
    /// Usable / land area in square metres
    #[arg(long)]
    pub area: Option<Decimal>,

    /// Reference unit price per square metre for the area
    #[arg(long)]
    pub base_price: Option<Decimal>,

    /// Street frontage in metres
    #[arg(long)]
    pub frontage: Option<Decimal>,

    /// Access road / alley width in metres
    #[arg(long)]
    pub alley_width: Option<Decimal>,

    /// Number of floors
    #[arg(long, default_value = "1")]
    pub floors: u32,

    /// Condition / depreciation factor (0.8–1.1)
    #[arg(long, default_value = "1")]
    pub condition: Decimal,

    /// Legal status factor (0.7–1.05)
    #[arg(long, default_value = "1")]
    pub legal: Decimal,

    /// Market sentiment factor (0.9–1.1)
    #[arg(long, default_value = "1")]
    pub market: Decimal,

    /// Irregular shape penalty (0.9–1)
    #[arg(long, default_value = "1")]
    pub shape: Decimal,

    /// Corner lot with two frontages
    #[arg(long)]
    pub corner: bool,

    /// Close to a main road
    #[arg(long)]
    pub near_main_road: bool,
}

impl PropertyArgs {
    fn into_input(self) -> Result<ValuationInput, Box<dyn std::error::Error>> {
        Ok(ValuationInput {
            area_m2: self.area.ok_or("--area is required (or provide --input)")?,
            base_price_per_m2: self
                .base_price
                .ok_or("--base-price is required (or provide --input)")?,
            frontage_m: self
                .frontage
                .ok_or("--frontage is required (or provide --input)")?,
            alley_width_m: self
                .alley_width
                .ok_or("--alley-width is required (or provide --input)")?,
            floors: self.floors,
            condition_factor: self.condition,
            legal_factor: self.legal,
            market_factor: self.market,
            shape_penalty: self.shape,
            corner: self.corner,
            near_main_road: self.near_main_road,
        })
    }
}

/// Arguments for a property value estimate
#[derive(Args)]
pub struct ValuateArgs {
    #[command(flatten)]
    pub property: PropertyArgs,

    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for a collateral assessment (value + maximum loan)
#[derive(Args)]
pub struct CollateralArgs {
    #[command(flatten)]
    pub property: PropertyArgs,

    /// Maximum loan-to-value percentage
    #[arg(long, default_value_t = DEFAULT_LTV_PCT)]
    pub ltv_pct: Decimal,

    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for the LTV loan ceiling
#[derive(Args)]
pub struct LtvArgs {
    /// Estimated collateral value
    #[arg(long)]
    pub value: Decimal,

    /// Maximum loan-to-value percentage
    #[arg(long, default_value_t = DEFAULT_LTV_PCT)]
    pub ltv_pct: Decimal,
}

pub fn run_valuate(args: ValuateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let property: ValuationInput = match input::load(args.input.as_deref())? {
        Some(property) => property,
        None => args.property.into_input()?,
    };
    let result = valuation::estimate_valuation(&property)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_collateral(args: CollateralArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let collateral: CollateralInput = match input::load(args.input.as_deref())? {
        Some(collateral) => collateral,
        None => CollateralInput {
            property: args.property.into_input()?,
            ltv_pct: args.ltv_pct,
        },
    };
    let result = ltv::assess_collateral(&collateral)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_ltv(args: LtvArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let max_loan = ltv::ltv_max(args.value, args.ltv_pct)?;
    Ok(json!({
        "estimatedValue": args.value,
        "ltvPct": args.ltv_pct,
        "maxLoan": max_loan,
    }))
}
