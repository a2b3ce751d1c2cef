use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::valuation::{
    collect_range_warnings, estimate_property_value, ValuationBreakdown, ValuationInput,
};
use crate::error::RealtyFinanceError;
use crate::types::{
    checked_product, round_whole, with_metadata, ComputationOutput, Money, Percent,
};
use crate::RealtyFinanceResult;

/// Loan-to-value ceiling applied when the caller does not choose one.
pub const DEFAULT_LTV_PCT: Percent = dec!(70);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A property offered as collateral and the lender's LTV ceiling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollateralInput {
    #[serde(flatten)]
    pub property: ValuationInput,
    /// Maximum loan as a percentage of estimated value
    #[serde(default = "default_ltv_pct")]
    pub ltv_pct: Percent,
}

fn default_ltv_pct() -> Percent {
    DEFAULT_LTV_PCT
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollateralOutput {
    pub estimated_value: Money,
    /// Largest loan the collateral supports at `ltv_pct`
    pub max_loan: Money,
    /// Adjusted unit price
    pub per_m2: Money,
    pub ltv_pct: Percent,
    pub breakdown: ValuationBreakdown,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Maximum loanable amount: `max(0, round(value * ltv_pct / 100))`.
pub fn ltv_max(estimated_value: Money, ltv_pct: Percent) -> RealtyFinanceResult<Money> {
    if ltv_pct < Decimal::ZERO {
        return Err(RealtyFinanceError::invalid(
            "ltvPct",
            "LTV percentage cannot be negative",
        ));
    }
    let scaled = checked_product("maximum loan", &[estimated_value, ltv_pct])?;
    Ok(round_whole(scaled / dec!(100)).max(Decimal::ZERO))
}

/// Value the collateral and derive the maximum loan it supports.
pub fn assess_collateral(
    input: &CollateralInput,
) -> RealtyFinanceResult<ComputationOutput<CollateralOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let valuation = estimate_property_value(&input.property)?;
    let max_loan = ltv_max(valuation.estimated_value, input.ltv_pct)?;

    collect_range_warnings(&input.property, &mut warnings);
    if input.ltv_pct > dec!(100) {
        warnings.push(format!(
            "LTV of {}% exceeds 100%; maximum loan is larger than the collateral value",
            input.ltv_pct
        ));
    } else if input.ltv_pct > dec!(80) {
        warnings.push(format!(
            "LTV of {}% exceeds 80%: high leverage",
            input.ltv_pct
        ));
    }

    let output = CollateralOutput {
        estimated_value: valuation.estimated_value,
        max_loan,
        per_m2: valuation.breakdown.per_m2,
        ltv_pct: input.ltv_pct,
        breakdown: valuation.breakdown,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Hedonic Collateral Valuation with LTV Ceiling",
        input,
        warnings,
        elapsed,
        output,
    ))
}
