use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::RealtyFinanceError;
use crate::RealtyFinanceResult;

/// All monetary values. Currency-agnostic; wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Periodic rates expressed as decimals (0.01 = 1% per period).
pub type Rate = Decimal;

/// Rates and ratios quoted as percentages (11 = 11%), the way loan forms take them.
pub type Percent = Decimal;

/// Dimensionless adjustment multipliers (1.05 = +5%)
pub type Multiple = Decimal;

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

/// Round to a whole currency unit, halves away from zero.
///
/// `Decimal::round` uses banker's rounding, which would disagree with the
/// form's displayed figures at exact .5 boundaries.
pub fn round_whole(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Multiply through a chain of factors without panicking on overflow.
pub(crate) fn checked_product(context: &str, factors: &[Decimal]) -> RealtyFinanceResult<Decimal> {
    factors.iter().try_fold(Decimal::ONE, |acc, factor| {
        acc.checked_mul(*factor)
            .ok_or_else(|| RealtyFinanceError::overflow(context))
    })
}

pub(crate) fn checked_sum(context: &str, terms: &[Decimal]) -> RealtyFinanceResult<Decimal> {
    terms.iter().try_fold(Decimal::ZERO, |acc, term| {
        acc.checked_add(*term)
            .ok_or_else(|| RealtyFinanceError::overflow(context))
    })
}
