use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Decimals cross the JS boundary as strings so no precision is lost to f64.
fn parse_decimal(field: &str, raw: &str) -> NapiResult<Decimal> {
    Decimal::from_str(raw.trim())
        .map_err(|e| napi::Error::from_reason(format!("Invalid {field} '{raw}': {e}")))
}

// ---------------------------------------------------------------------------
// Lending
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_amortization(input_json: String) -> NapiResult<String> {
    let input: realty_finance_core::lending::amortization::LoanInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = realty_finance_core::lending::amortization::compute_amortization(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn monthly_payment(principal: String, annual_rate_pct: String, months: u32) -> NapiResult<String> {
    let principal = parse_decimal("principal", &principal)?;
    let annual_rate_pct = parse_decimal("annualRatePct", &annual_rate_pct)?;
    let payment = realty_finance_core::time_value::monthly_payment(principal, annual_rate_pct, months)
        .map_err(to_napi_error)?;
    Ok(payment.to_string())
}

#[napi]
pub fn days_to_months(days: i64) -> i64 {
    realty_finance_core::time_value::days_to_months(days)
}

// ---------------------------------------------------------------------------
// Collateral
// ---------------------------------------------------------------------------

#[napi]
pub fn estimate_valuation(input_json: String) -> NapiResult<String> {
    let input: realty_finance_core::collateral::valuation::ValuationInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = realty_finance_core::collateral::valuation::estimate_valuation(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn assess_collateral(input_json: String) -> NapiResult<String> {
    let input: realty_finance_core::collateral::ltv::CollateralInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        realty_finance_core::collateral::ltv::assess_collateral(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn ltv_max(estimated_value: String, ltv_pct: String) -> NapiResult<String> {
    let estimated_value = parse_decimal("estimatedValue", &estimated_value)?;
    let ltv_pct = parse_decimal("ltvPct", &ltv_pct)?;
    let max_loan =
        realty_finance_core::collateral::ltv::ltv_max(estimated_value, ltv_pct).map_err(to_napi_error)?;
    Ok(max_loan.to_string())
}
