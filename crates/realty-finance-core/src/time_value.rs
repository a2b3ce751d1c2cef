use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::RealtyFinanceError;
use crate::types::{round_whole, Money, Percent, Rate};
use crate::RealtyFinanceResult;

/// Average Gregorian month length in days (365.2425 / 12).
pub const AVG_DAYS_PER_MONTH: Decimal = dec!(30.4375);

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Convert an annual percentage rate (11 = 11%/yr) to a monthly periodic rate.
pub fn monthly_rate(annual_rate_pct: Percent) -> Rate {
    annual_rate_pct / dec!(100) / MONTHS_PER_YEAR
}

/// Level monthly payment that fully amortizes `principal` over `months`.
///
/// Zero rate degenerates to straight-line repayment. Otherwise the annuity
/// formula `P * r * (1+r)^n / ((1+r)^n - 1)` is evaluated in the equivalent
/// form `P * r / (1 - (1+r)^-n)` so that long terms do not overflow the
/// numerator. When `(1+r)^n` exceeds the decimal range the payment takes its
/// limit `P * r`, which only services interest.
pub fn monthly_payment(
    principal: Money,
    annual_rate_pct: Percent,
    months: u32,
) -> RealtyFinanceResult<Money> {
    if months == 0 {
        return Err(RealtyFinanceError::invalid(
            "months",
            "Loan term must be at least 1 month",
        ));
    }
    if principal < Decimal::ZERO {
        return Err(RealtyFinanceError::invalid(
            "principal",
            "Principal cannot be negative",
        ));
    }
    if annual_rate_pct < Decimal::ZERO {
        return Err(RealtyFinanceError::invalid(
            "annualRatePct",
            "Annual rate cannot be negative",
        ));
    }

    let r = monthly_rate(annual_rate_pct);
    if r.is_zero() {
        return Ok(principal / Decimal::from(months));
    }

    let interest_only = principal
        .checked_mul(r)
        .ok_or_else(|| RealtyFinanceError::overflow("monthly payment"))?;
    let growth = match (Decimal::ONE + r).checked_powi(i64::from(months)) {
        Some(g) => g,
        None => return Ok(interest_only),
    };

    let annuity_denominator = Decimal::ONE - Decimal::ONE / growth;
    if annuity_denominator.is_zero() {
        return Err(RealtyFinanceError::DivisionByZero {
            context: "annuity payment denominator".into(),
        });
    }

    interest_only
        .checked_div(annuity_denominator)
        .ok_or_else(|| RealtyFinanceError::overflow("monthly payment"))
}

/// Approximate whole months in a span of days, using the average month length.
///
/// Not calendar-accurate: 28 days and 31 days both map to one month.
pub fn days_to_months(days: i64) -> i64 {
    let months = round_whole(Decimal::from(days) / AVG_DAYS_PER_MONTH);
    // |days| / 30.4375 always fits back into an i64.
    months.to_i64().unwrap_or_default()
}

/// Approximate months between two dates; negative when `end` precedes `start`.
pub fn months_between(start: NaiveDate, end: NaiveDate) -> i64 {
    days_to_months((end - start).num_days())
}
