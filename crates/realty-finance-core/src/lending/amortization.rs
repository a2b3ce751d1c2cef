use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use crate::error::RealtyFinanceError;
use crate::time_value::{monthly_payment, monthly_rate};
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::RealtyFinanceResult;

/// Hard cap on simulated periods (300 years of monthly payments).
pub const MAX_PERIODS: u32 = 3600;

/// Residual balance, relative to the original principal, that is swept into
/// the current period's principal instead of opening another period.
const SETTLEMENT_TOLERANCE: Decimal = dec!(0.000000000001);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Loan terms as entered on a repayment form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanInput {
    /// Amount borrowed
    pub principal: Money,
    /// Nominal annual rate as a percentage (11 = 11%/yr); 0 is interest-free
    pub annual_rate_pct: Percent,
    /// Term in monthly periods
    pub months: u32,
    /// Additional principal prepaid every period
    #[serde(default)]
    pub extra_per_month: Money,
}

/// One period of the repayment schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationRow {
    /// 1-indexed period number
    pub period: u32,
    /// Cash paid this period (interest + principal)
    pub payment: Money,
    /// Interest accrued on the opening balance
    pub interest: Money,
    /// Principal retired this period
    pub principal: Money,
    /// Closing balance, never negative
    pub balance: Money,
}

/// Fully materialised schedule plus its aggregates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationSchedule {
    pub schedule: Vec<AmortizationRow>,
    pub total_interest: Money,
    /// Number of periods actually used; below the nominal term when prepaying
    pub last_period: u32,
    /// Set when the period cap was reached before the balance cleared
    pub truncated: bool,
}

/// Summary of a loan as shown on the repayment calculator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationOutput {
    /// Level annuity payment for the nominal term
    pub base_payment: Money,
    /// Base payment plus the recurring extra principal
    pub scheduled_payment: Money,
    pub total_interest: Money,
    pub total_paid: Money,
    pub last_period: u32,
    pub truncated: bool,
    pub schedule: Vec<AmortizationRow>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Build the repayment schedule for a loan and summarise it.
///
/// Returns a `ComputationOutput<AmortizationOutput>`; a schedule cut off by
/// the period cap is reported in `warnings` and flagged `truncated`.
pub fn compute_amortization(
    input: &LoanInput,
) -> RealtyFinanceResult<ComputationOutput<AmortizationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let AmortizationSchedule {
        schedule,
        total_interest,
        last_period,
        truncated,
    } = amortization_schedule(
        input.principal,
        input.annual_rate_pct,
        input.months,
        input.extra_per_month,
    )?;
    let base_payment = monthly_payment(input.principal, input.annual_rate_pct, input.months)?;

    if truncated {
        warnings.push(format!(
            "Schedule stopped at the {MAX_PERIODS}-period cap with balance outstanding; \
             payment does not amortize the loan, treat the schedule as incomplete"
        ));
    }

    let output = AmortizationOutput {
        base_payment,
        scheduled_payment: base_payment + input.extra_per_month,
        total_interest,
        total_paid: total_paid(&schedule)?,
        last_period,
        truncated,
        schedule,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Level-Payment Annuity Amortization",
        input,
        warnings,
        elapsed,
        output,
    ))
}

/// Simulate a level-payment loan period by period.
///
/// Each period accrues `r * balance` interest and retires
/// `base - interest + extra_per_month` of principal, clamped to
/// `[0, balance]`. The loop ends when the balance clears or after
/// [`MAX_PERIODS`] periods, whichever comes first.
///
/// Decimal rounding leaves a residue on the order of `principal * (1+r)^n`
/// ulps. It is settled in the nominal final period of an amortizing
/// payment, or earlier once it falls within [`SETTLEMENT_TOLERANCE`] of the
/// principal.
pub fn amortization_schedule(
    principal: Money,
    annual_rate_pct: Percent,
    months: u32,
    extra_per_month: Money,
) -> RealtyFinanceResult<AmortizationSchedule> {
    validate_loan(principal, annual_rate_pct, months, extra_per_month)?;

    let r = monthly_rate(annual_rate_pct);
    let base = monthly_payment(principal, annual_rate_pct, months)?;
    let scheduled = base
        .checked_add(extra_per_month)
        .ok_or_else(|| RealtyFinanceError::overflow("scheduled payment"))?;
    // The interest-only fallback never retires principal on its own.
    let amortizing = base > r * principal;
    let dust = principal * SETTLEMENT_TOLERANCE;
    debug!(%principal, %annual_rate_pct, months, %extra_per_month, %base, amortizing, "building amortization schedule");

    let mut schedule = Vec::with_capacity(months.min(MAX_PERIODS) as usize);
    let mut balance = principal;
    let mut total_interest = Decimal::ZERO;
    let mut period: u32 = 0;

    while balance > Decimal::ZERO && period < MAX_PERIODS {
        period += 1;

        let interest = r * balance;
        let mut principal_pay = (scheduled - interest).max(Decimal::ZERO).min(balance);
        let remaining = balance - principal_pay;
        if remaining <= dust || (amortizing && period == months) {
            principal_pay = balance;
        }

        let payment = interest
            .checked_add(principal_pay)
            .ok_or_else(|| RealtyFinanceError::overflow("period payment"))?;
        balance -= principal_pay;
        total_interest = total_interest
            .checked_add(interest)
            .ok_or_else(|| RealtyFinanceError::overflow("total interest"))?;

        schedule.push(AmortizationRow {
            period,
            payment,
            interest,
            principal: principal_pay,
            balance,
        });
    }

    let truncated = balance > Decimal::ZERO;
    if truncated {
        warn!(periods = MAX_PERIODS, remaining = %balance, "amortization schedule truncated at period cap");
    }

    Ok(AmortizationSchedule {
        schedule,
        total_interest,
        last_period: period,
        truncated,
    })
}

/// Total cash paid across a schedule.
pub fn total_paid(schedule: &[AmortizationRow]) -> RealtyFinanceResult<Money> {
    schedule.iter().try_fold(Decimal::ZERO, |acc, row| {
        acc.checked_add(row.payment)
            .ok_or_else(|| RealtyFinanceError::overflow("total paid"))
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_loan(
    principal: Money,
    annual_rate_pct: Percent,
    months: u32,
    extra_per_month: Money,
) -> RealtyFinanceResult<()> {
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
    if extra_per_month < Decimal::ZERO {
        return Err(RealtyFinanceError::invalid(
            "extraPerMonth",
            "Extra monthly principal cannot be negative",
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn reference_loan() -> LoanInput {
        LoanInput {
            principal: dec!(2000000000),
            annual_rate_pct: dec!(11),
            months: 240,
            extra_per_month: Decimal::ZERO,
        }
    }

    #[test]
    fn test_first_row_interest() {
        let s = amortization_schedule(dec!(2000000000), dec!(11), 240, Decimal::ZERO).unwrap();
        let first = &s.schedule[0];
        assert_eq!(first.period, 1);
        // 2bn * 0.11 / 12
        assert!((first.interest - dec!(18333333.33)).abs() < dec!(0.01));
        assert_eq!(first.payment, first.interest + first.principal);
    }

    #[test]
    fn test_schedule_closes_on_nominal_term() {
        let s = amortization_schedule(dec!(2000000000), dec!(11), 240, Decimal::ZERO).unwrap();
        assert_eq!(s.last_period, 240);
        assert_eq!(s.schedule.len(), 240);
        assert_eq!(s.schedule.last().unwrap().balance, Decimal::ZERO);
        assert!(!s.truncated);
    }

    #[test]
    fn test_balance_is_monotonic() {
        let s = amortization_schedule(dec!(750000000), dec!(9.5), 180, dec!(1000000)).unwrap();
        for pair in s.schedule.windows(2) {
            assert!(
                pair[1].balance <= pair[0].balance,
                "Balance rose between periods {} and {}",
                pair[0].period,
                pair[1].period
            );
        }
    }

    #[test]
    fn test_conservation_of_payments() {
        let s = amortization_schedule(dec!(2000000000), dec!(11), 240, Decimal::ZERO).unwrap();
        let paid = total_paid(&s.schedule).unwrap();
        let expected = dec!(2000000000) + s.total_interest;
        assert!(
            (paid - expected).abs() < dec!(0.01),
            "Paid {paid} vs principal + interest {expected}"
        );
    }

    #[test]
    fn test_zero_rate_schedule() {
        let s = amortization_schedule(dec!(1200), Decimal::ZERO, 12, Decimal::ZERO).unwrap();
        assert_eq!(s.last_period, 12);
        assert_eq!(s.total_interest, Decimal::ZERO);
        assert!(s.schedule.iter().all(|row| row.payment == dec!(100)));
    }

    #[test]
    fn test_extra_payment_clears_loan_in_one_period() {
        let s = amortization_schedule(dec!(1000), dec!(12), 12, dec!(5000)).unwrap();
        assert_eq!(s.schedule.len(), 1);
        assert_eq!(s.last_period, 1);
        let row = &s.schedule[0];
        assert_eq!(row.principal, dec!(1000));
        assert_eq!(row.balance, Decimal::ZERO);
        // 1% interest on 1000
        assert_eq!(row.payment, dec!(1010));
    }

    #[test]
    fn test_zero_principal_yields_empty_schedule() {
        let s = amortization_schedule(Decimal::ZERO, dec!(8), 60, Decimal::ZERO).unwrap();
        assert!(s.schedule.is_empty());
        assert_eq!(s.last_period, 0);
        assert!(!s.truncated);
    }

    #[test]
    fn test_non_amortizing_term_is_truncated() {
        // 12%/yr over 6000 months: the annuity barely touches principal
        let s = amortization_schedule(dec!(1000000), dec!(12), 6000, Decimal::ZERO).unwrap();
        assert_eq!(s.last_period, MAX_PERIODS);
        assert_eq!(s.schedule.len(), MAX_PERIODS as usize);
        assert!(s.truncated);
        assert!(s.schedule.last().unwrap().balance > Decimal::ZERO);
    }

    #[test]
    fn test_validation_errors() {
        let cases = [
            (dec!(-1), dec!(5), 12, Decimal::ZERO, "principal"),
            (dec!(1000), dec!(-0.5), 12, Decimal::ZERO, "annualRatePct"),
            (dec!(1000), dec!(5), 0, Decimal::ZERO, "months"),
            (dec!(1000), dec!(5), 12, dec!(-10), "extraPerMonth"),
        ];
        for (principal, rate, months, extra, expected_field) in cases {
            match amortization_schedule(principal, rate, months, extra) {
                Err(RealtyFinanceError::InvalidInput { field, .. }) => {
                    assert_eq!(field, expected_field)
                }
                other => panic!("Expected InvalidInput for {expected_field}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_compute_amortization_summary() {
        let result = compute_amortization(&reference_loan()).unwrap();
        let out = &result.result;
        assert_eq!(out.last_period, 240);
        assert_eq!(out.scheduled_payment, out.base_payment);
        assert_eq!(out.total_paid, total_paid(&out.schedule).unwrap());
        assert!(result.warnings.is_empty());
        assert_eq!(result.methodology, "Level-Payment Annuity Amortization");
    }

    #[test]
    fn test_compute_amortization_warns_when_truncated() {
        let input = LoanInput {
            principal: dec!(1000000),
            annual_rate_pct: dec!(12),
            months: 6000,
            extra_per_month: Decimal::ZERO,
        };
        let result = compute_amortization(&input).unwrap();
        assert!(result.result.truncated);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("3600-period cap"));
    }

    #[test]
    fn test_loan_input_wire_names() {
        let input: LoanInput = serde_json::from_str(
            r#"{"principal": 2000000000, "annualRatePct": 11, "months": 240}"#,
        )
        .unwrap();
        assert_eq!(input.principal, dec!(2000000000));
        assert_eq!(input.annual_rate_pct, dec!(11));
        assert_eq!(input.extra_per_month, Decimal::ZERO);
    }
}
