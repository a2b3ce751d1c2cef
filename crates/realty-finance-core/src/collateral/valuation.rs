use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::error::RealtyFinanceError;
use crate::types::{
    checked_product, checked_sum, round_whole, with_metadata, ComputationOutput, Money, Multiple,
};
use crate::RealtyFinanceResult;

/// Each floor above the ground floor adds this share of base value.
const FLOOR_STEP: Decimal = dec!(0.03);
/// Ceiling on the floors multiplier (+15%).
const FLOORS_FACTOR_CAP: Decimal = dec!(1.15);

const CORNER_PREMIUM: Multiple = dec!(1.05);
const MAIN_ROAD_PREMIUM: Multiple = dec!(1.03);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Physical and market attributes of a property used as loan collateral.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationInput {
    /// Usable / land area in square metres
    pub area_m2: Decimal,
    /// Reference unit price for the area
    pub base_price_per_m2: Money,
    /// Street frontage width in metres
    pub frontage_m: Decimal,
    /// Width of the access road or alley in metres
    pub alley_width_m: Decimal,
    /// Number of floors (houses); 1 for land or single-storey
    #[serde(default = "default_floors")]
    pub floors: u32,
    /// Build quality / depreciation, typically 0.8–1.1
    #[serde(default = "neutral_factor")]
    pub condition_factor: Multiple,
    /// Title / paperwork status, typically 0.7–1.05
    #[serde(default = "neutral_factor")]
    pub legal_factor: Multiple,
    /// Local market sentiment, typically 0.9–1.1
    #[serde(default = "neutral_factor")]
    pub market_factor: Multiple,
    /// Irregular lot shape discount, typically 0.9–1
    #[serde(default = "neutral_factor")]
    pub shape_penalty: Multiple,
    /// Corner lot with two frontages
    #[serde(default)]
    pub corner: bool,
    /// Close to a main road
    #[serde(default)]
    pub near_main_road: bool,
}

fn default_floors() -> u32 {
    1
}

fn neutral_factor() -> Multiple {
    Decimal::ONE
}

/// Every intermediate factor and component behind an estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationBreakdown {
    pub road_factor: Multiple,
    pub frontage_factor: Multiple,
    pub corner_factor: Multiple,
    pub main_road_factor: Multiple,
    pub condition_factor: Multiple,
    pub legal_factor: Multiple,
    pub market_factor: Multiple,
    pub shape_penalty: Multiple,
    pub floors_factor: Multiple,
    /// Fully adjusted unit price
    pub per_m2: Money,
    pub land_component: Money,
    /// Value added by floors, priced off the unadjusted base
    pub building_component: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationOutput {
    /// Rounded to whole currency units, never negative
    pub estimated_value: Money,
    pub breakdown: ValuationBreakdown,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Estimate a property's market value with the hedonic adjustment chain.
///
/// Returns a `ComputationOutput<ValuationOutput>` with warnings for
/// adjustment factors outside their customary ranges.
pub fn estimate_valuation(
    input: &ValuationInput,
) -> RealtyFinanceResult<ComputationOutput<ValuationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let output = estimate_property_value(input)?;
    collect_range_warnings(input, &mut warnings);

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Hedonic Adjustment (Comparative Unit Price)",
        input,
        warnings,
        elapsed,
        output,
    ))
}

/// Adjusted value of land plus the incremental value of extra floors.
///
/// `per_m2` is the base unit price multiplied through every location and
/// quality factor. The building component is priced off the unadjusted base
/// so floor count adds to the land chain instead of compounding with it.
pub fn estimate_property_value(input: &ValuationInput) -> RealtyFinanceResult<ValuationOutput> {
    validate_input(input)?;

    let road = road_factor(input.alley_width_m);
    let frontage = frontage_factor(input.frontage_m);
    let corner = if input.corner {
        CORNER_PREMIUM
    } else {
        Decimal::ONE
    };
    let main_road = if input.near_main_road {
        MAIN_ROAD_PREMIUM
    } else {
        Decimal::ONE
    };
    let floors = floors_factor(input.floors);

    let per_m2 = checked_product(
        "adjusted unit price",
        &[
            input.base_price_per_m2,
            road,
            frontage,
            corner,
            main_road,
            input.condition_factor,
            input.legal_factor,
            input.market_factor,
            input.shape_penalty,
        ],
    )?;

    let land_component = checked_product("land component", &[input.area_m2, per_m2])?;
    let building_component = checked_product(
        "building component",
        &[input.area_m2, input.base_price_per_m2, floors - Decimal::ONE],
    )?;
    let estimated_value = round_whole(checked_sum(
        "estimated value",
        &[land_component, building_component],
    )?)
    .max(Decimal::ZERO);

    debug!(%per_m2, %land_component, %building_component, %estimated_value, "property valued");

    Ok(ValuationOutput {
        estimated_value,
        breakdown: ValuationBreakdown {
            road_factor: road,
            frontage_factor: frontage,
            corner_factor: corner,
            main_road_factor: main_road,
            condition_factor: input.condition_factor,
            legal_factor: input.legal_factor,
            market_factor: input.market_factor,
            shape_penalty: input.shape_penalty,
            floors_factor: floors,
            per_m2,
            land_component,
            building_component,
        },
    })
}

/// Access-road multiplier. Bands are inclusive on their lower bound;
/// widths strictly between 2 and 5 metres are unadjusted.
pub fn road_factor(alley_width_m: Decimal) -> Multiple {
    if alley_width_m >= dec!(12) {
        dec!(1.10)
    } else if alley_width_m >= dec!(8) {
        dec!(1.06)
    } else if alley_width_m >= dec!(5) {
        dec!(1.03)
    } else if alley_width_m <= dec!(2) {
        dec!(0.92)
    } else {
        Decimal::ONE
    }
}

/// Frontage multiplier. The narrow-lot discount applies strictly below 3.2m.
pub fn frontage_factor(frontage_m: Decimal) -> Multiple {
    if frontage_m >= dec!(8) {
        dec!(1.08)
    } else if frontage_m >= dec!(6) {
        dec!(1.05)
    } else if frontage_m < dec!(3.2) {
        dec!(0.95)
    } else {
        Decimal::ONE
    }
}

/// `min(1 + 0.03 * (floors - 1), 1.15)`
pub fn floors_factor(floors: u32) -> Multiple {
    let extra_floors = Decimal::from(floors.saturating_sub(1));
    (Decimal::ONE + FLOOR_STEP * extra_floors).min(FLOORS_FACTOR_CAP)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_input(input: &ValuationInput) -> RealtyFinanceResult<()> {
    if input.area_m2 <= Decimal::ZERO {
        return Err(RealtyFinanceError::invalid(
            "areaM2",
            "Area must be positive",
        ));
    }
    if input.base_price_per_m2 <= Decimal::ZERO {
        return Err(RealtyFinanceError::invalid(
            "basePricePerM2",
            "Base unit price must be positive",
        ));
    }
    if input.frontage_m < Decimal::ZERO {
        return Err(RealtyFinanceError::invalid(
            "frontageM",
            "Frontage cannot be negative",
        ));
    }
    if input.alley_width_m < Decimal::ZERO {
        return Err(RealtyFinanceError::invalid(
            "alleyWidthM",
            "Alley width cannot be negative",
        ));
    }
    if input.floors == 0 {
        return Err(RealtyFinanceError::invalid(
            "floors",
            "Floor count must be at least 1",
        ));
    }

    let factors = [
        ("conditionFactor", input.condition_factor),
        ("legalFactor", input.legal_factor),
        ("marketFactor", input.market_factor),
        ("shapePenalty", input.shape_penalty),
    ];
    for (field, value) in factors {
        if value <= Decimal::ZERO {
            return Err(RealtyFinanceError::invalid(
                field,
                "Adjustment factor must be positive",
            ));
        }
    }

    Ok(())
}

pub(crate) fn collect_range_warnings(input: &ValuationInput, warnings: &mut Vec<String>) {
    let ranges = [
        ("conditionFactor", input.condition_factor, dec!(0.8), dec!(1.1)),
        ("legalFactor", input.legal_factor, dec!(0.7), dec!(1.05)),
        ("marketFactor", input.market_factor, dec!(0.9), dec!(1.1)),
        ("shapePenalty", input.shape_penalty, dec!(0.9), Decimal::ONE),
    ];
    for (field, value, low, high) in ranges {
        if value < low || value > high {
            warnings.push(format!(
                "{field} {value} is outside the customary {low}–{high} range; verify the adjustment"
            ));
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn townhouse() -> ValuationInput {
        ValuationInput {
            area_m2: dec!(60),
            base_price_per_m2: dec!(40000000),
            frontage_m: dec!(4),
            alley_width_m: dec!(4),
            floors: 2,
            condition_factor: Decimal::ONE,
            legal_factor: Decimal::ONE,
            market_factor: Decimal::ONE,
            shape_penalty: Decimal::ONE,
            corner: false,
            near_main_road: false,
        }
    }

    #[test]
    fn test_road_factor_bands() {
        assert_eq!(road_factor(dec!(12)), dec!(1.10));
        assert_eq!(road_factor(dec!(11.99)), dec!(1.06));
        assert_eq!(road_factor(dec!(8)), dec!(1.06));
        assert_eq!(road_factor(dec!(5)), dec!(1.03));
        assert_eq!(road_factor(dec!(4.99)), Decimal::ONE);
        assert_eq!(road_factor(dec!(2.01)), Decimal::ONE);
        assert_eq!(road_factor(dec!(2)), dec!(0.92));
        assert_eq!(road_factor(Decimal::ZERO), dec!(0.92));
    }

    #[test]
    fn test_frontage_factor_bands() {
        assert_eq!(frontage_factor(dec!(8)), dec!(1.08));
        assert_eq!(frontage_factor(dec!(6)), dec!(1.05));
        assert_eq!(frontage_factor(dec!(5.99)), Decimal::ONE);
        assert_eq!(frontage_factor(dec!(3.2)), Decimal::ONE);
        assert_eq!(frontage_factor(dec!(3.19)), dec!(0.95));
    }

    #[test]
    fn test_floors_factor_cap() {
        assert_eq!(floors_factor(1), Decimal::ONE);
        assert_eq!(floors_factor(2), dec!(1.03));
        assert_eq!(floors_factor(6), dec!(1.15));
        assert_eq!(floors_factor(20), dec!(1.15));
    }

    #[test]
    fn test_townhouse_reference_value() {
        let out = estimate_property_value(&townhouse()).unwrap();
        let b = &out.breakdown;
        assert_eq!(b.road_factor, Decimal::ONE);
        assert_eq!(b.frontage_factor, Decimal::ONE);
        assert_eq!(b.floors_factor, dec!(1.03));
        assert_eq!(b.per_m2, dec!(40000000));
        assert_eq!(b.land_component, dec!(2400000000));
        assert_eq!(b.building_component, dec!(72000000));
        assert_eq!(out.estimated_value, dec!(2472000000));
    }

    #[test]
    fn test_building_component_ignores_location_premiums() {
        let mut input = townhouse();
        input.corner = true;
        input.alley_width_m = dec!(12);
        let out = estimate_property_value(&input).unwrap();
        // 60 * 40m * 0.03, unaffected by the corner and road premiums
        assert_eq!(out.breakdown.building_component, dec!(72000000));
        assert_eq!(out.breakdown.per_m2, dec!(40000000) * dec!(1.10) * dec!(1.05));
    }

    #[test]
    fn test_rejects_non_positive_area_and_price() {
        let mut input = townhouse();
        input.area_m2 = Decimal::ZERO;
        assert!(matches!(
            estimate_property_value(&input),
            Err(RealtyFinanceError::InvalidInput { ref field, .. }) if field == "areaM2"
        ));

        let mut input = townhouse();
        input.base_price_per_m2 = dec!(-1);
        assert!(matches!(
            estimate_property_value(&input),
            Err(RealtyFinanceError::InvalidInput { ref field, .. }) if field == "basePricePerM2"
        ));
    }

    #[test]
    fn test_rejects_non_positive_factor() {
        let mut input = townhouse();
        input.legal_factor = Decimal::ZERO;
        assert!(matches!(
            estimate_property_value(&input),
            Err(RealtyFinanceError::InvalidInput { ref field, .. }) if field == "legalFactor"
        ));
    }

    #[test]
    fn test_out_of_range_factor_warns() {
        let mut input = townhouse();
        input.legal_factor = dec!(0.5);
        let result = estimate_valuation(&input).unwrap();
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].starts_with("legalFactor"));
    }

    #[test]
    fn test_defaults_from_wire() {
        let input: ValuationInput = serde_json::from_str(
            r#"{"areaM2": 60, "basePricePerM2": 40000000, "frontageM": 4, "alleyWidthM": 4}"#,
        )
        .unwrap();
        assert_eq!(input.floors, 1);
        assert_eq!(input.condition_factor, Decimal::ONE);
        assert_eq!(input.shape_penalty, Decimal::ONE);
        assert!(!input.corner);
        assert!(!input.near_main_road);
    }
}
