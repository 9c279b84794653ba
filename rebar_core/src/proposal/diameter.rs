//! # Diameter Proposal
//!
//! Picks the catalog (diameter, spacing) pair whose area per meter is
//! closest to a required area, and reports the diameter.
//!
//! ## Search Order
//!
//! Diameters are visited in catalog order, and for each diameter the
//! spacings in catalog order. A pair replaces the current best only when
//! its absolute error is strictly smaller, so on an exact tie the earlier
//! pair wins (smaller diameter, then smaller spacing, for an ascending
//! catalog).
//!
//! ## Example
//!
//! ```rust
//! use rebar_core::proposal::propose_diameter;
//! use rebar_core::reinforcement::RebarCatalog;
//! use rebar_core::units::AreaUnit;
//!
//! // 5.0 cm2/m: Ø12 c/c 250 (4.52 cm2/m) is the nearest layout
//! let diameter = propose_diameter(5.0, RebarCatalog::standard(), AreaUnit::Cm2PerM)?;
//! assert_eq!(diameter, 12.0);
//! # Ok::<(), rebar_core::errors::CalcError>(())
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::reinforcement::{RebarCatalog, RebarLayout};
use crate::units::AreaUnit;

/// Best layout found for one required area.
///
/// ## JSON Example
///
/// ```json
/// {
///   "layout": { "diameter": 12.0, "spacing": 250.0 },
///   "implied_area": 4.5239,
///   "error": 0.4761
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RebarMatch {
    /// Winning diameter and spacing
    pub layout: RebarLayout,
    /// Area per meter of the layout, in the requested unit
    pub implied_area: f64,
    /// |required - implied|, in the requested unit
    pub error: f64,
}

/// Find the catalog layout closest to `required_area`.
///
/// # Arguments
///
/// * `required_area` - Required reinforcement per meter width, in `unit`
/// * `catalog` - Candidate diameters and spacings
/// * `unit` - Unit of `required_area`
///
/// # Returns
///
/// * `Ok(RebarMatch)` - The nearest (diameter, spacing) pair
/// * `Err(CalcError::InvalidInput)` - Negative or non-finite area
/// * `Err(CalcError::InvalidConfiguration)` - Unusable unit scale
pub fn closest_layout(required_area: f64, catalog: &RebarCatalog, unit: AreaUnit) -> CalcResult<RebarMatch> {
    validate_required_area(required_area)?;
    validate_unit(unit)?;

    // Compared in mm2/m so every unit sees the same catalog arithmetic
    let required = unit.to_mm2_per_m(required_area);

    let mut best: Option<(RebarLayout, f64)> = None;
    for &diameter in catalog.diameters() {
        for &spacing in catalog.spacings() {
            let layout = RebarLayout::new(diameter, spacing);
            let error = (required.0 - layout.area_per_meter().0).abs();

            if best.map_or(true, |(_, best_error)| error < best_error) {
                best = Some((layout, error));
            }
        }
    }

    // Unreachable for a validated catalog
    let (layout, _) = best.ok_or_else(|| {
        CalcError::invalid_configuration("catalog", "[]", "Catalog has no (diameter, spacing) pairs")
    })?;

    let implied_area = layout.implied_area(unit);
    Ok(RebarMatch {
        layout,
        implied_area,
        error: (required_area - implied_area).abs(),
    })
}

/// Propose a bar diameter for `required_area`.
///
/// The spacing of the winning pair is used only for the comparison and
/// is not returned; see [`closest_layout`] for the full match.
pub fn propose_diameter(required_area: f64, catalog: &RebarCatalog, unit: AreaUnit) -> CalcResult<f64> {
    closest_layout(required_area, catalog, unit).map(|m| m.layout.diameter.0)
}

fn validate_required_area(required_area: f64) -> CalcResult<()> {
    if !required_area.is_finite() {
        return Err(CalcError::invalid_input(
            "required_area",
            required_area.to_string(),
            "Required area must be finite",
        ));
    }
    if required_area < 0.0 {
        return Err(CalcError::invalid_input(
            "required_area",
            required_area.to_string(),
            "Required area cannot be negative",
        ));
    }
    Ok(())
}

fn validate_unit(unit: AreaUnit) -> CalcResult<()> {
    let scale = unit.scale_factor();
    if !scale.is_finite() || scale <= 0.0 {
        return Err(CalcError::invalid_configuration(
            "area_unit",
            scale.to_string(),
            "Scale factor must be positive and finite",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn standard() -> &'static RebarCatalog {
        RebarCatalog::standard()
    }

    #[test]
    fn test_zero_area_picks_smallest_layout() {
        // Ø12 c/c 250 = 452.4 mm2/m is the smallest area on the grid
        let m = closest_layout(0.0, standard(), AreaUnit::Mm2PerM).unwrap();
        assert_eq!(m.layout, RebarLayout::new(12.0, 250.0));
        assert_relative_eq!(m.error, 452.39, epsilon = 0.01);

        assert_eq!(propose_diameter(0.0, standard(), AreaUnit::Mm2PerM).unwrap(), 12.0);
    }

    #[test]
    fn test_five_cm2_per_m() {
        // 452.4 (err 47.6) beats 565.5 (err 65.5)
        let m = closest_layout(5.0, standard(), AreaUnit::Cm2PerM).unwrap();
        assert_eq!(m.layout, RebarLayout::new(12.0, 250.0));
        assert_relative_eq!(m.error, 0.476, epsilon = 0.001);
        assert_eq!(propose_diameter(5.0, standard(), AreaUnit::Cm2PerM).unwrap(), 12.0);
    }

    #[test]
    fn test_exact_layout_is_found() {
        let target = RebarLayout::new(20.0, 150.0).area_per_meter().0;
        let m = closest_layout(target, standard(), AreaUnit::Mm2PerM).unwrap();
        assert_eq!(m.layout, RebarLayout::new(20.0, 150.0));
        assert_eq!(m.error, 0.0);
    }

    #[test]
    fn test_large_demand_picks_largest_layout() {
        // Ø32 c/c 100 = 8042 mm2/m
        assert_eq!(propose_diameter(150.0, standard(), AreaUnit::Cm2PerM).unwrap(), 32.0);
    }

    #[test]
    fn test_ties_go_to_earliest_pair() {
        // Ø10 c/c 100 and Ø20 c/c 400 both give 785.4 mm2/m
        let a = RebarLayout::new(10.0, 100.0).area_per_meter().0;
        let b = RebarLayout::new(20.0, 400.0).area_per_meter().0;
        assert_eq!(a, b);

        let ascending = RebarCatalog::new(vec![10.0, 20.0], vec![100.0, 400.0]).unwrap();
        let m = closest_layout(a, &ascending, AreaUnit::Mm2PerM).unwrap();
        assert_eq!(m.layout, RebarLayout::new(10.0, 100.0));

        let descending = RebarCatalog::new(vec![20.0, 10.0], vec![100.0, 400.0]).unwrap();
        let m = closest_layout(a, &descending, AreaUnit::Mm2PerM).unwrap();
        assert_eq!(m.layout, RebarLayout::new(20.0, 400.0));
    }

    #[test]
    fn test_custom_scale() {
        // scale 0.001 compares in "dm2/m"-like units: Ø16 c/c 200 = 1.005
        let unit = AreaUnit::from_token("0.001").unwrap();
        assert_eq!(propose_diameter(1.0, standard(), unit).unwrap(), 16.0);
    }

    #[test]
    fn test_invalid_area_rejected() {
        for area in [-0.5, f64::NAN, f64::INFINITY] {
            let err = propose_diameter(area, standard(), AreaUnit::Cm2PerM).unwrap_err();
            assert_eq!(err.error_code(), "INVALID_INPUT", "area {area}");
        }
    }

    #[test]
    fn test_invalid_custom_scale_rejected() {
        let err = propose_diameter(5.0, standard(), AreaUnit::Custom(0.0)).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIGURATION");
    }

    /// Areas within a few ulp of the midpoint between two catalog areas
    fn near_midpoints(catalog: &RebarCatalog) -> Vec<f64> {
        let mut areas = Vec::new();
        for &d in catalog.diameters() {
            for &s in catalog.spacings() {
                areas.push(RebarLayout::new(d, s).area_per_meter().0);
            }
        }

        let mut points = Vec::new();
        for (i, a) in areas.iter().enumerate() {
            for b in &areas[i + 1..] {
                let mid_cm = (a + b) / 2.0 / 100.0;
                let bits = mid_cm.to_bits();
                for offset in 0..=6u64 {
                    points.push(f64::from_bits(bits - 3 + offset));
                }
            }
        }
        points
    }

    #[test]
    fn test_cm2_matches_mm2_near_midpoints() {
        for x in [2.0525072003453314e1, 1.987057353395544e1] {
            let cm = propose_diameter(x, standard(), AreaUnit::Cm2PerM).unwrap();
            let mm = propose_diameter(100.0 * x, standard(), AreaUnit::Mm2PerM).unwrap();
            assert_eq!(cm, mm, "x = {x:e}");
        }

        for x in near_midpoints(standard()) {
            let cm = closest_layout(x, standard(), AreaUnit::Cm2PerM).unwrap();
            let mm = closest_layout(100.0 * x, standard(), AreaUnit::Mm2PerM).unwrap();
            assert_eq!(cm.layout, mm.layout, "x = {x:e}");
        }
    }

    #[test]
    fn test_implied_area_reported_in_requested_unit() {
        let m = closest_layout(13.0, standard(), AreaUnit::Cm2PerM).unwrap();
        assert_eq!(m.layout, RebarLayout::new(16.0, 150.0));
        assert_relative_eq!(m.implied_area, 13.404, epsilon = 0.001);
        assert_relative_eq!(m.error, 0.404, epsilon = 0.001);
    }

    proptest! {
        #[test]
        fn prop_result_is_catalog_diameter(area in 0.0f64..100.0) {
            let d = propose_diameter(area, standard(), AreaUnit::Cm2PerM).unwrap();
            prop_assert!(standard().contains_diameter(d));
        }

        #[test]
        fn prop_idempotent(area in 0.0f64..10_000.0) {
            let first = closest_layout(area, standard(), AreaUnit::Mm2PerM).unwrap();
            let second = closest_layout(area, standard(), AreaUnit::Mm2PerM).unwrap();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_cm2_matches_scaled_mm2(area in 0.0f64..100.0) {
            let cm = propose_diameter(area, standard(), AreaUnit::Cm2PerM).unwrap();
            let mm = propose_diameter(area * 100.0, standard(), AreaUnit::Mm2PerM).unwrap();
            prop_assert_eq!(cm, mm);
        }

        #[test]
        fn prop_no_pair_is_closer(area in 0.0f64..10_000.0) {
            let best = closest_layout(area, standard(), AreaUnit::Mm2PerM).unwrap();
            for &d in standard().diameters() {
                for &s in standard().spacings() {
                    let implied = RebarLayout::new(d, s).implied_area(AreaUnit::Mm2PerM);
                    prop_assert!(best.error <= (area - implied).abs());
                }
            }
        }
    }
}
