//! Rebar Layout
//!
//! A single bar diameter laid at a constant center-to-center spacing, and
//! the reinforcement area per meter width it provides:
//!
//! ```text
//! As = π·Ø²/4 · 1000/s   [mm²/m]
//! ```

use std::f64::consts::PI;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::units::{AreaUnit, Millimeters, Mm2PerM, SqMm};

/// Bar diameter and spacing for one reinforcement layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RebarLayout {
    /// Bar diameter Ø
    pub diameter: Millimeters,
    /// Center-to-center spacing s
    pub spacing: Millimeters,
}

impl RebarLayout {
    pub fn new(diameter_mm: f64, spacing_mm: f64) -> Self {
        RebarLayout {
            diameter: Millimeters(diameter_mm),
            spacing: Millimeters(spacing_mm),
        }
    }

    /// Cross-section of one bar
    pub fn bar_area(&self) -> SqMm {
        SqMm(PI * self.diameter.0.powi(2) / 4.0)
    }

    /// Reinforcement area per meter width
    pub fn area_per_meter(&self) -> Mm2PerM {
        Mm2PerM(self.bar_area().0 * 1000.0 / self.spacing.0)
    }

    /// Area per meter expressed in `unit`
    pub fn implied_area(&self, unit: AreaUnit) -> f64 {
        self.area_per_meter().0 * unit.scale_factor()
    }
}

impl fmt::Display for RebarLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ø{} c/c {}", self.diameter.0, self.spacing.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_bar_area() {
        let layout = RebarLayout::new(16.0, 200.0);
        assert_relative_eq!(layout.bar_area().0, 201.06, epsilon = 0.01);
    }

    #[test]
    fn test_area_per_meter() {
        // Ø16 c/c 100 = 2010.6 mm²/m, Ø12 c/c 250 = 452.4 mm²/m
        assert_relative_eq!(RebarLayout::new(16.0, 100.0).area_per_meter().0, 2010.62, epsilon = 0.01);
        assert_relative_eq!(RebarLayout::new(12.0, 250.0).area_per_meter().0, 452.39, epsilon = 0.01);
    }

    #[test]
    fn test_implied_area_in_cm2() {
        let layout = RebarLayout::new(12.0, 200.0);
        assert_relative_eq!(layout.implied_area(AreaUnit::Cm2PerM), 5.655, epsilon = 0.001);
        assert_relative_eq!(layout.implied_area(AreaUnit::Mm2PerM), 565.49, epsilon = 0.01);
    }

    #[test]
    fn test_display() {
        assert_eq!(RebarLayout::new(20.0, 150.0).to_string(), "Ø20 c/c 150");
    }
}
