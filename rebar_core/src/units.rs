//! # Unit Types
//!
//! Type-safe wrappers for the handful of units a reinforcement proposal
//! touches, plus [`AreaUnit`], the scale between the catalog's native
//! mm²/m and whatever unit the required areas arrive in.
//!
//! ## Metric Units
//!
//! - Length: millimeters (bar diameter, center-to-center spacing)
//! - Area: square millimeters (single bar cross-section)
//! - Area per width: mm²/m, with cm²/m and custom scales via [`AreaUnit`]
//!
//! ## Example
//!
//! ```rust
//! use rebar_core::units::AreaUnit;
//!
//! let unit: AreaUnit = "cm2/m".parse().unwrap();
//! assert_eq!(unit.scale_factor(), 0.01);
//! assert_eq!(unit.to_mm2_per_m(5.0).0, 500.0);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::{CalcError, CalcResult};

// ============================================================================
// Length Units
// ============================================================================

/// Length in millimeters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Millimeters(pub f64);

// ============================================================================
// Area Units
// ============================================================================

/// Area in square millimeters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SqMm(pub f64);

/// Reinforcement area per meter width in mm²/m
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mm2PerM(pub f64);

// ============================================================================
// Required-area unit
// ============================================================================

/// Unit of a required-area value, expressed as the factor that takes a
/// catalog area in mm²/m into that unit.
///
/// Serializes as its token: `"cm2/m"`, `"mm2/m"`, or the bare scale for
/// custom units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AreaUnit {
    /// cm²/m, scale 0.01
    Cm2PerM,
    /// mm²/m, scale 1
    Mm2PerM,
    /// Literal scale factor applied to mm²/m
    Custom(f64),
}

impl AreaUnit {
    pub const CM2_PER_M_TOKEN: &'static str = "cm2/m";
    pub const MM2_PER_M_TOKEN: &'static str = "mm2/m";

    /// Resolve a unit token.
    ///
    /// The two recognized tokens map to their fixed scales. Anything else
    /// must parse as a positive finite number and is taken as a literal
    /// scale factor; a warning is logged because a typo in a unit string
    /// lands here too. Use [`AreaUnit::advisory`] to surface it to callers.
    pub fn from_token(token: &str) -> CalcResult<Self> {
        let trimmed = token.trim();
        match trimmed {
            "cm2/m" => Ok(AreaUnit::Cm2PerM),
            "mm2/m" => Ok(AreaUnit::Mm2PerM),
            other => {
                let scale: f64 = other.parse().map_err(|_| {
                    CalcError::invalid_configuration(
                        "area_unit",
                        token,
                        "Expected 'cm2/m', 'mm2/m' or a numeric scale factor",
                    )
                })?;
                let unit = AreaUnit::custom(scale)?;
                warn!(token = other, scale, "Scaling area mm2/m by a custom factor");
                Ok(unit)
            }
        }
    }

    /// Build a custom unit from a literal scale factor.
    pub fn custom(scale: f64) -> CalcResult<Self> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(CalcError::invalid_configuration(
                "area_unit",
                scale.to_string(),
                "Scale factor must be positive and finite",
            ));
        }
        Ok(AreaUnit::Custom(scale))
    }

    /// Factor that converts mm²/m into this unit
    pub fn scale_factor(&self) -> f64 {
        match self {
            AreaUnit::Cm2PerM => 0.01,
            AreaUnit::Mm2PerM => 1.0,
            AreaUnit::Custom(scale) => *scale,
        }
    }

    /// Convert a value in this unit to mm²/m.
    ///
    /// `x` cm²/m and `100·x` mm²/m convert to the same value, bit for bit.
    pub fn to_mm2_per_m(&self, value: f64) -> Mm2PerM {
        match self {
            AreaUnit::Cm2PerM => Mm2PerM(value * 100.0),
            AreaUnit::Mm2PerM => Mm2PerM(value),
            AreaUnit::Custom(scale) => Mm2PerM(value / *scale),
        }
    }

    /// Advisory to raise when this unit came from an unrecognized token
    pub fn advisory(&self) -> Option<Advisory> {
        match self {
            AreaUnit::Custom(scale) => Some(Advisory::CustomAreaScale { scale: *scale }),
            _ => None,
        }
    }

    /// Token form of this unit
    pub fn token(&self) -> String {
        match self {
            AreaUnit::Cm2PerM => Self::CM2_PER_M_TOKEN.to_string(),
            AreaUnit::Mm2PerM => Self::MM2_PER_M_TOKEN.to_string(),
            AreaUnit::Custom(scale) => scale.to_string(),
        }
    }
}

impl Default for AreaUnit {
    fn default() -> Self {
        AreaUnit::Cm2PerM
    }
}

impl fmt::Display for AreaUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

impl FromStr for AreaUnit {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AreaUnit::from_token(s)
    }
}

impl TryFrom<String> for AreaUnit {
    type Error = CalcError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        AreaUnit::from_token(&value)
    }
}

impl From<AreaUnit> for String {
    fn from(unit: AreaUnit) -> Self {
        unit.token()
    }
}

/// Non-fatal notice attached to a proposal run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "details")]
pub enum Advisory {
    /// Required areas were compared using a literal scale factor
    CustomAreaScale { scale: f64 },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::CustomAreaScale { scale } => {
                write!(f, "Scaling area mm2/m by a custom factor of {}", scale)
            }
        }
    }
}
