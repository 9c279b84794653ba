//! Rebar Catalog
//!
//! The discrete set of bar diameters and center-to-center spacings a
//! proposal may pick from. A catalog is validated once on construction and
//! is immutable afterwards, so the search never sees an empty or
//! non-positive candidate list.
//!
//! The standard catalog (Ø12–Ø32, c/c 100–250) is built once and shared:
//!
//! ```rust
//! use rebar_core::reinforcement::RebarCatalog;
//!
//! let catalog = RebarCatalog::standard();
//! assert_eq!(catalog.diameters(), &[12.0, 16.0, 20.0, 25.0, 32.0]);
//! assert_eq!(catalog.spacings(), &[100.0, 150.0, 200.0, 250.0]);
//! ```

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Standard bar diameters in mm
pub const STANDARD_DIAMETERS_MM: [f64; 5] = [12.0, 16.0, 20.0, 25.0, 32.0];

/// Standard center-to-center spacings in mm
pub const STANDARD_SPACINGS_MM: [f64; 4] = [100.0, 150.0, 200.0, 250.0];

static STANDARD_CATALOG: Lazy<RebarCatalog> = Lazy::new(|| RebarCatalog {
    diameters: STANDARD_DIAMETERS_MM.to_vec(),
    spacings: STANDARD_SPACINGS_MM.to_vec(),
});

/// Candidate diameters and spacings, both in mm, kept in caller order.
///
/// ## JSON Example
///
/// ```json
/// {
///   "diameters": [12.0, 16.0, 20.0, 25.0, 32.0],
///   "spacings": [100.0, 150.0, 200.0, 250.0]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCatalog")]
pub struct RebarCatalog {
    diameters: Vec<f64>,
    spacings: Vec<f64>,
}

#[derive(Deserialize)]
struct RawCatalog {
    diameters: Vec<f64>,
    spacings: Vec<f64>,
}

impl TryFrom<RawCatalog> for RebarCatalog {
    type Error = CalcError;

    fn try_from(raw: RawCatalog) -> Result<Self, Self::Error> {
        RebarCatalog::new(raw.diameters, raw.spacings)
    }
}

impl RebarCatalog {
    /// Create a catalog, rejecting empty lists and non-positive entries.
    pub fn new(diameters: Vec<f64>, spacings: Vec<f64>) -> CalcResult<Self> {
        validate_candidates("diameters", &diameters)?;
        validate_candidates("spacings", &spacings)?;
        Ok(RebarCatalog { diameters, spacings })
    }

    /// The shared standard catalog
    pub fn standard() -> &'static RebarCatalog {
        &STANDARD_CATALOG
    }

    /// Candidate diameters (mm) in search order
    pub fn diameters(&self) -> &[f64] {
        &self.diameters
    }

    /// Candidate spacings (mm) in search order
    pub fn spacings(&self) -> &[f64] {
        &self.spacings
    }

    /// Number of (diameter, spacing) pairs searched per cell
    pub fn combination_count(&self) -> usize {
        self.diameters.len() * self.spacings.len()
    }

    /// Check whether a value is one of the catalog diameters
    pub fn contains_diameter(&self, diameter: f64) -> bool {
        self.diameters.iter().any(|&d| d == diameter)
    }

    /// Replace the diameters, keeping spacings
    pub fn with_diameters(&self, diameters: Vec<f64>) -> CalcResult<Self> {
        RebarCatalog::new(diameters, self.spacings.clone())
    }

    /// Replace the spacings, keeping diameters
    pub fn with_spacings(&self, spacings: Vec<f64>) -> CalcResult<Self> {
        RebarCatalog::new(self.diameters.clone(), spacings)
    }
}

impl Default for RebarCatalog {
    fn default() -> Self {
        RebarCatalog::standard().clone()
    }
}

fn validate_candidates(field: &str, values: &[f64]) -> CalcResult<()> {
    if values.is_empty() {
        return Err(CalcError::invalid_configuration(
            field,
            "[]",
            "Catalog needs at least one candidate",
        ));
    }
    if let Some(bad) = values.iter().find(|v| !v.is_finite() || **v <= 0.0) {
        return Err(CalcError::invalid_configuration(
            field,
            bad.to_string(),
            "Catalog values must be positive and finite",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog() {
        let catalog = RebarCatalog::standard();
        assert_eq!(catalog.combination_count(), 20);
        assert!(catalog.contains_diameter(25.0));
        assert!(!catalog.contains_diameter(10.0));
        assert_eq!(&RebarCatalog::default(), catalog);
    }

    #[test]
    fn test_empty_lists_rejected() {
        let err = RebarCatalog::new(vec![], vec![100.0]).unwrap_err();
        assert!(matches!(err, CalcError::InvalidConfiguration { ref field, .. } if field == "diameters"));

        let err = RebarCatalog::new(vec![12.0], vec![]).unwrap_err();
        assert!(matches!(err, CalcError::InvalidConfiguration { ref field, .. } if field == "spacings"));
    }

    #[test]
    fn test_non_positive_spacing_rejected() {
        assert!(RebarCatalog::new(vec![12.0], vec![100.0, 0.0]).is_err());
        assert!(RebarCatalog::new(vec![12.0], vec![-150.0]).is_err());
        assert!(RebarCatalog::new(vec![f64::NAN], vec![150.0]).is_err());
    }

    #[test]
    fn test_with_overrides() {
        let catalog = RebarCatalog::standard().with_spacings(vec![125.0, 175.0]).unwrap();
        assert_eq!(catalog.diameters(), &STANDARD_DIAMETERS_MM);
        assert_eq!(catalog.spacings(), &[125.0, 175.0]);
    }

    #[test]
    fn test_deserialization_validates() {
        let ok: RebarCatalog =
            serde_json::from_str(r#"{"diameters":[10,12],"spacings":[150]}"#).unwrap();
        assert_eq!(ok.diameters(), &[10.0, 12.0]);

        let bad = serde_json::from_str::<RebarCatalog>(r#"{"diameters":[],"spacings":[150]}"#);
        assert!(bad.is_err());
    }
}
