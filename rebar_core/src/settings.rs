//! # Proposal Settings
//!
//! The configuration value a proposal run is made with: the rebar catalog,
//! the default area unit, the failure policy for table passes and the
//! names of the identifier columns. Settings serialize to JSON; see
//! [`file_io`](crate::file_io) for loading and saving.
//!
//! ## Example
//!
//! ```rust
//! use rebar_core::settings::ProposalSettings;
//!
//! let settings = ProposalSettings::default();
//! assert_eq!(settings.propose(5.0)?, 12.0);
//!
//! let json = serde_json::to_string_pretty(&settings).unwrap();
//! assert!(json.contains("\"area_unit\": \"cm2/m\""));
//! # Ok::<(), rebar_core::errors::CalcError>(())
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::CalcResult;
use crate::proposal::{propose_diameter, propose_diameters_for_table, FailurePolicy, TableProposal};
use crate::reinforcement::RebarCatalog;
use crate::table::ElementRebarTable;
use crate::units::AreaUnit;

/// Current schema version for settings files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Default element identifier column
pub const DEFAULT_ID_COLUMN: &str = "ID";

/// Default row key column (element number; the trailing space is part of
/// the design tool's header)
pub const DEFAULT_KEY_COLUMN: &str = "NR ";

/// Settings for a proposal run.
///
/// ## JSON Example
///
/// ```json
/// {
///   "version": "0.1.0",
///   "catalog": {
///     "diameters": [12.0, 16.0, 20.0, 25.0, 32.0],
///     "spacings": [100.0, 150.0, 200.0, 250.0]
///   },
///   "area_unit": "cm2/m",
///   "failure_policy": "fail_fast",
///   "id_column": "ID",
///   "key_column": "NR "
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProposalSettings {
    /// Schema version (for migration compatibility)
    pub version: String,

    /// Candidate diameters and spacings
    pub catalog: RebarCatalog,

    /// Unit of single required-area values
    pub area_unit: AreaUnit,

    /// Handling of failing cells in table passes
    pub failure_policy: FailurePolicy,

    /// Element identifier column in area tables
    pub id_column: String,

    /// Row key column in area tables, if any
    pub key_column: Option<String>,
}

impl Default for ProposalSettings {
    fn default() -> Self {
        ProposalSettings {
            version: SCHEMA_VERSION.to_string(),
            catalog: RebarCatalog::default(),
            area_unit: AreaUnit::default(),
            failure_policy: FailurePolicy::default(),
            id_column: DEFAULT_ID_COLUMN.to_string(),
            key_column: Some(DEFAULT_KEY_COLUMN.to_string()),
        }
    }
}

impl ProposalSettings {
    /// Propose a diameter for one area given in [`Self::area_unit`]
    pub fn propose(&self, required_area: f64) -> CalcResult<f64> {
        propose_diameter(required_area, &self.catalog, self.area_unit)
    }

    /// Run a table pass with these settings' catalog and failure policy
    pub fn propose_table(&self, table: &ElementRebarTable) -> CalcResult<TableProposal> {
        propose_diameters_for_table(table, &self.catalog, self.failure_policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = ProposalSettings::default();
        assert_eq!(settings.version, SCHEMA_VERSION);
        assert_eq!(&settings.catalog, RebarCatalog::standard());
        assert_eq!(settings.area_unit, AreaUnit::Cm2PerM);
        assert_eq!(settings.failure_policy, FailurePolicy::FailFast);
        assert_eq!(settings.key_column.as_deref(), Some("NR "));
    }

    #[test]
    fn test_serialization_roundtrip() {
        let mut settings = ProposalSettings::default();
        settings.failure_policy = FailurePolicy::CollectAll;
        settings.area_unit = AreaUnit::Mm2PerM;

        let json = serde_json::to_string_pretty(&settings).unwrap();
        assert!(json.contains("\"collect_all\""));
        assert!(json.contains("\"mm2/m\""));

        let roundtrip: ProposalSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip, settings);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: ProposalSettings =
            serde_json::from_str(r#"{"catalog":{"diameters":[10,12],"spacings":[150,300]}}"#).unwrap();
        assert_eq!(settings.catalog.diameters(), &[10.0, 12.0]);
        assert_eq!(settings.id_column, "ID");
        assert_eq!(settings.version, SCHEMA_VERSION);
    }

    #[test]
    fn test_invalid_catalog_rejected_on_load() {
        let result = serde_json::from_str::<ProposalSettings>(r#"{"catalog":{"diameters":[12],"spacings":[0]}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_propose_uses_settings_unit() {
        let mut settings = ProposalSettings::default();
        assert_eq!(settings.propose(5.0).unwrap(), 12.0);

        // 5 mm2/m is far below any layout
        settings.area_unit = AreaUnit::Mm2PerM;
        assert_eq!(settings.propose(5.0).unwrap(), 12.0);
        assert_eq!(settings.propose(4000.0).unwrap(), 32.0);
    }
}
