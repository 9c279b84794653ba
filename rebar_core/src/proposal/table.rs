//! # Table Proposal
//!
//! Applies [`propose_diameter`] to every area cell of an
//! [`ElementRebarTable`], producing a parallel [`DiameterTable`].
//!
//! Cells are independent: each uses only its own area, the catalog and
//! its column's unit. How a failing cell is handled is chosen by
//! [`FailurePolicy`].
//!
//! ## Example
//!
//! ```rust
//! use rebar_core::proposal::{propose_diameters_for_table, FailurePolicy};
//! use rebar_core::reinforcement::RebarCatalog;
//! use rebar_core::table::{AreaColumn, ElementRebarTable, ElementRow, Layer};
//! use rebar_core::units::AreaUnit;
//!
//! let columns = vec![
//!     AreaColumn::new(Layer::TopOuter, AreaUnit::Cm2PerM),
//!     AreaColumn::new(Layer::BottomOuter, AreaUnit::Cm2PerM),
//! ];
//! let mut table = ElementRebarTable::new("ID", None, columns);
//! table.push_row(ElementRow::new("P1", None, vec![5.0, 10.0]))?;
//!
//! let outcome = propose_diameters_for_table(&table, RebarCatalog::standard(), FailurePolicy::FailFast)?;
//! assert_eq!(outcome.table.diameter(0, "phi_SO"), Some(12.0));
//! # Ok::<(), rebar_core::errors::CalcError>(())
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::{CalcError, CalcResult};
use crate::proposal::diameter::propose_diameter;
use crate::reinforcement::RebarCatalog;
use crate::table::{DiameterRow, DiameterTable, ElementRebarTable};
use crate::units::Advisory;

/// What to do when a cell cannot be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop at the first failing cell
    #[default]
    FailFast,
    /// Leave failing cells empty and report all of them
    CollectAll,
}

/// A cell that could not be resolved under [`FailurePolicy::CollectAll`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellFailure {
    /// Zero-based data row index
    pub row: usize,
    pub element_id: String,
    /// Header of the area column
    pub column: String,
    pub error: CalcError,
}

impl CellFailure {
    /// Convert into a [`CalcError::CellFailed`]
    pub fn into_error(self) -> CalcError {
        CalcError::cell_failed(self.row, self.element_id, self.column, self.error)
    }
}

/// Result of a table pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableProposal {
    pub table: DiameterTable,
    /// Failed cells, in row-then-column order
    pub failures: Vec<CellFailure>,
    /// Non-fatal notices, one per distinct custom unit
    pub advisories: Vec<Advisory>,
}

impl TableProposal {
    /// True when every cell got a diameter
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Propose a diameter for every area cell of `table`.
///
/// # Returns
///
/// * `Ok(TableProposal)` - One output row per input row, same order and ids
/// * `Err(CalcError::CellFailed)` - First failing cell, under `FailFast`
pub fn propose_diameters_for_table(
    table: &ElementRebarTable,
    catalog: &RebarCatalog,
    policy: FailurePolicy,
) -> CalcResult<TableProposal> {
    let mut advisories: Vec<Advisory> = Vec::new();
    for column in table.area_columns() {
        if let Some(advisory) = column.unit.advisory() {
            if !advisories.contains(&advisory) {
                advisories.push(advisory);
            }
        }
    }

    let mut failures = Vec::new();
    let mut rows = Vec::with_capacity(table.len());

    for (index, row) in table.rows().iter().enumerate() {
        let mut diameters = Vec::with_capacity(table.area_columns().len());

        for (column, &area) in table.area_columns().iter().zip(&row.areas) {
            match propose_diameter(area, catalog, column.unit) {
                Ok(diameter) => diameters.push(Some(diameter)),
                Err(error) => {
                    let failure = CellFailure {
                        row: index,
                        element_id: row.element_id.clone(),
                        column: column.header.clone(),
                        error,
                    };
                    match policy {
                        FailurePolicy::FailFast => return Err(failure.into_error()),
                        FailurePolicy::CollectAll => {
                            warn!(
                                row = index,
                                element = %row.element_id,
                                column = %column.header,
                                error = %failure.error,
                                "Could not propose diameter"
                            );
                            failures.push(failure);
                            diameters.push(None);
                        }
                    }
                }
            }
        }

        rows.push(DiameterRow {
            element_id: row.element_id.clone(),
            row_key: row.row_key.clone(),
            diameters,
        });
    }

    debug!(
        rows = rows.len(),
        columns = table.area_columns().len(),
        failures = failures.len(),
        "Table proposal finished"
    );

    Ok(TableProposal {
        table: DiameterTable {
            id_column: table.id_column.clone(),
            key_column: table.key_column.clone(),
            diameter_columns: table.area_columns().iter().map(|c| c.diameter_header()).collect(),
            rows,
        },
        failures,
        advisories,
    })
}
