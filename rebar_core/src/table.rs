//! # Element Tables
//!
//! Row-per-element tables of required areas and of proposed diameters.
//!
//! Area columns are recognized by header, `AS<tag> [<unit>]`, where the
//! tag names the reinforcement layer and the bracket holds the area unit
//! token:
//!
//! | Header          | Layer                   | Diameter column |
//! |-----------------|-------------------------|-----------------|
//! | `ASO [cm2/m]`   | top, outer              | `phi_SO`        |
//! | `ASOQ [cm2/m]`  | top, outer secondary    | `phi_SOQ`       |
//! | `ASU [cm2/m]`   | bottom, outer           | `phi_SU`        |
//! | `ASUQ [cm2/m]`  | bottom, outer secondary | `phi_SUQ`       |
//!
//! ## Example
//!
//! ```rust
//! use rebar_core::table::{AreaColumn, ElementRebarTable, ElementRow, Layer};
//!
//! let column = AreaColumn::parse("ASO [cm2/m]")?.expect("area column");
//! assert_eq!(column.layer, Layer::TopOuter);
//! assert_eq!(column.diameter_header(), "phi_SO");
//!
//! let mut table = ElementRebarTable::new("ID", Some("NR ".to_string()), vec![column]);
//! table.push_row(ElementRow::new("P1", Some("101".to_string()), vec![5.0]))?;
//! assert_eq!(table.len(), 1);
//! # Ok::<(), rebar_core::errors::CalcError>(())
//! ```

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{CalcError, CalcResult};
use crate::units::AreaUnit;

static AREA_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^A(S\w+)\s*\[([^\]]+)\]\s*$").expect("area header pattern is valid")
});

/// Prefix of proposed-diameter column headers
pub const DIAMETER_PREFIX: &str = "phi_";

/// Reinforcement layer of a two-way slab section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layer {
    /// Top face, outer layer (SO)
    #[serde(rename = "SO")]
    TopOuter,
    /// Top face, outer secondary layer (SOQ)
    #[serde(rename = "SOQ")]
    TopOuterSecondary,
    /// Bottom face, outer layer (SU)
    #[serde(rename = "SU")]
    BottomOuter,
    /// Bottom face, outer secondary layer (SUQ)
    #[serde(rename = "SUQ")]
    BottomOuterSecondary,
}

impl Layer {
    pub const ALL: [Layer; 4] = [
        Layer::TopOuter,
        Layer::TopOuterSecondary,
        Layer::BottomOuter,
        Layer::BottomOuterSecondary,
    ];

    /// Short tag used in column headers
    pub fn tag(&self) -> &'static str {
        match self {
            Layer::TopOuter => "SO",
            Layer::TopOuterSecondary => "SOQ",
            Layer::BottomOuter => "SU",
            Layer::BottomOuterSecondary => "SUQ",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Layer> {
        Layer::ALL.into_iter().find(|layer| layer.tag() == tag)
    }

    /// Area column header for this layer, e.g. `ASO [cm2/m]`
    pub fn area_header(&self, unit: AreaUnit) -> String {
        format!("A{} [{}]", self.tag(), unit)
    }

    /// Diameter column header for this layer, e.g. `phi_SO`
    pub fn diameter_header(&self) -> String {
        format!("{}{}", DIAMETER_PREFIX, self.tag())
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// A required-area column: original header, layer and unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaColumn {
    pub header: String,
    pub layer: Layer,
    pub unit: AreaUnit,
}

impl AreaColumn {
    pub fn new(layer: Layer, unit: AreaUnit) -> Self {
        AreaColumn {
            header: layer.area_header(unit),
            layer,
            unit,
        }
    }

    /// Interpret a header as an area column.
    ///
    /// Returns `Ok(None)` for headers that are not area columns, including
    /// `AS...` headers with an unknown layer tag. An unusable unit token in
    /// an otherwise matching header is an error.
    pub fn parse(header: &str) -> CalcResult<Option<AreaColumn>> {
        let Some(caps) = AREA_HEADER.captures(header) else {
            return Ok(None);
        };

        let Some(layer) = Layer::from_tag(&caps[1]) else {
            debug!(header, "Ignoring area column with unknown layer tag");
            return Ok(None);
        };

        let unit = AreaUnit::from_token(&caps[2]).map_err(|_| {
            CalcError::invalid_configuration(
                "area_column",
                header,
                "Unit in brackets must be 'cm2/m', 'mm2/m' or a numeric scale factor",
            )
        })?;

        Ok(Some(AreaColumn {
            header: header.to_string(),
            layer,
            unit,
        }))
    }

    /// Header of the companion diameter column
    pub fn diameter_header(&self) -> String {
        self.layer.diameter_header()
    }
}

/// One element's required areas, parallel to the table's area columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementRow {
    pub element_id: String,
    /// Row-local key (e.g. element number within a shell)
    pub row_key: Option<String>,
    pub areas: Vec<f64>,
}

impl ElementRow {
    pub fn new(element_id: impl Into<String>, row_key: Option<String>, areas: Vec<f64>) -> Self {
        ElementRow {
            element_id: element_id.into(),
            row_key,
            areas,
        }
    }
}

/// Required areas per element and layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementRebarTable {
    /// Header of the element identifier column
    pub id_column: String,
    /// Header of the row key column, if the source has one
    pub key_column: Option<String>,
    area_columns: Vec<AreaColumn>,
    rows: Vec<ElementRow>,
}

impl ElementRebarTable {
    pub fn new(id_column: impl Into<String>, key_column: Option<String>, area_columns: Vec<AreaColumn>) -> Self {
        ElementRebarTable {
            id_column: id_column.into(),
            key_column,
            area_columns,
            rows: Vec::new(),
        }
    }

    /// Append a row; its area count must match the area columns.
    pub fn push_row(&mut self, row: ElementRow) -> CalcResult<()> {
        if row.areas.len() != self.area_columns.len() {
            return Err(CalcError::invalid_input(
                "areas",
                format!("{} values for element '{}'", row.areas.len(), row.element_id),
                format!("Expected {} values, one per area column", self.area_columns.len()),
            ));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Area columns, fixed at construction
    pub fn area_columns(&self) -> &[AreaColumn] {
        &self.area_columns
    }

    pub fn rows(&self) -> &[ElementRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Element identifiers in row order
    pub fn element_ids(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.element_id.as_str()).collect()
    }
}

/// Proposed diameters for one element. `None` marks a cell that failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiameterRow {
    pub element_id: String,
    pub row_key: Option<String>,
    pub diameters: Vec<Option<f64>>,
}

/// Proposed diameters per element and layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiameterTable {
    pub id_column: String,
    pub key_column: Option<String>,
    /// Diameter column headers, parallel to the source area columns
    pub diameter_columns: Vec<String>,
    pub rows: Vec<DiameterRow>,
}

impl DiameterTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Element identifiers in row order
    pub fn element_ids(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.element_id.as_str()).collect()
    }

    /// Look up a diameter by row index and diameter column header
    pub fn diameter(&self, row: usize, column: &str) -> Option<f64> {
        let col = self.diameter_columns.iter().position(|c| c == column)?;
        self.rows.get(row)?.diameters.get(col).copied().flatten()
    }
}

/// Fill blank identifiers with the last non-blank identifier above them.
///
/// FEM exports written without "fill all cells" only print a shell id on
/// its first row. A blank before any identifier has nothing to inherit and
/// is an error.
pub fn forward_fill_ids(column: &str, values: Vec<Option<String>>) -> CalcResult<Vec<String>> {
    let mut current: Option<String> = None;
    let mut filled = Vec::with_capacity(values.len());

    for (row, value) in values.into_iter().enumerate() {
        match value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
            Some(id) => {
                current = Some(id.clone());
                filled.push(id);
            }
            None => {
                let id = current.clone().ok_or_else(|| {
                    CalcError::invalid_input(
                        column,
                        format!("row {}", row),
                        "Blank identifier with no identifier above it",
                    )
                })?;
                debug!(column, row, id = %id, "Forward-filled blank identifier");
                filled.push(id);
            }
        }
    }

    Ok(filled)
}
