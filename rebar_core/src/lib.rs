//! # rebar_core - Rebar Diameter Proposal Engine
//!
//! `rebar_core` turns required reinforcement areas per meter width, as
//! exported by a finite-element design tool, into proposed bar diameters
//! for a reinforced-concrete design tool. All inputs and outputs are
//! JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: Pure functions over an explicit catalog and unit
//! - **JSON-First**: All types implement Serialize/Deserialize
//! - **Rich Errors**: Structured error types that name the failing row and column
//!
//! ## Quick Start
//!
//! ```rust
//! use rebar_core::proposal::{closest_layout, propose_diameter};
//! use rebar_core::reinforcement::RebarCatalog;
//! use rebar_core::units::AreaUnit;
//!
//! let catalog = RebarCatalog::standard();
//! assert_eq!(propose_diameter(5.0, catalog, AreaUnit::Cm2PerM)?, 12.0);
//!
//! let best = closest_layout(13.0, catalog, AreaUnit::Cm2PerM)?;
//! assert_eq!(best.layout.to_string(), "Ø16 c/c 150");
//! # Ok::<(), rebar_core::errors::CalcError>(())
//! ```
//!
//! ## Modules
//!
//! - [`proposal`] - Nearest-match diameter proposal, single value and table
//! - [`reinforcement`] - Rebar catalog and layouts
//! - [`table`] - Element area and diameter tables
//! - [`settings`] - Proposal configuration
//! - [`units`] - Unit wrappers and area unit tokens
//! - [`errors`] - Structured error types
//! - [`file_io`] - CSV tables, settings files, atomic export

pub mod errors;
pub mod file_io;
pub mod proposal;
pub mod reinforcement;
pub mod settings;
pub mod table;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use errors::{CalcError, CalcResult};
pub use proposal::{closest_layout, propose_diameter, propose_diameters_for_table, FailurePolicy};
pub use reinforcement::{RebarCatalog, RebarLayout};
pub use settings::ProposalSettings;
pub use units::{Advisory, AreaUnit};
