//! # Rebar Proposal
//!
//! Nearest-match selection of bar diameters from a [`RebarCatalog`].
//!
//! - [`diameter`] - single required area to a diameter (or full layout)
//! - [`table`] - the same, cell by cell over an element table
//!
//! [`RebarCatalog`]: crate::reinforcement::RebarCatalog

pub mod diameter;
pub mod table;

pub use diameter::{closest_layout, propose_diameter, RebarMatch};
pub use table::{propose_diameters_for_table, CellFailure, FailurePolicy, TableProposal};
