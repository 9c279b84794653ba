//! # Reinforcement
//!
//! Catalog of candidate bars and the layout type that turns a
//! (diameter, spacing) pair into an area per meter width.
//!
//! ## Example
//!
//! ```rust
//! use rebar_core::reinforcement::{RebarCatalog, RebarLayout};
//!
//! let catalog = RebarCatalog::standard();
//! let layout = RebarLayout::new(catalog.diameters()[0], catalog.spacings()[0]);
//! println!("{} gives {:.0} mm2/m", layout, layout.area_per_meter().0);
//! ```

pub mod catalog;
pub mod layout;

pub use catalog::{RebarCatalog, STANDARD_DIAMETERS_MM, STANDARD_SPACINGS_MM};
pub use layout::RebarLayout;
