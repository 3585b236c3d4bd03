//! Domain models for the technology tracker.
//!
//! - [`Technology`]: one trackable learning item. The ordered collection of
//!   technologies is the unit of persistence, import and export.
//! - [`Status`]: the three-state learning lifecycle of a technology.
//! - [`ExportDocument`]: the JSON document written by an export and accepted
//!   back by an import.

mod export;
mod technology;

pub use export::*;
pub use technology::*;
