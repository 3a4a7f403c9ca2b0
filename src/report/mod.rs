//! Output generation.
//!
//! `table` writes the derived tables as delimited text; `generator` renders
//! console previews and the JSON run report.

pub mod generator;
pub mod table;

pub use generator::*;
pub use table::*;
