//! Source table loading for the VR/VA benefit engine.
//!
//! This module knows the fixed catalog of monthly inputs, reads each one into
//! a [`SourceTable`](crate::models::SourceTable), and tolerates missing or
//! unreadable files by substituting an empty table and recording a
//! diagnostic.

mod catalog;
mod loader;
mod reader;

pub use catalog::SourceName;
pub use loader::{LoadedSources, SourceLoader};
pub use reader::read_table;
