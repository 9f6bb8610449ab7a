//! Data generators for creating test fixtures.
//!
//! Connections, catalogs and documents shaped like what the REST backend
//! hands the editor.

pub mod fixtures;

pub use fixtures::*;
