//! Assertion utilities for validating flow documents.

pub mod flow;

pub use flow::*;
