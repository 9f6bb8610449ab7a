//! Builders for integration documents and steps.

pub mod integration;

pub use integration::{IntegrationBuilder, StepBuilder};
