//! Testing utilities for the Conduit flow core.
//!
//! This crate provides mocks of the collaborator traits, test implementations
//! (fakes) with controllable failure and timing, builders and fixtures for
//! integration documents, an event recorder and assertion helpers.

pub mod assertions;
pub mod builders;
pub mod data_generators;
pub mod implementations;
pub mod mocks;

/// Re-export commonly used types for convenience
pub use mockall;

pub use builders::{IntegrationBuilder, StepBuilder};
pub use implementations::{EventRecorder, FailingRepository, GatedRepository};
pub use mocks::{MockIntegrationDeployer, MockIntegrationRepository};
