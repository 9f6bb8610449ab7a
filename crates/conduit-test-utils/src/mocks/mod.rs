//! Mock implementations of the flow core's collaborator interfaces.
//!
//! Generated with mockall so tests can set expectations on how often the
//! store reaches persistence or deployment, and with what document.

pub mod repository;

pub use repository::*;
