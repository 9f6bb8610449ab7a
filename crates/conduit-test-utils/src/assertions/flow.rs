//! Assertion utilities for validating the document held by a flow store.

use conduit_core::{Integration, StepKind};
use thiserror::Error;

/// Error type for flow document validation failures
#[derive(Debug, Error, PartialEq)]
pub enum FlowValidationError {
    /// Step count differs
    #[error("Invalid step count: expected {expected}, got {actual}")]
    StepCount {
        /// Expected number of steps
        expected: usize,
        /// Actual number of steps
        actual: usize,
    },

    /// Step kinds differ
    #[error("Invalid step kinds: expected {expected:?}, got {actual:?}")]
    StepKinds {
        /// Expected kinds
        expected: Vec<Option<StepKind>>,
        /// Actual kinds
        actual: Vec<Option<StepKind>>,
    },

    /// Connection ids differ
    #[error("Invalid connection ids: expected {expected:?}, got {actual:?}")]
    ConnectionIds {
        /// Expected connection ids per step
        expected: Vec<Option<String>>,
        /// Actual connection ids per step
        actual: Vec<Option<String>>,
    },

    /// A step is not complete
    #[error("Step {0} is incomplete")]
    IncompleteStep(usize),
}

/// Asserts the number of steps in the document.
pub fn assert_step_count(
    integration: &Integration,
    expected: usize,
) -> Result<(), FlowValidationError> {
    let actual = integration.steps.len();
    if actual != expected {
        return Err(FlowValidationError::StepCount { expected, actual });
    }
    Ok(())
}

/// Asserts the kinds of all steps, in order.
pub fn assert_step_kinds(
    integration: &Integration,
    expected: &[Option<StepKind>],
) -> Result<(), FlowValidationError> {
    let actual: Vec<Option<StepKind>> = integration.steps.iter().map(|s| s.kind).collect();
    if actual != expected {
        return Err(FlowValidationError::StepKinds {
            expected: expected.to_vec(),
            actual,
        });
    }
    Ok(())
}

/// Asserts the connection id bound at each step, in order.
///
/// Steps without a connection are matched by `None`.
pub fn assert_connection_ids(
    integration: &Integration,
    expected: &[Option<&str>],
) -> Result<(), FlowValidationError> {
    let actual: Vec<Option<String>> = integration
        .steps
        .iter()
        .map(|s| s.connection.as_ref().map(|c| c.id.clone()))
        .collect();
    let expected: Vec<Option<String>> = expected.iter().map(|id| id.map(str::to_string)).collect();
    if actual != expected {
        return Err(FlowValidationError::ConnectionIds { expected, actual });
    }
    Ok(())
}

/// Asserts every step is complete.
pub fn assert_all_complete(integration: &Integration) -> Result<(), FlowValidationError> {
    match integration.steps.iter().position(|s| !s.is_complete()) {
        Some(position) => Err(FlowValidationError::IncompleteStep(position)),
        None => Ok(()),
    }
}
