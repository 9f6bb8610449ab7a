//! Conduit Core - editing state for integration flows
//!
//! This crate holds the document under edit, the event bus pages use to
//! change it, the reducer that applies those events and the navigation
//! rules that decide when a user may move on. Persistence and deployment
//! are reached through the collaborator traits in [`domain::repository`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Domain layer - value model, events and collaborator interfaces
pub mod domain;

/// Application layer - the flow store, reducer and navigation policy
pub mod application;

/// Configuration
pub mod config;

/// Error types
pub mod error;

pub use application::current_flow::{CurrentFlow, CurrentFlowBuilder};
pub use application::navigation::DataShapeAdvice;
pub use config::FlowConfig;
pub use domain::confirmation::Confirmation;
pub use domain::cursor::{FlowCursor, FlowPage};
pub use domain::event_bus::{EventHandler, FlowEventBus, Subscription};
pub use domain::events::{Callback, FlowEvent, IntegrationField, SaveRequest};
pub use domain::integration::{
    step_is_complete, Action, ActionDescriptor, ActionPattern, ConfiguredProperties, Connection,
    Connector, DataShape, DataShapeKind, Integration, Step, StepKind,
};
pub use domain::repository::{ConnectionCatalog, IntegrationDeployer, IntegrationRepository};
pub use error::CoreError;
