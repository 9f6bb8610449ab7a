//! Flow events
//!
//! Every mutation of the flow store and every state notification travels
//! as a [`FlowEvent`]. Events are transient: they live for one dispatch
//! cycle and are never stored.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::cursor::{FlowCursor, FlowPage};
use super::integration::{
    Action, ConfiguredProperties, Connection, DataShape, Integration, Step, StepKind,
};
use crate::CoreError;

/// A cloneable callback carried inside an event
pub struct Callback<T = ()> {
    inner: Arc<dyn Fn(T) + Send + Sync>,
}

impl<T> Callback<T> {
    /// Wrap a closure
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    /// Invoke the callback
    pub fn call(&self, arg: T) {
        (self.inner)(arg)
    }
}

impl<T> Clone for Callback<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Callback<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback")
    }
}

/// Document-level property targeted by [`FlowEvent::SetProperty`]
#[derive(Debug, Clone, PartialEq)]
pub enum IntegrationField {
    /// `name`
    Name(Option<String>),
    /// `description`
    Description(Option<String>),
    /// `tags`
    Tags(Vec<String>),
    /// Any other top-level property, carried through to the REST API
    Other {
        /// Property name
        property: String,
        /// New value
        value: Value,
    },
}

/// Callbacks and options for a save
#[derive(Debug, Clone, Default)]
pub struct SaveRequest {
    /// Deploy the saved integration afterwards
    pub publish: bool,
    /// Invoked with the saved document on success
    pub action: Option<Callback<Integration>>,
    /// Invoked with the failure reason
    pub error: Option<Callback<CoreError>>,
}

impl SaveRequest {
    /// Request publication after the save succeeds
    pub fn publish(mut self) -> Self {
        self.publish = true;
        self
    }

    /// Attach the success callback
    pub fn on_saved<F>(mut self, f: F) -> Self
    where
        F: Fn(Integration) + Send + Sync + 'static,
    {
        self.action = Some(Callback::new(f));
        self
    }

    /// Attach the failure callback
    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(CoreError) + Send + Sync + 'static,
    {
        self.error = Some(Callback::new(f));
        self
    }

    pub(crate) fn succeed(&self, integration: Integration) {
        if let Some(action) = &self.action {
            action.call(integration);
        }
    }

    pub(crate) fn fail(&self, reason: CoreError) {
        if let Some(error) = &self.error {
            error.call(reason);
        }
    }
}

/// Typed flow event; one variant per event kind
#[derive(Debug, Clone)]
pub enum FlowEvent {
    /// A new document was set on the store
    IntegrationUpdated {
        /// The document as set
        integration: Integration,
    },

    /// The document set on the store has no steps
    IntegrationNoConnections,

    /// Bind a connection at `position`, replacing the step with an endpoint
    SetConnection {
        /// Target position
        position: usize,
        /// Connection record
        connection: Connection,
        /// Invoked after the mutation
        on_save: Option<Callback>,
    },

    /// Bind an action (and optionally its properties) at `position`
    SelectedAction {
        /// Target position
        position: usize,
        /// Chosen action
        action: Action,
        /// Properties that come with the action
        configured_properties: Option<ConfiguredProperties>,
        /// Invoked after the mutation
        on_save: Option<Callback>,
    },

    /// Set the document name
    SetName {
        /// New name
        name: String,
        /// Invoked after the mutation
        on_save: Option<Callback>,
    },

    /// Set a top-level document property
    SetProperty {
        /// Field and value
        field: IntegrationField,
        /// Invoked after the mutation
        on_save: Option<Callback>,
    },

    /// Merge properties into the step at `position`
    SetProperties {
        /// Target position
        position: usize,
        /// Properties to merge
        properties: ConfiguredProperties,
        /// Invoked after the mutation
        on_save: Option<Callback>,
    },

    /// Replace the step at `position`
    SetStep {
        /// Target position
        position: usize,
        /// Replacement step
        step: Step,
        /// Invoked after the mutation
        on_save: Option<Callback>,
    },

    /// Remove the step at `position`, shifting later steps down
    RemoveStep {
        /// Target position
        position: usize,
        /// Invoked after the mutation
        on_save: Option<Callback>,
    },

    /// Insert a processing step after `position`
    InsertStep {
        /// Step after which to insert
        position: usize,
        /// Kind of the new step
        kind: StepKind,
        /// Invoked after the mutation
        on_save: Option<Callback>,
    },

    /// Insert an empty endpoint after `position`
    InsertConnection {
        /// Step after which to insert
        position: usize,
        /// Invoked after the mutation
        on_save: Option<Callback>,
    },

    /// Insert a data mapper before `position`
    InsertDataMapper {
        /// Step before which to insert
        position: usize,
        /// Invoked after the mutation
        on_save: Option<Callback>,
    },

    /// Merge editor metadata into the step at `position`
    SetMetadata {
        /// Target position
        position: usize,
        /// Metadata to merge
        metadata: BTreeMap<String, Value>,
        /// Invoked after the mutation
        on_save: Option<Callback>,
    },

    /// Set the input or output data shape of the action at `position`
    SetDataShape {
        /// Target position
        position: usize,
        /// New shape
        data_shape: DataShape,
        /// Input side when true, output side otherwise
        is_input: bool,
        /// Invoked after the mutation
        on_save: Option<Callback>,
    },

    /// Move the cursor
    Navigate {
        /// New cursor
        cursor: FlowCursor,
    },

    /// The user asked to delete the step at `position`; awaiting confirmation
    DeletePrompt {
        /// Step to delete
        position: usize,
    },

    /// Persist the document
    Save(SaveRequest),
}

impl FlowEvent {
    /// Bind a connection at `position`
    pub fn set_connection(position: usize, connection: Connection) -> Self {
        FlowEvent::SetConnection {
            position,
            connection,
            on_save: None,
        }
    }

    /// Bind an action at `position`
    pub fn selected_action(
        position: usize,
        action: Action,
        configured_properties: Option<ConfiguredProperties>,
    ) -> Self {
        FlowEvent::SelectedAction {
            position,
            action,
            configured_properties,
            on_save: None,
        }
    }

    /// Set the document name
    pub fn set_name(name: impl Into<String>) -> Self {
        FlowEvent::SetName {
            name: name.into(),
            on_save: None,
        }
    }

    /// Set a top-level property
    pub fn set_property(field: IntegrationField) -> Self {
        FlowEvent::SetProperty {
            field,
            on_save: None,
        }
    }

    /// Merge properties at `position`
    pub fn set_properties(position: usize, properties: ConfiguredProperties) -> Self {
        FlowEvent::SetProperties {
            position,
            properties,
            on_save: None,
        }
    }

    /// Replace the step at `position`
    pub fn set_step(position: usize, step: Step) -> Self {
        FlowEvent::SetStep {
            position,
            step,
            on_save: None,
        }
    }

    /// Remove the step at `position`
    pub fn remove_step(position: usize) -> Self {
        FlowEvent::RemoveStep {
            position,
            on_save: None,
        }
    }

    /// Insert a processing step after `position`
    pub fn insert_step(position: usize, kind: StepKind) -> Self {
        FlowEvent::InsertStep {
            position,
            kind,
            on_save: None,
        }
    }

    /// Insert an empty endpoint after `position`
    pub fn insert_connection(position: usize) -> Self {
        FlowEvent::InsertConnection {
            position,
            on_save: None,
        }
    }

    /// Insert a data mapper before `position`
    pub fn insert_data_mapper(position: usize) -> Self {
        FlowEvent::InsertDataMapper {
            position,
            on_save: None,
        }
    }

    /// Merge metadata at `position`
    pub fn set_metadata(position: usize, metadata: BTreeMap<String, Value>) -> Self {
        FlowEvent::SetMetadata {
            position,
            metadata,
            on_save: None,
        }
    }

    /// Describe the input or output data at `position`
    pub fn set_data_shape(position: usize, data_shape: DataShape, is_input: bool) -> Self {
        FlowEvent::SetDataShape {
            position,
            data_shape,
            is_input,
            on_save: None,
        }
    }

    /// Move the cursor to `page` at `position`
    pub fn navigate(position: usize, page: FlowPage) -> Self {
        FlowEvent::Navigate {
            cursor: FlowCursor::new(position, page),
        }
    }

    /// Persist the document
    pub fn save(request: SaveRequest) -> Self {
        FlowEvent::Save(request)
    }

    /// Attach an `on_save` callback. Events without one are returned unchanged.
    pub fn with_on_save<F>(mut self, f: F) -> Self
    where
        F: Fn(()) + Send + Sync + 'static,
    {
        if let Some(slot) = self.on_save_slot() {
            *slot = Some(Callback::new(f));
        }
        self
    }

    fn on_save_slot(&mut self) -> Option<&mut Option<Callback>> {
        match self {
            FlowEvent::SetConnection { on_save, .. }
            | FlowEvent::SelectedAction { on_save, .. }
            | FlowEvent::SetName { on_save, .. }
            | FlowEvent::SetProperty { on_save, .. }
            | FlowEvent::SetProperties { on_save, .. }
            | FlowEvent::SetStep { on_save, .. }
            | FlowEvent::RemoveStep { on_save, .. }
            | FlowEvent::InsertStep { on_save, .. }
            | FlowEvent::InsertConnection { on_save, .. }
            | FlowEvent::InsertDataMapper { on_save, .. }
            | FlowEvent::SetMetadata { on_save, .. }
            | FlowEvent::SetDataShape { on_save, .. } => Some(on_save),
            FlowEvent::IntegrationUpdated { .. }
            | FlowEvent::IntegrationNoConnections
            | FlowEvent::Navigate { .. }
            | FlowEvent::DeletePrompt { .. }
            | FlowEvent::Save(_) => None,
        }
    }

    /// The `on_save` callback, if any
    pub fn on_save(&self) -> Option<&Callback> {
        match self {
            FlowEvent::SetConnection { on_save, .. }
            | FlowEvent::SelectedAction { on_save, .. }
            | FlowEvent::SetName { on_save, .. }
            | FlowEvent::SetProperty { on_save, .. }
            | FlowEvent::SetProperties { on_save, .. }
            | FlowEvent::SetStep { on_save, .. }
            | FlowEvent::RemoveStep { on_save, .. }
            | FlowEvent::InsertStep { on_save, .. }
            | FlowEvent::InsertConnection { on_save, .. }
            | FlowEvent::InsertDataMapper { on_save, .. }
            | FlowEvent::SetMetadata { on_save, .. }
            | FlowEvent::SetDataShape { on_save, .. } => on_save.as_ref(),
            _ => None,
        }
    }

    /// Wire tag of the event kind
    pub fn kind(&self) -> &'static str {
        match self {
            FlowEvent::IntegrationUpdated { .. } => "integration-updated",
            FlowEvent::IntegrationNoConnections => "integration-no-connections",
            FlowEvent::SetConnection { .. } => "integration-set-connection",
            FlowEvent::SelectedAction { .. } => "integration-selected-action",
            FlowEvent::SetName { .. } => "integration-set-name",
            FlowEvent::SetProperty { .. } => "integration-set-property",
            FlowEvent::SetProperties { .. } => "integration-set-properties",
            FlowEvent::SetStep { .. } => "integration-set-step",
            FlowEvent::RemoveStep { .. } => "integration-remove-step",
            FlowEvent::InsertStep { .. } => "integration-insert-step",
            FlowEvent::InsertConnection { .. } => "integration-insert-connection",
            FlowEvent::InsertDataMapper { .. } => "integration-insert-datamapper",
            FlowEvent::SetMetadata { .. } => "integration-set-metadata",
            FlowEvent::SetDataShape { .. } => "integration-set-datashape",
            FlowEvent::Navigate { .. } => "integration-navigate",
            FlowEvent::DeletePrompt { .. } => "integration-delete-prompt",
            FlowEvent::Save(_) => "integration-save",
        }
    }

    /// Step position the event targets, if any
    pub fn position(&self) -> Option<usize> {
        match self {
            FlowEvent::SetConnection { position, .. }
            | FlowEvent::SelectedAction { position, .. }
            | FlowEvent::SetProperties { position, .. }
            | FlowEvent::SetStep { position, .. }
            | FlowEvent::RemoveStep { position, .. }
            | FlowEvent::InsertStep { position, .. }
            | FlowEvent::InsertConnection { position, .. }
            | FlowEvent::InsertDataMapper { position, .. }
            | FlowEvent::SetMetadata { position, .. }
            | FlowEvent::SetDataShape { position, .. }
            | FlowEvent::DeletePrompt { position } => Some(*position),
            FlowEvent::Navigate { cursor } => Some(cursor.current_position),
            _ => None,
        }
    }

    /// Whether the event only notifies and never mutates the store
    pub fn is_notification(&self) -> bool {
        matches!(
            self,
            FlowEvent::IntegrationUpdated { .. }
                | FlowEvent::IntegrationNoConnections
                | FlowEvent::DeletePrompt { .. }
        )
    }
}
