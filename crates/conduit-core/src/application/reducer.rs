//! Reducer applying flow events to the session state
//!
//! The reducer holds the write lock only while it mutates the document. The
//! lock is released before any callback runs, so callbacks may read the
//! store or emit further events.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::current_flow::SharedState;
use crate::config::FlowConfig;
use crate::domain::events::{FlowEvent, IntegrationField, SaveRequest};
use crate::domain::integration::{
    Action, ActionDescriptor, ConfiguredProperties, DataShape, Integration, Step, StepKind,
};
use crate::domain::properties::{merge_into, stringify_values};
use crate::domain::repository::{IntegrationDeployer, IntegrationRepository};
use crate::CoreError;

pub(crate) struct FlowReducer {
    state: SharedState,
    repository: Arc<dyn IntegrationRepository>,
    deployer: Option<Arc<dyn IntegrationDeployer>>,
    config: FlowConfig,
    in_flight: Arc<AtomicUsize>,
}

/// Furthest a setter may reach past the last step
const MAX_PADDING: usize = 64;

/// Slot at `position`, padding the sequence with placeholders when short.
/// `None` when the position lies more than [`MAX_PADDING`] past the end.
fn slot(steps: &mut Vec<Step>, position: usize) -> Option<&mut Step> {
    if position >= steps.len() {
        if position - steps.len() >= MAX_PADDING {
            warn!(position, steps = steps.len(), "Position too far past the last step, ignoring");
            return None;
        }
        steps.resize_with(position + 1, Step::placeholder);
    }
    steps.get_mut(position)
}

/// Insertion index after `position`, clamped to the end
fn after(steps: &[Step], position: usize) -> usize {
    position.saturating_add(1).min(steps.len())
}

/// Keep shapes the user described by hand when an action is replaced
fn keep_user_defined(previous: Option<&ActionDescriptor>, action: &mut Action) {
    let Some(previous) = previous else {
        return;
    };
    let descriptor = action.descriptor.get_or_insert_with(ActionDescriptor::default);
    let user_defined =
        |shape: &Option<DataShape>| shape.as_ref().filter(|s| s.is_user_defined()).cloned();
    if let Some(shape) = user_defined(&previous.input_data_shape) {
        descriptor.input_data_shape = Some(shape);
    }
    if let Some(shape) = user_defined(&previous.output_data_shape) {
        descriptor.output_data_shape = Some(shape);
    }
}

fn new_step_id() -> String {
    Uuid::new_v4().to_string()
}

impl FlowReducer {
    pub(crate) fn new(
        state: SharedState,
        repository: Arc<dyn IntegrationRepository>,
        deployer: Option<Arc<dyn IntegrationDeployer>>,
        config: FlowConfig,
        in_flight: Arc<AtomicUsize>,
    ) -> Self {
        Self {
            state,
            repository,
            deployer,
            config,
            in_flight,
        }
    }

    pub(crate) fn apply(&self, event: &FlowEvent) {
        debug!(kind = event.kind(), position = ?event.position(), "Reducing flow event");

        match event {
            FlowEvent::IntegrationUpdated { .. } => {
                self.state.write().loaded = true;
                return;
            }
            FlowEvent::IntegrationNoConnections | FlowEvent::DeletePrompt { .. } => return,
            FlowEvent::Navigate { cursor } => {
                self.state.write().cursor = *cursor;
                return;
            }
            FlowEvent::Save(request) => {
                self.save(request);
                return;
            }
            _ => {}
        }

        let applied = {
            let mut state = self.state.write();
            match state.integration.as_mut() {
                Some(integration) => Some(self.mutate(integration, event)),
                None => None,
            }
        };

        match applied {
            None => {
                warn!(kind = event.kind(), "No integration loaded, ignoring event");
                return;
            }
            Some(false) => return,
            Some(true) => {}
        }

        if let Some(on_save) = event.on_save() {
            on_save.call(());
        }
    }

    fn properties(&self, incoming: &ConfiguredProperties) -> ConfiguredProperties {
        if self.config.stringify_property_values {
            stringify_values(incoming)
        } else {
            incoming.clone()
        }
    }

    /// Apply a mutation event; false when the event targeted an unreachable slot
    fn mutate(&self, integration: &mut Integration, event: &FlowEvent) -> bool {
        match event {
            FlowEvent::SetConnection {
                position,
                connection,
                ..
            } => {
                let Some(step) = slot(&mut integration.steps, *position) else {
                    return false;
                };
                *step = Step::endpoint(connection.clone());
            }
            FlowEvent::SelectedAction {
                position,
                action,
                configured_properties,
                ..
            } => {
                let properties = configured_properties.as_ref().map(|p| self.properties(p));
                let Some(step) = slot(&mut integration.steps, *position) else {
                    return false;
                };
                let mut action = action.clone();
                keep_user_defined(
                    step.action.as_ref().and_then(|a| a.descriptor.as_ref()),
                    &mut action,
                );
                step.kind = Some(StepKind::Endpoint);
                step.action = Some(action);
                if properties.is_some() {
                    step.configured_properties = properties;
                }
            }
            FlowEvent::SetName { name, .. } => {
                integration.name = Some(name.clone());
            }
            FlowEvent::SetProperty { field, .. } => match field {
                IntegrationField::Name(name) => integration.name = name.clone(),
                IntegrationField::Description(description) => {
                    integration.description = description.clone()
                }
                IntegrationField::Tags(tags) => integration.tags = tags.clone(),
                IntegrationField::Other { property, value } => {
                    integration.extra.insert(property.clone(), value.clone());
                }
            },
            FlowEvent::SetProperties {
                position,
                properties,
                ..
            } => {
                let incoming = self.properties(properties);
                let Some(step) = slot(&mut integration.steps, *position) else {
                    return false;
                };
                let target = step
                    .configured_properties
                    .get_or_insert_with(ConfiguredProperties::new);
                merge_into(target, &incoming);
            }
            FlowEvent::SetStep { position, step, .. } => {
                let mut step = step.clone();
                if step.id.is_none() {
                    step.id = Some(new_step_id());
                }
                let Some(target) = slot(&mut integration.steps, *position) else {
                    return false;
                };
                *target = step;
            }
            FlowEvent::RemoveStep { position, .. } => {
                if *position < integration.steps.len() {
                    integration.steps.remove(*position);
                } else {
                    debug!(position, "Remove beyond last step ignored");
                }
            }
            FlowEvent::InsertStep { position, kind, .. } => {
                let at = after(&integration.steps, *position);
                integration.steps.insert(at, Step::processing(*kind));
            }
            FlowEvent::InsertConnection { position, .. } => {
                let at = after(&integration.steps, *position);
                integration.steps.insert(at, Step::endpoint_placeholder());
            }
            FlowEvent::InsertDataMapper { position, .. } => {
                let at = (*position).min(integration.steps.len());
                integration.steps.insert(at, Step::processing(StepKind::Mapper));
            }
            FlowEvent::SetMetadata {
                position, metadata, ..
            } => {
                let Some(step) = slot(&mut integration.steps, *position) else {
                    return false;
                };
                for (key, value) in metadata {
                    step.metadata.insert(key.clone(), value.clone());
                }
            }
            FlowEvent::SetDataShape {
                position,
                data_shape,
                is_input,
                ..
            } => {
                let Some(step) = slot(&mut integration.steps, *position) else {
                    return false;
                };
                let descriptor = step
                    .action
                    .get_or_insert_with(Action::default)
                    .descriptor
                    .get_or_insert_with(ActionDescriptor::default);
                if *is_input {
                    descriptor.input_data_shape = Some(data_shape.clone());
                } else {
                    descriptor.output_data_shape = Some(data_shape.clone());
                }
            }
            FlowEvent::IntegrationUpdated { .. }
            | FlowEvent::IntegrationNoConnections
            | FlowEvent::Navigate { .. }
            | FlowEvent::DeletePrompt { .. }
            | FlowEvent::Save(_) => {}
        }
        true
    }

    /// Copy sent to persistence: ids for unnamed steps, connector tags
    fn prepare_for_save(&self, mut integration: Integration) -> Integration {
        if self.config.assign_step_ids_on_save {
            for step in integration.steps.iter_mut().filter(|s| s.id.is_none()) {
                step.id = Some(new_step_id());
            }
        }
        if self.config.tag_connectors_on_save {
            for connector_id in integration.connector_ids() {
                if !integration.tags.contains(&connector_id) {
                    integration.tags.push(connector_id);
                }
            }
        }
        integration
    }

    fn save(&self, request: &SaveRequest) {
        let snapshot = self.state.read().integration.clone();
        let Some(snapshot) = snapshot else {
            warn!("Save requested with no integration loaded");
            request.fail(CoreError::ValidationError(
                "No integration loaded".to_string(),
            ));
            return;
        };

        let already_saving = self.in_flight.fetch_add(1, Ordering::SeqCst) > 0;
        if already_saving && self.config.guard_concurrent_saves {
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            warn!(integration_id = ?snapshot.id, "Save rejected, another save is in flight");
            request.fail(CoreError::SaveInProgress);
            return;
        }

        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(err) => {
                self.in_flight.fetch_sub(1, Ordering::SeqCst);
                warn!(error = %err, "Save requested outside of an async runtime");
                request.fail(CoreError::NoAsyncRuntime(err.to_string()));
                return;
            }
        };

        let prepared = self.prepare_for_save(snapshot);
        let repository = Arc::clone(&self.repository);
        let deployer = self.deployer.clone();
        let state = self.state.clone();
        let in_flight = Arc::clone(&self.in_flight);
        let request = request.clone();

        info!(
            integration_id = ?prepared.id,
            steps = prepared.steps.len(),
            publish = request.publish,
            "Saving integration"
        );

        handle.spawn(async move {
            let outcome = persist(repository, deployer, &state, prepared, request.publish).await;
            in_flight.fetch_sub(1, Ordering::SeqCst);
            match outcome {
                Ok(saved) => {
                    info!(integration_id = ?saved.id, "Integration saved");
                    request.succeed(saved);
                }
                Err(reason) => {
                    warn!(error = %reason, "Integration save failed");
                    request.fail(reason);
                }
            }
        });
    }
}

async fn persist(
    repository: Arc<dyn IntegrationRepository>,
    deployer: Option<Arc<dyn IntegrationDeployer>>,
    state: &SharedState,
    prepared: Integration,
    publish: bool,
) -> Result<Integration, CoreError> {
    let saved = repository.update_or_create(prepared).await?;

    {
        let mut state = state.write();
        if let Some(live) = state.integration.as_mut() {
            if live.id.is_none() {
                live.id = saved.id.clone();
            }
        }
    }

    if publish {
        let deployer = deployer.ok_or_else(|| {
            CoreError::DeploymentError("No deployer configured".to_string())
        })?;
        deployer.deploy(&saved).await?;
        info!(integration_id = ?saved.id, "Integration published");
    }

    Ok(saved)
}
