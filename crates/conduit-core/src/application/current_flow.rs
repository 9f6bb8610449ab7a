//! Flow State Store
//!
//! [`CurrentFlow`] owns the integration document being edited and the
//! cursor for one editing session. Nothing mutates either directly: pages
//! emit [`FlowEvent`]s on the store's bus and the reducer registered at
//! construction applies them.
//!
//! Every accessor is total. Before a document is loaded they return `None`,
//! an empty list, or `true` for [`CurrentFlow::at_end`], so pages can render
//! before any fetch completes.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

use super::reducer::FlowReducer;
use crate::config::FlowConfig;
use crate::domain::cursor::FlowCursor;
use crate::domain::event_bus::{FlowEventBus, Subscription};
use crate::domain::events::FlowEvent;
use crate::domain::integration::{ActionPattern, Connection, Integration, Step};
use crate::domain::repository::{ConnectionCatalog, IntegrationDeployer, IntegrationRepository};

#[derive(Debug, Default)]
pub(crate) struct FlowState {
    pub(crate) integration: Option<Integration>,
    pub(crate) cursor: FlowCursor,
    pub(crate) loaded: bool,
}

/// Lock-poisoning-tolerant handle on the session state
#[derive(Debug, Clone, Default)]
pub(crate) struct SharedState(Arc<RwLock<FlowState>>);

impl SharedState {
    pub(crate) fn read(&self) -> RwLockReadGuard<'_, FlowState> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, FlowState> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Builder for [`CurrentFlow`]
pub struct CurrentFlowBuilder {
    repository: Arc<dyn IntegrationRepository>,
    deployer: Option<Arc<dyn IntegrationDeployer>>,
    catalog: ConnectionCatalog,
    config: FlowConfig,
}

impl CurrentFlowBuilder {
    /// Deploy collaborator used by publishing saves
    pub fn deployer(mut self, deployer: Arc<dyn IntegrationDeployer>) -> Self {
        self.deployer = Some(deployer);
        self
    }

    /// Connections available for step resolution
    pub fn catalog(mut self, catalog: ConnectionCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Behaviour switches
    pub fn config(mut self, config: FlowConfig) -> Self {
        self.config = config;
        self
    }

    /// Create the store and register its reducer on a fresh bus
    pub fn build(self) -> CurrentFlow {
        let state = SharedState::default();
        let events = FlowEventBus::new();
        let in_flight = Arc::new(AtomicUsize::new(0));

        let reducer = FlowReducer::new(
            state.clone(),
            self.repository,
            self.deployer,
            self.config,
            Arc::clone(&in_flight),
        );
        let reducer_subscription = events.subscribe(move |event| reducer.apply(event));

        CurrentFlow {
            state,
            events,
            catalog: Arc::new(RwLock::new(self.catalog)),
            reducer_subscription: Some(reducer_subscription),
            in_flight,
        }
    }
}

/// The document and cursor of one editing session
pub struct CurrentFlow {
    state: SharedState,
    events: FlowEventBus,
    catalog: Arc<RwLock<ConnectionCatalog>>,
    reducer_subscription: Option<Subscription>,
    in_flight: Arc<AtomicUsize>,
}

impl CurrentFlow {
    /// Start building a store around a persistence collaborator
    pub fn builder(repository: Arc<dyn IntegrationRepository>) -> CurrentFlowBuilder {
        CurrentFlowBuilder {
            repository,
            deployer: None,
            catalog: ConnectionCatalog::new(),
            config: FlowConfig::default(),
        }
    }

    /// Store with default configuration and an empty catalog
    pub fn new(repository: Arc<dyn IntegrationRepository>) -> Self {
        Self::builder(repository).build()
    }

    /// The bus carrying this session's events
    pub fn events(&self) -> &FlowEventBus {
        &self.events
    }

    /// Emit an event on the session bus
    pub fn emit(&self, event: FlowEvent) {
        self.events.emit(event);
    }

    /// Subscribe to the session bus. The reducer always runs first.
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&FlowEvent) + Send + Sync + 'static,
    {
        self.events.subscribe(handler)
    }

    /// Replace the connection catalog used for step resolution
    pub fn set_catalog(&self, catalog: ConnectionCatalog) {
        *self.catalog.write().unwrap_or_else(PoisonError::into_inner) = catalog;
    }

    /// Replace the current document.
    ///
    /// Emits `integration-updated`, then `integration-no-connections` when the
    /// document has no steps.
    pub fn set_integration(&self, integration: Integration) {
        let empty = integration.steps.is_empty();
        {
            let mut state = self.state.write();
            state.integration = Some(integration.clone());
            state.loaded = false;
        }
        debug!(
            integration_id = ?integration.id,
            steps = integration.steps.len(),
            "Integration set on current flow"
        );

        self.events.emit(FlowEvent::IntegrationUpdated { integration });
        if empty {
            self.events.emit(FlowEvent::IntegrationNoConnections);
        }
    }

    /// The current document, `None` before one is set
    pub fn get_integration(&self) -> Option<Integration> {
        self.state.read().integration.clone()
    }

    /// Deep copy of the current document
    pub fn integration_clone(&self) -> Option<Integration> {
        self.get_integration()
    }

    /// True once `integration-updated` has been delivered for the current document
    pub fn is_loaded(&self) -> bool {
        self.state.read().loaded
    }

    /// True while at least one save is in flight
    pub fn is_saving(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Current cursor
    pub fn cursor(&self) -> FlowCursor {
        self.state.read().cursor
    }

    /// The step at `position`, with its connection resolved against the catalog
    pub fn get_step(&self, position: usize) -> Option<Step> {
        let step = {
            let state = self.state.read();
            state.integration.as_ref()?.steps.get(position)?.clone()
        };
        Some(self.resolve(step))
    }

    fn resolve(&self, mut step: Step) -> Step {
        if !step.resolves_connection() {
            return step;
        }
        let catalog = self.catalog.read().unwrap_or_else(PoisonError::into_inner);
        let resolved = step
            .connection
            .as_ref()
            .and_then(|connection| catalog.get(&connection.id))
            .cloned();
        if let Some(connection) = resolved {
            step.connection = Some(connection);
        }
        step
    }

    fn steps_len(&self) -> Option<usize> {
        self.state
            .read()
            .integration
            .as_ref()
            .map(|integration| integration.steps.len())
    }

    /// Always 0 once a document is loaded
    pub fn get_first_position(&self) -> Option<usize> {
        self.steps_len().map(|_| 0)
    }

    /// Index of the finish slot. A document always has a virtual finish slot
    /// at 1, even with fewer than two steps.
    pub fn get_last_position(&self) -> Option<usize> {
        self.steps_len().map(|len| if len <= 1 { 1 } else { len - 1 })
    }

    /// A position halfway between start and finish, rounded half up
    pub fn get_middle_position(&self) -> Option<usize> {
        self.get_last_position().map(|last| (last + 1) / 2)
    }

    /// True when no document is loaded or it has no steps
    pub fn is_empty(&self) -> bool {
        self.steps_len().map_or(true, |len| len == 0)
    }

    /// True when no document is loaded or `position` is past the last step
    pub fn at_end(&self, position: usize) -> bool {
        self.steps_len().map_or(true, |len| position >= len)
    }

    /// True when the document has a non-empty name
    pub fn is_valid(&self) -> bool {
        self.state
            .read()
            .integration
            .as_ref()
            .map_or(false, Integration::has_name)
    }

    /// First step, resolved
    pub fn get_start_step(&self) -> Option<Step> {
        self.get_step(self.get_first_position()?)
    }

    /// Finish step, resolved; `None` while no distinct finish exists
    pub fn get_end_step(&self) -> Option<Step> {
        let last = self.get_last_position()?;
        if last < 1 {
            return None;
        }
        self.get_step(last)
    }

    /// Connection of the first step
    pub fn get_start_connection(&self) -> Option<Connection> {
        self.get_start_step()?.connection
    }

    /// Connection of the finish step
    pub fn get_end_connection(&self) -> Option<Connection> {
        self.get_end_step()?.connection
    }

    /// Steps strictly between start and finish, each resolved
    pub fn get_middle_steps(&self) -> Vec<Step> {
        let last = match self.get_last_position() {
            Some(last) if last >= 2 => last,
            _ => return Vec::new(),
        };
        (1..last).filter_map(|position| self.get_step(position)).collect()
    }

    /// Steps from `position` onwards
    pub fn get_subsequent_steps(&self, position: usize) -> Option<Vec<Step>> {
        let state = self.state.read();
        let steps = &state.integration.as_ref()?.steps;
        Some(steps.iter().skip(position).cloned().collect())
    }

    /// Steps before `position`
    pub fn get_previous_steps(&self, position: usize) -> Option<Vec<Step>> {
        let state = self.state.read();
        let steps = &state.integration.as_ref()?.steps;
        Some(steps.iter().take(position).cloned().collect())
    }

    /// Endpoint steps from `position` onwards
    pub fn get_subsequent_connections(&self, position: usize) -> Option<Vec<Step>> {
        self.get_subsequent_steps(position)
            .map(|steps| steps.into_iter().filter(Step::is_endpoint).collect())
    }

    /// Endpoint steps before `position`
    pub fn get_previous_connections(&self, position: usize) -> Option<Vec<Step>> {
        self.get_previous_steps(position)
            .map(|steps| steps.into_iter().filter(Step::is_endpoint).collect())
    }

    /// Nearest endpoint step before `position`
    pub fn get_previous_connection(&self, position: usize) -> Option<Step> {
        self.get_previous_connections(position)?.pop()
    }

    /// First endpoint step from `position` onwards
    pub fn get_subsequent_connection(&self, position: usize) -> Option<Step> {
        self.get_subsequent_connections(position)?.into_iter().next()
    }

    /// Steps from `position` onwards whose action declares an input shape,
    /// with their positions
    pub fn get_subsequent_steps_with_data_shape(&self, position: usize) -> Vec<(usize, Step)> {
        self.get_subsequent_steps(position)
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(offset, step)| (position + offset, step))
            .filter(|(_, step)| step.has_data_shape(true))
            .collect()
    }

    /// Steps before `position` whose action declares an output shape, with
    /// their positions
    pub fn get_previous_steps_with_data_shape(&self, position: usize) -> Vec<(usize, Step)> {
        self.get_previous_steps(position)
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .filter(|(_, step)| step.has_data_shape(false))
            .collect()
    }

    /// Position of the nearest step before `position` producing data
    pub fn get_previous_step_index_with_data_shape(&self, position: usize) -> Option<usize> {
        self.get_previous_steps_with_data_shape(position)
            .pop()
            .map(|(index, _)| index)
    }

    /// Nearest step before `position` producing data
    pub fn get_previous_step_with_data_shape(&self, position: usize) -> Option<Step> {
        self.get_previous_steps_with_data_shape(position)
            .pop()
            .map(|(_, step)| step)
    }

    /// First step from `position` onwards consuming data
    pub fn get_subsequent_step_with_data_shape(&self, position: usize) -> Option<Step> {
        self.get_subsequent_steps_with_data_shape(position)
            .into_iter()
            .next()
            .map(|(_, step)| step)
    }

    /// Connections usable at `position`: the start needs a `From` action,
    /// every later position a `To` action. No position keeps everything.
    pub fn filter_connections_by_position(
        connections: &[Connection],
        position: Option<usize>,
    ) -> Vec<Connection> {
        let pattern = match position {
            None => return connections.to_vec(),
            Some(0) => ActionPattern::From,
            Some(_) => ActionPattern::To,
        };
        connections
            .iter()
            .filter(|connection| connection.offers(pattern))
            .cloned()
            .collect()
    }
}

impl Drop for CurrentFlow {
    fn drop(&mut self) {
        if let Some(subscription) = self.reducer_subscription.take() {
            subscription.unsubscribe();
        }
    }
}
