//! Fluent builders for [`Integration`] and [`Step`] values.

use conduit_core::{
    Action, ConfiguredProperties, Connection, Integration, Step, StepKind,
};
use serde_json::Value;

/// Builds an [`Integration`] step by step
#[derive(Debug, Clone, Default)]
pub struct IntegrationBuilder {
    integration: Integration,
}

impl IntegrationBuilder {
    /// Start from an empty, unnamed, unsaved document
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the backend id
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.integration.id = Some(id.into());
        self
    }

    /// Set the name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.integration.name = Some(name.into());
        self
    }

    /// Add a tag
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.integration.tags.push(tag.into());
        self
    }

    /// Append a step
    pub fn step(mut self, step: Step) -> Self {
        self.integration.steps.push(step);
        self
    }

    /// Append an endpoint bound to `connection` with no action yet
    pub fn endpoint(self, connection: Connection) -> Self {
        self.step(Step::endpoint(connection))
    }

    /// Finish building
    pub fn build(self) -> Integration {
        self.integration
    }
}

/// Builds a single [`Step`]
#[derive(Debug, Clone)]
pub struct StepBuilder {
    step: Step,
}

impl StepBuilder {
    /// An endpoint step with no connection
    pub fn endpoint() -> Self {
        Self {
            step: Step::endpoint_placeholder(),
        }
    }

    /// A processing step of `kind`
    pub fn processing(kind: StepKind) -> Self {
        Self {
            step: Step::processing(kind),
        }
    }

    /// Set the id
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.step.id = Some(id.into());
        self
    }

    /// Bind a connection
    pub fn connection(mut self, connection: Connection) -> Self {
        self.step.connection = Some(connection);
        self
    }

    /// Bind an action by id
    pub fn action(mut self, id: impl Into<String>) -> Self {
        self.step.action = Some(Action::with_id(id));
        self
    }

    /// Set one configured property, creating the map when absent
    pub fn property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.step
            .configured_properties
            .get_or_insert_with(ConfiguredProperties::new)
            .insert(key.into(), value);
        self
    }

    /// Mark the step configured with an empty property map
    pub fn configured(mut self) -> Self {
        self.step
            .configured_properties
            .get_or_insert_with(ConfiguredProperties::new);
        self
    }

    /// Finish building
    pub fn build(self) -> Step {
        self.step
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_integration_builder() {
        let integration = IntegrationBuilder::new()
            .id("i-1")
            .name("Timer to log")
            .tag("demo")
            .endpoint(Connection::new("c1", "timer"))
            .step(StepBuilder::processing(StepKind::Log).build())
            .build();

        assert_eq!(integration.id.as_deref(), Some("i-1"));
        assert!(integration.has_name());
        assert_eq!(integration.tags, vec!["demo"]);
        assert_eq!(integration.steps.len(), 2);
    }

    #[test]
    fn test_step_builder_complete_endpoint() {
        let step = StepBuilder::endpoint()
            .connection(Connection::new("c1", "timer"))
            .action("tick")
            .property("period", json!(1000))
            .build();

        assert!(step.is_complete());
        assert_eq!(
            step.configured_properties.and_then(|p| p.get("period").cloned()),
            Some(json!(1000))
        );
    }

    #[test]
    fn test_step_builder_configured_processing() {
        assert!(!StepBuilder::processing(StepKind::Filter).build().is_complete());
        assert!(StepBuilder::processing(StepKind::Filter).configured().build().is_complete());
    }
}
