//! Integration value model
//!
//! An [`Integration`] is the document under edit: scalar metadata plus an
//! ordered list of [`Step`]s. Position 0 is the start, the highest index is
//! the finish and everything in between is a middle step.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Filled-in form values keyed by property name
pub type ConfiguredProperties = BTreeMap<String, Value>;

/// The integration document being edited
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Integration {
    /// Backend identifier, absent while the document is unsaved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Human-readable name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Tags, including the connector ids used by the flow once saved
    #[serde(default)]
    pub tags: Vec<String>,

    /// Ordered steps; a missing or null list deserializes as empty
    #[serde(default, deserialize_with = "deserialize_steps")]
    pub steps: Vec<Step>,

    /// Properties owned by the REST API that the editor carries through untouched
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

fn deserialize_steps<'de, D>(deserializer: D) -> Result<Vec<Step>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<Option<Step>>>::deserialize(deserializer)?;
    Ok(raw.unwrap_or_default().into_iter().flatten().collect())
}

impl Integration {
    /// Create an empty, unsaved integration with the given name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// True when the document carries a non-empty name
    pub fn has_name(&self) -> bool {
        self.name.as_deref().map_or(false, |name| !name.is_empty())
    }

    /// Connector ids referenced by endpoint steps, in step order, without duplicates
    pub fn connector_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        for step in self.steps.iter().filter(|s| s.is_endpoint()) {
            let connector_id = step
                .connection
                .as_ref()
                .and_then(|connection| connection.connector_id.clone());
            if let Some(id) = connector_id {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }
        ids
    }
}

/// Discriminant of a [`Step`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StepKind {
    /// A connection plus action pair
    Endpoint,
    /// Legacy spelling of an endpoint
    Connection,
    /// Data mapper
    Mapper,
    /// Message filter
    Filter,
    /// Log step
    Log,
    /// Store data
    StoreData,
    /// Set data
    SetData,
    /// Call a named route
    CallRoute,
    /// Conditional processing
    ConditionalProcessing,
    /// Split
    Split,
    /// Aggregate
    Aggregate,
    /// Template
    Template,
    /// Extension-provided step
    Extension,
}

impl StepKind {
    /// Wire tag of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            StepKind::Endpoint => "endpoint",
            StepKind::Connection => "connection",
            StepKind::Mapper => "mapper",
            StepKind::Filter => "filter",
            StepKind::Log => "log",
            StepKind::StoreData => "storeData",
            StepKind::SetData => "setData",
            StepKind::CallRoute => "callRoute",
            StepKind::ConditionalProcessing => "conditionalProcessing",
            StepKind::Split => "split",
            StepKind::Aggregate => "aggregate",
            StepKind::Template => "template",
            StepKind::Extension => "extension",
        }
    }

    /// Label used for freshly inserted steps
    pub fn display_name(&self) -> &'static str {
        match self {
            StepKind::Endpoint | StepKind::Connection => "Connection",
            StepKind::Mapper => "Data Mapper",
            StepKind::Filter => "Basic Filter",
            StepKind::Log => "Log",
            StepKind::StoreData => "Store Data",
            StepKind::SetData => "Set Data",
            StepKind::CallRoute => "Call Route",
            StepKind::ConditionalProcessing => "Conditional Flows",
            StepKind::Split => "Split",
            StepKind::Aggregate => "Aggregate",
            StepKind::Template => "Template",
            StepKind::Extension => "Extension",
        }
    }

    /// Endpoint and its legacy spelling
    pub fn is_endpoint(&self) -> bool {
        matches!(self, StepKind::Endpoint | StepKind::Connection)
    }
}

/// One element of a flow
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    /// Backend identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Step kind, absent on a fresh placeholder
    #[serde(
        default,
        rename = "stepKind",
        alias = "kind",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<StepKind>,

    /// Display name for processing steps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Bound connection (endpoint steps)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection: Option<Connection>,

    /// Bound action (endpoint steps)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,

    /// Values produced by the step's configuration form
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configured_properties: Option<ConfiguredProperties>,

    /// Editor metadata such as `configured: true`
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, Value>,
}

impl Step {
    /// An empty placeholder, created when the user advances into a new position
    pub fn placeholder() -> Self {
        Self::default()
    }

    /// An endpoint placeholder with no connection yet
    pub fn endpoint_placeholder() -> Self {
        Self {
            kind: Some(StepKind::Endpoint),
            ..Self::default()
        }
    }

    /// An endpoint step bound to the given connection
    pub fn endpoint(connection: Connection) -> Self {
        Self {
            kind: Some(StepKind::Endpoint),
            connection: Some(connection),
            ..Self::default()
        }
    }

    /// A processing step of the given kind, named after the kind
    pub fn processing(kind: StepKind) -> Self {
        Self {
            kind: Some(kind),
            name: Some(kind.display_name().to_string()),
            ..Self::default()
        }
    }

    /// True when the kind is explicitly an endpoint
    pub fn is_endpoint(&self) -> bool {
        self.kind.map_or(false, |kind| kind.is_endpoint())
    }

    /// True when the step should be resolved against the connection catalog:
    /// `endpoint`, `connection` or no kind at all
    pub fn resolves_connection(&self) -> bool {
        self.kind.map_or(true, |kind| kind.is_endpoint())
    }

    /// Data shape on the requested side of the step's action
    pub fn data_shape(&self, input: bool) -> Option<&DataShape> {
        self.action
            .as_ref()
            .and_then(|action| action.descriptor.as_ref())
            .and_then(|descriptor| descriptor.data_shape(input))
    }

    /// True when the requested side carries a shape other than `NONE`
    pub fn has_data_shape(&self, input: bool) -> bool {
        self.data_shape(input).map_or(false, DataShape::carries_data)
    }

    /// Completeness predicate gating forward navigation
    pub fn is_complete(&self) -> bool {
        match self.kind {
            Some(kind) if kind.is_endpoint() => {
                self.connection.is_some()
                    && self.action.is_some()
                    && self.configured_properties.is_some()
            }
            Some(_) => self.configured_properties.is_some(),
            None => false,
        }
    }
}

/// Free-function form of [`Step::is_complete`]
pub fn step_is_complete(step: &Step) -> bool {
    step.is_complete()
}

/// Direction an action supports within a flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionPattern {
    /// Consumes from the connection, usable as the start
    From,
    /// Produces to the connection, usable after the start
    To,
    /// Request/response style action
    Pipe,
}

/// An operation offered by a connector
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    /// Action identifier
    pub id: String,

    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Direction the action supports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<ActionPattern>,

    /// Input and output data shapes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descriptor: Option<ActionDescriptor>,
}

impl Action {
    /// An action known only by id
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

/// Data shapes an action consumes and produces
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionDescriptor {
    /// Shape of the message the action consumes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_data_shape: Option<DataShape>,

    /// Shape of the message the action produces
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_data_shape: Option<DataShape>,
}

impl ActionDescriptor {
    /// Shape on the requested side
    pub fn data_shape(&self, input: bool) -> Option<&DataShape> {
        if input {
            self.input_data_shape.as_ref()
        } else {
            self.output_data_shape.as_ref()
        }
    }

    /// True when either side accepts anything, leaving the shape to the user
    pub fn is_shapeless(&self) -> bool {
        let is_any = |shape: &Option<DataShape>| {
            shape.as_ref().and_then(|s| s.kind) == Some(DataShapeKind::Any)
        };
        is_any(&self.input_data_shape) || is_any(&self.output_data_shape)
    }
}

/// Type system a data shape is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataShapeKind {
    /// Anything goes; the user is expected to describe it
    Any,
    /// A Java class
    Java,
    /// JSON schema document
    JsonSchema,
    /// Example JSON instance
    JsonInstance,
    /// XML schema document
    XmlSchema,
    /// Example XML instance
    XmlInstance,
    /// No data at all
    None,
}

/// Description of the message flowing into or out of a step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataShape {
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Type system
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<DataShapeKind>,

    /// Type name within the type system
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,

    /// Schema or instance text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specification: Option<String>,

    /// Free-form metadata; `userDefined = "true"` marks shapes the user described
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl DataShape {
    /// A shape of the given kind with nothing else filled in
    pub fn of_kind(kind: DataShapeKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    /// False for `NONE`, true otherwise
    pub fn carries_data(&self) -> bool {
        self.kind != Some(DataShapeKind::None)
    }

    /// True when the user described the shape by hand
    pub fn is_user_defined(&self) -> bool {
        self.metadata.get("userDefined").map(String::as_str) == Some("true")
    }

    /// Same kind, type and specification
    pub fn same_shape(&self, other: &DataShape) -> bool {
        self.kind == other.kind
            && self.type_name == other.type_name
            && self.specification == other.specification
    }

    /// Label shown next to the step: the name, `ANY`, or the type name
    pub fn label(&self) -> Option<String> {
        if self.name.is_some() {
            return self.name.clone();
        }
        match self.kind {
            Some(DataShapeKind::Any) => Some("ANY".to_string()),
            Some(DataShapeKind::None) => None,
            _ => self.type_name.clone(),
        }
    }
}

/// Connector definition backing a connection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connector {
    /// Connector identifier
    pub id: String,

    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Actions offered by the connector
    #[serde(default)]
    pub actions: Vec<Action>,
}

/// A configured connection, owned by the connection catalog
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    /// Connection identifier
    pub id: String,

    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Icon reference used when rendering
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    /// Description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Id of the backing connector
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connector_id: Option<String>,

    /// Backing connector, when the catalog has it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connector: Option<Connector>,

    /// Connection-level configured properties
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configured_properties: Option<ConfiguredProperties>,
}

impl Connection {
    /// A connection known by id and name
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Whether the connection's connector offers an action with the given pattern.
    /// Connections without connector data are assumed to offer everything.
    pub fn offers(&self, pattern: ActionPattern) -> bool {
        match &self.connector {
            None => true,
            Some(connector) => connector
                .actions
                .iter()
                .any(|action| action.pattern == Some(pattern)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn complete_endpoint() -> Step {
        let mut step = Step::endpoint(Connection::new("1", "foo"));
        step.action = Some(Action::with_id("a1"));
        step.configured_properties = Some(ConfiguredProperties::new());
        step
    }

    #[test]
    fn test_null_steps_deserialize_as_empty() {
        let integration: Integration =
            serde_json::from_value(json!({"name": "x", "steps": null})).unwrap();
        assert!(integration.steps.is_empty());

        let integration: Integration = serde_json::from_value(json!({"name": "x"})).unwrap();
        assert!(integration.steps.is_empty());
    }

    #[test]
    fn test_null_entries_are_dropped() {
        let integration: Integration = serde_json::from_value(json!({
            "steps": [{"stepKind": "log"}, null, {"stepKind": "endpoint"}]
        }))
        .unwrap();
        assert_eq!(integration.steps.len(), 2);
        assert_eq!(integration.steps[1].kind, Some(StepKind::Endpoint));
    }

    #[test]
    fn test_unknown_fields_are_preserved() {
        let raw = json!({"name": "x", "currentStatus": "Draft", "steps": []});
        let integration: Integration = serde_json::from_value(raw).unwrap();
        assert_eq!(integration.extra.get("currentStatus"), Some(&json!("Draft")));

        let back = serde_json::to_value(&integration).unwrap();
        assert_eq!(back["currentStatus"], json!("Draft"));
    }

    #[test]
    fn test_kind_alias() {
        let step: Step = serde_json::from_value(json!({"kind": "storeData"})).unwrap();
        assert_eq!(step.kind, Some(StepKind::StoreData));
        assert_eq!(serde_json::to_value(&step).unwrap(), json!({"stepKind": "storeData"}));
    }

    #[test]
    fn test_endpoint_completeness() {
        let mut step = complete_endpoint();
        assert!(step.is_complete());

        step.action = None;
        assert!(!step.is_complete());

        let mut step = complete_endpoint();
        step.configured_properties = None;
        assert!(!step.is_complete());

        let mut step = complete_endpoint();
        step.connection = None;
        assert!(!step_is_complete(&step));
    }

    #[test]
    fn test_processing_completeness() {
        let mut step = Step::processing(StepKind::Log);
        assert!(!step.is_complete());

        step.configured_properties = Some(ConfiguredProperties::new());
        assert!(step.is_complete());

        assert!(!Step::placeholder().is_complete());
    }

    #[test]
    fn test_resolves_connection_set_membership() {
        assert!(Step::placeholder().resolves_connection());
        assert!(Step::endpoint_placeholder().resolves_connection());

        let legacy = Step {
            kind: Some(StepKind::Connection),
            ..Step::default()
        };
        assert!(legacy.resolves_connection());
        assert!(!Step::processing(StepKind::Mapper).resolves_connection());
    }

    #[test]
    fn test_has_name() {
        assert!(!Integration::default().has_name());
        assert!(!Integration::named("").has_name());
        assert!(Integration::named("Twitter to Salesforce").has_name());
    }

    #[test]
    fn test_connector_ids() {
        let mut twitter = Connection::new("c1", "twitter");
        twitter.connector_id = Some("twitter".to_string());
        let mut salesforce = Connection::new("c2", "sf");
        salesforce.connector_id = Some("salesforce".to_string());

        let integration = Integration {
            steps: vec![
                Step::endpoint(twitter.clone()),
                Step::processing(StepKind::Log),
                Step::endpoint(salesforce),
                Step::endpoint(twitter),
            ],
            ..Integration::default()
        };

        assert_eq!(integration.connector_ids(), vec!["twitter", "salesforce"]);
    }

    #[test]
    fn test_connection_offers() {
        let mut connection = Connection::new("1", "foo");
        assert!(connection.offers(ActionPattern::From));

        connection.connector = Some(Connector {
            id: "timer".to_string(),
            name: None,
            actions: vec![Action {
                id: "tick".to_string(),
                name: None,
                pattern: Some(ActionPattern::From),
                ..Action::default()
            }],
        });
        assert!(connection.offers(ActionPattern::From));
        assert!(!connection.offers(ActionPattern::To));
    }

    #[test]
    fn test_data_shape_wire_format() {
        let raw = json!({
            "id": "get",
            "descriptor": {
                "inputDataShape": {"kind": "NONE"},
                "outputDataShape": {
                    "kind": "JSON_SCHEMA",
                    "type": "Order",
                    "metadata": {"userDefined": "true"}
                }
            }
        });
        let action: Action = serde_json::from_value(raw.clone()).unwrap();
        let step = Step {
            action: Some(action.clone()),
            ..Step::endpoint_placeholder()
        };

        assert!(!step.has_data_shape(true));
        assert!(step.has_data_shape(false));
        let output = step.data_shape(false).unwrap();
        assert!(output.is_user_defined());
        assert_eq!(output.label(), Some("Order".to_string()));
        assert_eq!(serde_json::to_value(&action).unwrap(), raw);
    }

    #[test]
    fn test_shapeless_descriptor() {
        let descriptor = ActionDescriptor {
            input_data_shape: Some(DataShape::of_kind(DataShapeKind::Any)),
            output_data_shape: Some(DataShape::of_kind(DataShapeKind::None)),
        };
        assert!(descriptor.is_shapeless());
        assert_eq!(DataShape::of_kind(DataShapeKind::Any).label(), Some("ANY".to_string()));
        assert_eq!(DataShape::of_kind(DataShapeKind::None).label(), None);
        assert!(!ActionDescriptor::default().is_shapeless());
    }
}
