//! Ready-made connections, catalogs and documents.

use conduit_core::{
    Action, ActionPattern, ConfiguredProperties, Connection, ConnectionCatalog, Connector,
    Integration, Step,
};
use serde_json::Value;

fn action(id: &str, name: &str, pattern: ActionPattern) -> Action {
    Action {
        id: id.to_string(),
        name: Some(name.to_string()),
        pattern: Some(pattern),
        descriptor: None,
    }
}

fn connection(id: &str, name: &str, connector: Connector) -> Connection {
    Connection {
        connector_id: Some(connector.id.clone()),
        connector: Some(connector),
        ..Connection::new(id, name)
    }
}

/// A connection whose connector only offers a `From` action
pub fn timer_connection() -> Connection {
    connection(
        "timer-1",
        "Timer",
        Connector {
            id: "timer".to_string(),
            name: Some("Timer".to_string()),
            actions: vec![action("timer-action", "Simple Timer", ActionPattern::From)],
        },
    )
}

/// A connection whose connector only offers a `To` action
pub fn log_connection() -> Connection {
    connection(
        "log-1",
        "Log",
        Connector {
            id: "log".to_string(),
            name: Some("Log".to_string()),
            actions: vec![action("log-action", "Log Message", ActionPattern::To)],
        },
    )
}

/// A connection offering both directions
pub fn http_connection() -> Connection {
    connection(
        "http-1",
        "HTTP",
        Connector {
            id: "http".to_string(),
            name: Some("HTTP".to_string()),
            actions: vec![
                action("http-poll", "Periodic GET", ActionPattern::From),
                action("http-post", "POST", ActionPattern::To),
            ],
        },
    )
}

/// Catalog holding the timer, log and HTTP connections
pub fn sample_catalog() -> ConnectionCatalog {
    vec![timer_connection(), log_connection(), http_connection()]
        .into_iter()
        .collect()
}

/// Configured properties from a JSON object literal; anything else is empty
pub fn properties(value: Value) -> ConfiguredProperties {
    match value {
        Value::Object(map) => map.into_iter().collect(),
        _ => ConfiguredProperties::new(),
    }
}

/// A complete endpoint step on `connection` using its first action
pub fn complete_endpoint(connection: Connection) -> Step {
    let action = connection
        .connector
        .as_ref()
        .and_then(|c| c.actions.first().cloned())
        .unwrap_or_else(|| Action::with_id("default"));
    Step {
        action: Some(action),
        configured_properties: Some(ConfiguredProperties::new()),
        ..Step::endpoint(connection)
    }
}

/// A named document running timer to log, both endpoints complete
pub fn timer_to_log() -> Integration {
    Integration {
        name: Some("Timer to log".to_string()),
        steps: vec![
            complete_endpoint(timer_connection()),
            complete_endpoint(log_connection()),
        ],
        ..Integration::default()
    }
}
