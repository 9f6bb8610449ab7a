//! Scripted edit session against the in-memory collaborators.
//!
//! Builds a timer-to-log integration through flow events, publishes it and
//! prints the saved document as JSON.

use anyhow::{anyhow, Context, Result};
use std::env;
use std::fs;
use tokio::sync::mpsc;
use tracing::info;

use conduit_core::{
    Action, ActionPattern, ConfiguredProperties, Connection, ConnectionCatalog, Connector,
    CoreError, CurrentFlow, FlowConfig, FlowEvent, FlowPage, Integration, SaveRequest, StepKind,
};
use conduit_monitoring::{init_logging, LogExt, MonitoringConfig};
use conduit_state_inmemory::InMemoryStoreProvider;

fn connection(id: &str, connector: &str, action: &str, pattern: ActionPattern) -> Connection {
    Connection {
        connector_id: Some(connector.to_string()),
        connector: Some(Connector {
            id: connector.to_string(),
            name: Some(connector.to_string()),
            actions: vec![Action {
                id: action.to_string(),
                name: Some(action.to_string()),
                pattern: Some(pattern),
                descriptor: None,
            }],
        }),
        ..Connection::new(id, connector)
    }
}

fn catalog() -> ConnectionCatalog {
    vec![
        connection("timer-1", "timer", "Simple Timer", ActionPattern::From),
        connection("log-1", "log", "Log Message", ActionPattern::To),
    ]
    .into_iter()
    .collect()
}

fn props(pairs: &[(&str, serde_json::Value)]) -> ConfiguredProperties {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect()
}

fn load_flow_config() -> Result<FlowConfig> {
    match env::var("CONDUIT_CONFIG") {
        Ok(path) => {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {}", path))?;
            let mut config = FlowConfig::from_yaml_str(&raw)
                .with_context(|| format!("Failed to parse config file {}", path))?;
            config.apply_env_overrides();
            Ok(config)
        }
        Err(_) => Ok(FlowConfig::load()),
    }
}

/// Run the scripted session and return the published document
async fn walkthrough(config: FlowConfig, provider: &InMemoryStoreProvider) -> Result<Integration> {
    let (repository, deployer) = provider.create_collaborators();
    let catalog = catalog();
    let connections = catalog.connections();
    let starts = CurrentFlow::filter_connections_by_position(&connections, Some(0));
    let finishes = CurrentFlow::filter_connections_by_position(&connections, Some(1));
    let (start, finish) = match (starts.first(), finishes.first()) {
        (Some(start), Some(finish)) => (start.clone(), finish.clone()),
        _ => return Err(anyhow!("Catalog has no usable start or finish connection")),
    };

    let flow = CurrentFlow::builder(repository)
        .deployer(deployer)
        .catalog(catalog.clone())
        .config(config)
        .build();

    // An empty document sends the user straight to the connection picker
    let bus = flow.events().clone();
    let host = flow.subscribe(move |event| {
        if let FlowEvent::IntegrationNoConnections = event {
            bus.emit(FlowEvent::navigate(0, FlowPage::ConnectionSelect));
        }
    });

    flow.set_integration(Integration::named("Timer to log"));
    info!(cursor = ?flow.cursor(), "Editing started");

    flow.emit(FlowEvent::set_connection(0, start));
    flow.emit(FlowEvent::selected_action(
        0,
        Action::with_id("Simple Timer"),
        Some(props(&[("period", serde_json::json!(60000))])),
    ));
    flow.goto(FlowPage::ConnectionSelect, 1);

    flow.emit(FlowEvent::set_connection(1, finish));
    flow.emit(FlowEvent::selected_action(1, Action::with_id("Log Message"), None));
    flow.emit(FlowEvent::set_properties(
        1,
        props(&[("loggerName", serde_json::json!("walkthrough"))]),
    ));

    flow.emit(FlowEvent::insert_step(0, StepKind::Log));
    flow.emit(FlowEvent::set_properties(
        1,
        props(&[("bodyLoggingEnabled", serde_json::json!(true))]),
    ));
    flow.goto(FlowPage::SaveOrAddStep, 1);

    if let Some(last) = flow.get_last_position() {
        for position in 0..=last {
            info!(
                position,
                label = %flow.step_text(position),
                slot = flow.position_text(position),
                "Flow step"
            );
        }
    }

    let (tx, mut rx) = mpsc::unbounded_channel::<Result<Integration, CoreError>>();
    let on_error = tx.clone();
    let request = SaveRequest::default()
        .publish()
        .on_saved(move |saved| {
            let _ = tx.send(Ok(saved));
        })
        .on_error(move |err| {
            let _ = on_error.send(Err(err));
        });
    flow.emit(FlowEvent::save(request));

    let outcome = rx
        .recv()
        .await
        .ok_or_else(|| anyhow!("Save finished without reporting an outcome"))?;
    host.unsubscribe();

    outcome.log_err("Publishing failed").map_err(anyhow::Error::from)
}

#[tokio::main]
async fn main() -> Result<()> {
    let monitoring_config = MonitoringConfig {
        service_name: "conduit-walkthrough".to_string(),
        ..MonitoringConfig::load()
    };
    init_logging(&monitoring_config).context("Failed to initialize logging")?;

    let config = load_flow_config().context("Failed to load configuration")?;
    let provider = InMemoryStoreProvider::new();

    let saved = walkthrough(config, &provider).await?;
    let deployments = provider.deployer().deployments().await;
    info!(deployments = deployments.len(), "Walkthrough finished");

    println!(
        "{}",
        serde_json::to_string_pretty(&saved).context("Failed to serialize integration")?
    );
    Ok(())
}
