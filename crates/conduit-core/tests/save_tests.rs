use std::sync::Arc;
use std::time::Duration;

use conduit_core::{
    CoreError, CurrentFlow, FlowConfig, FlowEvent, Integration, IntegrationRepository,
    SaveRequest, StepKind,
};
use conduit_state_inmemory::InMemoryStoreProvider;
use conduit_test_utils::data_generators::{log_connection, timer_connection, timer_to_log};
use conduit_test_utils::mocks::{create_mock_deployer, MockIntegrationDeployer, MockIntegrationRepository};
use conduit_test_utils::{FailingRepository, GatedRepository, IntegrationBuilder, StepBuilder};
use pretty_assertions::assert_eq;
use tokio::sync::mpsc;
use tokio::time::timeout;

type Outcome = Result<Integration, CoreError>;

/// Save request whose callbacks forward the outcome to a channel
fn save_request(publish: bool) -> (SaveRequest, mpsc::UnboundedReceiver<Outcome>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let on_error = tx.clone();
    let mut request = SaveRequest::default()
        .on_saved(move |saved| {
            let _ = tx.send(Ok(saved));
        })
        .on_error(move |err| {
            let _ = on_error.send(Err(err));
        });
    if publish {
        request = request.publish();
    }
    (request, rx)
}

async fn next_outcome(rx: &mut mpsc::UnboundedReceiver<Outcome>) -> Outcome {
    timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("save outcome within timeout")
        .expect("callback channel open")
}

#[tokio::test]
async fn test_save_failure_leaves_document_unchanged() {
    let reason = CoreError::PersistenceError("503 Service Unavailable".to_string());
    let repository = Arc::new(FailingRepository::always(reason.clone()));
    let flow = CurrentFlow::new(repository.clone());
    flow.set_integration(
        IntegrationBuilder::new()
            .name("draft")
            .endpoint(timer_connection())
            .build(),
    );
    let before = flow.get_integration();

    let (request, mut rx) = save_request(false);
    flow.emit(FlowEvent::save(request));

    assert_eq!(next_outcome(&mut rx).await, Err(reason));
    assert_eq!(flow.get_integration(), before);
    assert!(!flow.is_saving());

    // The copy sent to persistence carried the save-time enrichment, the live document did not
    let sent = repository.received();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].steps.iter().all(|s| s.id.is_some()));
    assert_eq!(sent[0].tags, vec!["timer"]);
}

#[tokio::test]
async fn test_save_success_adopts_id_and_calls_action() {
    let mut repository = MockIntegrationRepository::new();
    repository
        .expect_update_or_create()
        .withf(|integration| {
            integration.id.is_none()
                && integration.tags == vec!["timer".to_string(), "log".to_string()]
                && integration.steps.iter().all(|s| s.id.is_some())
        })
        .times(1)
        .returning(|mut integration| {
            integration.id = Some("i-42".to_string());
            Ok(integration)
        });

    let flow = CurrentFlow::new(Arc::new(repository));
    flow.set_integration(timer_to_log());

    let (request, mut rx) = save_request(false);
    flow.emit(FlowEvent::save(request));

    let saved = next_outcome(&mut rx).await.expect("save succeeds");
    assert_eq!(saved.id.as_deref(), Some("i-42"));
    assert_eq!(
        flow.get_integration().and_then(|i| i.id),
        Some("i-42".to_string())
    );
    // Save-time tags stay on the saved copy
    assert!(flow.get_integration().map_or(false, |i| i.tags.is_empty()));
}

#[tokio::test]
async fn test_save_keeps_existing_id() {
    let provider = InMemoryStoreProvider::new();
    let (repository, _) = provider.create_collaborators();
    let stored = repository
        .update_or_create(Integration::named("existing"))
        .await
        .expect("seed");

    let flow = CurrentFlow::new(repository);
    flow.set_integration(stored.clone());
    flow.emit(FlowEvent::set_name("renamed"));

    let (request, mut rx) = save_request(false);
    flow.emit(FlowEvent::save(request));

    let saved = next_outcome(&mut rx).await.expect("save succeeds");
    assert_eq!(saved.id, stored.id);
    assert_eq!(saved.name.as_deref(), Some("renamed"));
    assert_eq!(provider.repository().len().await, 1);
}

#[tokio::test]
async fn test_publish_deploys_saved_integration() {
    let provider = InMemoryStoreProvider::new();
    let (repository, deployer) = provider.create_collaborators();
    let flow = CurrentFlow::builder(repository).deployer(deployer).build();
    flow.set_integration(timer_to_log());

    let (request, mut rx) = save_request(true);
    flow.emit(FlowEvent::save(request));

    let saved = next_outcome(&mut rx).await.expect("publish succeeds");
    let deployments = provider.deployer().deployments().await;
    assert_eq!(deployments.len(), 1);
    assert_eq!(Some(deployments[0].integration_id.clone()), saved.id);
}

#[tokio::test]
async fn test_deploy_failure_reports_error() {
    let mut deployer = MockIntegrationDeployer::new();
    deployer
        .expect_deploy()
        .times(1)
        .returning(|_| Err(CoreError::DeploymentError("quota exceeded".to_string())));

    let provider = InMemoryStoreProvider::new();
    let (repository, _) = provider.create_collaborators();
    let flow = CurrentFlow::builder(repository)
        .deployer(Arc::new(deployer))
        .build();
    flow.set_integration(timer_to_log());

    let (request, mut rx) = save_request(true);
    flow.emit(FlowEvent::save(request));

    assert_eq!(
        next_outcome(&mut rx).await,
        Err(CoreError::DeploymentError("quota exceeded".to_string()))
    );
    // The save itself went through
    assert_eq!(provider.repository().len().await, 1);
    assert!(!flow.is_saving());
}

#[tokio::test]
async fn test_publish_without_deployer_fails() {
    let flow = CurrentFlow::new(Arc::new(
        conduit_test_utils::mocks::create_mock_repository(),
    ));
    flow.set_integration(timer_to_log());

    let (request, mut rx) = save_request(true);
    flow.emit(FlowEvent::save(request));

    assert!(matches!(
        next_outcome(&mut rx).await,
        Err(CoreError::DeploymentError(_))
    ));
}

#[tokio::test]
async fn test_concurrent_save_is_rejected() {
    let repository = Arc::new(GatedRepository::new());
    let flow = CurrentFlow::new(repository.clone());
    flow.set_integration(timer_to_log());

    let (first, mut first_rx) = save_request(false);
    flow.emit(FlowEvent::save(first));
    repository.wait_entered().await;
    assert!(flow.is_saving());

    let (second, mut second_rx) = save_request(false);
    flow.emit(FlowEvent::save(second));
    assert_eq!(next_outcome(&mut second_rx).await, Err(CoreError::SaveInProgress));

    repository.release(1);
    assert!(next_outcome(&mut first_rx).await.is_ok());
    assert_eq!(repository.calls(), 1);
    assert!(!flow.is_saving());

    // A new save is accepted once the first has settled
    let (third, mut third_rx) = save_request(false);
    flow.emit(FlowEvent::save(third));
    repository.release(1);
    assert!(next_outcome(&mut third_rx).await.is_ok());
    assert_eq!(repository.calls(), 2);
}

#[tokio::test]
async fn test_concurrent_saves_allowed_when_unguarded() {
    let repository = Arc::new(GatedRepository::new());
    let flow = CurrentFlow::builder(repository.clone())
        .config(FlowConfig {
            guard_concurrent_saves: false,
            ..FlowConfig::default()
        })
        .build();
    flow.set_integration(timer_to_log());

    let (first, mut first_rx) = save_request(false);
    let (second, mut second_rx) = save_request(false);
    flow.emit(FlowEvent::save(first));
    flow.emit(FlowEvent::save(second));

    repository.release(2);
    assert!(next_outcome(&mut first_rx).await.is_ok());
    assert!(next_outcome(&mut second_rx).await.is_ok());
    assert_eq!(repository.calls(), 2);
}

#[tokio::test]
async fn test_save_without_document_fails() {
    let flow = CurrentFlow::new(Arc::new(
        conduit_test_utils::mocks::create_rejecting_mock_repository(CoreError::Other(
            "unreachable".to_string(),
        )),
    ));

    let (request, mut rx) = save_request(false);
    flow.emit(FlowEvent::save(request));

    assert!(matches!(
        next_outcome(&mut rx).await,
        Err(CoreError::ValidationError(_))
    ));
}

#[tokio::test]
async fn test_save_enrichment_can_be_disabled() {
    let mut repository = MockIntegrationRepository::new();
    repository
        .expect_update_or_create()
        .withf(|integration| {
            integration.tags.is_empty() && integration.steps.iter().all(|s| s.id.is_none())
        })
        .times(1)
        .returning(Ok);

    let flow = CurrentFlow::builder(Arc::new(repository))
        .deployer(Arc::new(create_mock_deployer()))
        .config(FlowConfig {
            assign_step_ids_on_save: false,
            tag_connectors_on_save: false,
            ..FlowConfig::default()
        })
        .build();
    flow.set_integration(
        IntegrationBuilder::new()
            .endpoint(log_connection())
            .step(StepBuilder::processing(StepKind::Log).configured().build())
            .build(),
    );

    let (request, mut rx) = save_request(false);
    flow.emit(FlowEvent::save(request));
    assert!(next_outcome(&mut rx).await.is_ok());
}

#[tokio::test]
async fn test_is_saving_until_every_unguarded_save_settles() {
    let repository = Arc::new(GatedRepository::new());
    let flow = CurrentFlow::builder(repository.clone())
        .config(FlowConfig {
            guard_concurrent_saves: false,
            ..FlowConfig::default()
        })
        .build();
    flow.set_integration(timer_to_log());

    // Both saves report to the same channel; completion order is up to the gate
    let (tx, mut rx) = mpsc::unbounded_channel::<Outcome>();
    for _ in 0..2 {
        let (saved_tx, error_tx) = (tx.clone(), tx.clone());
        flow.emit(FlowEvent::save(
            SaveRequest::default()
                .on_saved(move |saved| {
                    let _ = saved_tx.send(Ok(saved));
                })
                .on_error(move |err| {
                    let _ = error_tx.send(Err(err));
                }),
        ));
    }

    timeout(Duration::from_secs(5), async {
        while repository.calls() < 2 {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("both saves reach the repository");

    repository.release(1);
    assert!(next_outcome(&mut rx).await.is_ok());
    assert!(flow.is_saving());

    repository.release(1);
    assert!(next_outcome(&mut rx).await.is_ok());
    assert!(!flow.is_saving());
}
