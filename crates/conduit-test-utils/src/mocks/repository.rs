//! Mocks of IntegrationRepository and IntegrationDeployer.

use async_trait::async_trait;
use conduit_core::{CoreError, Integration, IntegrationDeployer, IntegrationRepository};
use mockall::mock;

mock! {
    pub IntegrationRepository {}

    #[async_trait]
    impl IntegrationRepository for IntegrationRepository {
        async fn update_or_create(&self, integration: Integration) -> Result<Integration, CoreError>;
    }
}

mock! {
    pub IntegrationDeployer {}

    #[async_trait]
    impl IntegrationDeployer for IntegrationDeployer {
        async fn deploy(&self, integration: &Integration) -> Result<(), CoreError>;
    }
}

/// Creates a repository mock that stores nothing and echoes the document
/// back, assigning a generated id when it has none.
pub fn create_mock_repository() -> MockIntegrationRepository {
    let mut mock = MockIntegrationRepository::new();
    mock.expect_update_or_create().returning(|mut integration| {
        if integration.id.is_none() {
            integration.id = Some(format!("integration-{}", uuid::Uuid::new_v4()));
        }
        Ok(integration)
    });
    mock
}

/// Creates a repository mock that rejects every save with `reason`
pub fn create_rejecting_mock_repository(reason: CoreError) -> MockIntegrationRepository {
    let mut mock = MockIntegrationRepository::new();
    mock.expect_update_or_create()
        .returning(move |_| Err(reason.clone()));
    mock
}

/// Creates a deployer mock that accepts every deployment
pub fn create_mock_deployer() -> MockIntegrationDeployer {
    let mut mock = MockIntegrationDeployer::new();
    mock.expect_deploy().returning(|_| Ok(()));
    mock
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_repository_default_behavior() {
        let mock = create_mock_repository();

        let saved = mock
            .update_or_create(Integration::named("x"))
            .await
            .unwrap();
        assert!(saved.id.unwrap().starts_with("integration-"));

        let existing = Integration {
            id: Some("keep".to_string()),
            ..Integration::default()
        };
        let saved = mock.update_or_create(existing).await.unwrap();
        assert_eq!(saved.id.as_deref(), Some("keep"));
    }

    #[tokio::test]
    async fn test_rejecting_mock_repository() {
        let mock = create_rejecting_mock_repository(CoreError::PersistenceError("503".to_string()));
        let err = mock.update_or_create(Integration::default()).await.unwrap_err();
        assert_eq!(err, CoreError::PersistenceError("503".to_string()));
    }

    #[tokio::test]
    async fn test_mock_deployer_custom_behavior() {
        let mut mock = MockIntegrationDeployer::new();
        mock.expect_deploy()
            .withf(|integration| integration.id.as_deref() == Some("i-1"))
            .times(1)
            .returning(|_| Err(CoreError::DeploymentError("quota".to_string())));

        let integration = Integration {
            id: Some("i-1".to_string()),
            ..Integration::default()
        };
        assert!(mock.deploy(&integration).await.is_err());
    }
}
