use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use conduit_core::{CoreError, Integration, IntegrationDeployer, IntegrationRepository};

/// In-memory implementation of the IntegrationRepository
pub struct InMemoryIntegrationRepository {
    integrations: Arc<RwLock<HashMap<String, Integration>>>,
}

impl InMemoryIntegrationRepository {
    /// Create a new repository over shared storage
    pub fn new(integrations: Arc<RwLock<HashMap<String, Integration>>>) -> Self {
        Self { integrations }
    }

    /// Stored copy of an integration
    pub async fn find_by_id(&self, id: &str) -> Option<Integration> {
        self.integrations.read().await.get(id).cloned()
    }

    /// All stored integrations, ordered by id
    pub async fn list(&self) -> Vec<Integration> {
        let integrations = self.integrations.read().await;
        let mut all: Vec<Integration> = integrations.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }

    /// Number of stored integrations
    pub async fn len(&self) -> usize {
        self.integrations.read().await.len()
    }

    /// True when nothing has been stored yet
    pub async fn is_empty(&self) -> bool {
        self.integrations.read().await.is_empty()
    }
}

impl Default for InMemoryIntegrationRepository {
    fn default() -> Self {
        Self::new(Arc::new(RwLock::new(HashMap::new())))
    }
}

#[async_trait]
impl IntegrationRepository for InMemoryIntegrationRepository {
    async fn update_or_create(&self, mut integration: Integration) -> Result<Integration, CoreError> {
        let id = match &integration.id {
            Some(id) if id.is_empty() => {
                return Err(CoreError::PersistenceError(
                    "Integration id must not be empty".to_string(),
                ))
            }
            Some(id) => id.clone(),
            None => {
                let id = Uuid::new_v4().to_string();
                integration.id = Some(id.clone());
                debug!(integration_id = %id, "Creating integration");
                id
            }
        };

        let mut integrations = self.integrations.write().await;
        if integrations.insert(id.clone(), integration.clone()).is_some() {
            debug!(integration_id = %id, "Updated integration");
        }
        Ok(integration)
    }
}

/// One recorded deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    /// Deployed integration
    pub integration_id: String,
    /// Deployment counter for that integration, starting at 1
    pub version: u32,
}

/// In-memory implementation of the IntegrationDeployer
///
/// Only integrations present in the shared storage can be deployed.
pub struct InMemoryDeployer {
    integrations: Arc<RwLock<HashMap<String, Integration>>>,
    deployments: Arc<RwLock<Vec<Deployment>>>,
}

impl InMemoryDeployer {
    /// Create a new deployer over shared storage
    pub fn new(
        integrations: Arc<RwLock<HashMap<String, Integration>>>,
        deployments: Arc<RwLock<Vec<Deployment>>>,
    ) -> Self {
        Self {
            integrations,
            deployments,
        }
    }

    /// Deployments recorded so far, oldest first
    pub async fn deployments(&self) -> Vec<Deployment> {
        self.deployments.read().await.clone()
    }
}

#[async_trait]
impl IntegrationDeployer for InMemoryDeployer {
    async fn deploy(&self, integration: &Integration) -> Result<(), CoreError> {
        let id = integration.id.clone().ok_or_else(|| {
            CoreError::DeploymentError("Cannot deploy an unsaved integration".to_string())
        })?;

        if !self.integrations.read().await.contains_key(&id) {
            warn!(integration_id = %id, "Deploy requested for unknown integration");
            return Err(CoreError::DeploymentError(format!(
                "Integration not found: {}",
                id
            )));
        }

        let mut deployments = self.deployments.write().await;
        let version = deployments
            .iter()
            .filter(|d| d.integration_id == id)
            .count() as u32
            + 1;
        deployments.push(Deployment {
            integration_id: id.clone(),
            version,
        });
        debug!(integration_id = %id, version, "Integration deployed");
        Ok(())
    }
}
