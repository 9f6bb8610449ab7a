//! In-memory collaborators for the Conduit flow core
//!
//! This crate provides in-memory implementations of the persistence and
//! deploy interfaces defined in the conduit-core crate. It is primarily
//! useful for development, testing and the walkthrough binary, where no
//! REST backend is available.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use conduit_core::{Integration, IntegrationDeployer, IntegrationRepository};

pub mod repositories;
pub use repositories::{Deployment, InMemoryDeployer, InMemoryIntegrationRepository};

/// Provider for in-memory collaborators sharing one backing store
pub struct InMemoryStoreProvider {
    integrations: Arc<RwLock<HashMap<String, Integration>>>,
    deployments: Arc<RwLock<Vec<Deployment>>>,
}

impl InMemoryStoreProvider {
    /// Create a provider with empty storage
    pub fn new() -> Self {
        Self {
            integrations: Arc::new(RwLock::new(HashMap::new())),
            deployments: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Create collaborators for use with `CurrentFlow`
    pub fn create_collaborators(
        &self,
    ) -> (Arc<dyn IntegrationRepository>, Arc<dyn IntegrationDeployer>) {
        let repository = Arc::new(self.repository());
        let deployer = Arc::new(self.deployer());
        (repository, deployer)
    }

    /// Concrete repository over the shared storage
    pub fn repository(&self) -> InMemoryIntegrationRepository {
        InMemoryIntegrationRepository::new(self.integrations.clone())
    }

    /// Concrete deployer over the shared storage
    pub fn deployer(&self) -> InMemoryDeployer {
        InMemoryDeployer::new(self.integrations.clone(), self.deployments.clone())
    }
}

impl Default for InMemoryStoreProvider {
    fn default() -> Self {
        Self::new()
    }
}
