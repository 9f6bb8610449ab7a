//! Collaborator interfaces for the flow core
//!
//! The core never talks to the REST backend itself. Persistence and
//! deployment are reached through the traits below; connection records are
//! handed in, already fetched, through a [`ConnectionCatalog`].

use async_trait::async_trait;
use std::collections::HashMap;

use super::integration::{Connection, Integration};
use crate::CoreError;

/// Persistence collaborator for integration documents
#[async_trait]
pub trait IntegrationRepository: Send + Sync {
    /// Create the document when it has no id, update it otherwise.
    /// Returns the document as stored.
    async fn update_or_create(&self, integration: Integration) -> Result<Integration, CoreError>;
}

/// Deploy collaborator, used when a save asks for publication
#[async_trait]
pub trait IntegrationDeployer: Send + Sync {
    /// Deploy a saved integration
    async fn deploy(&self, integration: &Integration) -> Result<(), CoreError>;
}

/// Read-only lookup of connection records by id
#[derive(Debug, Clone, Default)]
pub struct ConnectionCatalog {
    connections: HashMap<String, Connection>,
    order: Vec<String>,
}

impl ConnectionCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a connection
    pub fn insert(&mut self, connection: Connection) {
        if !self.connections.contains_key(&connection.id) {
            self.order.push(connection.id.clone());
        }
        self.connections.insert(connection.id.clone(), connection);
    }

    /// Look up a connection by id
    pub fn get(&self, id: &str) -> Option<&Connection> {
        self.connections.get(id)
    }

    /// All connections, in insertion order
    pub fn connections(&self) -> Vec<Connection> {
        self.order
            .iter()
            .filter_map(|id| self.connections.get(id).cloned())
            .collect()
    }

    /// Number of connections
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// True when the catalog holds no connections
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

impl FromIterator<Connection> for ConnectionCatalog {
    fn from_iter<I: IntoIterator<Item = Connection>>(iter: I) -> Self {
        let mut catalog = ConnectionCatalog::new();
        for connection in iter {
            catalog.insert(connection);
        }
        catalog
    }
}
