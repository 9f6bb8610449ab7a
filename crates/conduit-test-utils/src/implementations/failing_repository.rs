//! Repository that rejects saves with a configured error.

use async_trait::async_trait;
use conduit_core::{CoreError, Integration, IntegrationRepository};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Rejects the first `failures` saves, then accepts and echoes the document
#[derive(Debug)]
pub struct FailingRepository {
    reason: CoreError,
    remaining_failures: AtomicUsize,
    received: Mutex<Vec<Integration>>,
}

impl FailingRepository {
    /// Rejects every save with `reason`
    pub fn always(reason: CoreError) -> Self {
        Self::times(reason, usize::MAX)
    }

    /// Rejects the first `failures` saves with `reason`
    pub fn times(reason: CoreError, failures: usize) -> Self {
        Self {
            reason,
            remaining_failures: AtomicUsize::new(failures),
            received: Mutex::new(Vec::new()),
        }
    }

    /// Documents passed to `update_or_create`, in call order
    pub fn received(&self) -> Vec<Integration> {
        self.received.lock().clone()
    }

    /// Number of save attempts
    pub fn calls(&self) -> usize {
        self.received.lock().len()
    }
}

#[async_trait]
impl IntegrationRepository for FailingRepository {
    async fn update_or_create(&self, integration: Integration) -> Result<Integration, CoreError> {
        self.received.lock().push(integration.clone());

        let failing = self
            .remaining_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(self.reason.clone());
        }

        let mut saved = integration;
        saved.id.get_or_insert_with(|| "recovered".to_string());
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fails_then_recovers() {
        let repository = FailingRepository::times(CoreError::PersistenceError("503".to_string()), 1);

        let first = repository.update_or_create(Integration::named("x")).await;
        assert_eq!(first, Err(CoreError::PersistenceError("503".to_string())));

        let second = repository.update_or_create(Integration::named("x")).await;
        assert_eq!(second.map(|i| i.id), Ok(Some("recovered".to_string())));
        assert_eq!(repository.calls(), 2);
    }
}
