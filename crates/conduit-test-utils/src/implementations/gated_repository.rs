//! Repository whose saves block until the test releases them.

use async_trait::async_trait;
use conduit_core::{CoreError, Integration, IntegrationRepository};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Notify, Semaphore};

/// Holds every save until [`GatedRepository::release`] is called.
///
/// Lets tests observe the store while a save is in flight.
#[derive(Debug)]
pub struct GatedRepository {
    gate: Semaphore,
    entered: Notify,
    calls: AtomicUsize,
}

impl GatedRepository {
    /// Create a closed gate
    pub fn new() -> Self {
        Self {
            gate: Semaphore::new(0),
            entered: Notify::new(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Let `n` pending or future saves complete
    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }

    /// Wait until a save has reached the repository
    pub async fn wait_entered(&self) {
        self.entered.notified().await;
    }

    /// Number of saves that reached the repository
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for GatedRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IntegrationRepository for GatedRepository {
    async fn update_or_create(&self, mut integration: Integration) -> Result<Integration, CoreError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.entered.notify_one();

        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|e| CoreError::PersistenceError(e.to_string()))?;
        permit.forget();

        integration
            .id
            .get_or_insert_with(|| format!("gated-{}", call));
        Ok(integration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_save_waits_for_release() {
        let repository = Arc::new(GatedRepository::new());
        let task = {
            let repository = Arc::clone(&repository);
            tokio::spawn(async move { repository.update_or_create(Integration::named("x")).await })
        };

        repository.wait_entered().await;
        assert_eq!(repository.calls(), 1);
        assert!(!task.is_finished());

        repository.release(1);
        let saved = task.await.unwrap().unwrap();
        assert_eq!(saved.id.as_deref(), Some("gated-1"));
    }
}
