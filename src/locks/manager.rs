//! Lock manager: named, timeout-bounded, cancellable mutual exclusion.

use super::guard::LockGuard;
use crate::error::{Result, StreamError};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Default)]
struct LockTable {
    semaphores: HashMap<String, Arc<Semaphore>>,
    closed: bool,
}

/// Grants exclusive access to named resources.
///
/// The table mutex is held only for the get-or-create lookup, never across an
/// await, so waiting on one resource does not stall lookups for another.
#[derive(Debug)]
pub struct LockManager {
    table: Mutex<LockTable>,
    default_timeout: Duration,
}

impl LockManager {
    pub fn new(default_timeout: Duration) -> Self {
        Self {
            table: Mutex::new(LockTable::default()),
            default_timeout,
        }
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Acquire `resource` with the manager's default timeout.
    pub async fn acquire(&self, resource: &str, cancel: &CancellationToken) -> Result<LockGuard> {
        self.acquire_with_timeout(resource, self.default_timeout, cancel)
            .await
    }

    /// Acquire `resource`, waiting at most `timeout`.
    ///
    /// # Returns
    ///
    /// * `Ok(LockGuard)` - The caller now holds the resource
    /// * `Err(StreamError::LockTimeout)` - Still busy after `timeout`
    /// * `Err(StreamError::Cancelled)` - `cancel` fired first
    /// * `Err(StreamError::Closed)` - The manager was closed before or during the wait
    pub async fn acquire_with_timeout(
        &self,
        resource: &str,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<LockGuard> {
        let semaphore = self.semaphore(resource)?;

        if cancel.is_cancelled() {
            return Err(StreamError::Cancelled);
        }

        let permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(StreamError::Cancelled),
            acquired = tokio::time::timeout(timeout, semaphore.acquire_owned()) => match acquired {
                Ok(Ok(permit)) => permit,
                Ok(Err(_)) => return Err(StreamError::Closed(resource.to_string())),
                Err(_) => {
                    return Err(StreamError::LockTimeout {
                        resource: resource.to_string(),
                        timeout,
                    });
                }
            },
        };

        Ok(LockGuard::new(resource.to_string(), permit))
    }

    /// Get or atomically create the semaphore for `resource`.
    fn semaphore(&self, resource: &str) -> Result<Arc<Semaphore>> {
        let mut table = self.table.lock();
        if table.closed {
            return Err(StreamError::Closed(resource.to_string()));
        }

        let semaphore = table
            .semaphores
            .entry(resource.to_string())
            .or_insert_with(|| Arc::new(Semaphore::new(1)));
        Ok(Arc::clone(semaphore))
    }

    /// Tear down every semaphore and refuse further acquisitions.
    ///
    /// Pending waiters fail with `StreamError::Closed`. Guards still held stay
    /// valid until dropped.
    pub fn close(&self) {
        let mut table = self.table.lock();
        table.closed = true;
        for (_, semaphore) in table.semaphores.drain() {
            semaphore.close();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.table.lock().closed
    }

    /// Number of resources that have been requested at least once.
    pub fn resource_count(&self) -> usize {
        self.table.lock().semaphores.len()
    }

    /// Permits currently free for `resource`; `None` if it was never requested.
    pub fn available_permits(&self, resource: &str) -> Option<usize> {
        self.table
            .lock()
            .semaphores
            .get(resource)
            .map(|s| s.available_permits())
    }
}

impl Drop for LockManager {
    fn drop(&mut self) {
        self.close();
    }
}
