//! RAII lock guard implementation.

use tokio::sync::OwnedSemaphorePermit;

/// Proof of exclusive access to one named resource.
///
/// When dropped, the resource is released. Releasing more than once is a
/// no-op, so the underlying semaphore never gains a second permit.
#[derive(Debug)]
pub struct LockGuard {
    /// Name of the locked resource.
    resource: String,

    /// Present until the first release.
    permit: Option<OwnedSemaphorePermit>,
}

impl LockGuard {
    pub(super) fn new(resource: String, permit: OwnedSemaphorePermit) -> Self {
        Self {
            resource,
            permit: Some(permit),
        }
    }

    /// Get the name of the locked resource.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Release the resource now instead of at drop.
    ///
    /// Returns `true` only for the call that actually released it.
    pub fn release(&mut self) -> bool {
        self.permit.take().is_some()
    }

    pub fn is_released(&self) -> bool {
        self.permit.is_none()
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        self.release();
    }
}
