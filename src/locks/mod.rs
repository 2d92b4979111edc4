//! Per-resource locking for datastream.
//!
//! Every named resource (in practice one output file) gets its own binary
//! semaphore, created lazily on first request and kept for the lifetime of the
//! manager. Locking one resource never blocks another.
//!
//! # Acquisition
//!
//! `acquire` waits until the resource is free, the timeout elapses, or the
//! caller's cancellation token fires, whichever comes first. The three
//! outcomes are distinct: a guard, `StreamError::LockTimeout`, or
//! `StreamError::Cancelled`.
//!
//! # RAII Guards
//!
//! Access is proven by a `LockGuard`. Dropping it frees the resource for the
//! next waiter; releasing it explicitly first is allowed and idempotent.

mod guard;
mod manager;


// Re-export public API
pub use guard::LockGuard;
pub use manager::LockManager;
