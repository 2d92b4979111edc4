//! Datastream: a concurrent streaming persistence engine.
//!
//! The engine writes three CSV resources (customers, invoices, loans) in a
//! one-time bootstrap, then appends small batches to them on a fixed period.
//!
//! - [`locks`] hands out one exclusive lock per named resource.
//! - [`store`] writes records under those locks, replacing files atomically.
//! - [`logging`] queues log entries and flushes them to a daily file.
//! - [`stream`] drives the bootstrap and streaming phases.

pub mod config;
pub mod domain;
pub mod error;
pub mod exit_codes;
pub mod fs;
pub mod locks;
pub mod logging;
pub mod store;
pub mod stream;
