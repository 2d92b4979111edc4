//! Filesystem utilities for datastream.
//!
//! This module provides the side-file, backup, and publish primitives the
//! record store builds its atomic full replace on.

pub mod atomic;

pub use atomic::{
    PublishMode, atomic_write_file, backup_existing, backup_path, discard, publish, temp_path,
};
