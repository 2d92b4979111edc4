//! Config loading, validation, and persistence.

use super::model::StreamConfig;
use crate::error::{Result, StreamError};
use crate::fs::atomic_write_file;
use std::path::Path;

impl StreamConfig {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    ///
    /// # Returns
    ///
    /// * `Ok(StreamConfig)` - Successfully loaded and validated config
    /// * `Err(StreamError::Config)` - Read error, parse error, or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            StreamError::Config(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // serde_yaml rejects an empty document for a struct; treat it as "all defaults".
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: StreamConfig = serde_yaml::from_str(yaml)
            .map_err(|e| StreamError::Config(format!("failed to parse config YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| StreamError::Config(format!("failed to serialize config to YAML: {}", e)))
    }

    /// Write this config to `path` through an atomic replace.
    pub async fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = self.to_yaml()?;
        let path = path.as_ref();
        atomic_write_file(path, &yaml)
            .await
            .map_err(|e| StreamError::Io(format!("failed to write '{}': {}", path.display(), e)))
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - `refresh_interval_ms` must be at least 100
    /// - `total_customers` must be at least 1 (invoices and loans reference customers)
    /// - `lock_timeout_ms` must be at least 500
    /// - batch, flush, and queue sizes must be positive
    /// - directories must be non-empty
    pub fn validate(&self) -> Result<()> {
        if self.refresh_interval_ms < 100 {
            return Err(invalid("refresh_interval_ms must be >= 100"));
        }

        if self.total_customers < 1 {
            return Err(invalid("total_customers must be >= 1"));
        }

        if self.lock_timeout_ms < 500 {
            return Err(invalid("lock_timeout_ms must be >= 500"));
        }

        if self.max_entries_per_cycle == 0 {
            return Err(invalid("max_entries_per_cycle must be greater than 0"));
        }

        if self.flush_every_rows == 0 {
            return Err(invalid("flush_every_rows must be greater than 0"));
        }

        if self.log_flush_interval_ms < 10 {
            return Err(invalid("log_flush_interval_ms must be >= 10"));
        }

        if self.log_queue_capacity == 0 {
            return Err(invalid("log_queue_capacity must be greater than 0"));
        }

        if self.output_dir.as_os_str().is_empty() {
            return Err(invalid("output_dir must not be empty"));
        }

        if self.log_dir.as_os_str().is_empty() {
            return Err(invalid("log_dir must not be empty"));
        }

        Ok(())
    }
}

fn invalid(reason: &str) -> StreamError {
    StreamError::Config(format!("config validation failed: {}", reason))
}
