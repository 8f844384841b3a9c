//! Engine configuration, loaded once at startup.
//!
//! ```toml
//! collision_workers = 4      # omit to use hardware concurrency (min 2)
//! draw_colliders = false
//! max_delta_ms = 100
//! input_queue_capacity = 256
//! target_fps = 60
//! ```

use std::path::Path;
use std::time::Duration;

use nebula_shared::constants::{DEFAULT_MAX_DELTA_MS, DEFAULT_TARGET_FPS};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Default input queue capacity.
pub const DEFAULT_INPUT_QUEUE_CAPACITY: usize = 256;

/// Configuration for a [`Simulation`](crate::Simulation).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Collision worker count. `None` sizes the pool from the hardware.
    pub collision_workers: Option<usize>,
    /// Draw collider outlines along with sprites.
    pub draw_colliders: bool,
    /// Longest step one tick may simulate, in milliseconds.
    pub max_delta_ms: u64,
    /// Input events that may be queued between ticks before producers drop them.
    pub input_queue_capacity: usize,
    /// Frame rate used to flag slow ticks.
    pub target_fps: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            collision_workers: None,
            draw_colliders: false,
            max_delta_ms: DEFAULT_MAX_DELTA_MS,
            input_queue_capacity: DEFAULT_INPUT_QUEUE_CAPACITY,
            target_fps: DEFAULT_TARGET_FPS,
        }
    }
}

impl EngineConfig {
    /// Parses and validates a TOML document. Missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed TOML, unknown fields or invalid values.
    pub fn from_toml_str(source: &str) -> EngineResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or its content is invalid.
    pub fn load(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| EngineError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&source)?;
        tracing::info!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> EngineResult<()> {
        let invalid = |field, reason| Err(EngineError::InvalidConfig { field, reason });

        if self.collision_workers == Some(0) {
            return invalid("collision_workers", "must be at least 1");
        }
        if self.max_delta_ms == 0 {
            return invalid("max_delta_ms", "must be positive");
        }
        if self.input_queue_capacity == 0 {
            return invalid("input_queue_capacity", "must be positive");
        }
        if self.target_fps == 0 {
            return invalid("target_fps", "must be positive");
        }
        Ok(())
    }

    /// Per-tick delta clamp.
    #[must_use]
    pub const fn max_delta(&self) -> Duration {
        Duration::from_millis(self.max_delta_ms)
    }

    /// Wall-clock budget of one tick at the target frame rate.
    #[must_use]
    pub fn frame_budget(&self) -> Duration {
        Duration::from_secs(1) / self.target_fps.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(EngineConfig::from_toml_str("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_partial_document() {
        let config = EngineConfig::from_toml_str("collision_workers = 3\ndraw_colliders = true").unwrap();
        assert_eq!(config.collision_workers, Some(3));
        assert!(config.draw_colliders);
        assert_eq!(config.max_delta(), Duration::from_millis(100));
    }

    #[test]
    fn test_rejects_zero_workers() {
        let err = EngineConfig::from_toml_str("collision_workers = 0").unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidConfig { field: "collision_workers", .. }
        ));
    }

    #[test]
    fn test_rejects_unknown_fields() {
        let err = EngineConfig::from_toml_str("colision_workers = 2").unwrap_err();
        assert!(matches!(err, EngineError::ConfigParse(_)));
    }

    #[test]
    fn test_frame_budget() {
        let config = EngineConfig {
            target_fps: 50,
            ..EngineConfig::default()
        };
        assert_eq!(config.frame_budget(), Duration::from_millis(20));
    }

    #[test]
    fn test_load_missing_file() {
        let err = EngineConfig::load("/nonexistent/nebula.toml").unwrap_err();
        assert!(matches!(err, EngineError::ConfigIo { .. }));
    }
}
