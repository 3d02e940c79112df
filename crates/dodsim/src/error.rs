//! # Driver Error Types

use std::path::PathBuf;

use dodsim_core::SimError;
use thiserror::Error;

/// Errors that can stop a run.
#[derive(Error, Debug)]
pub enum DriverError {
    /// The simulation rejected its configuration or a frame.
    #[error(transparent)]
    Sim(#[from] SimError),

    /// The config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    ReadConfig {
        /// The file that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`crate::DriverConfig`].
    #[error("failed to parse config: {0}")]
    ParseConfig(#[from] toml::de::Error),

    /// The scene renders more sprites than the render buffer holds.
    #[error("scene renders {required} sprites but the render buffer holds {capacity}")]
    SpriteCapacity {
        /// Renderable entities in the scene.
        required: usize,
        /// Configured buffer capacity.
        capacity: usize,
    },
}

/// Result type for driver operations.
pub type DriverResult<T> = Result<T, DriverError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sim_errors_pass_through() {
        let err = DriverError::from(SimError::NotInitialized);
        assert_eq!(err.to_string(), SimError::NotInitialized.to_string());
    }

    #[test]
    fn test_capacity_message() {
        let err = DriverError::SpriteCapacity {
            required: 12,
            capacity: 10,
        };
        let msg = err.to_string();
        assert!(msg.contains("12") && msg.contains("10"));
    }
}
