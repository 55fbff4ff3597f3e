//! Error types for the split-diff crate.
//!
//! The diff engine itself is total: alignment, refinement, collapsing and expansion never
//! fail. Errors only surface while loading or validating an [`EngineConfig`].
//!
//! [`EngineConfig`]: crate::config::EngineConfig

use thiserror::Error;

#[derive(Error, Debug)]
/// Unified error enumeration for the split-diff library.
pub enum DiffError {
    /// A configuration value is outside its accepted domain.
    #[error("Invalid engine config: {0}")]
    InvalidConfig(String),

    /// I/O error while reading a configuration file.
    #[error("IO Error: {0}")]
    IOError(#[from] std::io::Error),

    /// Malformed JSON configuration.
    #[error("Config parse failed: {0}")]
    ConfigParse(#[from] serde_json::Error),
}
