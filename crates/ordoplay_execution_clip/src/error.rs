// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types for clip authoring and execution.

use std::path::PathBuf;

/// Error raised while authoring or executing a clip
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClipError {
    /// The clip ends before it starts
    #[error("Invalid clip range: end {end} is before start {start}")]
    InvalidRange {
        /// Start time of the offending range
        start: f64,
        /// End time of the offending range
        end: f64,
    },

    /// Path-based movement without a configured curve
    #[error("Movement requires a path but none is configured")]
    MissingPath,

    /// Effect type tag not present in the registry
    #[error("Unknown effect type: {0}")]
    UnknownEffectType(String),

    /// Clip extends past the end of its execution
    #[error("Clip '{clip}' ends at {end}, after execution end {total_time}")]
    ClipOutOfBounds {
        /// Clip name
        clip: String,
        /// Clip end time
        end: f64,
        /// Execution total time
        total_time: f64,
    },

    /// Spawn target name not found in the execution lookup
    #[error("Unresolved spawn reference: {0}")]
    UnresolvedSpawnReference(String),
}

/// Error when loading clip settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// Failed to read the settings file
    #[error("Failed to read settings file {path:?}: {source}")]
    Io {
        /// Path that was read
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Settings file is not valid RON
    #[error("Failed to parse settings: {0}")]
    Ron(#[from] ron::error::SpannedError),

    /// Failed to serialize settings
    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] ron::Error),
}
