// SPDX-License-Identifier: MIT OR Apache-2.0
//! Clip evaluation settings.
//!
//! Settings are stored as RON alongside the authoring project:
//!
//! ```ron
//! (
//!     strict_effect_registry: false,
//!     path_parametrization: ArcLength,
//!     arc_length_samples: 128,
//! )
//! ```

use crate::error::SettingsError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default arc-length table resolution
pub const DEFAULT_ARC_LENGTH_SAMPLES: usize = 64;

/// Smallest arc-length table resolution
pub const MIN_ARC_LENGTH_SAMPLES: usize = 2;

/// Largest arc-length table resolution
pub const MAX_ARC_LENGTH_SAMPLES: usize = 4096;

/// Conventional settings file name
pub const SETTINGS_FILE_NAME: &str = "clips.ron";

/// How path-fly volumes map normalized time onto their path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PathParametrization {
    /// Uniform in curve parameter; each segment takes equal time
    #[default]
    Uniform,
    /// Uniform in distance travelled
    ArcLength,
}

/// Settings shared by authoring and evaluation hosts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipSettings {
    /// Reject unknown effect tags instead of ignoring them
    pub strict_effect_registry: bool,
    /// Path parametrization for path-fly movement
    pub path_parametrization: PathParametrization,
    /// Arc-length table resolution, clamped to
    /// `MIN_ARC_LENGTH_SAMPLES..=MAX_ARC_LENGTH_SAMPLES` when loaded
    pub arc_length_samples: usize,
}

impl Default for ClipSettings {
    fn default() -> Self {
        Self {
            strict_effect_registry: false,
            path_parametrization: PathParametrization::Uniform,
            arc_length_samples: DEFAULT_ARC_LENGTH_SAMPLES,
        }
    }
}

impl ClipSettings {
    /// Parse settings from a RON string
    pub fn from_ron_str(source: &str) -> Result<Self, SettingsError> {
        let mut settings: Self = ron::from_str(source)?;
        settings.arc_length_samples = clamp_arc_length_samples(settings.arc_length_samples);
        Ok(settings)
    }

    /// Load settings from a RON file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let source = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_ron_str(&source)?;
        tracing::debug!("Loaded clip settings from {:?}", path);
        Ok(settings)
    }

    /// Serialize to pretty RON
    pub fn to_ron_string(&self) -> Result<String, SettingsError> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }
}

/// Clamp an arc-length table resolution into the supported range
pub fn clamp_arc_length_samples(samples: usize) -> usize {
    samples.clamp(MIN_ARC_LENGTH_SAMPLES, MAX_ARC_LENGTH_SAMPLES)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = ClipSettings::default();
        assert!(!settings.strict_effect_registry);
        assert_eq!(settings.path_parametrization, PathParametrization::Uniform);
        assert_eq!(settings.arc_length_samples, DEFAULT_ARC_LENGTH_SAMPLES);
    }

    #[test]
    fn test_serialization() {
        let settings = ClipSettings {
            strict_effect_registry: true,
            path_parametrization: PathParametrization::ArcLength,
            arc_length_samples: 32,
        };
        let ron_str = settings.to_ron_string().unwrap();
        let loaded = ClipSettings::from_ron_str(&ron_str).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let loaded = ClipSettings::from_ron_str("(strict_effect_registry: true)").unwrap();
        assert!(loaded.strict_effect_registry);
        assert_eq!(loaded.arc_length_samples, DEFAULT_ARC_LENGTH_SAMPLES);
    }

    #[test]
    fn test_sample_count_has_floor() {
        let loaded = ClipSettings::from_ron_str("(arc_length_samples: 0)").unwrap();
        assert_eq!(loaded.arc_length_samples, 2);
    }

    #[test]
    fn test_sample_count_has_ceiling() {
        let loaded = ClipSettings::from_ron_str(
            "(path_parametrization: ArcLength, arc_length_samples: 18446744073709551615)",
        )
        .unwrap();
        assert_eq!(loaded.arc_length_samples, MAX_ARC_LENGTH_SAMPLES);
    }

    #[test]
    fn test_invalid_ron() {
        assert!(matches!(
            ClipSettings::from_ron_str("(strict_effect_registry: maybe)"),
            Err(SettingsError::Ron(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let result = ClipSettings::load(Path::new("does/not/exist/clips.ron"));
        assert!(matches!(result, Err(SettingsError::Io { .. })));
    }
}
