//! Runtime configuration for every tunable of the crate.
//!
//! All sections default field by field, so a partial JSON document such as
//! `{"track": {"corner_subdivisions": 5}}` is a complete configuration.

use serde::{Deserialize, Serialize};

use crate::spawn::{SpawnGridError, SpawnGridOptions};
use crate::track::{SurfaceFitError, SurfaceFitOptions, TouchSpawnerOptions, TrackError, TrackOptions};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackConfig {
    pub fit: SurfaceFitOptions,
    pub track: TrackOptions,
    pub spawner: TouchSpawnerOptions,
    pub grid: SpawnGridOptions,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("fit: {0}")]
    Fit(#[from] SurfaceFitError),
    #[error("track: {0}")]
    Track(#[from] TrackError),
    #[error("grid: {0}")]
    Grid(#[from] SpawnGridError),
    #[error("spawner: cooldown must be finite and >= 0 and height offset finite, got {cooldown_seconds} / {spawn_height_offset}")]
    Spawner {
        cooldown_seconds: f64,
        spawn_height_offset: f64,
    },
}

impl TrackConfig {
    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    /// Returns a parse error or the first invalid section.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    /// Returns the first section with an out-of-range value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.fit.validate()?;
        self.track.validate()?;
        self.grid.validate()?;
        let spawner = self.spawner;
        if !spawner.cooldown_seconds.is_finite()
            || spawner.cooldown_seconds < 0.0
            || !spawner.spawn_height_offset.is_finite()
        {
            return Err(ConfigError::Spawner {
                cooldown_seconds: spawner.cooldown_seconds,
                spawn_height_offset: spawner.spawn_height_offset,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Vec3;
    use crate::track::SurfaceLabel;

    #[test]
    fn empty_object_is_default_config() {
        let config = TrackConfig::from_json_str("{}").unwrap();
        assert_eq!(config, TrackConfig::default());
        assert_eq!(config.track.segment_length, 0.2);
        assert_eq!(config.grid.columns, 6);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let json = r#"{
            "fit": {"labels": ["table", "couch"], "margin_factor": 0.9},
            "track": {"corner_subdivisions": 5, "corner_bezier_offset_local": [0.0, 0.0, 0.08]}
        }"#;
        let config = TrackConfig::from_json_str(json).unwrap();
        assert!(config.fit.labels.contains(SurfaceLabel::Couch));
        assert_eq!(config.fit.margin_factor, 0.9);
        assert_eq!(config.track.corner_subdivisions, 5);
        assert_eq!(config.track.corner_bezier_offset_local, Vec3::new(0.0, 0.0, 0.08));
        assert_eq!(config.track.road_width, 0.2);
        assert_eq!(config.spawner.cooldown_seconds, 0.3);
    }

    #[test]
    fn rejects_unknown_sections_and_bad_values() {
        assert!(matches!(
            TrackConfig::from_json_str(r#"{"tracks": {}}"#),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            TrackConfig::from_json_str(r#"{"track": {"segment_length": -1.0}}"#),
            Err(ConfigError::Track(TrackError::InvalidSegmentLength(_)))
        ));
        assert!(matches!(
            TrackConfig::from_json_str(
                r#"{"track": {"corner_subdivisions": 18446744073709551615}}"#
            ),
            Err(ConfigError::Track(TrackError::InvalidCornerSubdivisions(_)))
        ));
        assert!(matches!(
            TrackConfig::from_json_str(r#"{"track": {"corner_subdivisions": 65}}"#),
            Err(ConfigError::Track(TrackError::InvalidCornerSubdivisions(65)))
        ));
        assert!(matches!(
            TrackConfig::from_json_str(r#"{"fit": {"margin_factor": 0.0}}"#),
            Err(ConfigError::Fit(SurfaceFitError::InvalidMarginFactor(_)))
        ));
        assert!(matches!(
            TrackConfig::from_json_str(r#"{"grid": {"rows": 0}}"#),
            Err(ConfigError::Grid(SpawnGridError::EmptyGrid { .. }))
        ));
        assert!(matches!(
            TrackConfig::from_json_str(r#"{"spawner": {"cooldown_seconds": -0.1}}"#),
            Err(ConfigError::Spawner { .. })
        ));
    }
}
