// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pipeline configuration
//!
//! Every stage takes its own config struct; [`PipelineConfig`] bundles them
//! so a whole run can be described by one JSON document. Missing fields fall
//! back to the defaults of the reference pipeline.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// RANSAC line fitting parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RansacConfig {
    /// Number of two-point samples drawn
    pub iterations: usize,
    /// Maximum perpendicular distance of an inlier (meters)
    pub threshold: f64,
    /// Fixed seed for reproducible fits; `None` draws from the OS
    pub seed: Option<u64>,
}

impl Default for RansacConfig {
    fn default() -> Self {
        Self {
            iterations: 3000,
            threshold: 0.03,
            seed: None,
        }
    }
}

impl RansacConfig {
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Tolerances for projecting a candidate segment onto a reference wall
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MatchConfig {
    /// Upper bound (exclusive) on the smaller of the slope and reciprocal-slope differences
    pub slope_tolerance: f64,
    /// Upper bound (exclusive) on the average endpoint-to-projection distance
    pub max_average_distance: f64,
    /// Offset added to slopes before taking reciprocals
    pub slope_epsilon: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            slope_tolerance: 1.0,
            max_average_distance: 0.5,
            slope_epsilon: 1e-8,
        }
    }
}

impl MatchConfig {
    pub fn with_max_average_distance(mut self, distance: f64) -> Self {
        self.max_average_distance = distance;
        self
    }

    pub fn with_slope_tolerance(mut self, tolerance: f64) -> Self {
        self.slope_tolerance = tolerance;
        self
    }
}

/// Collinearity tolerance for splitting walls at openings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SplitConfig {
    pub epsilon: f64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self { epsilon: 1e-5 }
    }
}

/// Band heights used when extruding walls (meters above floor)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExtrusionConfig {
    /// Top of plain walls
    pub wall_height: f64,
    /// Top of the solid band above doors and windows
    pub head_height: f64,
}

impl Default for ExtrusionConfig {
    fn default() -> Self {
        Self {
            wall_height: 3.2,
            head_height: 2.4,
        }
    }
}

impl ExtrusionConfig {
    pub fn with_wall_height(mut self, height: f64) -> Self {
        self.wall_height = height;
        self
    }

    pub fn with_head_height(mut self, height: f64) -> Self {
        self.head_height = height;
        self
    }
}

/// Post-processing of the merged mesh
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MeshConfig {
    /// Weld coincident vertices closer than this distance; `None` keeps duplicates
    pub weld_epsilon: Option<f64>,
}

/// Companion material written next to the OBJ file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MaterialConfig {
    /// Placeholder diffuse texture referenced by the material
    pub texture: String,
}

impl Default for MaterialConfig {
    fn default() -> Self {
        Self {
            texture: "door.jpg".into(),
        }
    }
}

/// Configuration of a complete reconstruction run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    pub ransac: RansacConfig,
    pub matching: MatchConfig,
    pub split: SplitConfig,
    pub extrusion: ExtrusionConfig,
    pub mesh: MeshConfig,
    pub material: MaterialConfig,
    /// Project opening footprints onto the closest wall before splitting
    pub snap_openings: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            ransac: RansacConfig::default(),
            matching: MatchConfig::default(),
            split: SplitConfig::default(),
            extrusion: ExtrusionConfig::default(),
            mesh: MeshConfig::default(),
            material: MaterialConfig::default(),
            snap_openings: true,
        }
    }
}

impl PipelineConfig {
    /// Parse a JSON document; absent fields keep their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_json_str(&json)
    }

    /// Apply `FLOORPLAN_WALL_HEIGHT` / `FLOORPLAN_HEAD_HEIGHT` when set and parseable
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(height) = env_f64("FLOORPLAN_WALL_HEIGHT") {
            self.extrusion.wall_height = height;
        }
        if let Some(height) = env_f64("FLOORPLAN_HEAD_HEIGHT") {
            self.extrusion.head_height = height;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.ransac.threshold <= 0.0 {
            return Err(Error::Config(format!(
                "ransac.threshold must be positive, got {}",
                self.ransac.threshold
            )));
        }
        if self.split.epsilon <= 0.0 {
            return Err(Error::Config(format!(
                "split.epsilon must be positive, got {}",
                self.split.epsilon
            )));
        }
        if self.extrusion.wall_height <= 0.0 || self.extrusion.head_height <= 0.0 {
            return Err(Error::Config(
                "extrusion heights must be positive".to_string(),
            ));
        }
        if let Some(eps) = self.mesh.weld_epsilon {
            if eps <= 0.0 {
                return Err(Error::Config(format!(
                    "mesh.weld_epsilon must be positive, got {}",
                    eps
                )));
            }
        }
        Ok(())
    }
}

fn env_f64(key: &str) -> Option<f64> {
    let value = std::env::var(key).ok()?;
    match value.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Some(v),
        _ => {
            tracing::warn!(key, value = %value, "Ignoring unparseable environment override");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_pipeline() {
        let config = PipelineConfig::default();
        assert_eq!(config.ransac.iterations, 3000);
        assert!((config.extrusion.wall_height - 3.2).abs() < 1e-12);
        assert!((config.extrusion.head_height - 2.4).abs() < 1e-12);
        assert!((config.matching.max_average_distance - 0.5).abs() < 1e-12);
        assert_eq!(config.material.texture, "door.jpg");
        assert!(config.snap_openings);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            PipelineConfig::from_json_str(r#"{ "extrusion": { "wall_height": 2.8 } }"#).unwrap();
        assert!((config.extrusion.wall_height - 2.8).abs() < 1e-12);
        assert!((config.extrusion.head_height - 2.4).abs() < 1e-12);
        assert_eq!(config.ransac, RansacConfig::default());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = PipelineConfig::from_json_str(r#"{ "split": { "epsilon": 0.0 } }"#);
        assert!(matches!(err, Err(Error::Config(_))));

        let err = PipelineConfig::from_json_str("{ not json");
        assert!(matches!(err, Err(Error::Json(_))));
    }
}
