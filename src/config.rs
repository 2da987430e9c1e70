//! Configuration of transform composition.

use crate::codec::DocumentFormat;
use anyhow::{Result, ensure};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How to treat input rotations whose quaternion norm deviates from one by
/// more than the configured tolerance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotationNormPolicy {
    /// Fail with an invalid rotation error.
    #[default]
    Reject,
    /// Log a warning and continue with the normalized rotation.
    Renormalize,
}

/// Configuration parameters for composing transforms.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposeConfig {
    /// Largest accepted deviation of an input quaternion's norm from one.
    pub rotation_norm_tolerance: f64,
    pub rotation_norm_policy: RotationNormPolicy,
    /// Format of the output document. If [`None`], the format is inferred from
    /// the extension of the output resource.
    pub output_format: Option<DocumentFormat>,
}

impl ComposeConfig {
    /// Parses the configuration from the RON file at the given path. Fields
    /// missing from the file take their default values.
    pub fn from_ron_file(file_path: impl AsRef<Path>) -> Result<Self> {
        let config: Self = framechain_io::parse_ron_file(file_path)?;
        config.validate()?;
        Ok(config)
    }

    /// Writes the configuration to a RON file at the given path.
    pub fn save_to_ron_file(&self, file_path: impl AsRef<Path>) -> Result<()> {
        framechain_io::write_ron_file(self, file_path)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.rotation_norm_tolerance.is_finite() && self.rotation_norm_tolerance >= 0.0,
            "Rotation norm tolerance must be a non-negative number, got {}",
            self.rotation_norm_tolerance
        );
        Ok(())
    }

    /// Whether a quaternion with the given norm is close enough to unit
    /// length.
    pub fn accepts_rotation_norm(&self, norm: f64) -> bool {
        (norm - 1.0).abs() <= self.rotation_norm_tolerance
    }
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            rotation_norm_tolerance: 1e-6,
            rotation_norm_policy: RotationNormPolicy::default(),
            output_format: None,
        }
    }
}
