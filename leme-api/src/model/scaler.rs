//! Standard-score input scaling fit during training

use super::check_arity;
use crate::error::Result;
use leme_common::Error;
use serde::Deserialize;

/// Contents of a `*_scaler.json` artifact
#[derive(Debug, Clone, Deserialize)]
pub struct ScalerArtifact {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

/// `x' = (x - mean) / scale`, per feature
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    /// Zero scales (constant training features) are replaced by 1
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> leme_common::Result<Self> {
        if mean.is_empty() || mean.len() != scale.len() {
            return Err(Error::invalid_artifact(
                "scaler",
                format!("mean has {} entries, scale has {}", mean.len(), scale.len()),
            ));
        }
        if mean.iter().chain(&scale).any(|v| !v.is_finite()) {
            return Err(Error::invalid_artifact("scaler", "non-finite parameter"));
        }

        let scale = scale
            .into_iter()
            .map(|s| if s == 0.0 { 1.0 } else { s })
            .collect();
        Ok(Self { mean, scale })
    }

    pub fn from_artifact(artifact: ScalerArtifact) -> leme_common::Result<Self> {
        Self::new(artifact.mean, artifact.scale)
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    pub fn transform(&self, x: &[f64]) -> Result<Vec<f64>> {
        check_arity("scaler", self.n_features(), x)?;
        Ok(x
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(v, (m, s))| (v - m) / s)
            .collect())
    }
}
