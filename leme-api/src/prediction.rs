//! Prediction services
//!
//! Each service pairs a trained model with the scaling transform fit during
//! its training. Both operate on an already-encoded [`FeatureVector`]; a
//! vector of the wrong length is reported as
//! [`ServingError::FeatureSchemaMismatch`] and never corrected.

use crate::encoder::FeatureVector;
use crate::error::{Result, ServingError};
use crate::model::{Classifier, Regressor, StandardScaler};
use leme_common::Error;
use tracing::debug;

/// Raw classification output
#[derive(Debug, Clone, PartialEq)]
pub struct TrackPrediction {
    pub predicted_key: String,
    /// Maximum class probability, in `[0, 1]`
    pub confidence: f64,
}

/// Raw regression output
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SuccessPrediction {
    pub raw_rate: f64,
    /// `raw_rate` clipped into `[0, 1]`
    pub rate: f64,
}

/// Track classifier: scaler + classifier
pub struct TrackClassifier {
    scaler: StandardScaler,
    model: Box<dyn Classifier>,
}

impl TrackClassifier {
    pub fn new(scaler: StandardScaler, model: Box<dyn Classifier>) -> leme_common::Result<Self> {
        if scaler.n_features() != model.n_features() {
            return Err(Error::invalid_artifact(
                "classifier",
                format!(
                    "scaler expects {} features, model expects {}",
                    scaler.n_features(),
                    model.n_features()
                ),
            ));
        }
        Ok(Self { scaler, model })
    }

    pub fn n_features(&self) -> usize {
        self.scaler.n_features()
    }

    pub fn classes(&self) -> &[String] {
        self.model.classes()
    }

    pub fn predict(&self, features: &FeatureVector) -> Result<TrackPrediction> {
        let scaled = self.scaler.transform(features.as_slice())?;
        let predicted_key = self.model.predict(&scaled)?;
        let proba = self.model.predict_proba(&scaled)?;

        let confidence = proba.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if !(0.0..=1.0).contains(&confidence) {
            return Err(ServingError::Model(format!(
                "confidence {} outside [0, 1]",
                confidence
            )));
        }

        debug!(
            "Classifier predicted {} (confidence {:.4})",
            predicted_key, confidence
        );
        Ok(TrackPrediction {
            predicted_key,
            confidence,
        })
    }
}

/// Success-rate regressor: scaler + regressor
pub struct SuccessRegressor {
    scaler: StandardScaler,
    model: Box<dyn Regressor>,
}

impl SuccessRegressor {
    pub fn new(scaler: StandardScaler, model: Box<dyn Regressor>) -> leme_common::Result<Self> {
        if scaler.n_features() != model.n_features() {
            return Err(Error::invalid_artifact(
                "regressor",
                format!(
                    "scaler expects {} features, model expects {}",
                    scaler.n_features(),
                    model.n_features()
                ),
            ));
        }
        Ok(Self { scaler, model })
    }

    pub fn n_features(&self) -> usize {
        self.scaler.n_features()
    }

    /// Predict and clip into `[0, 1]`; extrapolated values are clipped, not rejected
    pub fn predict(&self, features: &FeatureVector) -> Result<SuccessPrediction> {
        let scaled = self.scaler.transform(features.as_slice())?;
        let raw_rate = self.model.predict(&scaled)?;
        if !raw_rate.is_finite() {
            return Err(ServingError::Model(format!(
                "non-finite success rate {}",
                raw_rate
            )));
        }

        debug!("Regressor predicted raw rate {:.4}", raw_rate);
        Ok(SuccessPrediction {
            raw_rate,
            rate: raw_rate.clamp(0.0, 1.0),
        })
    }
}
