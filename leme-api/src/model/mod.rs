//! Model capabilities and concrete model representations
//!
//! Models are trained offline and exported to JSON. At serving time they are
//! only ever seen through two small capability traits, [`Classifier`] and
//! [`Regressor`], so any representation (including a lookup table in tests)
//! can stand in for a trained model.

mod forest;
mod linear;
mod scaler;

pub use forest::{DecisionTree, RandomForestClassifier, RandomForestRegressor};
pub use linear::{LinearRegression, LogisticRegression};
pub use scaler::{ScalerArtifact, StandardScaler};

use crate::error::{Result, ServingError};
use serde::Deserialize;

/// Multiclass classifier capability
pub trait Classifier: Send + Sync {
    /// Class labels, in the order used by [`Classifier::predict_proba`]
    fn classes(&self) -> &[String];

    /// Number of input features expected
    fn n_features(&self) -> usize;

    /// Probability per class, same order as [`Classifier::classes`]
    fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>>;

    /// Most probable class label (first one on ties)
    fn predict(&self, x: &[f64]) -> Result<String> {
        let proba = self.predict_proba(x)?;
        let best = argmax(&proba)?;
        self.classes().get(best).cloned().ok_or_else(|| {
            ServingError::Model(format!(
                "class index {} out of range for {} classes",
                best,
                self.classes().len()
            ))
        })
    }
}

/// Scalar regressor capability
pub trait Regressor: Send + Sync {
    /// Number of input features expected
    fn n_features(&self) -> usize;

    fn predict(&self, x: &[f64]) -> Result<f64>;
}

/// Serialized classifier, tagged by model family
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierArtifact {
    LogisticRegression {
        classes: Vec<String>,
        coefficients: Vec<Vec<f64>>,
        intercepts: Vec<f64>,
    },
    RandomForest {
        classes: Vec<String>,
        n_features: usize,
        trees: Vec<DecisionTree>,
    },
}

impl ClassifierArtifact {
    pub fn into_model(self) -> leme_common::Result<Box<dyn Classifier>> {
        Ok(match self {
            ClassifierArtifact::LogisticRegression {
                classes,
                coefficients,
                intercepts,
            } => Box::new(LogisticRegression::new(classes, coefficients, intercepts)?),
            ClassifierArtifact::RandomForest {
                classes,
                n_features,
                trees,
            } => Box::new(RandomForestClassifier::new(classes, n_features, trees)?),
        })
    }
}

/// Serialized regressor, tagged by model family
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegressorArtifact {
    LinearRegression {
        coefficients: Vec<f64>,
        intercept: f64,
    },
    RandomForest {
        n_features: usize,
        trees: Vec<DecisionTree>,
    },
}

impl RegressorArtifact {
    pub fn into_model(self) -> leme_common::Result<Box<dyn Regressor>> {
        Ok(match self {
            RegressorArtifact::LinearRegression {
                coefficients,
                intercept,
            } => Box::new(LinearRegression::new(coefficients, intercept)?),
            RegressorArtifact::RandomForest { n_features, trees } => {
                Box::new(RandomForestRegressor::new(n_features, trees)?)
            }
        })
    }
}

/// Fail with [`ServingError::FeatureSchemaMismatch`] unless `x` has `expected` entries
pub(crate) fn check_arity(stage: &'static str, expected: usize, x: &[f64]) -> Result<()> {
    if x.len() != expected {
        return Err(ServingError::FeatureSchemaMismatch {
            stage,
            expected,
            actual: x.len(),
        });
    }
    Ok(())
}

/// Index of the largest value; non-finite values are a model error
pub(crate) fn argmax(values: &[f64]) -> Result<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        if !v.is_finite() {
            return Err(ServingError::Model(format!("non-finite output at index {}", i)));
        }
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
        .ok_or_else(|| ServingError::Model("empty model output".to_string()))
}

fn dot(weights: &[f64], x: &[f64]) -> f64 {
    weights.iter().zip(x).map(|(w, v)| w * v).sum()
}
