//! Linear model families: multinomial logistic regression and least squares

use super::{check_arity, dot, Classifier, Regressor};
use crate::error::{Result, ServingError};
use leme_common::Error;

/// Logistic regression classifier
///
/// One coefficient row per class with softmax over the scores, or the binary
/// form (two classes, a single row) scored with the logistic sigmoid.
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    classes: Vec<String>,
    coefficients: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
    n_features: usize,
}

impl LogisticRegression {
    pub fn new(
        classes: Vec<String>,
        coefficients: Vec<Vec<f64>>,
        intercepts: Vec<f64>,
    ) -> leme_common::Result<Self> {
        let artifact = "logistic_regression";
        if classes.len() < 2 {
            return Err(Error::invalid_artifact(artifact, "need at least two classes"));
        }

        let binary = classes.len() == 2 && coefficients.len() == 1;
        if !binary && coefficients.len() != classes.len() {
            return Err(Error::invalid_artifact(
                artifact,
                format!(
                    "{} coefficient rows for {} classes",
                    coefficients.len(),
                    classes.len()
                ),
            ));
        }
        if intercepts.len() != coefficients.len() {
            return Err(Error::invalid_artifact(
                artifact,
                format!(
                    "{} intercepts for {} coefficient rows",
                    intercepts.len(),
                    coefficients.len()
                ),
            ));
        }

        let n_features = coefficients[0].len();
        if n_features == 0 || coefficients.iter().any(|row| row.len() != n_features) {
            return Err(Error::invalid_artifact(artifact, "ragged coefficient matrix"));
        }

        Ok(Self {
            classes,
            coefficients,
            intercepts,
            n_features,
        })
    }
}

impl Classifier for LogisticRegression {
    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>> {
        check_arity("classifier", self.n_features, x)?;

        let scores: Vec<f64> = self
            .coefficients
            .iter()
            .zip(&self.intercepts)
            .map(|(row, b)| dot(row, x) + b)
            .collect();

        let proba = if scores.len() == 1 {
            let p = sigmoid(scores[0]);
            vec![1.0 - p, p]
        } else {
            softmax(&scores)
        };

        if proba.iter().any(|p| !p.is_finite()) {
            return Err(ServingError::Model(
                "non-finite class probability".to_string(),
            ));
        }
        Ok(proba)
    }
}

/// Ordinary least-squares regressor
#[derive(Debug, Clone)]
pub struct LinearRegression {
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LinearRegression {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> leme_common::Result<Self> {
        if coefficients.is_empty() {
            return Err(Error::invalid_artifact("linear_regression", "no coefficients"));
        }
        Ok(Self {
            coefficients,
            intercept,
        })
    }
}

impl Regressor for LinearRegression {
    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn predict(&self, x: &[f64]) -> Result<f64> {
        check_arity("regressor", self.coefficients.len(), x)?;
        Ok(dot(&self.coefficients, x) + self.intercept)
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}
