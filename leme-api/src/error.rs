//! Error types for the prediction path
//!
//! Load-time failures use [`leme_common::Error`]; everything that can go
//! wrong while serving a single request is a [`ServingError`].

use thiserror::Error;

/// Categorical profile field, used to name the offending input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryField {
    Area,
    Accessibility,
}

impl CategoryField {
    /// Request field name
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryField::Area => "area",
            CategoryField::Accessibility => "accessibility",
        }
    }
}

impl std::fmt::Display for CategoryField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while turning a profile into a shaped prediction
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServingError {
    /// Value outside the vocabulary the encoder was trained on
    #[error("Invalid {field}: {value:?}. Accepted values: {accepted:?}")]
    InvalidCategory {
        field: CategoryField,
        value: String,
        accepted: Vec<String>,
    },

    /// Feature vector does not match what a transform or model expects
    #[error("Feature schema mismatch in {stage}: expected {expected} features, got {actual}")]
    FeatureSchemaMismatch {
        stage: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Resolved track key is absent from the catalog
    #[error("Track {0} not found in catalog")]
    TrackNotFound(String),

    /// Model produced an unusable output
    #[error("Model error: {0}")]
    Model(String),
}

/// Convenience Result type for the prediction path
pub type Result<T> = std::result::Result<T, ServingError>;
