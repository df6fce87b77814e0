//! Artifact loading
//!
//! Reads the exported model, scaler and encoder artifacts plus the track
//! catalog, validates them against each other and assembles the
//! [`PredictionService`]. Any problem here is fatal at startup; nothing is
//! re-read at request time.

use crate::catalog::TrackCatalog;
use crate::decision::TrackKeyResolver;
use crate::encoder::{EncodersArtifact, ProfileEncoder};
use crate::error::CategoryField;
use crate::model::{ClassifierArtifact, RegressorArtifact, ScalerArtifact, StandardScaler};
use crate::prediction::{SuccessRegressor, TrackClassifier};
use crate::service::PredictionService;
use leme_common::{Error, Result};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::info;

pub const ENCODERS_FILE: &str = "encoders.json";
pub const CLASSIFIER_FILE: &str = "classifier.json";
pub const CLASSIFIER_SCALER_FILE: &str = "classifier_scaler.json";
pub const REGRESSOR_FILE: &str = "regressor.json";
pub const REGRESSOR_SCALER_FILE: &str = "regressor_scaler.json";

/// Locations of every artifact the service needs
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactPaths {
    pub encoders: PathBuf,
    pub classifier: PathBuf,
    pub classifier_scaler: PathBuf,
    pub regressor: PathBuf,
    pub regressor_scaler: PathBuf,
    pub catalog: PathBuf,
}

impl ArtifactPaths {
    /// Standard file names inside `dir`, with the catalog given separately
    pub fn in_dir(dir: &Path, catalog: PathBuf) -> Self {
        Self {
            encoders: dir.join(ENCODERS_FILE),
            classifier: dir.join(CLASSIFIER_FILE),
            classifier_scaler: dir.join(CLASSIFIER_SCALER_FILE),
            regressor: dir.join(REGRESSOR_FILE),
            regressor_scaler: dir.join(REGRESSOR_SCALER_FILE),
            catalog,
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    serde_json::from_str(&content)
        .map_err(|e| Error::invalid_artifact(path.display().to_string(), e.to_string()))
}

fn load_scaler(path: &Path) -> Result<StandardScaler> {
    let artifact: ScalerArtifact = read_json(path)?;
    StandardScaler::from_artifact(artifact)
}

/// Load all artifacts and build the serving pipeline
pub fn load_service(paths: &ArtifactPaths, variant_suffixes: Vec<String>) -> Result<PredictionService> {
    let encoder = ProfileEncoder::from_artifact(read_json::<EncodersArtifact>(&paths.encoders)?)?;
    info!("✓ Encoders loaded from {}", paths.encoders.display());
    info!("Features: {:?}", encoder.schema().names());
    info!("Areas: {:?}", encoder.vocabulary(CategoryField::Area));
    info!(
        "Accessibility values: {:?}",
        encoder.vocabulary(CategoryField::Accessibility)
    );

    let classifier = TrackClassifier::new(
        load_scaler(&paths.classifier_scaler)?,
        read_json::<ClassifierArtifact>(&paths.classifier)?.into_model()?,
    )?;
    info!(
        "✓ Classification model loaded ({} classes)",
        classifier.classes().len()
    );

    let regressor = SuccessRegressor::new(
        load_scaler(&paths.regressor_scaler)?,
        read_json::<RegressorArtifact>(&paths.regressor)?.into_model()?,
    )?;
    info!("✓ Regression model loaded");

    let catalog = TrackCatalog::load(&paths.catalog)?;
    info!("✓ Catalog loaded: {} tracks", catalog.len());

    PredictionService::new(
        encoder,
        classifier,
        regressor,
        catalog,
        TrackKeyResolver::new(variant_suffixes),
    )
}
