//! Serving pipeline
//!
//! Profile → encoder → prediction service → decision layer → catalog.
//! Everything held here is loaded once and read-only afterwards, so a single
//! instance is shared by all request handlers without locking.

use crate::catalog::{TrackCatalog, TrackEntry};
use crate::decision::{adaptations_for, round3, SuccessCategory, TrackKeyResolver};
use crate::encoder::{Profile, ProfileEncoder};
use crate::error::{Result, ServingError};
use crate::prediction::{SuccessRegressor, TrackClassifier};
use leme_common::Error;
use tracing::warn;

/// Shaped result of the suggest-track pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct TrackSuggestion<'a> {
    /// Catalog key after variant stripping
    pub track_key: String,
    /// Key as emitted by the classifier
    pub predicted_key: String,
    pub track: &'a TrackEntry,
    /// Rounded to 3 decimals
    pub confidence: f64,
    pub adaptations: &'static [&'static str],
}

/// Shaped result of the predict-success pipeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SuccessEstimate {
    /// Clipped and rounded to 3 decimals
    pub success_rate: f64,
    /// Bucket of the unrounded rate
    pub category: SuccessCategory,
}

/// Process-wide immutable serving state
pub struct PredictionService {
    encoder: ProfileEncoder,
    classifier: TrackClassifier,
    regressor: SuccessRegressor,
    catalog: TrackCatalog,
    resolver: TrackKeyResolver,
}

impl PredictionService {
    /// Assemble the pipeline, checking that every stage agrees on arity
    pub fn new(
        encoder: ProfileEncoder,
        classifier: TrackClassifier,
        regressor: SuccessRegressor,
        catalog: TrackCatalog,
        resolver: TrackKeyResolver,
    ) -> leme_common::Result<Self> {
        let n_features = encoder.schema().len();
        for (stage, expected) in [
            ("classifier", classifier.n_features()),
            ("regressor", regressor.n_features()),
        ] {
            if expected != n_features {
                return Err(Error::invalid_artifact(
                    stage,
                    format!(
                        "expects {} features, feature schema has {}",
                        expected, n_features
                    ),
                ));
            }
        }

        let service = Self {
            encoder,
            classifier,
            regressor,
            catalog,
            resolver,
        };
        for key in service.unresolvable_classes() {
            warn!(
                "Classifier class {} has no catalog entry; requests predicting it will return 404",
                key
            );
        }
        Ok(service)
    }

    pub fn encoder(&self) -> &ProfileEncoder {
        &self.encoder
    }

    pub fn catalog(&self) -> &TrackCatalog {
        &self.catalog
    }

    pub fn resolver(&self) -> &TrackKeyResolver {
        &self.resolver
    }

    /// Classifier classes that do not resolve to a catalog key
    pub fn unresolvable_classes(&self) -> Vec<&str> {
        self.classifier
            .classes()
            .iter()
            .map(String::as_str)
            .filter(|class| !self.catalog.contains(self.resolver.resolve(class)))
            .collect()
    }

    /// Suggest a track for a profile
    pub fn suggest_track(&self, profile: &Profile) -> Result<TrackSuggestion<'_>> {
        let features = self.encoder.encode(profile)?;
        let prediction = self.classifier.predict(&features)?;

        let track_key = self.resolver.resolve(&prediction.predicted_key);
        let track = self
            .catalog
            .lookup(track_key)
            .ok_or_else(|| ServingError::TrackNotFound(track_key.to_string()))?;

        Ok(TrackSuggestion {
            track_key: track_key.to_string(),
            predicted_key: prediction.predicted_key.clone(),
            track,
            confidence: round3(prediction.confidence),
            adaptations: adaptations_for(&profile.accessibility),
        })
    }

    /// Estimate the completion success rate for a profile
    pub fn predict_success(&self, profile: &Profile) -> Result<SuccessEstimate> {
        let features = self.encoder.encode(profile)?;
        let prediction = self.regressor.predict(&features)?;

        Ok(SuccessEstimate {
            success_rate: round3(prediction.rate),
            category: SuccessCategory::from_rate(prediction.rate),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ModuleDescriptor;
    use crate::encoder::{FeatureName, FeatureSchema, LabelEncoder};
    use crate::model::{Classifier, Regressor, StandardScaler};
    use std::collections::HashMap;

    struct Constant {
        classes: Vec<String>,
        n_features: usize,
        rate: f64,
    }

    impl Classifier for Constant {
        fn classes(&self) -> &[String] {
            &self.classes
        }

        fn n_features(&self) -> usize {
            self.n_features
        }

        fn predict_proba(&self, _x: &[f64]) -> Result<Vec<f64>> {
            Ok(vec![0.25, 0.75])
        }
    }

    impl Regressor for Constant {
        fn n_features(&self) -> usize {
            self.n_features
        }

        fn predict(&self, _x: &[f64]) -> Result<f64> {
            Ok(self.rate)
        }
    }

    fn constant(n_features: usize, rate: f64) -> Constant {
        Constant {
            classes: vec!["Design".to_string(), "Design_Accessible".to_string()],
            n_features,
            rate,
        }
    }

    fn scaler(n: usize) -> StandardScaler {
        StandardScaler::new(vec![0.0; n], vec![1.0; n]).unwrap()
    }

    fn build_with_rate(
        classifier_features: usize,
        rate: f64,
    ) -> leme_common::Result<PredictionService> {
        let encoder = ProfileEncoder::new(
            LabelEncoder::new("area", vec!["Design".to_string()]).unwrap(),
            LabelEncoder::new("accessibility", vec!["none".to_string(), "blind".to_string()])
                .unwrap(),
            FeatureSchema::new(FeatureName::ALL.to_vec()).unwrap(),
        );
        let mut entries = HashMap::new();
        entries.insert(
            "Design".to_string(),
            TrackEntry {
                display_name: "Design Fundamentals".to_string(),
                id: None,
                modules: vec![ModuleDescriptor {
                    title: "Colour".to_string(),
                    content_url: "https://example.org/design/1".to_string(),
                }],
            },
        );

        PredictionService::new(
            encoder,
            TrackClassifier::new(
                scaler(classifier_features),
                Box::new(constant(classifier_features, rate)),
            )?,
            SuccessRegressor::new(scaler(4), Box::new(constant(4, rate)))?,
            TrackCatalog::new(entries)?,
            TrackKeyResolver::new(vec!["_Accessible".to_string()]),
        )
    }

    fn build(classifier_features: usize) -> leme_common::Result<PredictionService> {
        build_with_rate(classifier_features, 0.6)
    }

    fn profile(accessibility: &str) -> Profile {
        Profile {
            area: "Design".to_string(),
            accessibility: accessibility.to_string(),
            modules_completed: 1,
            days_on_platform: 2,
        }
    }

    #[test]
    fn test_arity_mismatch_with_schema_rejected() {
        assert!(matches!(build(3), Err(Error::InvalidArtifact { .. })));
    }

    #[test]
    fn test_suggest_resolves_variant_to_catalog_key() {
        let service = build(4).unwrap();
        let suggestion = service.suggest_track(&profile("blind")).unwrap();
        assert_eq!(suggestion.predicted_key, "Design_Accessible");
        assert_eq!(suggestion.track_key, "Design");
        assert_eq!(suggestion.track.display_name, "Design Fundamentals");
        assert_eq!(suggestion.confidence, 0.75);
        assert!(service.unresolvable_classes().is_empty());
    }

    #[test]
    fn test_category_uses_unrounded_rate() {
        // Rates just below a threshold stay in the lower tier even though
        // the reported value rounds up to the threshold
        for (raw, reported, category) in [
            (0.4996, 0.5, SuccessCategory::Low),
            (0.7496, 0.75, SuccessCategory::Medium),
            (0.75, 0.75, SuccessCategory::High),
            (0.5, 0.5, SuccessCategory::Medium),
        ] {
            let service = build_with_rate(4, raw).unwrap();
            let estimate = service.predict_success(&profile("none")).unwrap();
            assert_eq!(estimate.success_rate, reported, "raw {}", raw);
            assert_eq!(estimate.category, category, "raw {}", raw);
        }
    }

    #[test]
    fn test_unknown_category_rejected_before_models() {
        let service = build(4).unwrap();
        let err = service.predict_success(&profile("telepathy")).unwrap_err();
        assert!(matches!(err, ServingError::InvalidCategory { .. }));
    }
}
