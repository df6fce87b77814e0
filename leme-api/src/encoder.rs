//! Profile encoder
//!
//! Turns a learner profile into the numeric feature vector the models were
//! trained on. Categorical fields go through label encoders whose
//! vocabularies are fixed at load time; the output order follows the feature
//! schema recorded next to the encoders, never a hardcoded order.

use crate::error::{CategoryField, Result, ServingError};
use leme_common::Error;
use serde::Deserialize;
use std::collections::HashMap;

/// Learner profile, one per request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub area: String,
    pub accessibility: String,
    pub modules_completed: u32,
    pub days_on_platform: u32,
}

/// Named model input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum FeatureName {
    #[serde(rename = "area_encoded")]
    AreaEncoded,

    #[serde(rename = "accessibility_encoded", alias = "acess_encoded")]
    AccessibilityEncoded,

    #[serde(rename = "modules_completed", alias = "modulos_concluidos")]
    ModulesCompleted,

    #[serde(rename = "days_on_platform", alias = "tempo_plataforma_dias")]
    DaysOnPlatform,
}

impl FeatureName {
    pub const ALL: [FeatureName; 4] = [
        FeatureName::AreaEncoded,
        FeatureName::AccessibilityEncoded,
        FeatureName::ModulesCompleted,
        FeatureName::DaysOnPlatform,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureName::AreaEncoded => "area_encoded",
            FeatureName::AccessibilityEncoded => "accessibility_encoded",
            FeatureName::ModulesCompleted => "modules_completed",
            FeatureName::DaysOnPlatform => "days_on_platform",
        }
    }
}

/// Ordered feature schema, resolved once at load time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSchema {
    order: Vec<FeatureName>,
}

impl FeatureSchema {
    /// Every feature must appear exactly once
    pub fn new(order: Vec<FeatureName>) -> leme_common::Result<Self> {
        for feature in FeatureName::ALL {
            let count = order.iter().filter(|f| **f == feature).count();
            if count != 1 {
                return Err(Error::invalid_artifact(
                    "feature schema",
                    format!("{} appears {} times, expected once", feature.as_str(), count),
                ));
            }
        }
        Ok(Self { order })
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.order.iter().map(FeatureName::as_str).collect()
    }
}

/// Model input in schema order
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Label encoder: the code of a value is its position in `classes`
#[derive(Debug, Clone)]
pub struct LabelEncoder {
    classes: Vec<String>,
    codes: HashMap<String, usize>,
}

impl LabelEncoder {
    pub fn new(name: &str, classes: Vec<String>) -> leme_common::Result<Self> {
        if classes.is_empty() {
            return Err(Error::invalid_artifact(
                format!("{} encoder", name),
                "empty vocabulary",
            ));
        }

        let mut codes = HashMap::with_capacity(classes.len());
        for (code, class) in classes.iter().enumerate() {
            if codes.insert(class.clone(), code).is_some() {
                return Err(Error::invalid_artifact(
                    format!("{} encoder", name),
                    format!("duplicate class {:?}", class),
                ));
            }
        }

        Ok(Self { classes, codes })
    }

    pub fn transform(&self, value: &str) -> Option<usize> {
        self.codes.get(value).copied()
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

/// Serialized vocabulary
#[derive(Debug, Clone, Deserialize)]
pub struct LabelEncoderArtifact {
    pub classes: Vec<String>,
}

/// Contents of `encoders.json`
#[derive(Debug, Clone, Deserialize)]
pub struct EncodersArtifact {
    pub area: LabelEncoderArtifact,

    #[serde(alias = "acessibilidade")]
    pub accessibility: LabelEncoderArtifact,

    pub features: Vec<FeatureName>,
}

/// Maps a validated profile to a feature vector
#[derive(Debug, Clone)]
pub struct ProfileEncoder {
    area: LabelEncoder,
    accessibility: LabelEncoder,
    schema: FeatureSchema,
}

impl ProfileEncoder {
    pub fn new(area: LabelEncoder, accessibility: LabelEncoder, schema: FeatureSchema) -> Self {
        Self {
            area,
            accessibility,
            schema,
        }
    }

    pub fn from_artifact(artifact: EncodersArtifact) -> leme_common::Result<Self> {
        Ok(Self::new(
            LabelEncoder::new("area", artifact.area.classes)?,
            LabelEncoder::new("accessibility", artifact.accessibility.classes)?,
            FeatureSchema::new(artifact.features)?,
        ))
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Accepted values for a categorical field
    pub fn vocabulary(&self, field: CategoryField) -> &[String] {
        match field {
            CategoryField::Area => self.area.classes(),
            CategoryField::Accessibility => self.accessibility.classes(),
        }
    }

    /// Check both categorical fields against the trained vocabularies
    pub fn validate(&self, profile: &Profile) -> Result<()> {
        self.code(CategoryField::Area, &profile.area)?;
        self.code(CategoryField::Accessibility, &profile.accessibility)?;
        Ok(())
    }

    /// Encode a profile in schema order
    pub fn encode(&self, profile: &Profile) -> Result<FeatureVector> {
        let area = self.code(CategoryField::Area, &profile.area)?;
        let accessibility = self.code(CategoryField::Accessibility, &profile.accessibility)?;

        let values = self
            .schema
            .order
            .iter()
            .map(|feature| match feature {
                FeatureName::AreaEncoded => area as f64,
                FeatureName::AccessibilityEncoded => accessibility as f64,
                FeatureName::ModulesCompleted => f64::from(profile.modules_completed),
                FeatureName::DaysOnPlatform => f64::from(profile.days_on_platform),
            })
            .collect();

        Ok(FeatureVector::new(values))
    }

    fn code(&self, field: CategoryField, value: &str) -> Result<usize> {
        let encoder = match field {
            CategoryField::Area => &self.area,
            CategoryField::Accessibility => &self.accessibility,
        };
        encoder
            .transform(value)
            .ok_or_else(|| ServingError::InvalidCategory {
                field,
                value: value.to_string(),
                accepted: encoder.classes().to_vec(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn encoder_with_schema(order: Vec<FeatureName>) -> ProfileEncoder {
        ProfileEncoder::new(
            LabelEncoder::new("area", strings(&["Accounting", "Design", "Lawyer"])).unwrap(),
            LabelEncoder::new("accessibility", strings(&["none", "blind", "sign_language"]))
                .unwrap(),
            FeatureSchema::new(order).unwrap(),
        )
    }

    fn profile(area: &str, accessibility: &str) -> Profile {
        Profile {
            area: area.to_string(),
            accessibility: accessibility.to_string(),
            modules_completed: 4,
            days_on_platform: 30,
        }
    }

    #[test]
    fn test_encode_training_order() {
        let encoder = encoder_with_schema(FeatureName::ALL.to_vec());
        let vector = encoder.encode(&profile("Lawyer", "blind")).unwrap();
        assert_eq!(vector.as_slice(), &[2.0, 1.0, 4.0, 30.0]);
    }

    #[test]
    fn test_encode_follows_reordered_schema() {
        let encoder = encoder_with_schema(vec![
            FeatureName::DaysOnPlatform,
            FeatureName::AreaEncoded,
            FeatureName::ModulesCompleted,
            FeatureName::AccessibilityEncoded,
        ]);
        let vector = encoder.encode(&profile("Design", "sign_language")).unwrap();
        assert_eq!(vector.as_slice(), &[30.0, 1.0, 4.0, 2.0]);
    }

    #[test]
    fn test_unknown_area_reports_field_and_vocabulary() {
        let encoder = encoder_with_schema(FeatureName::ALL.to_vec());
        let err = encoder.encode(&profile("Astronaut", "none")).unwrap_err();
        match err {
            ServingError::InvalidCategory {
                field,
                value,
                accepted,
            } => {
                assert_eq!(field, CategoryField::Area);
                assert_eq!(value, "Astronaut");
                assert_eq!(accepted, strings(&["Accounting", "Design", "Lawyer"]));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_accessibility_rejected() {
        let encoder = encoder_with_schema(FeatureName::ALL.to_vec());
        let err = encoder.validate(&profile("Lawyer", "Blind")).unwrap_err();
        assert!(matches!(
            err,
            ServingError::InvalidCategory {
                field: CategoryField::Accessibility,
                ..
            }
        ));
    }

    #[test]
    fn test_schema_requires_each_feature_once() {
        assert!(FeatureSchema::new(vec![
            FeatureName::AreaEncoded,
            FeatureName::AreaEncoded,
            FeatureName::ModulesCompleted,
            FeatureName::DaysOnPlatform,
        ])
        .is_err());
        assert!(FeatureSchema::new(vec![FeatureName::AreaEncoded]).is_err());
    }

    #[test]
    fn test_duplicate_vocabulary_rejected() {
        assert!(LabelEncoder::new("area", strings(&["Design", "Design"])).is_err());
        assert!(LabelEncoder::new("area", Vec::new()).is_err());
    }

    #[test]
    fn test_artifact_accepts_training_names() {
        let json = r#"{
            "area": {"classes": ["Design"]},
            "acessibilidade": {"classes": ["nenhuma", "libras"]},
            "features": ["area_encoded", "acess_encoded", "modulos_concluidos", "tempo_plataforma_dias"]
        }"#;
        let artifact: EncodersArtifact = serde_json::from_str(json).unwrap();
        let encoder = ProfileEncoder::from_artifact(artifact).unwrap();
        assert_eq!(
            encoder.schema().names(),
            vec!["area_encoded", "accessibility_encoded", "modules_completed", "days_on_platform"]
        );
        assert_eq!(encoder.vocabulary(CategoryField::Accessibility).len(), 2);
    }
}
