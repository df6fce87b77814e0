//! Post-prediction business rules
//!
//! - Track-key resolution: the classifier may emit a variant key such as
//!   `Lawyer_Accessible`; the variant marker is stripped and the base key is
//!   looked up. There is no fallback track.
//! - Success-rate bucketing into `high` / `medium` / `low`.
//! - Accessibility-driven adaptation tags.

use serde::Serialize;

/// Lower bound of the `high` tier (inclusive)
pub const HIGH_THRESHOLD: f64 = 0.75;

/// Lower bound of the `medium` tier (inclusive)
pub const MEDIUM_THRESHOLD: f64 = 0.50;

/// Folds variant keys onto their base catalog key
#[derive(Debug, Clone)]
pub struct TrackKeyResolver {
    suffixes: Vec<String>,
}

impl TrackKeyResolver {
    pub fn new(suffixes: Vec<String>) -> Self {
        Self { suffixes }
    }

    pub fn suffixes(&self) -> &[String] {
        &self.suffixes
    }

    /// Strip the first configured suffix that ends `predicted`
    ///
    /// A suffix equal to the whole key is not stripped, so the result is
    /// never empty.
    pub fn resolve<'a>(&self, predicted: &'a str) -> &'a str {
        self.suffixes
            .iter()
            .find_map(|suffix| {
                predicted
                    .strip_suffix(suffix.as_str())
                    .filter(|base| !base.is_empty())
            })
            .unwrap_or(predicted)
    }
}

/// Success-rate tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuccessCategory {
    High,
    Medium,
    Low,
}

impl SuccessCategory {
    /// Tiers are inclusive at the lower bound, exclusive at the upper
    pub fn from_rate(rate: f64) -> Self {
        if rate >= HIGH_THRESHOLD {
            SuccessCategory::High
        } else if rate >= MEDIUM_THRESHOLD {
            SuccessCategory::Medium
        } else {
            SuccessCategory::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SuccessCategory::High => "high",
            SuccessCategory::Medium => "medium",
            SuccessCategory::Low => "low",
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            SuccessCategory::High => {
                "Strong completion outlook. Keep the current pace and consider an advanced track."
            }
            SuccessCategory::Medium => {
                "Moderate completion outlook. Set a weekly study goal to keep momentum."
            }
            SuccessCategory::Low => {
                "Completion at risk. Start with shorter modules and schedule regular check-ins."
            }
        }
    }
}

const BLIND: &[&str] = &["text_to_speech", "high_contrast", "keyboard_navigation"];
const LOW_VISION: &[&str] = &["high_contrast", "font_scaling"];
const SIGN_LANGUAGE: &[&str] = &["sign_language_videos", "captions_enabled"];

/// UI adaptation tags for an accessibility value
///
/// Values without adaptations (including `none`) map to an empty list.
pub fn adaptations_for(accessibility: &str) -> &'static [&'static str] {
    match accessibility {
        "blind" | "cego" => BLIND,
        "low_vision" | "baixa_visao" => LOW_VISION,
        "sign_language" | "deaf" | "libras" | "surdo" => SIGN_LANGUAGE,
        _ => &[],
    }
}

/// Round to 3 decimal places for outward responses
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
