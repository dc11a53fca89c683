//! Part signal map - the structured fields recovered for one part

use serde::{Deserialize, Serialize};

use super::lenient;

/// Part complexity class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum Complexity {
    Simple,
    #[default]
    Moderate,
    Complex,
}

impl std::fmt::Display for Complexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Complexity::Simple => write!(f, "simple"),
            Complexity::Moderate => write!(f, "moderate"),
            Complexity::Complex => write!(f, "complex"),
        }
    }
}

impl std::str::FromStr for Complexity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "simple" => Ok(Complexity::Simple),
            "moderate" => Ok(Complexity::Moderate),
            "complex" => Ok(Complexity::Complex),
            _ => Err(format!(
                "Unknown complexity: {}. Use simple, moderate, or complex",
                s
            )),
        }
    }
}

/// Overall part size class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum SizeClass {
    Small,
    #[default]
    Medium,
    Large,
}

impl SizeClass {
    /// Classify by the mean of the three principal dimensions (inches)
    pub fn from_mean_dimension(mean_in: f64) -> Self {
        if mean_in < 2.0 {
            SizeClass::Small
        } else if mean_in > 6.0 {
            SizeClass::Large
        } else {
            SizeClass::Medium
        }
    }
}

impl std::fmt::Display for SizeClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SizeClass::Small => write!(f, "small"),
            SizeClass::Medium => write!(f, "medium"),
            SizeClass::Large => write!(f, "large"),
        }
    }
}

impl std::str::FromStr for SizeClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "small" => Ok(SizeClass::Small),
            "medium" => Ok(SizeClass::Medium),
            "large" => Ok(SizeClass::Large),
            _ => Err(format!("Unknown size: {}. Use small, medium, or large", s)),
        }
    }
}

/// Tolerance class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum Tolerance {
    #[default]
    Normal,
    Tight,
    Aerospace,
}

impl std::fmt::Display for Tolerance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tolerance::Normal => write!(f, "normal"),
            Tolerance::Tight => write!(f, "tight"),
            Tolerance::Aerospace => write!(f, "aerospace"),
        }
    }
}

impl std::str::FromStr for Tolerance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "normal" => Ok(Tolerance::Normal),
            "tight" => Ok(Tolerance::Tight),
            "aerospace" => Ok(Tolerance::Aerospace),
            _ => Err(format!(
                "Unknown tolerance: {}. Use normal, tight, or aerospace",
                s
            )),
        }
    }
}

/// Raw dimension values as recovered by the extractor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDimensions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length_in: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width_in: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_in: Option<f64>,
}

/// What the aggregator saw, for troubleshooting extraction on real drawings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionDebug {
    /// Input length in characters
    pub text_length: usize,

    pub found_length: bool,
    pub found_width: bool,
    pub found_height: bool,

    pub raw_dimensions: RawDimensions,

    /// Cascade stage that last contributed a dimension ("none" if nothing)
    pub stage: String,
}

/// Structured signals for one part
///
/// Every field is optional: the aggregator omits what it cannot recover and
/// callers supply only what they know. Deserialization is lenient, see
/// [`lenient`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartSignals {
    /// Normalized lowercase material name
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::text")]
    pub material: Option<String>,

    /// Part count (>= 1)
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::qty")]
    pub qty: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::positive_number")]
    pub length_in: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::positive_number")]
    pub width_in: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::positive_number")]
    pub height_in: Option<f64>,

    /// Per-part stock weight in pounds
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::positive_number")]
    pub material_weight_lbs: Option<f64>,

    /// Per-part machining time in minutes
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::positive_number")]
    pub machining_minutes: Option<f64>,

    /// simple | moderate | complex (unrecognized values are kept as given)
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::text")]
    pub complexity: Option<String>,

    /// small | medium | large
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::text")]
    pub size: Option<String>,

    /// normal | tight | aerospace
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::text")]
    pub tolerance: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_text_preview: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction_debug: Option<ExtractionDebug>,
}

impl PartSignals {
    /// Layer caller-supplied values on top of these signals
    ///
    /// A supplied value replaces the current one when it is present and,
    /// for text fields, not blank.
    pub fn apply_overrides(&mut self, overrides: &PartSignals) {
        fn text(target: &mut Option<String>, value: &Option<String>) {
            if let Some(v) = value {
                if !v.trim().is_empty() {
                    *target = Some(v.clone());
                }
            }
        }
        fn copy<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
            if value.is_some() {
                *target = value.clone();
            }
        }

        text(&mut self.material, &overrides.material);
        copy(&mut self.qty, &overrides.qty);
        copy(&mut self.length_in, &overrides.length_in);
        copy(&mut self.width_in, &overrides.width_in);
        copy(&mut self.height_in, &overrides.height_in);
        copy(&mut self.material_weight_lbs, &overrides.material_weight_lbs);
        copy(&mut self.machining_minutes, &overrides.machining_minutes);
        text(&mut self.complexity, &overrides.complexity);
        text(&mut self.size, &overrides.size);
        text(&mut self.tolerance, &overrides.tolerance);
        text(&mut self.notes, &overrides.notes);
        text(&mut self.raw_text_preview, &overrides.raw_text_preview);
        copy(&mut self.extraction_debug, &overrides.extraction_debug);
    }

    /// Return a copy with `overrides` applied
    pub fn merged_with(&self, overrides: &PartSignals) -> PartSignals {
        let mut merged = self.clone();
        merged.apply_overrides(overrides);
        merged
    }
}
