//! Signal extraction - turn raw drawing text into a [`PartSignals`] map
//!
//! The aggregator runs every detector over the same text and never fails:
//! whatever cannot be recovered is simply left out of the map.

pub mod dimensions;
pub mod lenient;
pub mod material;
pub mod part;
pub mod quantity;
pub mod weight;

pub use dimensions::{
    extract_dimensions, CandidateDimension, CandidateRule, CascadeStage, DimensionExtractor,
    DimensionReport, Dimensions, ExtractionThresholds, UnitGuess,
};
pub use material::detect_material;
pub use part::{Complexity, ExtractionDebug, PartSignals, RawDimensions, SizeClass, Tolerance};
pub use quantity::{extract_quantity, parse_qty};
pub use weight::extract_weight;

use log::debug;

/// Characters of input kept in `raw_text_preview`
pub const PREVIEW_CHARS: usize = 1200;

const COMPLEX_KEYWORDS: &[&str] = &["complex", "difficult", "intricate"];
const SIMPLE_KEYWORDS: &[&str] = &["simple", "basic", "easy"];

/// Complexity hint from keywords in lowercased text
pub fn detect_complexity(text: &str) -> Complexity {
    if COMPLEX_KEYWORDS.iter().any(|kw| text.contains(kw)) {
        Complexity::Complex
    } else if SIMPLE_KEYWORDS.iter().any(|kw| text.contains(kw)) {
        Complexity::Simple
    } else {
        Complexity::Moderate
    }
}

/// Runs all detectors over raw text
pub struct SignalAggregator {
    dimensions: DimensionExtractor,
}

impl Default for SignalAggregator {
    fn default() -> Self {
        Self::new(DimensionExtractor::default())
    }
}

impl SignalAggregator {
    pub fn new(dimensions: DimensionExtractor) -> Self {
        Self { dimensions }
    }

    /// Build an aggregator whose dimension cascade uses `thresholds`
    pub fn with_thresholds(thresholds: ExtractionThresholds) -> Self {
        Self::new(DimensionExtractor::with_thresholds(thresholds))
    }

    pub fn extract(&self, text: &str) -> PartSignals {
        let lower = text.to_lowercase();

        let report = self.dimensions.extract(text);
        let dims = report.dimensions;
        let size = dims.mean().map(SizeClass::from_mean_dimension);
        let material = detect_material(&lower);

        debug!(
            "signals: {} chars, material={:?}, dims={:?} via {:?}",
            text.chars().count(),
            material,
            dims,
            report.stage
        );

        PartSignals {
            material: material.map(str::to_string),
            qty: Some(extract_quantity(&lower)),
            length_in: dims.length_in,
            width_in: dims.width_in,
            height_in: dims.height_in,
            material_weight_lbs: extract_weight(&lower),
            machining_minutes: None,
            complexity: Some(detect_complexity(&lower).to_string()),
            size: size.map(|s| s.to_string()),
            tolerance: None,
            notes: Some(String::new()),
            raw_text_preview: Some(text.chars().take(PREVIEW_CHARS).collect()),
            extraction_debug: Some(ExtractionDebug {
                text_length: text.chars().count(),
                found_length: dims.length_in.is_some(),
                found_width: dims.width_in.is_some(),
                found_height: dims.height_in.is_some(),
                raw_dimensions: RawDimensions {
                    length_in: dims.length_in,
                    width_in: dims.width_in,
                    height_in: dims.height_in,
                },
                stage: report.stage.unwrap_or("none").to_string(),
            }),
        }
    }
}

/// Extract signals with default thresholds
pub fn extract_signals(text: &str) -> PartSignals {
    SignalAggregator::default().extract(text)
}
