//! Estimation engine - price a part from its signal map
//!
//! Pure and synchronous. The only shared state is the read-only tables in
//! [`tables`], so one engine can serve any number of callers.

pub mod result;
pub mod tables;

pub use result::{Breakdown, Confidence, EstimateResult, Inferred, PendingEstimate, QuotedEstimate};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::signals::{Complexity, PartSignals, SizeClass, Tolerance};
use tables::{
    lead_time_days, material_params, material_params_or_default, BASE_MACHINE_RATE_PER_MIN,
    DEFAULT_MACHINING_MINUTES, OVERHEAD_MULTIPLIER,
};

/// Message attached to every not-ready estimate
pub const NOT_READY_MESSAGE: &str = "Need a few more details to generate a quote.";

/// How the engine treats inputs it cannot infer from the signals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum ReadinessPolicy {
    /// Fall back to fixed defaults with low confidence; only material blocks
    #[default]
    Lenient,
    /// Report uninferable machining time or weight as missing inputs
    Strict,
}

impl std::fmt::Display for ReadinessPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadinessPolicy::Lenient => write!(f, "lenient"),
            ReadinessPolicy::Strict => write!(f, "strict"),
        }
    }
}

impl std::str::FromStr for ReadinessPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lenient" => Ok(ReadinessPolicy::Lenient),
            "strict" => Ok(ReadinessPolicy::Strict),
            _ => Err(format!("Unknown policy: {}. Use lenient or strict", s)),
        }
    }
}

/// Trim and lowercase, treating blank as absent
fn normalize(value: Option<&str>) -> Option<String> {
    value
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Normalized view of the signal map the engine works on
struct NormalizedInputs {
    material: Option<String>,
    qty: u32,
    complexity: String,
    size: String,
    tolerance: String,
    dims: Option<(f64, f64, f64)>,
    machining_minutes: Option<f64>,
    material_weight_lbs: Option<f64>,
}

impl NormalizedInputs {
    fn from_signals(signals: &PartSignals) -> Self {
        let dims = match (signals.length_in, signals.width_in, signals.height_in) {
            (Some(l), Some(w), Some(h)) => Some((l, w, h)),
            _ => None,
        };

        Self {
            material: normalize(signals.material.as_deref()),
            qty: signals.qty.filter(|q| *q > 0).unwrap_or(1),
            complexity: normalize(signals.complexity.as_deref())
                .unwrap_or_else(|| Complexity::default().to_string()),
            size: normalize(signals.size.as_deref())
                .unwrap_or_else(|| SizeClass::default().to_string()),
            tolerance: normalize(signals.tolerance.as_deref())
                .unwrap_or_else(|| Tolerance::default().to_string()),
            dims,
            machining_minutes: signals.machining_minutes,
            material_weight_lbs: signals.material_weight_lbs,
        }
    }
}

/// An inferred value and whether it came from a blind fallback
struct Inference {
    value: f64,
    fallback: bool,
}

/// Turns signal maps into estimates
#[derive(Debug, Clone, Copy, Default)]
pub struct EstimationEngine {
    policy: ReadinessPolicy,
}

impl EstimationEngine {
    pub fn new(policy: ReadinessPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> ReadinessPolicy {
        self.policy
    }

    /// Machining minutes from complexity and size
    fn infer_machining_minutes(&self, inputs: &NormalizedInputs) -> Option<Inference> {
        let size_factor = inputs
            .size
            .parse::<SizeClass>()
            .map(|s| s.time_factor())
            .unwrap_or(1.0);

        match inputs.complexity.parse::<Complexity>() {
            Ok(complexity) => Some(Inference {
                value: (complexity.base_minutes() * size_factor).round(),
                fallback: false,
            }),
            Err(_) => match self.policy {
                ReadinessPolicy::Lenient => Some(Inference {
                    value: DEFAULT_MACHINING_MINUTES,
                    fallback: true,
                }),
                ReadinessPolicy::Strict => None,
            },
        }
    }

    /// Per-part weight from geometry and density, or a size default
    fn infer_weight(&self, inputs: &NormalizedInputs) -> Option<Inference> {
        let density = inputs
            .material
            .as_deref()
            .and_then(material_params)
            .and_then(|p| p.density_lb_per_in3);

        if let (Some((l, w, h)), Some(density)) = (inputs.dims, density) {
            return Some(Inference {
                value: round2(l * w * h * density),
                fallback: false,
            });
        }

        match self.policy {
            ReadinessPolicy::Lenient => Some(Inference {
                value: inputs
                    .size
                    .parse::<SizeClass>()
                    .map(|s| s.default_weight_lbs())
                    .unwrap_or_else(|_| SizeClass::default().default_weight_lbs()),
                fallback: true,
            }),
            ReadinessPolicy::Strict => None,
        }
    }

    pub fn estimate(&self, signals: &PartSignals) -> EstimateResult {
        let inputs = NormalizedInputs::from_signals(signals);

        let mut missing: Vec<String> = Vec::new();
        let mut inferred = Inferred::default();
        let mut confidence = Confidence::High;

        if inputs.material.is_none() {
            missing.push("material".to_string());
        }

        let machining_minutes = match inputs.machining_minutes {
            Some(m) => Some(m),
            None => match self.infer_machining_minutes(&inputs) {
                Some(inference) => {
                    inferred.machining_minutes = Some(inference.value);
                    confidence = confidence.downgrade(if inference.fallback {
                        Confidence::Low
                    } else {
                        Confidence::Medium
                    });
                    Some(inference.value)
                }
                None => {
                    missing.push("machining_minutes".to_string());
                    None
                }
            },
        };

        let weight = match inputs.material_weight_lbs {
            Some(w) => Some(w),
            None => match self.infer_weight(&inputs) {
                Some(inference) => {
                    inferred.material_weight_lbs = Some(inference.value);
                    confidence = confidence.downgrade(if inference.fallback {
                        Confidence::Low
                    } else {
                        Confidence::Medium
                    });
                    Some(inference.value)
                }
                None => {
                    missing.push("material_weight_lbs".to_string());
                    None
                }
            },
        };

        if inferred.machining_minutes.is_some() && inferred.material_weight_lbs.is_some() {
            confidence = Confidence::Low;
        }

        let (material, machining_minutes, weight) = match (inputs.material.clone(), machining_minutes, weight) {
            (Some(material), Some(m), Some(w)) if missing.is_empty() => (material, m, w),
            _ => {
                debug!("estimate not ready, missing {:?}", missing);
                return EstimateResult::NotReady(PendingEstimate {
                    missing_inputs: missing,
                    message: NOT_READY_MESSAGE.to_string(),
                    confidence,
                    inferred,
                });
            }
        };

        let complexity_factor = inputs
            .complexity
            .parse::<Complexity>()
            .unwrap_or_default()
            .rate_factor();
        let tolerance_factor = inputs
            .tolerance
            .parse::<Tolerance>()
            .map(|t| t.rate_factor())
            .unwrap_or(1.0);
        let params = material_params_or_default(&material);

        let machine_rate = BASE_MACHINE_RATE_PER_MIN
            * complexity_factor
            * tolerance_factor
            * params.machining_multiplier;
        let machining_cost = machining_minutes * machine_rate;
        let material_cost = weight * params.material_rate_per_lb;
        let subtotal = machining_cost + material_cost;
        let total_each = round2(subtotal * OVERHEAD_MULTIPLIER);
        let total_all = total_each * f64::from(inputs.qty);
        let lead_time = lead_time_days(machining_minutes, &material);

        debug!(
            "estimate ready: {} x {} at {:.2}/min, total {:.2}",
            inputs.qty, material, machine_rate, total_all
        );

        EstimateResult::Ready(QuotedEstimate {
            cost_usd: round2(total_all),
            lead_time_days: lead_time,
            confidence,
            inferred,
            breakdown: Breakdown {
                qty: inputs.qty,
                material,
                machining_minutes_each: round2(machining_minutes),
                material_weight_lbs_each: round2(weight),
                base_machine_rate_per_min: BASE_MACHINE_RATE_PER_MIN,
                complexity_factor,
                tolerance_factor,
                material_machining_multiplier: params.machining_multiplier,
                machine_rate_per_min: round2(machine_rate),
                material_rate_per_lb: params.material_rate_per_lb,
                machining_cost_each: round2(machining_cost),
                material_cost_each: round2(material_cost),
                subtotal_each: round2(subtotal),
                multiplier: OVERHEAD_MULTIPLIER,
                total_each,
                total_all,
            },
        })
    }
}

/// Estimate with the default (lenient) policy
pub fn compute_estimate(signals: &PartSignals) -> EstimateResult {
    EstimationEngine::default().estimate(signals)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_inputs() -> PartSignals {
        PartSignals {
            material: Some("aluminum".to_string()),
            machining_minutes: Some(60.0),
            material_weight_lbs: Some(2.0),
            qty: Some(10),
            complexity: Some("moderate".to_string()),
            tolerance: Some("normal".to_string()),
            ..Default::default()
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_fully_specified_aluminum_quote() {
        let result = compute_estimate(&scenario_inputs());
        let quoted = result.quoted().expect("should be ready");
        let b = &quoted.breakdown;

        assert_close(b.machine_rate_per_min, 2.3);
        assert_close(b.machining_cost_each, 138.0);
        assert_close(b.material_cost_each, 6.0);
        assert_close(b.subtotal_each, 144.0);
        assert_close(b.total_each, 180.0);
        assert_close(b.total_all, 1800.0);
        assert_close(quoted.cost_usd, 1800.0);
        assert_eq!(quoted.lead_time_days, 5);
        assert_eq!(quoted.confidence, Confidence::High);
        assert!(quoted.inferred.is_empty());
    }

    #[test]
    fn test_missing_material_is_not_ready() {
        let result = compute_estimate(&PartSignals::default());

        assert!(!result.is_ready());
        assert_eq!(result.missing_inputs(), ["material".to_string()]);
        // moderate (60) x medium (1.3)
        assert_eq!(result.inferred().machining_minutes, Some(78.0));
        assert_eq!(result.inferred().material_weight_lbs, Some(2.0));
        assert_eq!(result.confidence(), Confidence::Low);

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["ready"], false);
        assert_eq!(value["message"], NOT_READY_MESSAGE);
    }

    #[test]
    fn test_strict_policy_reports_uninferable_inputs() {
        let signals = PartSignals {
            material: Some("brass".to_string()),
            complexity: Some("baroque".to_string()),
            ..Default::default()
        };
        let result = EstimationEngine::new(ReadinessPolicy::Strict).estimate(&signals);

        assert!(!result.is_ready());
        assert_eq!(
            result.missing_inputs(),
            ["machining_minutes".to_string(), "material_weight_lbs".to_string()]
        );
    }

    #[test]
    fn test_lenient_policy_defaults_unknown_complexity() {
        let signals = PartSignals {
            material: Some("brass".to_string()),
            complexity: Some("baroque".to_string()),
            material_weight_lbs: Some(1.0),
            ..Default::default()
        };
        let result = compute_estimate(&signals);
        let quoted = result.quoted().expect("lenient never blocks on minutes");

        assert_eq!(quoted.inferred.machining_minutes, Some(DEFAULT_MACHINING_MINUTES));
        assert_eq!(quoted.confidence, Confidence::Low);
        // unknown complexity prices at the moderate tier, unknown material at 3.0/1.0
        assert_close(quoted.breakdown.complexity_factor, 1.15);
        assert_close(quoted.breakdown.material_rate_per_lb, 3.0);
        assert_close(quoted.breakdown.material_machining_multiplier, 1.0);
    }

    #[test]
    fn test_one_inference_gives_medium_confidence() {
        let signals = PartSignals {
            material: Some("steel".to_string()),
            material_weight_lbs: Some(3.0),
            complexity: Some("simple".to_string()),
            size: Some("small".to_string()),
            ..Default::default()
        };
        let quoted = compute_estimate(&signals);
        let quoted = quoted.quoted().unwrap();

        assert_eq!(quoted.inferred.machining_minutes, Some(30.0));
        assert_eq!(quoted.confidence, Confidence::Medium);
        assert_eq!(quoted.lead_time_days, 3);
    }

    #[test]
    fn test_weight_from_geometry_and_density() {
        let signals = PartSignals {
            material: Some("Aluminum".to_string()),
            machining_minutes: Some(30.0),
            length_in: Some(4.0),
            width_in: Some(2.0),
            height_in: Some(1.0),
            ..Default::default()
        };
        let result = compute_estimate(&signals);
        let quoted = result.quoted().unwrap();

        // 8 in^3 x 0.0975
        assert_eq!(quoted.inferred.material_weight_lbs, Some(0.78));
        assert_eq!(quoted.confidence, Confidence::Medium);
        assert_eq!(quoted.breakdown.material, "aluminum");
    }

    #[test]
    fn test_both_inferred_gives_low_confidence() {
        let signals = PartSignals {
            material: Some("steel".to_string()),
            length_in: Some(2.0),
            width_in: Some(2.0),
            height_in: Some(2.0),
            ..Default::default()
        };
        let result = compute_estimate(&signals);
        assert!(result.is_ready());
        assert_eq!(result.confidence(), Confidence::Low);
    }

    #[test]
    fn test_hard_material_lead_time_and_rates() {
        let signals = PartSignals {
            material: Some("titanium".to_string()),
            machining_minutes: Some(100.0),
            material_weight_lbs: Some(1.0),
            tolerance: Some("aerospace".to_string()),
            complexity: Some("complex".to_string()),
            ..Default::default()
        };
        let result = compute_estimate(&signals);
        let quoted = result.quoted().unwrap();

        assert_eq!(quoted.lead_time_days, 9);
        // 2.0 x 1.4 x 1.7 x 1.5
        assert_close(quoted.breakdown.machine_rate_per_min, 7.14);
        assert_close(quoted.breakdown.material_cost_each, 10.0);
    }

    #[test]
    fn test_total_all_is_exact_multiple() {
        for qty in [1u32, 3, 7, 13, 250] {
            let signals = PartSignals {
                material: Some("stainless".to_string()),
                machining_minutes: Some(47.0),
                material_weight_lbs: Some(1.37),
                tolerance: Some("tight".to_string()),
                qty: Some(qty),
                ..Default::default()
            };
            let result = compute_estimate(&signals);
            let quoted = result.quoted().unwrap();
            let b = &quoted.breakdown;
            assert_eq!(b.total_all, b.total_each * f64::from(b.qty));
            assert_eq!(quoted.cost_usd, round2(b.total_all));
            assert!(result.missing_inputs().is_empty());
        }
    }

    #[test]
    fn test_zero_qty_counts_as_one() {
        let mut signals = scenario_inputs();
        signals.qty = Some(0);
        let result = compute_estimate(&signals);
        assert_eq!(result.quoted().unwrap().breakdown.qty, 1);

        signals.qty = None;
        assert_eq!(compute_estimate(&signals).quoted().unwrap().breakdown.qty, 1);
    }

    #[test]
    fn test_lead_time_boundaries_through_engine() {
        for (minutes, days) in [(45.0, 3), (46.0, 5), (90.0, 5), (91.0, 7)] {
            let mut signals = scenario_inputs();
            signals.machining_minutes = Some(minutes);
            let result = compute_estimate(&signals);
            assert_eq!(result.quoted().unwrap().lead_time_days, days);
        }
    }

    #[test]
    fn test_ready_wire_field_names() {
        let value = serde_json::to_value(compute_estimate(&scenario_inputs())).unwrap();
        for key in ["ready", "cost_usd", "lead_time_days", "confidence", "inferred", "breakdown"] {
            assert!(value.get(key).is_some(), "missing key {}", key);
        }
        assert!(value.get("missing_inputs").is_none());
        assert_eq!(value["confidence"], "high");
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("STRICT".parse::<ReadinessPolicy>().unwrap(), ReadinessPolicy::Strict);
        assert_eq!(ReadinessPolicy::default(), ReadinessPolicy::Lenient);
        assert!("lax".parse::<ReadinessPolicy>().is_err());
    }
}
