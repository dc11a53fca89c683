//! Estimate result types
//!
//! [`EstimateResult`] serializes as one flat map with a `ready` flag; the
//! field names are a contract with API consumers.

use serde::{Deserialize, Serialize};

/// Coarse reliability label
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    /// Lower the confidence to at most `to`
    pub fn downgrade(self, to: Confidence) -> Confidence {
        self.min(to)
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Confidence::Low => write!(f, "low"),
            Confidence::Medium => write!(f, "medium"),
            Confidence::High => write!(f, "high"),
        }
    }
}

/// Values the engine filled in instead of receiving them
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Inferred {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machining_minutes: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_weight_lbs: Option<f64>,
}

impl Inferred {
    pub fn is_empty(&self) -> bool {
        self.machining_minutes.is_none() && self.material_weight_lbs.is_none()
    }
}

/// Per-part pricing detail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    pub qty: u32,
    pub material: String,
    pub machining_minutes_each: f64,
    pub material_weight_lbs_each: f64,
    pub base_machine_rate_per_min: f64,
    pub complexity_factor: f64,
    pub tolerance_factor: f64,
    pub material_machining_multiplier: f64,
    pub machine_rate_per_min: f64,
    pub material_rate_per_lb: f64,
    pub machining_cost_each: f64,
    pub material_cost_each: f64,
    pub subtotal_each: f64,
    pub multiplier: f64,
    pub total_each: f64,
    /// `total_each * qty`, left unrounded so it may carry float noise in
    /// the last digits. `cost_usd` holds the rounded figure.
    pub total_all: f64,
}

/// Not enough signals to price the part
#[derive(Debug, Clone, PartialEq)]
pub struct PendingEstimate {
    /// Field names, in the order they were found missing
    pub missing_inputs: Vec<String>,
    pub message: String,
    pub confidence: Confidence,
    pub inferred: Inferred,
}

/// A priced estimate
#[derive(Debug, Clone, PartialEq)]
pub struct QuotedEstimate {
    pub cost_usd: f64,
    pub lead_time_days: u32,
    pub confidence: Confidence,
    pub inferred: Inferred,
    pub breakdown: Breakdown,
}

/// Outcome of the estimation engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "EstimateWire", try_from = "EstimateWire")]
pub enum EstimateResult {
    NotReady(PendingEstimate),
    Ready(QuotedEstimate),
}

impl EstimateResult {
    pub fn is_ready(&self) -> bool {
        matches!(self, EstimateResult::Ready(_))
    }

    pub fn confidence(&self) -> Confidence {
        match self {
            EstimateResult::NotReady(p) => p.confidence,
            EstimateResult::Ready(q) => q.confidence,
        }
    }

    pub fn inferred(&self) -> &Inferred {
        match self {
            EstimateResult::NotReady(p) => &p.inferred,
            EstimateResult::Ready(q) => &q.inferred,
        }
    }

    /// Missing field names (empty when ready)
    pub fn missing_inputs(&self) -> &[String] {
        match self {
            EstimateResult::NotReady(p) => &p.missing_inputs,
            EstimateResult::Ready(_) => &[],
        }
    }

    pub fn quoted(&self) -> Option<&QuotedEstimate> {
        match self {
            EstimateResult::Ready(q) => Some(q),
            EstimateResult::NotReady(_) => None,
        }
    }
}

/// Flat serialized form shared by both variants
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EstimateWire {
    ready: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    missing_inputs: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    cost_usd: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    lead_time_days: Option<u32>,

    confidence: Confidence,

    #[serde(default)]
    inferred: Inferred,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    breakdown: Option<Breakdown>,
}

impl From<EstimateResult> for EstimateWire {
    fn from(result: EstimateResult) -> Self {
        match result {
            EstimateResult::NotReady(p) => EstimateWire {
                ready: false,
                missing_inputs: Some(p.missing_inputs),
                message: Some(p.message),
                cost_usd: None,
                lead_time_days: None,
                confidence: p.confidence,
                inferred: p.inferred,
                breakdown: None,
            },
            EstimateResult::Ready(q) => EstimateWire {
                ready: true,
                missing_inputs: None,
                message: None,
                cost_usd: Some(q.cost_usd),
                lead_time_days: Some(q.lead_time_days),
                confidence: q.confidence,
                inferred: q.inferred,
                breakdown: Some(q.breakdown),
            },
        }
    }
}

impl TryFrom<EstimateWire> for EstimateResult {
    type Error = String;

    fn try_from(wire: EstimateWire) -> Result<Self, Self::Error> {
        if !wire.ready {
            return Ok(EstimateResult::NotReady(PendingEstimate {
                missing_inputs: wire.missing_inputs.unwrap_or_default(),
                message: wire.message.unwrap_or_default(),
                confidence: wire.confidence,
                inferred: wire.inferred,
            }));
        }

        match (wire.cost_usd, wire.lead_time_days, wire.breakdown) {
            (Some(cost_usd), Some(lead_time_days), Some(breakdown)) => {
                Ok(EstimateResult::Ready(QuotedEstimate {
                    cost_usd,
                    lead_time_days,
                    confidence: wire.confidence,
                    inferred: wire.inferred,
                    breakdown,
                }))
            }
            _ => Err("ready estimate requires cost_usd, lead_time_days and breakdown".to_string()),
        }
    }
}
