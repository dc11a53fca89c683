//! Static rate and factor tables
//!
//! Process-wide, read-only. Nothing here is mutated at runtime.

use crate::signals::{Complexity, SizeClass, Tolerance};

/// Baseline machining rate ($/min) before multipliers
pub const BASE_MACHINE_RATE_PER_MIN: f64 = 2.0;

/// Markup applied to the machining + material subtotal
pub const OVERHEAD_MULTIPLIER: f64 = 1.25;

/// Machining minutes used when complexity is unrecognized (lenient policy)
pub const DEFAULT_MACHINING_MINUTES: f64 = 60.0;

/// Per-material pricing row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialParams {
    /// lb / in^3, `None` when weight cannot be estimated from volume
    pub density_lb_per_in3: Option<f64>,
    /// Raw stock cost, $/lb
    pub material_rate_per_lb: f64,
    /// How much harder the material is to machine than aluminum
    pub machining_multiplier: f64,
}

/// Row used for unrecognized materials
pub const DEFAULT_MATERIAL_PARAMS: MaterialParams = MaterialParams {
    density_lb_per_in3: None,
    material_rate_per_lb: 3.0,
    machining_multiplier: 1.0,
};

const ALUMINUM: MaterialParams = MaterialParams {
    density_lb_per_in3: Some(0.0975),
    material_rate_per_lb: 3.0,
    machining_multiplier: 1.0,
};

const STAINLESS: MaterialParams = MaterialParams {
    density_lb_per_in3: Some(0.290),
    material_rate_per_lb: 4.5,
    machining_multiplier: 1.25,
};

/// Known materials keyed by normalized name
pub const MATERIAL_TABLE: &[(&str, MaterialParams)] = &[
    ("aluminum", ALUMINUM),
    ("aluminium", ALUMINUM),
    (
        "steel",
        MaterialParams {
            density_lb_per_in3: Some(0.283),
            material_rate_per_lb: 2.8,
            machining_multiplier: 1.1,
        },
    ),
    (
        "mild steel",
        MaterialParams {
            density_lb_per_in3: Some(0.283),
            material_rate_per_lb: 2.5,
            machining_multiplier: 1.1,
        },
    ),
    ("stainless", STAINLESS),
    ("stainless steel", STAINLESS),
    (
        "titanium",
        MaterialParams {
            density_lb_per_in3: Some(0.160),
            material_rate_per_lb: 10.0,
            machining_multiplier: 1.5,
        },
    ),
];

/// Look up a normalized material name
pub fn material_params(material: &str) -> Option<&'static MaterialParams> {
    MATERIAL_TABLE
        .iter()
        .find(|(name, _)| *name == material)
        .map(|(_, params)| params)
}

/// Same as [`material_params`], falling back to the default row
pub fn material_params_or_default(material: &str) -> &'static MaterialParams {
    material_params(material).unwrap_or(&DEFAULT_MATERIAL_PARAMS)
}

impl Complexity {
    /// Rule-of-thumb machining time per part
    pub fn base_minutes(&self) -> f64 {
        match self {
            Complexity::Simple => 30.0,
            Complexity::Moderate => 60.0,
            Complexity::Complex => 120.0,
        }
    }

    /// Machine rate multiplier
    pub fn rate_factor(&self) -> f64 {
        match self {
            Complexity::Simple => 1.0,
            Complexity::Moderate => 1.15,
            Complexity::Complex => 1.4,
        }
    }
}

impl SizeClass {
    /// Machining time multiplier
    pub fn time_factor(&self) -> f64 {
        match self {
            SizeClass::Small => 1.0,
            SizeClass::Medium => 1.3,
            SizeClass::Large => 1.8,
        }
    }

    /// Stock weight assumed when it cannot be computed from geometry
    pub fn default_weight_lbs(&self) -> f64 {
        match self {
            SizeClass::Small => 0.5,
            SizeClass::Medium => 2.0,
            SizeClass::Large => 5.0,
        }
    }
}

impl Tolerance {
    /// Machine rate multiplier
    pub fn rate_factor(&self) -> f64 {
        match self {
            Tolerance::Normal => 1.0,
            Tolerance::Tight => 1.3,
            Tolerance::Aerospace => 1.7,
        }
    }
}

/// Turnaround in days from machining time and material
pub fn lead_time_days(machining_minutes: f64, material: &str) -> u32 {
    let base = if machining_minutes <= 45.0 {
        3
    } else if machining_minutes <= 90.0 {
        5
    } else {
        7
    };

    let bump = if material.contains("titanium") {
        2
    } else if material.contains("stainless") {
        1
    } else {
        0
    };

    base + bump
}
