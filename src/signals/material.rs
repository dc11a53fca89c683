//! Material detection by vocabulary lookup

/// Recognized materials, in match priority order.
///
/// Multi-word entries must come before any single word they contain,
/// otherwise "mild steel" would resolve to "steel".
pub const MATERIAL_VOCABULARY: &[&str] = &[
    "aluminum",
    "aluminium",
    "stainless steel",
    "stainless",
    "mild steel",
    "steel",
    "titanium",
];

/// Return the first vocabulary entry found as a substring of `text`
///
/// `text` is expected to be lowercased already; the aggregator lowercases
/// once for all detectors.
pub fn detect_material(text: &str) -> Option<&'static str> {
    MATERIAL_VOCABULARY
        .iter()
        .copied()
        .find(|material| text.contains(material))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_simple_material() {
        assert_eq!(detect_material("material: aluminum 6061-t6"), Some("aluminum"));
        assert_eq!(detect_material("grade 5 titanium bar"), Some("titanium"));
    }

    #[test]
    fn test_mild_steel_wins_over_steel() {
        assert_eq!(detect_material("mild steel plate, 10 pcs"), Some("mild steel"));
    }

    #[test]
    fn test_stainless_steel_wins_over_steel() {
        assert_eq!(detect_material("304 stainless steel"), Some("stainless steel"));
        assert_eq!(detect_material("stainless 316"), Some("stainless"));
    }

    #[test]
    fn test_vocabulary_ordering_is_safe() {
        // An entry must never contain an entry listed before it
        for (i, longer) in MATERIAL_VOCABULARY.iter().enumerate() {
            for shorter in &MATERIAL_VOCABULARY[..i] {
                assert!(
                    !longer.contains(shorter),
                    "'{}' is shadowed by earlier entry '{}'",
                    longer,
                    shorter
                );
            }
        }
    }

    #[test]
    fn test_no_material() {
        assert_eq!(detect_material(""), None);
        assert_eq!(detect_material("brass fitting"), None);
    }
}
