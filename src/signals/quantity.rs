//! Part quantity extraction

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// "qty: 10", "quantity = 4", "q 2"
    static ref RE_LABELED: Regex =
        Regex::new(r"\b(?:qty|quantity|q)\s*[=:]?\s*(\d+)\b").expect("labeled qty regex");

    /// "25 pcs", "4 parts"
    static ref RE_COUNTED: Regex =
        Regex::new(r"\b(\d+)\s*(?:parts|pieces|pcs|units)\b").expect("counted qty regex");

    /// "x10", "× 4"
    static ref RE_MULTIPLIER: Regex =
        Regex::new(r"(?:\bx|×)\s*(\d+(?:\.\d+)?)").expect("multiplier qty regex");
}

/// Extract a part quantity from lowercased text, defaulting to 1
///
/// Pattern classes are tried in order and the first class that matches
/// anything decides the result; values are never merged across classes.
pub fn extract_quantity(text: &str) -> u32 {
    first_positive(&RE_LABELED, text)
        .or_else(|| first_positive(&RE_COUNTED, text))
        .or_else(|| first_multiplier(text))
        .unwrap_or(1)
}

/// Parse a caller-supplied quantity, falling back to 1
pub fn parse_qty(input: &str) -> u32 {
    match input.trim().parse::<u32>() {
        Ok(0) | Err(_) => 1,
        Ok(qty) => qty,
    }
}

fn first_positive(re: &Regex, text: &str) -> Option<u32> {
    re.captures_iter(text)
        .filter_map(|caps| caps.get(1)?.as_str().parse::<u32>().ok())
        .find(|qty| *qty > 0)
}

/// A multiplier only counts when it is not part of a dimension chain
/// ("5 x 3 x 2") and the multiplied value is a whole number.
fn first_multiplier(text: &str) -> Option<u32> {
    RE_MULTIPLIER.captures_iter(text).find_map(|caps| {
        let whole = caps.get(0)?;
        let value = caps.get(1)?.as_str();
        if value.contains('.') {
            return None;
        }
        let follows_number = text[..whole.start()]
            .trim_end()
            .chars()
            .next_back()
            .is_some_and(|c| c.is_ascii_digit() || c == '.' || c == '"');
        if follows_number {
            return None;
        }
        value.parse::<u32>().ok().filter(|qty| *qty > 0)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labeled_quantity() {
        assert_eq!(extract_quantity("qty: 12 material aluminum"), 12);
        assert_eq!(extract_quantity("quantity = 4"), 4);
        assert_eq!(extract_quantity("q 3"), 3);
    }

    #[test]
    fn test_counted_quantity() {
        assert_eq!(extract_quantity("make 25 pcs of this bracket"), 25);
        assert_eq!(extract_quantity("2 units"), 2);
    }

    #[test]
    fn test_multiplier_quantity() {
        assert_eq!(extract_quantity("spacer x10"), 10);
        assert_eq!(extract_quantity("bushing × 6"), 6);
    }

    #[test]
    fn test_dimension_chain_is_not_a_multiplier() {
        assert_eq!(extract_quantity("5.5 x 3.2 x 2.1 in"), 1);
        assert_eq!(extract_quantity("4 × 2 × 1 block"), 1);
    }

    #[test]
    fn test_first_class_wins() {
        // Labeled beats counted even when counted appears first
        assert_eq!(extract_quantity("10 pcs ... qty: 3"), 3);
    }

    #[test]
    fn test_default_quantity() {
        assert_eq!(extract_quantity(""), 1);
        assert_eq!(extract_quantity("no numbers here"), 1);
    }

    #[test]
    fn test_parse_qty_non_integer_is_one() {
        for input in ["abc", "2.5", "", "  ", "-3", "0", "1e3", "ten"] {
            assert_eq!(parse_qty(input), 1, "input {:?}", input);
        }
        assert_eq!(parse_qty(" 42 "), 42);
    }
}
