//! Part weight extraction (pounds)

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref RE_LABELED: Regex =
        Regex::new(r"\b(?:weight|wt)\s*[=:]?\s*(\d+(?:\.\d+)?)\s*(?:lbs|lb|pounds)\b")
            .expect("labeled weight regex");
    static ref RE_BARE: Regex =
        Regex::new(r"(\d+(?:\.\d+)?)\s*(?:lbs|lb|pounds)\b").expect("bare weight regex");
}

/// Extract a weight in pounds from lowercased text
pub fn extract_weight(text: &str) -> Option<f64> {
    first_weight(&RE_LABELED, text).or_else(|| first_weight(&RE_BARE, text))
}

fn first_weight(re: &Regex, text: &str) -> Option<f64> {
    re.captures_iter(text)
        .filter_map(|caps| caps.get(1)?.as_str().parse::<f64>().ok())
        .find(|w| w.is_finite() && *w > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labeled_weight() {
        assert_eq!(extract_weight("weight: 3.5 lbs"), Some(3.5));
        assert_eq!(extract_weight("wt=12 pounds"), Some(12.0));
    }

    #[test]
    fn test_labeled_preferred_over_bare() {
        assert_eq!(extract_weight("stock 10 lbs, finished weight 4.2 lb"), Some(4.2));
    }

    #[test]
    fn test_bare_weight() {
        assert_eq!(extract_weight("approx 0.75 lbs each"), Some(0.75));
    }

    #[test]
    fn test_no_weight() {
        assert_eq!(extract_weight("weight: tbd"), None);
        assert_eq!(extract_weight("12 kg"), None);
        assert_eq!(extract_weight(""), None);
    }
}
