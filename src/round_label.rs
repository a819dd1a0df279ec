use once_cell::sync::Lazy;
use regex::Regex;

static ROUND_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)ROUND\s*(\d+)").expect("round pattern should compile"));

pub fn normalize_round_label(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    match ROUND_PATTERN.captures(text).and_then(|caps| caps.get(1)) {
        Some(number) => format!("Round {}", number.as_str()),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::normalize_round_label;

    #[test]
    fn extracts_round_from_surrounding_text() {
        assert_eq!(normalize_round_label("  the ROUND 3 fixtures  "), "Round 3");
        assert_eq!(normalize_round_label("round12"), "Round 12");
        assert_eq!(normalize_round_label("Season 5 Round   7 (Div 1)"), "Round 7");
    }

    #[test]
    fn leaves_other_headers_alone() {
        assert_eq!(normalize_round_label("Quarter Finals"), "Quarter Finals");
        assert_eq!(normalize_round_label("ROUND ROBIN"), "ROUND ROBIN");
        assert_eq!(normalize_round_label(""), "");
    }
}
