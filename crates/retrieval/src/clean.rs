use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static DISALLOWED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_\s.,;:!?()\-/]").expect("valid regex"));

const NAVIGATION_WORDS: &[&str] = &[
    "home", "menu", "search", "login", "sign up", "cookie", "privacy", "terms",
];

/// Collapses whitespace, blanks out anything beyond basic punctuation, and
/// truncates to `max_chars` characters.
pub fn clean_text(text: &str, max_chars: usize) -> String {
    let collapsed = WHITESPACE.replace_all(text, " ");
    let stripped = DISALLOWED.replace_all(&collapsed, " ");
    WHITESPACE
        .replace_all(&stripped, " ")
        .trim()
        .chars()
        .take(max_chars)
        .collect()
}

/// Short strings mentioning site chrome ("home", "login", ...) are treated as
/// navigation rather than content.
pub fn is_navigation_text(text: &str) -> bool {
    if text.chars().count() >= 50 {
        return false;
    }
    let lower = text.to_lowercase();
    NAVIGATION_WORDS.iter().any(|word| lower.contains(word))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace_and_strips_symbols() {
        let cleaned = clean_text("  Cabin bags:\n\n 7kg ★ max  (per guest) — see €fees ", 5000);
        assert_eq!(cleaned, "Cabin bags: 7kg max (per guest) see fees");
    }

    #[test]
    fn truncates_to_limit() {
        let cleaned = clean_text(&"a".repeat(6000), 5000);
        assert_eq!(cleaned.len(), 5000);
    }

    #[test]
    fn navigation_text_is_short_and_chrome_like() {
        assert!(is_navigation_text("Home | Login"));
        assert!(is_navigation_text("Read our Privacy notice"));
        assert!(!is_navigation_text(
            "Use the search facility at the airport kiosk to locate your booking quickly."
        ));
        assert!(!is_navigation_text("Checked baggage allowance per fare"));
    }
}
