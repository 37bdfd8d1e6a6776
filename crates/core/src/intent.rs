use chrono::{Local, NaiveDate};

use crate::extract::extract_flight_query_on;
use crate::models::{Language, LanguageInfo, QueryClassification};

const FLIGHT_KEYWORDS: &[&str] = &[
    "flight",
    "fly",
    "ticket",
    "booking",
    "reservation",
    "from",
    "to",
    "departure",
    "arrival",
    "destination",
    "available flights",
    "show flights",
    "search flights",
    "price",
    "cost",
    "cheap",
    "cheapest",
    "route",
    "schedule",
    "departure date",
    "return date",
];

const AIRLINE_INFO_KEYWORDS: &[&str] = &[
    "baggage",
    "luggage",
    "carry-on",
    "checked",
    "weight",
    "kg",
    "allowance",
    "check-in",
    "checkin",
    "online check",
    "airport check",
    "cancel",
    "cancellation",
    "refund",
    "change",
    "modify",
    "policy",
    "policies",
    "meal",
    "food",
    "entertainment",
    "frequent flyer",
    "miles",
    "lounge",
    "vip",
    "maharaja club",
    "maharaja",
    "loyalty program",
    "visa",
    "documentation",
    "requirements",
    "pet",
    "sports equipment",
    "wheelchair",
    "disability",
    "special assistance",
];

const HINDI_KEYWORDS: &[&str] = &[
    "क्या", "है", "में", "के", "लिए", "कर", "हो", "से", "पर", "या", "उड़ान", "टिकट", "बुकिंग",
    "सामान", "चेक-इन", "रद्द", "रिफंड", "महाराजा", "क्लब", "मील", "सेवा", "सहायता", "नमस्ते",
    "कृपया", "जानकारी", "बताएं", "मदद", "प्रश्न", "उत्तर", "kya", "hai", "mujhe", "chahiye",
    "kaise", "kitna", "kitne", "batao", "bataiye", "kripya", "namaste", "udaan", "samaan",
    "dhanyavad", "madad",
];

pub fn normalize_text(input: &str) -> String {
    input
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

/// Devanagari script or a curated Hindi word selects Hindi; everything else is English.
pub fn detect_language(text: &str) -> Language {
    if text.trim().is_empty() {
        return Language::En;
    }

    if text
        .chars()
        .any(|ch| ('\u{0900}'..='\u{097F}').contains(&ch))
    {
        return Language::Hi;
    }

    let lower = text.to_lowercase();
    let has_keyword = lower
        .split(|ch: char| !(ch.is_alphanumeric() || ch == '-'))
        .filter(|word| !word.is_empty())
        .any(|word| HINDI_KEYWORDS.contains(&word));

    if has_keyword {
        Language::Hi
    } else {
        Language::En
    }
}

pub fn language_info(language: Language) -> LanguageInfo {
    match language {
        Language::Hi => LanguageInfo {
            language,
            response_language: "Hindi".to_string(),
            instruction: "आपको हिंदी में जवाब देना चाहिए। उपयोगकर्ता ने हिंदी में प्रश्न पूछा है, इसलिए आपको हिंदी में ही जवाब देना होगा।".to_string(),
        },
        Language::En => LanguageInfo {
            language,
            response_language: "English".to_string(),
            instruction: "You must respond in English. The user asked in English, so you must respond in English.".to_string(),
        },
    }
}

pub fn classify_query(text: &str) -> QueryClassification {
    classify_query_on(text, Local::now().date_naive())
}

/// A successful structured extraction always wins. Keyword-only flight intent is
/// suppressed by any airline-info keyword, and a message matching neither set still
/// asks for scraped knowledge.
pub fn classify_query_on(text: &str, today: NaiveDate) -> QueryClassification {
    if let Some(params) = extract_flight_query_on(text, today) {
        return QueryClassification::flight_search(Some(params));
    }

    let lower = text.to_lowercase();
    let has_flight_keyword = contains_any(&lower, FLIGHT_KEYWORDS);
    let has_info_keyword = contains_any(&lower, AIRLINE_INFO_KEYWORDS);

    match (has_flight_keyword, has_info_keyword) {
        (true, false) => QueryClassification::flight_search(None),
        (_, true) | (false, false) => QueryClassification::airline_info(),
    }
}

fn contains_any(input: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| input.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QueryKind;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    #[test]
    fn detects_hindi_script_and_keywords() {
        assert_eq!(detect_language("मुझे बैगेज की जानकारी चाहिए"), Language::Hi);
        assert_eq!(detect_language("baggage kitna allowed hai?"), Language::Hi);
        assert_eq!(detect_language("What is the baggage allowance?"), Language::En);
        assert_eq!(detect_language("flights to Shanghai"), Language::En);
        assert_eq!(detect_language("   "), Language::En);
    }

    #[test]
    fn language_info_names_the_response_language() {
        assert_eq!(language_info(Language::En).response_language, "English");
        assert_eq!(language_info(Language::Hi).response_language, "Hindi");
    }

    #[test]
    fn structured_flight_query_is_flight_search() {
        let result = classify_query_on("Show me flights from New York to London", today());
        assert_eq!(result.kind, QueryKind::FlightSearch);
        assert!(result.needs_flight_api);
        assert!(!result.needs_scraping);
        assert_eq!(result.flight_query.unwrap().origin_code, "JFK");
    }

    #[test]
    fn baggage_question_is_airline_info() {
        let result = classify_query_on("What is the baggage allowance?", today());
        assert_eq!(result.kind, QueryKind::AirlineInfo);
        assert!(result.needs_scraping);
        assert!(!result.needs_flight_api);
        assert!(result.flight_query.is_none());
    }

    #[test]
    fn extraction_beats_info_keywords() {
        let result = classify_query_on(
            "What is the baggage allowance on flights from Delhi to London?",
            today(),
        );
        assert_eq!(result.kind, QueryKind::FlightSearch);
        assert!(result.flight_query.is_some());
    }

    #[test]
    fn info_keywords_suppress_keyword_only_flight_intent() {
        let result = classify_query_on("Can I get a refund on my ticket?", today());
        assert_eq!(result.kind, QueryKind::AirlineInfo);

        let result = classify_query_on("show me the cheapest flight", today());
        assert_eq!(result.kind, QueryKind::FlightSearch);
        assert!(result.flight_query.is_none());
        assert!(!result.wants_flight_search());
    }

    #[test]
    fn unmatched_text_still_requests_knowledge() {
        let result = classify_query_on("hello there", today());
        assert_eq!(result.kind, QueryKind::AirlineInfo);
        assert!(result.needs_scraping);
    }
}
