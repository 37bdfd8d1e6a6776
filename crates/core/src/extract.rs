use std::ops::Range;

use chrono::{Days, Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::cities::{is_location_code, resolve_location};
use crate::models::{FlightSearchParams, TravelClass};

const FLIGHT_INTENT_KEYWORDS: &[&str] = &[
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
    "date",
    "when",
    "price",
    "cost",
];

// Dropped from a captured place phrase before it is resolved.
const FILLER_WORDS: &[&str] = &[
    "available",
    "right",
    "now",
    "today",
    "tomorrow",
    "what",
    "are",
    "is",
    "from",
    "to",
    "in",
    "the",
    "please",
    "flight",
    "flights",
];

struct LocationPatterns {
    code: Regex,
    phrase: Regex,
}

struct DatePatterns {
    iso: Regex,
    day_month_year: Regex,
}

static ORIGIN: Lazy<LocationPatterns> = Lazy::new(|| LocationPatterns {
    code: Regex::new(r"\b(?i:from|departure|leaving)\s+([A-Z]{3})\b").expect("valid origin code regex"),
    phrase: Regex::new(
        r"(?i)\b(?:from|departure|leaving)\s+([\p{L}\p{M}\s]+?)(?:\s+(?:to|on|for|with)\b|[^\p{L}\p{M}\s]|$)",
    )
    .expect("valid origin phrase regex"),
});

static DESTINATION: Lazy<LocationPatterns> = Lazy::new(|| LocationPatterns {
    code: Regex::new(r"\b(?i:to|destination|arriving|arrival)\s+([A-Z]{3})\b")
        .expect("valid destination code regex"),
    phrase: Regex::new(
        r"(?i)\b(?:to|destination|arriving|arrival)\s+([\p{L}\p{M}\s]+?)(?:\s+(?:on|date|for|with|in|from|return|returning|coming)\b|[^\p{L}\p{M}\s]|$)",
    )
    .expect("valid destination phrase regex"),
});

static DEPARTURE_DATE: Lazy<DatePatterns> = Lazy::new(|| DatePatterns {
    iso: Regex::new(r"\b(\d{4}-\d{2}-\d{2})\b").expect("valid iso date regex"),
    day_month_year: Regex::new(
        r"(?i)\b(?:on|date|departure date)\s+(\d{1,2}[/\-]\d{1,2}[/\-]\d{2,4})\b",
    )
    .expect("valid day-month-year regex"),
});

static RETURN_DATE: Lazy<DatePatterns> = Lazy::new(|| DatePatterns {
    iso: Regex::new(
        r"(?i)\b(?:return|returning|coming back|back)\s+(?:on\s+|date\s+)?(\d{4}-\d{2}-\d{2})\b",
    )
    .expect("valid return iso regex"),
    day_month_year: Regex::new(
        r"(?i)\b(?:return|returning|coming back|back)\s+(?:on\s+|date\s+)?(\d{1,2}[/\-]\d{1,2}[/\-]\d{2,4})\b",
    )
    .expect("valid return day-month-year regex"),
});

static ADULTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+)\s*(?:adults?|passengers?|people|persons|travell?ers)\b")
        .expect("valid adults regex")
});
static CHILDREN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+)\s*(?:child|children|kids?)\b").expect("valid children regex")
});
static INFANTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+)\s*(?:infants?|bab(?:y|ies))\b").expect("valid infants regex")
});
static CABIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(premium economy|business|first class|economy)\b").expect("valid cabin regex")
});

type LocationStrategy = fn(&str, &LocationPatterns) -> Option<String>;

/// Tried in order; the first hit wins. An explicit code always beats a resolved place name.
const LOCATION_STRATEGIES: [LocationStrategy; 2] = [explicit_code, resolved_phrase];

type DateParser = fn(&str) -> Option<NaiveDate>;

pub fn has_flight_intent(text: &str) -> bool {
    let lower = text.to_lowercase();
    FLIGHT_INTENT_KEYWORDS
        .iter()
        .any(|keyword| lower.contains(keyword))
}

/// Extracts a structured flight search, using tomorrow (local clock) as the default departure.
pub fn extract_flight_query(text: &str) -> Option<FlightSearchParams> {
    extract_flight_query_on(text, Local::now().date_naive())
}

/// Same as [`extract_flight_query`] with an explicit "today".
///
/// Returns `None` unless both origin and destination resolve to 3-letter codes.
pub fn extract_flight_query_on(text: &str, today: NaiveDate) -> Option<FlightSearchParams> {
    if !has_flight_intent(text) {
        return None;
    }

    let origin = locate(text, &ORIGIN)?;
    let destination = locate(text, &DESTINATION)?;

    let return_match = find_date(text, &RETURN_DATE, None);
    let return_span = return_match.as_ref().map(|(_, span)| span.clone());
    let departure_date = find_date(text, &DEPARTURE_DATE, return_span)
        .map(|(date, _)| date)
        .unwrap_or_else(|| today.checked_add_days(Days::new(1)).unwrap_or(today));

    Some(FlightSearchParams {
        origin_code: origin,
        destination_code: destination,
        departure_date,
        return_date: return_match.map(|(date, _)| date),
        adults: count(text, &ADULTS).filter(|adults| *adults > 0).unwrap_or(1),
        children: count(text, &CHILDREN).unwrap_or(0),
        infants: count(text, &INFANTS).unwrap_or(0),
        travel_class: CABIN
            .captures(text)
            .and_then(|captures| captures.get(1))
            .and_then(|cabin| TravelClass::parse(cabin.as_str()))
            .unwrap_or_default(),
    })
}

fn locate(text: &str, patterns: &LocationPatterns) -> Option<String> {
    LOCATION_STRATEGIES
        .iter()
        .find_map(|strategy| strategy(text, patterns))
        .filter(|code| is_location_code(code))
}

fn explicit_code(text: &str, patterns: &LocationPatterns) -> Option<String> {
    patterns
        .code
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|code| code.as_str().to_string())
}

fn resolved_phrase(text: &str, patterns: &LocationPatterns) -> Option<String> {
    patterns
        .phrase
        .captures_iter(text)
        .filter_map(|captures| captures.get(1))
        .find_map(|phrase| resolve_phrase(phrase.as_str()))
}

/// Full phrase, then its first two words, then its first word.
fn resolve_phrase(phrase: &str) -> Option<String> {
    let lower = phrase.to_lowercase();
    let words = lower
        .split_whitespace()
        .filter(|word| !FILLER_WORDS.contains(word))
        .collect::<Vec<_>>();

    if words.is_empty() {
        return None;
    }

    [words.len(), 2, 1]
        .into_iter()
        .filter(|take| *take <= words.len())
        .find_map(|take| resolve_location(&words[..take].join(" ")))
}

fn find_date(
    text: &str,
    patterns: &DatePatterns,
    skip: Option<Range<usize>>,
) -> Option<(NaiveDate, Range<usize>)> {
    let strategies: [(&Regex, DateParser); 2] = [
        (&patterns.iso, parse_iso_date),
        (&patterns.day_month_year, parse_day_month_year),
    ];

    strategies.iter().find_map(|(regex, parse)| {
        regex
            .captures_iter(text)
            .filter_map(|captures| captures.get(1))
            .filter(|found| skip.as_ref() != Some(&found.range()))
            .find_map(|found| parse(found.as_str()).map(|date| (date, found.range())))
    })
}

fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// `D/M/Y` or `D-M-Y`; two-digit years are read as 20YY.
fn parse_day_month_year(value: &str) -> Option<NaiveDate> {
    let parts = value.split(['/', '-']).collect::<Vec<_>>();
    let [day, month, year] = parts.as_slice() else {
        return None;
    };

    let day = day.parse::<u32>().ok()?;
    let month = month.parse::<u32>().ok()?;
    let year = match year.len() {
        2 => 2000 + year.parse::<i32>().ok()?,
        4 => year.parse::<i32>().ok()?,
        _ => return None,
    };

    NaiveDate::from_ymd_opt(year, month, day)
}

fn count(text: &str, pattern: &Regex) -> Option<u8> {
    pattern
        .captures(text)
        .and_then(|captures| captures.get(1))
        .and_then(|digits| digits.as_str().parse::<u8>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    #[test]
    fn resolves_city_names_and_defaults() {
        let params =
            extract_flight_query_on("Show me flights from New York to London", today()).unwrap();

        assert_eq!(params.origin_code, "JFK");
        assert_eq!(params.destination_code, "LHR");
        assert_eq!(params.departure_date, NaiveDate::from_ymd_opt(2025, 3, 15).unwrap());
        assert_eq!(params.return_date, None);
        assert_eq!(params.adults, 1);
        assert_eq!(params.children, 0);
        assert_eq!(params.infants, 0);
        assert_eq!(params.travel_class, TravelClass::Economy);
    }

    #[test]
    fn explicit_codes_win_over_city_names() {
        let params = extract_flight_query_on("flight from DEL to BOM", today()).unwrap();
        assert_eq!(params.origin_code, "DEL");
        assert_eq!(params.destination_code, "BOM");
    }

    #[test]
    fn reads_dates_passengers_and_cabin() {
        let params = extract_flight_query_on(
            "Business class flights from Delhi to Dubai on 5/4/25 for 2 adults, 1 child and 1 infant, return on 12/04/2025",
            today(),
        )
        .unwrap();

        assert_eq!(params.origin_code, "DEL");
        assert_eq!(params.destination_code, "DXB");
        assert_eq!(params.departure_date, NaiveDate::from_ymd_opt(2025, 4, 5).unwrap());
        assert_eq!(params.return_date, NaiveDate::from_ymd_opt(2025, 4, 12));
        assert_eq!(params.adults, 2);
        assert_eq!(params.children, 1);
        assert_eq!(params.infants, 1);
        assert_eq!(params.travel_class, TravelClass::Business);
    }

    #[test]
    fn iso_departure_is_not_taken_from_the_return_phrase() {
        let params = extract_flight_query_on(
            "fly from Paris to Rome, coming back 2025-06-20",
            today(),
        )
        .unwrap();

        assert_eq!(params.departure_date, NaiveDate::from_ymd_opt(2025, 3, 15).unwrap());
        assert_eq!(params.return_date, NaiveDate::from_ymd_opt(2025, 6, 20));

        let params = extract_flight_query_on(
            "fly from Paris to Rome 2025-06-01 return 2025-06-20",
            today(),
        )
        .unwrap();
        assert_eq!(params.departure_date, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
    }

    #[test]
    fn strips_filler_and_falls_back_to_word_prefixes() {
        let params = extract_flight_query_on(
            "what flights are available from Mumbai right now to Singapore tomorrow",
            today(),
        )
        .unwrap();
        assert_eq!(params.origin_code, "BOM");
        assert_eq!(params.destination_code, "SIN");
    }

    #[test]
    fn preposition_inside_a_word_is_ignored() {
        let params = extract_flight_query_on("flights from Toronto to Vancouver", today()).unwrap();
        assert_eq!(params.origin_code, "YYZ");
        assert_eq!(params.destination_code, "YVR");
    }

    #[test]
    fn devanagari_place_names_keep_their_vowel_signs() {
        let params = extract_flight_query_on("flights from दिल्ली to मुंबई", today()).unwrap();
        assert_eq!(params.origin_code, "DEL");
        assert_eq!(params.destination_code, "BOM");

        let params =
            extract_flight_query_on("flight from मुंबई to नई दिल्ली on 2025-04-02", today()).unwrap();
        assert_eq!(params.origin_code, "BOM");
        assert_eq!(params.destination_code, "DEL");
        assert_eq!(params.departure_date, NaiveDate::from_ymd_opt(2025, 4, 2).unwrap());
    }

    #[test]
    fn partial_routes_are_discarded() {
        assert!(extract_flight_query_on("I want to fly to Paris", today()).is_none());
        assert!(extract_flight_query_on("flights from Atlantis to London", today()).is_none());
    }

    #[test]
    fn no_flight_keywords_means_no_query() {
        assert!(extract_flight_query_on("What is the baggage allowance?", today()).is_none());
        assert!(!has_flight_intent("hello there"));
    }

    #[test]
    fn impossible_dates_fall_back_to_tomorrow() {
        let params =
            extract_flight_query_on("flight from Delhi to Goa on 31/02/2025", today()).unwrap();
        assert_eq!(params.departure_date, NaiveDate::from_ymd_opt(2025, 3, 15).unwrap());
    }
}
