use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;

static ISO_DURATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^P(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?)?$").expect("valid regex")
});

/// `PT2H30M` becomes `2h 30m`. Unrecognised input is returned unchanged.
pub fn format_duration(raw: &str) -> String {
    let Some(captures) = ISO_DURATION.captures(raw.trim()) else {
        return raw.to_string();
    };

    let parts = [(1, "d"), (2, "h"), (3, "m")]
        .into_iter()
        .filter_map(|(index, unit)| {
            captures
                .get(index)
                .and_then(|value| value.as_str().parse::<u32>().ok())
                .map(|value| format!("{value}{unit}"))
        })
        .collect::<Vec<_>>();

    if parts.is_empty() {
        raw.to_string()
    } else {
        parts.join(" ")
    }
}

/// Departure/arrival stamps are airport-local without an offset; they are kept
/// in that zone and only re-rendered.
pub fn format_local_time(raw: &str) -> String {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
        .map(|value| value.format("%d %b %Y, %H:%M").to_string())
        .unwrap_or_else(|_| raw.to_string())
}
