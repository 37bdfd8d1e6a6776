use std::collections::HashMap;

use once_cell::sync::Lazy;

// First entry wins when an alias repeats; `alias_collisions` reports repeats that disagree.
const LOCATION_ALIASES: &[(&str, &str)] = &[
    // United States
    ("new york", "JFK"), ("nueva york", "JFK"), ("nyc", "JFK"), ("manhattan", "JFK"), ("ny", "JFK"),
    ("los angeles", "LAX"), ("la", "LAX"),
    ("san francisco", "SFO"), ("sf", "SFO"),
    ("chicago", "ORD"),
    ("miami", "MIA"),
    ("boston", "BOS"),
    ("washington", "IAD"), ("dc", "IAD"), ("washington dc", "IAD"),
    ("seattle", "SEA"),
    ("atlanta", "ATL"),
    ("houston", "IAH"),
    ("dallas", "DFW"),
    ("philadelphia", "PHL"),
    ("phoenix", "PHX"),
    ("usa", "JFK"), ("united states", "JFK"), ("estados unidos", "JFK"), ("america", "JFK"),
    // United Kingdom
    ("london", "LHR"), ("londres", "LHR"), ("londom", "LHR"), ("londón", "LHR"), ("lon", "LHR"),
    ("manchester", "MAN"),
    ("edinburgh", "EDI"),
    ("glasgow", "GLA"),
    ("birmingham", "BHX"),
    ("uk", "LHR"), ("united kingdom", "LHR"), ("reino unido", "LHR"), ("inglaterra", "LHR"),
    ("england", "LHR"),
    // Spain
    ("madrid", "MAD"),
    ("barcelona", "BCN"),
    ("valencia", "VLC"),
    ("seville", "SVQ"), ("sevilla", "SVQ"),
    ("bilbao", "BIO"),
    ("spain", "MAD"), ("españa", "MAD"),
    // France
    ("paris", "CDG"), ("parís", "CDG"),
    ("lyon", "LYS"),
    ("marseille", "MRS"), ("marsella", "MRS"),
    ("nice", "NCE"),
    ("france", "CDG"), ("francia", "CDG"),
    // Germany
    ("berlin", "BER"),
    ("munich", "MUC"), ("múnich", "MUC"),
    ("frankfurt", "FRA"),
    ("hamburg", "HAM"),
    ("cologne", "CGN"), ("colonia", "CGN"),
    ("germany", "FRA"), ("alemania", "FRA"),
    // Italy
    ("rome", "FCO"), ("roma", "FCO"),
    ("milan", "MXP"), ("milán", "MXP"), ("milano", "MXP"),
    ("venice", "VCE"), ("venecia", "VCE"),
    ("naples", "NAP"), ("napoles", "NAP"),
    ("italy", "FCO"), ("italia", "FCO"),
    // Benelux, Switzerland, Austria
    ("amsterdam", "AMS"), ("netherlands", "AMS"), ("holanda", "AMS"),
    ("brussels", "BRU"), ("bruselas", "BRU"), ("belgium", "BRU"),
    ("zurich", "ZRH"), ("zúrich", "ZRH"), ("switzerland", "ZRH"),
    ("geneva", "GVA"), ("ginebra", "GVA"),
    ("vienna", "VIE"), ("viena", "VIE"), ("austria", "VIE"),
    // Portugal, Greece, Turkey, Russia
    ("lisbon", "LIS"), ("lisboa", "LIS"), ("porto", "OPO"), ("portugal", "LIS"),
    ("athens", "ATH"), ("atenas", "ATH"), ("greece", "ATH"), ("grecia", "ATH"),
    ("istanbul", "IST"), ("ankara", "ESB"), ("turkey", "IST"),
    ("moscow", "SVO"), ("moscú", "SVO"), ("russia", "SVO"),
    ("saint petersburg", "LED"), ("st petersburg", "LED"),
    // East Asia
    ("beijing", "PEK"), ("pekin", "PEK"),
    ("shanghai", "PVG"),
    ("guangzhou", "CAN"),
    ("shenzhen", "SZX"),
    ("hong kong", "HKG"),
    ("china", "PEK"),
    ("tokyo", "NRT"), ("tokio", "NRT"),
    ("osaka", "KIX"),
    ("japan", "NRT"),
    ("seoul", "ICN"), ("busan", "PUS"), ("south korea", "ICN"), ("korea", "ICN"),
    // India
    ("delhi", "DEL"), ("new delhi", "DEL"), ("nueva delhi", "DEL"),
    ("mumbai", "BOM"), ("bombay", "BOM"),
    ("bangalore", "BLR"), ("bengaluru", "BLR"),
    ("chennai", "MAA"), ("madras", "MAA"),
    ("kolkata", "CCU"), ("calcutta", "CCU"),
    ("hyderabad", "HYD"),
    ("pune", "PNQ"),
    ("goa", "GOI"),
    ("kochi", "COK"), ("cochin", "COK"),
    ("jaipur", "JAI"),
    ("ahmedabad", "AMD"),
    ("amritsar", "ATQ"),
    ("lucknow", "LKO"),
    ("india", "DEL"),
    ("दिल्ली", "DEL"), ("नई दिल्ली", "DEL"),
    ("मुंबई", "BOM"),
    ("बेंगलुरु", "BLR"),
    ("चेन्नई", "MAA"),
    ("कोलकाता", "CCU"),
    ("हैदराबाद", "HYD"),
    ("लंदन", "LHR"),
    ("न्यूयॉर्क", "JFK"),
    ("दुबई", "DXB"),
    ("सिंगापुर", "SIN"),
    // South-East Asia and Oceania
    ("bangkok", "BKK"), ("phuket", "HKT"), ("thailand", "BKK"),
    ("singapore", "SIN"), ("singapur", "SIN"),
    ("kuala lumpur", "KUL"), ("malaysia", "KUL"),
    ("jakarta", "CGK"), ("bali", "DPS"), ("indonesia", "CGK"),
    ("manila", "MNL"), ("philippines", "MNL"),
    ("ho chi minh", "SGN"), ("ho chi minh city", "SGN"), ("hanoi", "HAN"), ("vietnam", "SGN"),
    ("sydney", "SYD"), ("melbourne", "MEL"), ("brisbane", "BNE"), ("perth", "PER"),
    ("australia", "SYD"),
    ("auckland", "AKL"), ("wellington", "WLG"), ("new zealand", "AKL"),
    // Middle East and Africa
    ("dubai", "DXB"), ("abu dhabi", "AUH"), ("uae", "DXB"), ("emirates", "DXB"),
    ("riyadh", "RUH"), ("jeddah", "JED"), ("saudi arabia", "RUH"),
    ("doha", "DOH"), ("qatar", "DOH"),
    ("tel aviv", "TLV"), ("israel", "TLV"),
    ("cairo", "CAI"), ("el cairo", "CAI"), ("egypt", "CAI"),
    ("johannesburg", "JNB"), ("cape town", "CPT"), ("south africa", "JNB"),
    ("casablanca", "CMN"), ("morocco", "CMN"),
    ("nairobi", "NBO"), ("kenya", "NBO"),
    ("lagos", "LOS"), ("abuja", "ABV"), ("nigeria", "LOS"),
    // Americas
    ("sao paulo", "GRU"), ("são paulo", "GRU"),
    ("rio de janeiro", "GIG"), ("rio", "GIG"),
    ("brazil", "GRU"), ("brasil", "GRU"),
    ("buenos aires", "EZE"), ("argentina", "EZE"),
    ("mexico city", "MEX"), ("ciudad de mexico", "MEX"), ("mexico", "MEX"), ("méxico", "MEX"),
    ("cancun", "CUN"), ("cancún", "CUN"), ("guadalajara", "GDL"),
    ("toronto", "YYZ"), ("vancouver", "YVR"), ("montreal", "YUL"), ("montréal", "YUL"),
    ("calgary", "YYC"), ("canada", "YYZ"),
    ("santiago", "SCL"), ("chile", "SCL"),
    ("bogota", "BOG"), ("bogotá", "BOG"), ("colombia", "BOG"),
    ("lima", "LIM"), ("peru", "LIM"),
    ("panama city", "PTY"), ("panama", "PTY"),
    ("havana", "HAV"), ("cuba", "HAV"),
    // Northern and Eastern Europe
    ("warsaw", "WAW"), ("poland", "WAW"),
    ("prague", "PRG"), ("praga", "PRG"), ("czech republic", "PRG"),
    ("budapest", "BUD"), ("hungary", "BUD"),
    ("bucharest", "OTP"), ("romania", "OTP"),
    ("stockholm", "ARN"), ("sweden", "ARN"),
    ("oslo", "OSL"), ("norway", "OSL"),
    ("copenhagen", "CPH"), ("denmark", "CPH"),
    ("helsinki", "HEL"), ("finland", "HEL"),
    ("dublin", "DUB"), ("ireland", "DUB"),
];

static LOCATION_INDEX: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut index = HashMap::with_capacity(LOCATION_ALIASES.len());
    for (alias, code) in LOCATION_ALIASES {
        index.entry(*alias).or_insert(*code);
    }
    index
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasCollision {
    pub alias: &'static str,
    pub kept: &'static str,
    pub ignored: &'static str,
}

/// True for strings of exactly three ASCII capitals.
pub fn is_location_code(value: &str) -> bool {
    value.len() == 3 && value.bytes().all(|byte| byte.is_ascii_uppercase())
}

/// Maps a place name or alias to its 3-letter code. Codes pass through unchanged.
pub fn resolve_location(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return None;
    }

    if is_location_code(trimmed) {
        return Some(trimmed.to_string());
    }

    let key = trimmed
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    LOCATION_INDEX.get(key.as_str()).map(|code| code.to_string())
}

pub fn alias_collisions() -> Vec<AliasCollision> {
    LOCATION_ALIASES
        .iter()
        .filter_map(|(alias, code)| {
            let kept = LOCATION_INDEX.get(alias)?;
            (kept != code).then_some(AliasCollision {
                alias,
                kept,
                ignored: code,
            })
        })
        .collect()
}
