use crate::models::{
    FlightOffer, KnowledgeSection, LanguageInfo, Price, QueryClassification,
    ScrapedKnowledgeBase, Segment,
};

const ASSISTANT_NAME: &str = "Air India's virtual assistant (Maharaja Assistant)";

const FORBIDDEN_PHRASES: &[&str] = &[
    "\"visit the website\" or \"check the official website\"",
    "\"contact customer service\"",
    "\"I can help you find flights\" (without listing them)",
    "Any generic response without showing the actual flights",
];

fn section_heading(section: KnowledgeSection) -> &'static str {
    match section {
        KnowledgeSection::Baggage => {
            "BAGGAGE INFORMATION (use this exclusively for baggage-related questions)"
        }
        KnowledgeSection::CheckIn => {
            "CHECK-IN INFORMATION (use this exclusively for check-in questions)"
        }
        KnowledgeSection::Booking => {
            "BOOKING INFORMATION (use this exclusively for booking and reservation questions)"
        }
        KnowledgeSection::Policies => {
            "POLICIES INFORMATION (use this exclusively for cancellation, refund and change questions)"
        }
        KnowledgeSection::MaharajaClub => {
            "MAHARAJA CLUB INFORMATION (use this exclusively for frequent flyer, miles and loyalty questions)"
        }
    }
}

/// Builds the system prompt handed to the completion endpoint.
///
/// Flight data, when present, always comes before knowledge-base content. The
/// language rule opens the prompt and is repeated as the closing constraint.
pub fn build_system_prompt(
    scraped: Option<&ScrapedKnowledgeBase>,
    offers: Option<&[FlightOffer]>,
    classification: &QueryClassification,
    language: &LanguageInfo,
) -> String {
    let offers = offers.filter(|offers| !offers.is_empty());
    let mut prompt = String::new();

    if offers.is_some() {
        prompt.push_str(&format!(
            "You are {ASSISTANT_NAME}. The user is asking about FLIGHTS.\n\n"
        ));
    } else {
        prompt.push_str(&format!(
            "You are {ASSISTANT_NAME}. Your ONLY job is to present information from the official airline data provided below.\n\n"
        ));
    }

    prompt.push_str(&format!(
        "CRITICAL LANGUAGE RULE: {}\nYou MUST respond in {}. Do NOT mix languages.\n\n",
        language.instruction, language.response_language
    ));
    prompt.push_str(&format!(
        "QUERY TYPE: {}\nRESPONSE LANGUAGE: {}\n\n",
        classification.kind.as_str(),
        language.response_language
    ));

    if let Some(offers) = offers {
        push_flight_offers(&mut prompt, offers);
    } else if let Some(query) = classification
        .flight_query
        .as_ref()
        .filter(|_| classification.needs_flight_api)
    {
        prompt.push_str("=== FLIGHT SEARCH ATTEMPTED BUT NO DATA AVAILABLE ===\n");
        prompt.push_str(&format!(
            "The user asked about flights from {} to {} on {}, but no flight data was returned.\n\n",
            query.origin_code, query.destination_code, query.departure_date
        ));
        prompt.push_str("You should:\n");
        prompt.push_str("1. Apologize that no flights were found for that specific route and date\n");
        prompt.push_str("2. Explain that there may be no flights on that route or date, or that a country needs a specific city airport\n");
        prompt.push_str("3. Suggest trying:\n");
        prompt.push_str("   - A different date\n");
        prompt.push_str("   - A specific city instead of a country (e.g. \"Madrid\" instead of \"Spain\")\n");
        prompt.push_str("   - Verifying the departure and arrival cities or their 3-letter airport codes\n\n");
        prompt.push_str("Do NOT invent flights, prices or schedules.\n\n");
    } else if classification.needs_flight_api {
        prompt.push_str("=== FLIGHT SEARCH NOT POSSIBLE YET ===\n");
        prompt.push_str("The user wants flight information but the departure and arrival cities could not be identified.\n");
        prompt.push_str("Ask the user for the departure city, the arrival city and the travel date (for example: \"flights from Delhi to London on 2025-05-01\").\n");
        prompt.push_str("Do NOT invent flights, prices or schedules.\n\n");
    }

    if let Some(scraped) = scraped {
        push_knowledge(&mut prompt, scraped);
    } else if classification.needs_scraping {
        prompt.push_str("NOTE: Official airline website data is not available. Provide general information but recommend that users verify details on the official website.\n\n");
    }

    prompt.push_str(&format!(
        "LANGUAGE CONSTRAINT: {} Respond only in {}.",
        language.instruction, language.response_language
    ));

    prompt
}

fn push_flight_offers(prompt: &mut String, offers: &[FlightOffer]) {
    prompt.push_str("ABSOLUTE REQUIREMENT: You have REAL flight data below from the flight search API. YOU MUST LIST THESE FLIGHTS.\n\n");
    prompt.push_str("FORBIDDEN - NEVER SAY:\n");
    for phrase in FORBIDDEN_PHRASES {
        prompt.push_str(&format!("- {phrase}\n"));
    }
    prompt.push('\n');
    prompt.push_str("REQUIRED FORMAT - Start your response with:\n");
    prompt.push_str("\"Here are the available flights from [ORIGIN] to [DESTINATION]:\"\n\n");
    prompt.push_str("Then list EVERY flight from the data below in this exact format:\n");
    prompt.push_str("[FLIGHT_NUMBER/ID]:\n");
    prompt.push_str("- Route: [DEPARTURE_CODE] to [ARRIVAL_CODE]\n");
    prompt.push_str("- Price: [AMOUNT] [CURRENCY]\n");
    prompt.push_str("- Departure: [DEPARTURE_TIME]\n");
    prompt.push_str("- Arrival: [ARRIVAL_TIME]\n");
    prompt.push_str("- Duration: [DURATION]\n\n");
    prompt.push_str("=== REAL-TIME FLIGHT DATA ===\n");

    for (index, offer) in offers.iter().enumerate() {
        prompt.push_str(&format!("FLIGHT {}: {}\n", index + 1, offer_label(offer)));
        push_leg(
            prompt,
            "",
            &offer.outbound_segments,
            offer.outbound_duration.as_deref(),
            Some(&offer.price),
        );
        if let Some(segments) = offer.return_segments.as_deref() {
            push_leg(prompt, "Return ", segments, offer.return_duration.as_deref(), None);
        }
        prompt.push('\n');
    }

    prompt.push_str("=== END OF FLIGHT DATA ===\n\n");
    prompt.push_str("FINAL INSTRUCTION: list ALL flights above, using the flight number or ID as the header for each one.\n\n");
}

/// Field order matches the REQUIRED FORMAT directive.
fn push_leg(
    prompt: &mut String,
    label: &str,
    segments: &[Segment],
    duration: Option<&str>,
    price: Option<&Price>,
) {
    let (Some(first), Some(last)) = (segments.first(), segments.last()) else {
        if let Some(price) = price {
            push_price(prompt, price);
        }
        return;
    };

    prompt.push_str(&format!(
        "{label}Route: {} to {}\n",
        first.departure_airport, last.arrival_airport
    ));
    if let Some(price) = price {
        push_price(prompt, price);
    }
    if segments.len() > 1 {
        prompt.push_str(&format!(
            "{label}Flight Numbers: {}\n",
            flight_numbers(segments)
        ));
        prompt.push_str(&format!("{label}Stops: {}\n", segments.len() - 1));
    }
    prompt.push_str(&format!("{label}Departure: {}\n", first.departure_time));
    prompt.push_str(&format!("{label}Arrival: {}\n", last.arrival_time));
    prompt.push_str(&format!(
        "{label}Duration: {}\n",
        duration.unwrap_or(first.duration.as_str())
    ));
}

fn push_price(prompt: &mut String, price: &Price) {
    prompt.push_str(&format!("Price: {} {}\n", price.amount, price.currency));
}

fn offer_label(offer: &FlightOffer) -> String {
    if offer.outbound_segments.is_empty() {
        offer.id.clone()
    } else {
        flight_numbers(&offer.outbound_segments)
    }
}

fn flight_numbers(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|segment| format!("{}{}", segment.carrier_code, segment.flight_number))
        .collect::<Vec<_>>()
        .join(" + ")
}

fn push_knowledge(prompt: &mut String, scraped: &ScrapedKnowledgeBase) {
    prompt.push_str("=== OFFICIAL AIRLINE WEBSITE DATA ===\n");
    prompt.push_str("THIS DATA IS YOUR ONLY SOURCE. Extract information directly from it.\n");
    if scraped.is_fallback {
        prompt.push_str("(Bundled reference summary; the live website could not be reached.)\n");
    }
    prompt.push('\n');

    for section in KnowledgeSection::ALL {
        if let Some(text) = scraped.section(section) {
            prompt.push_str(&format!("{}:\n{}\n\n", section_heading(section), text));
        }
    }

    prompt.push_str("=== END OF DATA ===\n\n");
    prompt.push_str("INSTRUCTIONS:\n");
    prompt.push_str("1. Identify which section above matches the user's question and use ONLY that section\n");
    prompt.push_str("2. Keep ALL numbers, weights, times, procedures and limits exactly as written\n");
    prompt.push_str("3. Use the same terminology found in the data\n");
    prompt.push_str("4. Present the answer in a clear, organized way\n\n");
    prompt.push_str("DO NOT:\n");
    prompt.push_str("- Add information that is not in the data above\n");
    prompt.push_str("- Use outside or generic knowledge\n");
    prompt.push_str("- Skip specific details from the data\n\n");
}
