use airdesk_core::{KnowledgeSection, ScrapedKnowledgeBase};
use chrono::{DateTime, Utc};

fn fallback_text(section: KnowledgeSection) -> &'static str {
    match section {
        KnowledgeSection::Baggage => {
            "Air India baggage allowance information. Passengers can carry both checked and carry-on baggage. \
             The weight limits vary by class of travel and route. For domestic flights, economy class passengers \
             typically have 15kg checked baggage allowance and 7kg carry-on. For international flights, the allowance \
             may vary. Specific weight limits, dimensions, and restrictions are detailed in the baggage policy. \
             Passengers should check their ticket for exact allowances based on fare type and route."
        }
        KnowledgeSection::CheckIn => {
            "Air India offers online check-in services through their website and mobile app. Online check-in is \
             typically available 48 hours before departure and closes 2 hours before scheduled departure time. \
             Passengers can select seats, add special meal requests, and print boarding passes. Airport check-in \
             counters open 3 hours before departure for international flights and 2 hours for domestic flights. \
             Passengers must arrive at the airport with valid identification and travel documents."
        }
        KnowledgeSection::Booking => {
            "Air India booking can be done through their official website, mobile app, call center, or at airport \
             counters. Passengers can book flights, select seats, add baggage, and choose meal preferences. Various \
             payment methods are accepted including credit cards, debit cards, and online banking. Booking confirmation \
             is sent via email and SMS. Passengers can manage their bookings online to make changes or cancellations \
             subject to fare rules."
        }
        KnowledgeSection::Policies => {
            "Air India cancellation and refund policies vary based on fare type and timing. Cancellation fees apply \
             depending on when the cancellation is made relative to departure. Refunds are processed according to \
             fare rules - some fares are non-refundable while others may allow partial refunds. Changes to bookings \
             may be permitted with applicable fees. Passengers should review their fare conditions at the time of \
             booking. Refund processing typically takes 7-14 business days."
        }
        KnowledgeSection::MaharajaClub => {
            "Air India Maharaja Club is the frequent flyer program offering miles, tier benefits, and rewards. Members \
             earn miles on flights and partner services. Different membership tiers provide various benefits including \
             priority check-in, lounge access, extra baggage allowance, and upgrade opportunities. Miles can be redeemed \
             for flights, upgrades, and other rewards. Membership enrollment is available online or at airport counters."
        }
    }
}

/// Static stand-in used when no policy page could be scraped. Every section is populated.
pub fn fallback_knowledge(timestamp: DateTime<Utc>) -> ScrapedKnowledgeBase {
    let mut knowledge = ScrapedKnowledgeBase::empty(timestamp);
    for section in KnowledgeSection::ALL {
        knowledge.set_section(section, Some(fallback_text(section).to_string()));
    }
    knowledge.is_fallback = true;
    knowledge
}
