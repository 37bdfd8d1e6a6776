use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    En,
    Hi,
}

impl Language {
    pub fn from_optional_str(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_lowercase()) {
            Some(v) if v == "hi" || v == "hi-in" || v == "hindi" => Self::Hi,
            _ => Self::En,
        }
    }

    pub fn as_code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Hi => "hi",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageInfo {
    pub language: Language,
    pub response_language: String,
    pub instruction: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    FlightSearch,
    AirlineInfo,
    General,
}

impl QueryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FlightSearch => "flight_search",
            Self::AirlineInfo => "airline_info",
            Self::General => "general",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryClassification {
    pub kind: QueryKind,
    pub needs_scraping: bool,
    pub needs_flight_api: bool,
    pub flight_query: Option<FlightSearchParams>,
}

impl QueryClassification {
    pub fn flight_search(flight_query: Option<FlightSearchParams>) -> Self {
        Self {
            kind: QueryKind::FlightSearch,
            needs_scraping: false,
            needs_flight_api: true,
            flight_query,
        }
    }

    pub fn airline_info() -> Self {
        Self {
            kind: QueryKind::AirlineInfo,
            needs_scraping: true,
            needs_flight_api: false,
            flight_query: None,
        }
    }

    pub fn general() -> Self {
        Self {
            kind: QueryKind::General,
            needs_scraping: true,
            needs_flight_api: false,
            flight_query: None,
        }
    }

    /// True when a structured search can actually be issued.
    pub fn wants_flight_search(&self) -> bool {
        self.needs_flight_api && self.flight_query.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TravelClass {
    #[default]
    Economy,
    PremiumEconomy,
    Business,
    First,
}

impl TravelClass {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().replace(['-', '_'], " ").as_str() {
            "economy" | "eco" => Some(Self::Economy),
            "premium economy" | "premium" => Some(Self::PremiumEconomy),
            "business" => Some(Self::Business),
            "first" | "first class" => Some(Self::First),
            _ => None,
        }
    }

    pub fn as_api_str(self) -> &'static str {
        match self {
            Self::Economy => "ECONOMY",
            Self::PremiumEconomy => "PREMIUM_ECONOMY",
            Self::Business => "BUSINESS",
            Self::First => "FIRST",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightSearchParams {
    pub origin_code: String,
    pub destination_code: String,
    pub departure_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub adults: u8,
    pub children: u8,
    pub infants: u8,
    pub travel_class: TravelClass,
}

impl FlightSearchParams {
    pub fn new(origin_code: &str, destination_code: &str, departure_date: NaiveDate) -> Self {
        Self {
            origin_code: origin_code.to_string(),
            destination_code: destination_code.to_string(),
            departure_date,
            return_date: None,
            adults: 1,
            children: 0,
            infants: 0,
            travel_class: TravelClass::Economy,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub amount: String,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub departure_airport: String,
    pub departure_time: String,
    pub arrival_airport: String,
    pub arrival_time: String,
    pub carrier_code: String,
    pub flight_number: String,
    pub duration: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightOffer {
    pub id: String,
    pub price: Price,
    pub outbound_segments: Vec<Segment>,
    pub outbound_duration: Option<String>,
    pub return_segments: Option<Vec<Segment>>,
    pub return_duration: Option<String>,
}

impl FlightOffer {
    pub fn first_departure(&self) -> Option<&Segment> {
        self.outbound_segments.first()
    }

    pub fn last_arrival(&self) -> Option<&Segment> {
        self.outbound_segments.last()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnowledgeSection {
    Baggage,
    CheckIn,
    Booking,
    Policies,
    MaharajaClub,
}

impl KnowledgeSection {
    pub const ALL: [KnowledgeSection; 5] = [
        Self::Baggage,
        Self::CheckIn,
        Self::Booking,
        Self::Policies,
        Self::MaharajaClub,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::Baggage => "baggage",
            Self::CheckIn => "check_in",
            Self::Booking => "booking",
            Self::Policies => "policies",
            Self::MaharajaClub => "maharaja_club",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapedKnowledgeBase {
    pub baggage: Option<String>,
    pub check_in: Option<String>,
    pub booking: Option<String>,
    pub policies: Option<String>,
    pub maharaja_club: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub is_fallback: bool,
}

impl ScrapedKnowledgeBase {
    pub fn empty(timestamp: DateTime<Utc>) -> Self {
        Self {
            baggage: None,
            check_in: None,
            booking: None,
            policies: None,
            maharaja_club: None,
            timestamp,
            is_fallback: false,
        }
    }

    pub fn section(&self, section: KnowledgeSection) -> Option<&str> {
        match section {
            KnowledgeSection::Baggage => self.baggage.as_deref(),
            KnowledgeSection::CheckIn => self.check_in.as_deref(),
            KnowledgeSection::Booking => self.booking.as_deref(),
            KnowledgeSection::Policies => self.policies.as_deref(),
            KnowledgeSection::MaharajaClub => self.maharaja_club.as_deref(),
        }
    }

    pub fn set_section(&mut self, section: KnowledgeSection, text: Option<String>) {
        let slot = match section {
            KnowledgeSection::Baggage => &mut self.baggage,
            KnowledgeSection::CheckIn => &mut self.check_in,
            KnowledgeSection::Booking => &mut self.booking,
            KnowledgeSection::Policies => &mut self.policies,
            KnowledgeSection::MaharajaClub => &mut self.maharaja_club,
        };
        *slot = text;
    }

    pub fn populated_sections(&self) -> usize {
        KnowledgeSection::ALL
            .iter()
            .filter(|section| self.section(**section).is_some())
            .count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}
