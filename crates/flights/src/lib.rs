mod format;
mod wire;

use std::collections::HashSet;
use std::env;
use std::time::Duration;

use airdesk_core::{FlightOffer, FlightSearchParams, Price, Segment};
use airdesk_storage::TtlCache;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

pub use format::{format_duration, format_local_time};

use wire::{OffersResponse, TokenResponse, WireOffer, WireSegment};

pub const TEST_BASE_URL: &str = "https://test.api.amadeus.com";
pub const PRODUCTION_BASE_URL: &str = "https://api.amadeus.com";

const TOKEN_PATH: &str = "/v1/security/oauth2/token";
const OFFERS_PATH: &str = "/v2/shopping/flight-offers";
const TOKEN_KEY: &str = "access_token";

#[derive(Debug, Clone)]
pub struct FlightApiConfig {
    pub api_key: String,
    pub api_secret: String,
    pub base_url: String,
    pub max_offers: usize,
    pub token_safety_margin: chrono::Duration,
    pub default_token_lifetime: chrono::Duration,
    pub request_timeout: Duration,
}

impl FlightApiConfig {
    pub fn new(
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            max_offers: 5,
            token_safety_margin: chrono::Duration::seconds(60),
            default_token_lifetime: chrono::Duration::seconds(1800),
            request_timeout: Duration::from_secs(30),
        }
    }

    /// `None` when either credential is missing, which disables flight search.
    pub fn from_env() -> Option<Self> {
        let api_key = first_env(&["AIRDESK_AMADEUS_API_KEY", "AMADEUS_API_KEY"])?;
        let api_secret = first_env(&["AIRDESK_AMADEUS_API_SECRET", "AMADEUS_API_SECRET"])?;
        let base_url = first_env(&["AIRDESK_AMADEUS_BASE_URL"]).unwrap_or_else(|| {
            base_url_for_env(first_env(&["AIRDESK_AMADEUS_ENV", "AMADEUS_ENV"]).as_deref())
                .to_string()
        });

        Some(Self::new(api_key, api_secret, base_url))
    }
}

pub fn base_url_for_env(selector: Option<&str>) -> &'static str {
    match selector.map(|value| value.trim().to_lowercase()) {
        Some(value) if value == "production" => PRODUCTION_BASE_URL,
        _ => TEST_BASE_URL,
    }
}

fn first_env(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| {
        env::var(name)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}

#[derive(Debug, Error)]
pub enum FlightApiError {
    #[error("flight API request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("flight API returned {status}: {body}")]
    Status { status: u16, body: String },
}

#[async_trait]
pub trait FlightSearch: Send + Sync {
    fn is_configured(&self) -> bool;

    /// `None` means "no data" and is never an error for the caller.
    async fn search(&self, params: &FlightSearchParams) -> Option<Vec<FlightOffer>>;
}

pub struct FlightOfferProvider {
    client: Client,
    config: Option<FlightApiConfig>,
    tokens: TtlCache<&'static str, String>,
}

impl FlightOfferProvider {
    pub fn new(config: Option<FlightApiConfig>) -> Result<Self> {
        let timeout = config
            .as_ref()
            .map(|config| config.request_timeout)
            .unwrap_or(Duration::from_secs(30));
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build flight API client")?;
        let default_ttl = config
            .as_ref()
            .map(|config| config.default_token_lifetime)
            .unwrap_or_else(|| chrono::Duration::seconds(1800));

        Ok(Self {
            client,
            config,
            tokens: TtlCache::new(default_ttl),
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(FlightApiConfig::from_env())
    }

    async fn access_token(&self, config: &FlightApiConfig) -> Result<String, FlightApiError> {
        if let Some(token) = self.tokens.get(&TOKEN_KEY) {
            return Ok(token);
        }

        let response = self
            .client
            .post(format!("{}{TOKEN_PATH}", config.base_url))
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", config.api_key.as_str()),
                ("client_secret", config.api_secret.as_str()),
            ])
            .send()
            .await?;
        let response = ensure_success(response).await?;
        let token: TokenResponse = response.json().await?;

        let lifetime = token
            .expires_in
            .map(chrono::Duration::seconds)
            .unwrap_or(config.default_token_lifetime);
        let ttl = (lifetime - config.token_safety_margin).max(chrono::Duration::zero());
        debug!(ttl_seconds = ttl.num_seconds(), "cached flight API token");
        self.tokens
            .insert_with_ttl(TOKEN_KEY, token.access_token.clone(), ttl);

        Ok(token.access_token)
    }

    async fn fetch_offers(
        &self,
        config: &FlightApiConfig,
        params: &FlightSearchParams,
    ) -> Result<Vec<FlightOffer>, FlightApiError> {
        let token = self.access_token(config).await?;
        let response = self
            .client
            .get(format!("{}{OFFERS_PATH}", config.base_url))
            .bearer_auth(token)
            .query(&search_query(params))
            .send()
            .await?;
        let response = ensure_success(response).await?;
        let body: OffersResponse = response.json().await?;

        Ok(normalize_offers(body.data, config.max_offers))
    }
}

#[async_trait]
impl FlightSearch for FlightOfferProvider {
    fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    #[instrument(skip(self, params), fields(origin = %params.origin_code, destination = %params.destination_code))]
    async fn search(&self, params: &FlightSearchParams) -> Option<Vec<FlightOffer>> {
        let Some(config) = self.config.as_ref() else {
            debug!("flight search skipped: credentials not configured");
            return None;
        };

        match self.fetch_offers(config, params).await {
            Ok(offers) if offers.is_empty() => {
                info!("flight search returned no offers");
                None
            }
            Ok(offers) => {
                info!(offers = offers.len(), "flight search succeeded");
                Some(offers)
            }
            Err(err) => {
                warn!(error = %err, "flight search failed");
                None
            }
        }
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, FlightApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(FlightApiError::Status {
        status: status.as_u16(),
        body,
    })
}

/// Zero-valued optional fields are left out rather than sent as zero.
pub fn search_query(params: &FlightSearchParams) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("originLocationCode", params.origin_code.clone()),
        ("destinationLocationCode", params.destination_code.clone()),
        ("departureDate", params.departure_date.to_string()),
        ("adults", params.adults.max(1).to_string()),
        ("travelClass", params.travel_class.as_api_str().to_string()),
    ];
    if let Some(return_date) = params.return_date {
        query.push(("returnDate", return_date.to_string()));
    }
    if params.children > 0 {
        query.push(("children", params.children.to_string()));
    }
    if params.infants > 0 {
        query.push(("infants", params.infants.to_string()));
    }
    query
}

/// Drops duplicate itineraries before capping, keeping provider order.
fn normalize_offers(data: Vec<WireOffer>, max_offers: usize) -> Vec<FlightOffer> {
    let mut seen = HashSet::new();
    data.into_iter()
        .filter(|offer| match offer.dedup_key() {
            Some(key) => seen.insert(key),
            None => false,
        })
        .take(max_offers)
        .map(to_offer)
        .collect()
}

fn to_offer(offer: WireOffer) -> FlightOffer {
    let mut itineraries = offer.itineraries.into_iter();
    let outbound = itineraries.next();
    let inbound = itineraries.next();

    let (outbound_segments, outbound_duration) = match outbound {
        Some(itinerary) => (
            itinerary.segments.iter().map(to_segment).collect(),
            itinerary.duration.as_deref().map(format_duration),
        ),
        None => (Vec::new(), None),
    };

    FlightOffer {
        id: offer.id,
        price: Price {
            amount: offer.price.total,
            currency: offer.price.currency,
        },
        outbound_segments,
        outbound_duration,
        return_duration: inbound
            .as_ref()
            .and_then(|itinerary| itinerary.duration.as_deref())
            .map(format_duration),
        return_segments: inbound.map(|itinerary| itinerary.segments.iter().map(to_segment).collect()),
    }
}

fn to_segment(segment: &WireSegment) -> Segment {
    Segment {
        departure_airport: segment.departure.iata_code.clone(),
        departure_time: format_local_time(&segment.departure.at),
        arrival_airport: segment.arrival.iata_code.clone(),
        arrival_time: format_local_time(&segment.arrival.at),
        carrier_code: segment.carrier_code.clone(),
        flight_number: segment.number.clone(),
        duration: format_duration(&segment.duration),
    }
}
