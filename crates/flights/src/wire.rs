use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    pub expires_in: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct OffersResponse {
    #[serde(default)]
    pub data: Vec<WireOffer>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct WireOffer {
    pub id: String,
    pub price: WirePrice,
    #[serde(default)]
    pub itineraries: Vec<WireItinerary>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct WirePrice {
    pub total: String,
    pub currency: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct WireItinerary {
    pub duration: Option<String>,
    #[serde(default)]
    pub segments: Vec<WireSegment>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireSegment {
    pub departure: WireEndpoint,
    pub arrival: WireEndpoint,
    pub carrier_code: String,
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub duration: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireEndpoint {
    pub iata_code: String,
    pub at: String,
}

impl WireOffer {
    fn outbound(&self) -> Option<&[WireSegment]> {
        self.itineraries
            .first()
            .map(|itinerary| itinerary.segments.as_slice())
            .filter(|segments| !segments.is_empty())
    }

    /// (first departure airport, last arrival airport, total price, first departure time)
    pub fn dedup_key(&self) -> Option<(String, String, String, String)> {
        let segments = self.outbound()?;
        let first = segments.first()?;
        let last = segments.last()?;
        Some((
            first.departure.iata_code.clone(),
            last.arrival.iata_code.clone(),
            self.price.total.clone(),
            first.departure.at.clone(),
        ))
    }
}
