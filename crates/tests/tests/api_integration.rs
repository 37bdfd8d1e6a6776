use std::sync::Arc;
use std::time::Duration;

use airdesk_agents::{AirlineAgent, CompletionClient, CompletionError};
use airdesk_api::{build_router, ApiState};
use airdesk_core::{ChatMessage, FlightOffer, FlightSearchParams, Price, ScrapedKnowledgeBase, Segment};
use airdesk_flights::FlightSearch;
use airdesk_observability::AppMetrics;
use airdesk_retrieval::{FetchError, KnowledgeScraper, PageFetcher, ScraperConfig};
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Utc;
use parking_lot::Mutex;
use serde_json::{json, Value};
use tower::ServiceExt;

struct FakeFlights {
    configured: bool,
    searches: Mutex<Vec<FlightSearchParams>>,
}

#[async_trait]
impl FlightSearch for FakeFlights {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn search(&self, params: &FlightSearchParams) -> Option<Vec<FlightOffer>> {
        self.searches.lock().push(params.clone());
        self.configured.then(|| vec![offer()])
    }
}

struct UnreachablePages;

#[async_trait]
impl PageFetcher for UnreachablePages {
    async fn fetch(&self, _url: &str) -> Result<String, FetchError> {
        Err(FetchError::Status(503))
    }
}

struct FakeCompletion {
    prompts: Mutex<Vec<String>>,
    fail_with: Option<CompletionError>,
}

#[async_trait]
impl CompletionClient for FakeCompletion {
    async fn generate(
        &self,
        system_prompt: &str,
        messages: &[ChatMessage],
    ) -> Result<String, CompletionError> {
        self.prompts.lock().push(system_prompt.to_string());
        match &self.fail_with {
            Some(err) => Err(err.clone()),
            None => Ok(format!("answered {} messages", messages.len())),
        }
    }
}

fn offer() -> FlightOffer {
    FlightOffer {
        id: "1".to_string(),
        price: Price {
            amount: "5400.00".to_string(),
            currency: "INR".to_string(),
        },
        outbound_segments: vec![Segment {
            departure_airport: "DEL".to_string(),
            departure_time: "20 Dec 2026, 06:00".to_string(),
            arrival_airport: "BOM".to_string(),
            arrival_time: "20 Dec 2026, 08:10".to_string(),
            carrier_code: "AI".to_string(),
            flight_number: "805".to_string(),
            duration: "2h 10m".to_string(),
        }],
        outbound_duration: Some("2h 10m".to_string()),
        return_segments: None,
        return_duration: None,
    }
}

struct TestApp {
    router: Router,
    flights: Arc<FakeFlights>,
    completion: Arc<FakeCompletion>,
}

fn test_app(flights_configured: bool, fail_with: Option<CompletionError>) -> TestApp {
    let flights = Arc::new(FakeFlights {
        configured: flights_configured,
        searches: Mutex::new(Vec::new()),
    });
    let completion = Arc::new(FakeCompletion {
        prompts: Mutex::new(Vec::new()),
        fail_with,
    });
    let scraper = KnowledgeScraper::new(
        UnreachablePages,
        ScraperConfig {
            retry_base_delay: Duration::ZERO,
            ..ScraperConfig::with_base_url("http://kb.test/faq/")
        },
    );

    let agent = AirlineAgent::new(
        flights.clone(),
        Arc::new(scraper),
        completion.clone(),
        chrono::Duration::hours(1),
        AppMetrics::shared(),
    );

    TestApp {
        router: build_router(ApiState::new(Arc::new(agent))),
        flights,
        completion,
    }
}

fn chat_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn health_reports_capabilities() {
    let app = test_app(true, None);

    let response = app
        .router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let parsed = json_body(response).await;
    assert_eq!(parsed["status"], "ok");
    assert_eq!(parsed["capabilities"]["flight_search"], true);
    assert_eq!(parsed["capabilities"]["knowledge_preloaded"], false);
    assert!(parsed.get("metrics").is_some());
}

#[tokio::test]
async fn chat_returns_completion_text() {
    let app = test_app(false, None);

    let request = chat_request(
        "/chat",
        json!({ "messages": [
            { "role": "user", "content": "hi" },
            { "role": "assistant", "content": "Hello! How can I help?" },
            { "role": "user", "content": "What is the baggage allowance?" }
        ]}),
    );
    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let parsed = json_body(response).await;
    assert_eq!(parsed["response"], "answered 3 messages");

    let prompts = app.completion.prompts.lock();
    assert!(prompts[0].contains("OFFICIAL AIRLINE WEBSITE DATA"));
    assert!(app.flights.searches.lock().is_empty());
}

#[tokio::test]
async fn flight_question_reaches_the_prompt_through_api_prefix() {
    let app = test_app(true, None);

    let request = chat_request(
        "/api/chat",
        json!({ "messages": [
            { "role": "user", "content": "Find flights from DEL to BOM on 2026-12-20" }
        ]}),
    );
    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let searches = app.flights.searches.lock();
    assert_eq!(searches.len(), 1);
    assert_eq!(searches[0].origin_code, "DEL");
    assert_eq!(searches[0].destination_code, "BOM");

    let prompts = app.completion.prompts.lock();
    assert!(prompts[0].contains("REAL-TIME FLIGHT DATA"));
    assert!(prompts[0].contains("AI805"));
}

#[tokio::test]
async fn missing_messages_is_bad_request() {
    let app = test_app(false, None);

    let response = app
        .router
        .oneshot(chat_request("/chat", json!({ "text": "hello" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "Messages array is required");
    assert!(app.completion.prompts.lock().is_empty());
}

#[tokio::test]
async fn empty_messages_is_bad_request() {
    let app = test_app(false, None);

    let response = app
        .router
        .oneshot(chat_request("/chat", json!({ "messages": [] })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "Messages array is required");
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let app = test_app(false, None);

    let request = Request::builder()
        .method("POST")
        .uri("/chat")
        .header("content-type", "application/json")
        .body(Body::from("{\"messages\": ["))
        .unwrap();
    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn completion_failures_map_to_status_and_message() {
    let app = test_app(false, Some(CompletionError::RateLimited));

    let response = app
        .router
        .oneshot(chat_request(
            "/chat",
            json!({ "messages": [{ "role": "user", "content": "hello" }] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let parsed = json_body(response).await;
    assert!(parsed["error"]
        .as_str()
        .unwrap()
        .starts_with("Rate limit exceeded"));

    let app = test_app(false, Some(CompletionError::InvalidAuth));
    let response = app
        .router
        .oneshot(chat_request(
            "/chat",
            json!({ "messages": [{ "role": "user", "content": "hello" }] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn scrape_serves_fallback_when_pages_are_unreachable() {
    let app = test_app(false, None);

    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/api/scrape").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let parsed = json_body(response).await;
    assert_eq!(parsed["success"], true);
    assert_eq!(parsed["data"]["is_fallback"], true);
    let knowledge: ScrapedKnowledgeBase = serde_json::from_value(parsed["data"].clone()).unwrap();
    assert_eq!(knowledge.populated_sections(), 5);
    assert!(knowledge.timestamp <= Utc::now());

    let health = app
        .router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(json_body(health).await["capabilities"]["knowledge_preloaded"], true);
}
