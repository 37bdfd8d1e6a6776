pub mod completion;
pub mod config;
mod snapshot;

use std::sync::Arc;
use std::time::{Duration, Instant};

use airdesk_core::{
    alias_collisions, build_system_prompt, classify_query, detect_language, language_info,
    normalize_text, ChatMessage, FlightOffer, Language, LanguageInfo, QueryClassification,
    ScrapedKnowledgeBase,
};
use airdesk_flights::{FlightOfferProvider, FlightSearch};
use airdesk_observability::AppMetrics;
use airdesk_retrieval::{HttpPageFetcher, KnowledgeScraper, KnowledgeSource};
use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

pub use completion::{CompletionClient, CompletionError, OpenAiCompletionClient};
pub use config::{build_scraper_config, AirdeskConfig, ConfigError, OpenAiRuntimeConfig};
pub use snapshot::KnowledgeSnapshot;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Messages array is required")]
    EmptyConversation,
    #[error(transparent)]
    Completion(#[from] CompletionError),
}

impl ChatError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::EmptyConversation => 400,
            Self::Completion(err) => err.status_code(),
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyConversation => self.to_string(),
            Self::Completion(err) => err.user_message(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub response: String,
    pub classification: QueryClassification,
    pub language: Language,
    pub used_fallback_knowledge: bool,
    pub offers_found: usize,
}

/// Everything gathered for one turn before the completion call.
#[derive(Debug, Clone, Serialize)]
pub struct PreparedTurn {
    pub query: String,
    pub language: LanguageInfo,
    pub classification: QueryClassification,
    pub knowledge: Option<ScrapedKnowledgeBase>,
    pub offers: Option<Vec<FlightOffer>>,
    pub system_prompt: String,
}

#[derive(Clone)]
pub struct AirlineAgent {
    flights: Arc<dyn FlightSearch>,
    knowledge: Arc<dyn KnowledgeSource>,
    completion: Arc<dyn CompletionClient>,
    snapshot: KnowledgeSnapshot,
    metrics: Arc<AppMetrics>,
}

impl AirlineAgent {
    pub fn new(
        flights: Arc<dyn FlightSearch>,
        knowledge: Arc<dyn KnowledgeSource>,
        completion: Arc<dyn CompletionClient>,
        knowledge_ttl: chrono::Duration,
        metrics: Arc<AppMetrics>,
    ) -> Self {
        Self {
            flights,
            knowledge,
            completion,
            snapshot: KnowledgeSnapshot::new(knowledge_ttl),
            metrics,
        }
    }

    /// Wires the live HTTP providers described by `config`.
    pub fn from_config(config: &AirdeskConfig, metrics: Arc<AppMetrics>) -> Result<Self> {
        log_alias_collisions();

        let fetcher = HttpPageFetcher::new(config.scraper.request_timeout)?;
        let scraper = KnowledgeScraper::new(fetcher, config.scraper.clone());
        let flights = FlightOfferProvider::new(config.flights.clone())?;
        if !flights.is_configured() {
            warn!("flight API credentials not configured; flight search disabled");
        }
        let completion = OpenAiCompletionClient::new(config.openai.clone())?;

        Ok(Self::new(
            Arc::new(flights),
            Arc::new(scraper),
            Arc::new(completion),
            config.scraper.cache_ttl,
            metrics,
        ))
    }

    pub fn flight_search_enabled(&self) -> bool {
        self.flights.is_configured()
    }

    pub fn knowledge_preloaded(&self) -> bool {
        self.snapshot.is_populated()
    }

    pub fn metrics(&self) -> Arc<AppMetrics> {
        self.metrics.clone()
    }

    #[instrument(skip(self, messages), fields(messages = messages.len()))]
    pub async fn handle_chat(&self, messages: &[ChatMessage]) -> Result<ChatReply, ChatError> {
        let started = Instant::now();
        self.metrics.inc_request();

        let turn = self.prepare(messages).await?;
        let response = match self.completion.generate(&turn.system_prompt, messages).await {
            Ok(response) => response,
            Err(err) => {
                self.metrics.inc_completion_failure();
                warn!(error = %err, "completion failed");
                return Err(ChatError::Completion(err));
            }
        };

        self.metrics.observe_latency(started.elapsed());
        let reply = ChatReply {
            response,
            language: turn.language.language,
            used_fallback_knowledge: turn
                .knowledge
                .as_ref()
                .is_some_and(|knowledge| knowledge.is_fallback),
            offers_found: turn.offers.as_ref().map_or(0, Vec::len),
            classification: turn.classification,
        };
        info!(
            kind = reply.classification.kind.as_str(),
            language = reply.language.as_code(),
            offers = reply.offers_found,
            fallback_knowledge = reply.used_fallback_knowledge,
            "chat handled"
        );

        Ok(reply)
    }

    /// Everything up to the completion call: classification, retrieval and the system prompt.
    pub async fn prepare(&self, messages: &[ChatMessage]) -> Result<PreparedTurn, ChatError> {
        let query = messages
            .last()
            .map(|message| normalize_text(&message.content))
            .ok_or(ChatError::EmptyConversation)?;

        let language = language_info(detect_language(&query));
        let classification = classify_query(&query);

        let knowledge = async {
            if classification.needs_scraping {
                Some(self.current_knowledge().await)
            } else {
                None
            }
        };
        let offers = async {
            match classification
                .flight_query
                .as_ref()
                .filter(|_| classification.needs_flight_api)
            {
                Some(params) => {
                    let offers = self.flights.search(params).await;
                    if self.flights.is_configured() {
                        self.metrics.record_flight_search(offers.is_some());
                    }
                    offers
                }
                None => None,
            }
        };
        let (knowledge, offers) = tokio::join!(knowledge, offers);

        if knowledge.as_ref().is_some_and(|knowledge| knowledge.is_fallback) {
            self.metrics.inc_knowledge_fallback();
        }

        let system_prompt = build_system_prompt(
            knowledge.as_ref(),
            offers.as_deref(),
            &classification,
            &language,
        );

        Ok(PreparedTurn {
            query,
            language,
            classification,
            knowledge,
            offers,
            system_prompt,
        })
    }

    /// Preloaded content when fresh; otherwise a cache-aware scrape whose result
    /// replaces the snapshot.
    pub async fn current_knowledge(&self) -> ScrapedKnowledgeBase {
        if let Some(knowledge) = self.snapshot.fresh_at(Utc::now()) {
            return knowledge;
        }
        self.prime_knowledge().await
    }

    pub async fn prime_knowledge(&self) -> ScrapedKnowledgeBase {
        let knowledge = self.knowledge.knowledge_base().await;
        self.store_snapshot(knowledge)
    }

    /// Preload retries go through `refresh` so a cached fallback is scraped again.
    async fn refresh_knowledge(&self) -> ScrapedKnowledgeBase {
        let knowledge = self.knowledge.refresh().await;
        self.store_snapshot(knowledge)
    }

    fn store_snapshot(&self, knowledge: ScrapedKnowledgeBase) -> ScrapedKnowledgeBase {
        info!(
            sections = knowledge.populated_sections(),
            is_fallback = knowledge.is_fallback,
            "knowledge snapshot updated"
        );
        self.snapshot.store(knowledge.clone());
        knowledge
    }

    /// Primes immediately, then re-primes on every tick the snapshot needs it.
    pub fn spawn_preload_task(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.prime_knowledge().await;

            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if self.snapshot.needs_refresh_at(Utc::now()) {
                    self.refresh_knowledge().await;
                }
            }
        })
    }
}

fn log_alias_collisions() {
    for collision in alias_collisions() {
        warn!(
            alias = collision.alias,
            kept = collision.kept,
            ignored = collision.ignored,
            "conflicting location alias ignored"
        );
    }
}
