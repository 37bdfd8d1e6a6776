mod clean;
mod extract;
mod fallback;
mod fetch;

use std::time::Duration;

use airdesk_core::{KnowledgeSection, ScrapedKnowledgeBase};
use airdesk_storage::TtlCache;
use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use tracing::{debug, error, info, instrument, warn};

pub use clean::{clean_text, is_navigation_text};
pub use extract::extract_page_text;
pub use fallback::fallback_knowledge;
pub use fetch::{FetchError, HttpPageFetcher, PageFetcher};

pub const DEFAULT_FAQ_BASE_URL: &str =
    "https://www.airindia.com/content/air-india/in/en/frequently-asked-questions/";
pub const MAHARAJA_CLUB_FAQ_URL: &str = "https://www.airindia.com/in/en/maharaja-club/faqs.html";

const AGGREGATE_KEY: &str = "airline_info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSource {
    pub section: KnowledgeSection,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub pages: Vec<PageSource>,
    pub cache_ttl: chrono::Duration,
    pub max_retries: u32,
    pub retry_base_delay: Duration,
    pub request_timeout: Duration,
    pub max_text_chars: usize,
    pub min_content_chars: usize,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        let mut pages = faq_pages(DEFAULT_FAQ_BASE_URL);
        if let Some(club) = pages
            .iter_mut()
            .find(|page| page.section == KnowledgeSection::MaharajaClub)
        {
            club.url = MAHARAJA_CLUB_FAQ_URL.to_string();
        }

        Self {
            pages,
            cache_ttl: chrono::Duration::hours(1),
            max_retries: 3,
            retry_base_delay: Duration::from_millis(2000),
            request_timeout: Duration::from_secs(30),
            max_text_chars: 5000,
            min_content_chars: 100,
        }
    }
}

impl ScraperConfig {
    /// Serves every section, the loyalty FAQ included, from one base URL.
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            pages: faq_pages(base_url),
            ..Self::default()
        }
    }
}

fn faq_pages(base_url: &str) -> Vec<PageSource> {
    let base = if base_url.ends_with('/') {
        base_url.to_string()
    } else {
        format!("{base_url}/")
    };

    KnowledgeSection::ALL
        .into_iter()
        .map(|section| {
            let file = match section {
                KnowledgeSection::Baggage => "baggage.html",
                KnowledgeSection::CheckIn => "check-in.html",
                KnowledgeSection::Booking => "booking.html",
                KnowledgeSection::Policies => "cancellation-refund.html",
                KnowledgeSection::MaharajaClub => "maharaja-club/faqs.html",
            };
            PageSource {
                section,
                url: format!("{base}{file}"),
            }
        })
        .collect()
}

#[async_trait]
pub trait KnowledgeSource: Send + Sync {
    /// Never fails; total scrape failure yields the bundled fallback.
    async fn knowledge_base(&self) -> ScrapedKnowledgeBase;

    /// Like `knowledge_base`, but a cached fallback does not count as a hit.
    async fn refresh(&self) -> ScrapedKnowledgeBase {
        self.knowledge_base().await
    }
}

/// Scrapes the policy pages concurrently with per-page retry, caching each page
/// and the aggregate separately.
///
/// Concurrent cache misses are not coalesced; each one scrapes.
pub struct KnowledgeScraper<F> {
    fetcher: F,
    config: ScraperConfig,
    pages: TtlCache<String, String>,
    aggregate: TtlCache<&'static str, ScrapedKnowledgeBase>,
}

impl<F: PageFetcher> KnowledgeScraper<F> {
    pub fn new(fetcher: F, config: ScraperConfig) -> Self {
        let pages = TtlCache::new(config.cache_ttl);
        let aggregate = TtlCache::new(config.cache_ttl);
        Self {
            fetcher,
            config,
            pages,
            aggregate,
        }
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    pub fn cached(&self) -> Option<ScrapedKnowledgeBase> {
        self.aggregate.get(&AGGREGATE_KEY)
    }

    #[instrument(skip(self))]
    pub async fn get_knowledge_base(&self) -> ScrapedKnowledgeBase {
        if let Some(cached) = self.cached() {
            debug!(is_fallback = cached.is_fallback, "using cached knowledge base");
            return cached;
        }

        info!(pages = self.config.pages.len(), "scraping airline policy pages");
        let results = join_all(self.config.pages.iter().map(|page| async move {
            (page.section, self.scrape_page(page).await)
        }))
        .await;

        let mut knowledge = ScrapedKnowledgeBase::empty(Utc::now());
        for (section, text) in results {
            knowledge.set_section(section, text);
        }

        let populated = knowledge.populated_sections();
        if populated == 0 {
            warn!("failed to scrape any policy page; serving bundled fallback content");
            knowledge = fallback_knowledge(Utc::now());
        } else {
            info!(
                populated,
                total = self.config.pages.len(),
                "scraped policy pages"
            );
        }

        self.aggregate.insert(AGGREGATE_KEY, knowledge.clone());
        knowledge
    }

    /// Drops a cached fallback aggregate and scrapes again; cached live content is kept.
    pub async fn refresh_knowledge_base(&self) -> ScrapedKnowledgeBase {
        if self.cached().is_some_and(|cached| cached.is_fallback) {
            debug!("discarding cached fallback before re-scrape");
            self.aggregate.remove(&AGGREGATE_KEY);
        }
        self.get_knowledge_base().await
    }

    async fn scrape_page(&self, page: &PageSource) -> Option<String> {
        let key = format!("page_{}", page.section.key());
        if let Some(text) = self.pages.get(&key) {
            debug!(page = %key, "using cached page");
            return Some(text);
        }

        for attempt in 0..=self.config.max_retries {
            match self.fetch_text(&page.url).await {
                Ok(text) => {
                    debug!(page = %key, chars = text.len(), "scraped page");
                    self.pages.insert(key, text.clone());
                    return Some(text);
                }
                Err(err) if attempt < self.config.max_retries => {
                    let delay = self.config.retry_base_delay * 2_u32.pow(attempt);
                    warn!(
                        page = %key,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "page scrape failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => {
                    error!(page = %key, url = %page.url, error = %err, "giving up on page");
                }
            }
        }

        None
    }

    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let html = self.fetcher.fetch(url).await?;
        let text = clean_text(
            &extract_page_text(&html, self.config.min_content_chars),
            self.config.max_text_chars,
        );

        let chars = text.chars().count();
        if chars > self.config.min_content_chars {
            Ok(text)
        } else {
            Err(FetchError::InsufficientContent(chars))
        }
    }
}

#[async_trait]
impl<F: PageFetcher> KnowledgeSource for KnowledgeScraper<F> {
    async fn knowledge_base(&self) -> ScrapedKnowledgeBase {
        self.get_knowledge_base().await
    }

    async fn refresh(&self) -> ScrapedKnowledgeBase {
        self.refresh_knowledge_base().await
    }
}
