use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use metrics::{counter, histogram};
use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: OnceCell<()> = OnceCell::new();

#[derive(Debug, Default)]
pub struct AppMetrics {
    requests_total: AtomicU64,
    flight_searches_total: AtomicU64,
    flight_searches_empty_total: AtomicU64,
    knowledge_fallback_total: AtomicU64,
    completion_failures_total: AtomicU64,
    total_latency_millis: AtomicU64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub requests_total: u64,
    pub flight_searches_total: u64,
    pub flight_searches_empty_total: u64,
    pub knowledge_fallback_total: u64,
    pub completion_failures_total: u64,
    pub avg_latency_millis: f64,
}

impl AppMetrics {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn inc_request(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
        counter!("airdesk_requests_total").increment(1);
    }

    pub fn record_flight_search(&self, found_offers: bool) {
        self.flight_searches_total.fetch_add(1, Ordering::Relaxed);
        counter!("airdesk_flight_searches_total").increment(1);
        if !found_offers {
            self.flight_searches_empty_total
                .fetch_add(1, Ordering::Relaxed);
            counter!("airdesk_flight_searches_empty_total").increment(1);
        }
    }

    pub fn inc_knowledge_fallback(&self) {
        self.knowledge_fallback_total.fetch_add(1, Ordering::Relaxed);
        counter!("airdesk_knowledge_fallback_total").increment(1);
    }

    pub fn inc_completion_failure(&self) {
        self.completion_failures_total
            .fetch_add(1, Ordering::Relaxed);
        counter!("airdesk_completion_failures_total").increment(1);
    }

    pub fn observe_latency(&self, duration: Duration) {
        self.total_latency_millis
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
        histogram!("airdesk_request_latency_seconds").record(duration.as_secs_f64());
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let requests = self.requests_total.load(Ordering::Relaxed);
        let latency = self.total_latency_millis.load(Ordering::Relaxed);

        MetricsSnapshot {
            requests_total: requests,
            flight_searches_total: self.flight_searches_total.load(Ordering::Relaxed),
            flight_searches_empty_total: self.flight_searches_empty_total.load(Ordering::Relaxed),
            knowledge_fallback_total: self.knowledge_fallback_total.load(Ordering::Relaxed),
            completion_failures_total: self.completion_failures_total.load(Ordering::Relaxed),
            avg_latency_millis: if requests == 0 {
                0.0
            } else {
                latency as f64 / requests as f64
            },
        }
    }
}

pub fn init_tracing(service_name: &str) {
    TRACING_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}=info,airdesk_api=info,airdesk_agents=info,airdesk_retrieval=info,airdesk_flights=info",
                service_name
            ))
        });

        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .with_span_list(true)
            .init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_counters() {
        let metrics = AppMetrics::default();
        metrics.inc_request();
        metrics.inc_request();
        metrics.record_flight_search(true);
        metrics.record_flight_search(false);
        metrics.inc_knowledge_fallback();
        metrics.observe_latency(Duration::from_millis(30));
        metrics.observe_latency(Duration::from_millis(10));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.requests_total, 2);
        assert_eq!(snapshot.flight_searches_total, 2);
        assert_eq!(snapshot.flight_searches_empty_total, 1);
        assert_eq!(snapshot.knowledge_fallback_total, 1);
        assert_eq!(snapshot.completion_failures_total, 0);
        assert_eq!(snapshot.avg_latency_millis, 20.0);
    }
}
