use std::sync::Arc;

use airdesk_core::ScrapedKnowledgeBase;
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;

/// Last knowledge base seen by the process, shared between the preload task and
/// request handlers. Writers replace it wholesale.
#[derive(Debug, Clone)]
pub struct KnowledgeSnapshot {
    slot: Arc<RwLock<Option<ScrapedKnowledgeBase>>>,
    ttl: Duration,
}

impl KnowledgeSnapshot {
    pub fn new(ttl: Duration) -> Self {
        Self {
            slot: Arc::new(RwLock::new(None)),
            ttl,
        }
    }

    pub fn fresh_at(&self, now: DateTime<Utc>) -> Option<ScrapedKnowledgeBase> {
        self.slot
            .read()
            .as_ref()
            .filter(|knowledge| now - knowledge.timestamp < self.ttl)
            .cloned()
    }

    pub fn store(&self, knowledge: ScrapedKnowledgeBase) {
        *self.slot.write() = Some(knowledge);
    }

    pub fn is_populated(&self) -> bool {
        self.slot.read().is_some()
    }

    /// Fallback content is re-primed even while it is fresh.
    pub fn needs_refresh_at(&self, now: DateTime<Utc>) -> bool {
        match self.slot.read().as_ref() {
            None => true,
            Some(knowledge) => knowledge.is_fallback || now - knowledge.timestamp >= self.ttl,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn freshness_follows_ttl_and_fallback_flag() {
        let t0 = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let snapshot = KnowledgeSnapshot::new(Duration::hours(1));
        assert!(snapshot.needs_refresh_at(t0));
        assert!(snapshot.fresh_at(t0).is_none());

        snapshot.store(ScrapedKnowledgeBase::empty(t0));
        assert!(snapshot.is_populated());
        assert!(!snapshot.needs_refresh_at(t0 + Duration::minutes(30)));
        assert!(snapshot.fresh_at(t0 + Duration::minutes(30)).is_some());
        assert!(snapshot.needs_refresh_at(t0 + Duration::hours(1)));
        assert!(snapshot.fresh_at(t0 + Duration::hours(1)).is_none());

        let mut fallback = ScrapedKnowledgeBase::empty(t0);
        fallback.is_fallback = true;
        snapshot.store(fallback);
        assert!(snapshot.needs_refresh_at(t0));
        assert!(snapshot.fresh_at(t0).is_some());
    }
}
