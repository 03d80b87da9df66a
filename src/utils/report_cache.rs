use moka::future::Cache;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::reports::{DashboardStats, ReportSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    Dashboard,
    Summary,
}

#[derive(Debug, Clone)]
pub enum CachedReport {
    Dashboard(DashboardStats),
    Summary(ReportSummary),
}

/// Dashboard and report aggregates, shared by all workers.
///
/// Entries expire after the configured TTL and are dropped wholesale by
/// `invalidate` whenever leave or attendance data changes.
///
/// Readers take a `generation` before computing an aggregate and hand it
/// back to `put_*`. An aggregate computed across an invalidation is never
/// left in the cache.
pub struct ReportCache {
    cache: Cache<ReportKind, CachedReport>,
    generation: AtomicU64,
}

impl ReportCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(16)
                .time_to_live(ttl)
                .build(),
            generation: AtomicU64::new(0),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub async fn dashboard(&self) -> Option<DashboardStats> {
        match self.cache.get(&ReportKind::Dashboard).await {
            Some(CachedReport::Dashboard(stats)) => Some(stats),
            _ => None,
        }
    }

    pub async fn summary(&self) -> Option<ReportSummary> {
        match self.cache.get(&ReportKind::Summary).await {
            Some(CachedReport::Summary(summary)) => Some(summary),
            _ => None,
        }
    }

    pub async fn put_dashboard(&self, stats: DashboardStats, generation: u64) {
        self.put(ReportKind::Dashboard, CachedReport::Dashboard(stats), generation)
            .await;
    }

    pub async fn put_summary(&self, summary: ReportSummary, generation: u64) {
        self.put(ReportKind::Summary, CachedReport::Summary(summary), generation)
            .await;
    }

    async fn put(&self, kind: ReportKind, report: CachedReport, generation: u64) {
        if self.generation() != generation {
            return;
        }
        self.cache.insert(kind, report).await;
        // an invalidate that raced the insert must still win
        if self.generation() != generation {
            self.cache.invalidate(&kind).await;
        }
    }

    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.cache.invalidate_all();
    }
}
