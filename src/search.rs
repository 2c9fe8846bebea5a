//! Cross-Level Search
//!
//! Fans one capped name search out to every level, waits for all of them, and
//! concatenates whatever succeeded in level order. A failing level contributes
//! nothing; it never cancels its siblings.

use crate::config::SearchConfig;
use crate::level::Level;
use crate::node::SearchResult;
use crate::resolver::nodes_from_rows;
use crate::source::{clean_search_pattern, RecordSource};
use futures::future::join_all;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct CrossLevelSearch {
    source: Arc<dyn RecordSource>,
    config: SearchConfig,
    in_flight: AtomicUsize,
    generation: AtomicU64,
    last_results: RwLock<Vec<SearchResult>>,
}

/// Keeps the searching flag raised for as long as it lives.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl CrossLevelSearch {
    pub fn new(source: Arc<dyn RecordSource>, config: SearchConfig) -> Self {
        Self {
            source,
            config,
            in_flight: AtomicUsize::new(0),
            generation: AtomicU64::new(0),
            last_results: RwLock::new(Vec::new()),
        }
    }

    /// True while any search is awaiting its reads.
    pub fn is_searching(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Results of the most recently started search that has completed.
    pub fn last_results(&self) -> Vec<SearchResult> {
        self.last_results.read().clone()
    }

    /// Search all six levels for names containing `query`.
    ///
    /// Wildcard and filter-syntax characters are dropped from the query
    /// before both the backend read and the name filter. Queries left shorter
    /// than `min_query_len` characters clear the results and issue no read.
    /// At most `per_level_limit` results come from each level.
    pub async fn search(&self, query: &str) -> Vec<SearchResult> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let cleaned = clean_search_pattern(query.trim());
        let query = cleaned.trim();

        if query.chars().count() < self.config.min_query_len {
            self.last_results.write().clear();
            return Vec::new();
        }

        let _flag = InFlight::enter(&self.in_flight);
        let needle = query.to_lowercase();
        let limit = self.config.per_level_limit;

        let per_level = join_all(
            Level::ALL
                .into_iter()
                .map(|level| self.search_level(level, query, &needle, limit)),
        )
        .await;

        let results: Vec<SearchResult> = per_level.into_iter().flatten().collect();
        debug!(query = %query, count = results.len(), "Cross-level search finished");

        if self.generation.load(Ordering::SeqCst) == generation {
            *self.last_results.write() = results.clone();
        } else {
            debug!(query = %query, "Newer search started, not publishing results");
        }
        results
    }

    async fn search_level(
        &self,
        level: Level,
        query: &str,
        needle: &str,
        limit: usize,
    ) -> Vec<SearchResult> {
        match self.source.search_by_name(level, query, limit).await {
            Ok(rows) => nodes_from_rows(level, rows)
                .into_iter()
                .filter(|node| node.name.to_lowercase().contains(needle))
                .take(limit)
                .map(SearchResult::from)
                .collect(),
            Err(e) => {
                warn!(%level, query = %query, error = %e, "Level search failed, skipping level");
                Vec::new()
            }
        }
    }
}
