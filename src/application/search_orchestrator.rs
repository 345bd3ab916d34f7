// src/application/search_orchestrator.rs
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use tracing::{debug, info, instrument};

use crate::application::ports::NoteApi;
use crate::constants::{
    DEFAULT_EXCERPT_LENGTH, DEFAULT_MAX_EXCERPTS, MAX_QUERY_LENGTH, MAX_SEARCH_LIMIT,
    MIN_SEARCH_LIMIT,
};
use crate::domain::{
    DomainError, SearchAnalytics, SearchHit, SearchMode, SearchRequest, SearchResponse,
    SearchResult,
};
use crate::util::text::truncate_excerpt;

/// How matched chunks are cut down for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcerptPolicy {
    pub max_excerpts: usize,
    pub excerpt_length: usize,
}

impl Default for ExcerptPolicy {
    fn default() -> Self {
        Self {
            max_excerpts: DEFAULT_MAX_EXCERPTS,
            excerpt_length: DEFAULT_EXCERPT_LENGTH,
        }
    }
}

impl ExcerptPolicy {
    /// Project raw results into display hits, keeping the backend's order.
    pub fn render(&self, results: &[SearchResult]) -> Vec<SearchHit> {
        results.iter().map(|result| self.render_one(result)).collect()
    }

    fn render_one(&self, result: &SearchResult) -> SearchHit {
        let excerpts: Vec<String> = result
            .matched_chunks
            .iter()
            .take(self.max_excerpts)
            .map(|chunk| truncate_excerpt(chunk, self.excerpt_length))
            .collect();

        SearchHit {
            note: result.note.clone(),
            relevance_score: result.relevance_score,
            hidden_excerpts: result.matched_chunks.len() - excerpts.len(),
            excerpts,
        }
    }
}

/// What is currently on display for search.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchState {
    pub query: String,
    pub mode: SearchMode,
    /// Generation of the call whose result is displayed.
    pub generation: u64,
    pub hits: Vec<SearchHit>,
    pub total_found: usize,
    pub search_time: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// The result became the displayed state.
    Applied(Vec<SearchHit>),
    /// A newer search was started before this one completed; nothing changed.
    Stale { generation: u64 },
}

/// Dispatches searches and keeps the displayed results in step with the most
/// recently started call.
///
/// Every call takes a generation number when it starts. When it completes,
/// its result is applied only if no other call started in the meantime.
/// In-flight requests are never aborted, only ignored.
pub struct SearchOrchestrator<A: NoteApi> {
    api: A,
    policy: ExcerptPolicy,
    latest_generation: Cell<u64>,
    state: RefCell<SearchState>,
    last_response: RefCell<Option<SearchResponse>>,
}

impl<A: NoteApi> SearchOrchestrator<A> {
    pub fn new(api: A, policy: ExcerptPolicy) -> Self {
        Self {
            api,
            policy,
            latest_generation: Cell::new(0),
            state: RefCell::new(SearchState::default()),
            last_response: RefCell::new(None),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn state(&self) -> SearchState {
        self.state.borrow().clone()
    }

    /// Unabridged response behind the displayed hits, if any.
    pub fn last_response(&self) -> Option<SearchResponse> {
        self.last_response.borrow().clone()
    }

    pub fn latest_generation(&self) -> u64 {
        self.latest_generation.get()
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn search(
        &self,
        query: &str,
        mode: SearchMode,
        limit: u32,
        include_content: bool,
    ) -> Result<SearchOutcome, DomainError> {
        let generation = self.latest_generation.get() + 1;
        self.latest_generation.set(generation);

        let query = query.trim();
        if query.is_empty() {
            debug!(generation, "Empty query, clearing results without a request");
            self.apply(generation, query, mode, None);
            return Ok(SearchOutcome::Applied(vec![]));
        }

        let request = build_request(query, mode, limit, include_content);
        let result = self.api.search(&request).await;

        if generation != self.latest_generation.get() {
            debug!(
                generation,
                latest = self.latest_generation.get(),
                "Discarding stale search completion"
            );
            return Ok(SearchOutcome::Stale { generation });
        }

        let response = result?;
        info!(
            query = %request.query,
            mode = %mode,
            results = response.results.len(),
            "Search completed"
        );
        let hits = self.apply(generation, &request.query, mode, Some(response));
        Ok(SearchOutcome::Applied(hits))
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn analytics(&self, days: u32) -> Result<SearchAnalytics, DomainError> {
        Ok(self.api.search_analytics(days).await?)
    }

    fn apply(
        &self,
        generation: u64,
        query: &str,
        mode: SearchMode,
        response: Option<SearchResponse>,
    ) -> Vec<SearchHit> {
        let hits = response
            .as_ref()
            .map(|r| self.policy.render(&r.results))
            .unwrap_or_default();

        *self.state.borrow_mut() = SearchState {
            query: query.to_string(),
            mode,
            generation,
            hits: hits.clone(),
            total_found: response.as_ref().map_or(0, |r| r.total_found),
            search_time: response.as_ref().map_or(0.0, |r| r.search_time),
        };
        *self.last_response.borrow_mut() = response;
        hits
    }
}

fn build_request(query: &str, mode: SearchMode, limit: u32, include_content: bool) -> SearchRequest {
    SearchRequest {
        query: query.chars().take(MAX_QUERY_LENGTH).collect(),
        search_type: mode,
        limit: limit.clamp(MIN_SEARCH_LIMIT, MAX_SEARCH_LIMIT),
        include_content,
    }
}
