// src/domain/search.rs
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::{DomainError, Note};

/// The closed set of search modes the backend offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    #[default]
    Keyword,
    Semantic,
    Hybrid,
}

impl SearchMode {
    pub const ALL: [SearchMode; 3] = [SearchMode::Keyword, SearchMode::Semantic, SearchMode::Hybrid];

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMode::Keyword => "keyword",
            SearchMode::Semantic => "semantic",
            SearchMode::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        SearchMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == wanted)
            .ok_or_else(|| {
                DomainError::Validation(format!(
                    "unknown search mode '{s}', expected keyword, semantic or hybrid"
                ))
            })
    }
}

/// Body of `POST /search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub search_type: SearchMode,
    pub limit: u32,
    pub include_content: bool,
}

/// One raw hit as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub note: Note,
    pub relevance_score: f64,
    #[serde(default)]
    pub matched_chunks: Vec<String>,
}

/// Response envelope of `POST /search`. Results arrive relevance-descending.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    #[serde(default)]
    pub total_found: usize,
    #[serde(default)]
    pub search_time: f64,
    #[serde(default)]
    pub search_type: SearchMode,
}

/// Display-ready projection of a `SearchResult`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub note: Note,
    pub relevance_score: f64,
    pub excerpts: Vec<String>,
    /// Matched chunks not shown because of the excerpt cap.
    pub hidden_excerpts: usize,
}

/// `GET /analytics/search` payload, displayed as received.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchAnalytics {
    #[serde(default)]
    pub total_searches: u64,
    #[serde(default)]
    pub average_response_time: f64,
    #[serde(default)]
    pub search_types: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub popular_queries: Vec<PopularQuery>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PopularQuery {
    Counted { query: String, count: u64 },
    Plain(String),
}

impl PopularQuery {
    pub fn query(&self) -> &str {
        match self {
            PopularQuery::Counted { query, .. } => query,
            PopularQuery::Plain(query) => query,
        }
    }
}

/// `GET /health` payload. An unhealthy backend only reports `status` and `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<DatabaseHealth>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseHealth {
    pub note_count: u64,
    pub embedding_count: u64,
    pub database_type: String,
}
