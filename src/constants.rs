// src/constants.rs
//
// Limits and defaults shared by the client. Backend-imposed limits mirror what
// the Smart Notes API validates so requests that would be rejected never leave.

/// Longest title the backend stores.
///
/// Used in: `domain/note.rs`
pub const MAX_TITLE_LENGTH: usize = 255;

/// Longest search query the backend accepts; longer queries are cut.
///
/// Used in: `application/search_orchestrator.rs`
pub const MAX_QUERY_LENGTH: usize = 500;

/// Accepted range for the `limit` field of a search request.
///
/// Used in: `application/search_orchestrator.rs`
pub const MIN_SEARCH_LIMIT: u32 = 1;
pub const MAX_SEARCH_LIMIT: u32 = 50;

/// Excerpts shown per search hit.
///
/// Used in: `config.rs`, `application/search_orchestrator.rs`
pub const DEFAULT_MAX_EXCERPTS: usize = 2;

/// Characters kept from each excerpt before the ellipsis marker.
///
/// Used in: `config.rs`, `util/text.rs`
pub const DEFAULT_EXCERPT_LENGTH: usize = 150;

/// Appended to excerpts that were cut.
///
/// Used in: `util/text.rs`
pub const ELLIPSIS: &str = "...";

/// Notes fetched by a full list refresh.
///
/// Used in: `config.rs`, `application/note_cache.rs`
pub const DEFAULT_LIST_LIMIT: u32 = 20;

/// Default search result count.
///
/// Used in: `config.rs`
pub const DEFAULT_SEARCH_LIMIT: u32 = 10;

/// Default analytics window in days.
///
/// Used in: `cli/args.rs`
pub const DEFAULT_ANALYTICS_DAYS: u32 = 7;

/// Request timeout for the HTTP client.
///
/// Used in: `config.rs`
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
