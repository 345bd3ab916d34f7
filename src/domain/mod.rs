// src/domain/mod.rs
pub mod error;
pub mod note;
pub mod search;

pub use error::{ApiError, DomainError};
pub use note::{Draft, DraftChange, Note, NoteFields, NoteId, NoteUpdate};
pub use search::{
    DatabaseHealth, HealthReport, PopularQuery, SearchAnalytics, SearchHit, SearchMode,
    SearchRequest, SearchResponse, SearchResult,
};
