// src/application/ports.rs
use serde::{Deserialize, Serialize};
use std::rc::Rc;

use crate::domain::{
    ApiError, HealthReport, Note, NoteFields, NoteId, NoteUpdate, SearchAnalytics, SearchRequest,
    SearchResponse,
};

/// Query parameters of `GET /notes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    pub limit: u32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub skip: u32,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub public_only: bool,
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}

impl ListQuery {
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            skip: 0,
            public_only: false,
        }
    }
}

/// Remote note resource and search service.
///
/// Implementations only move requests and responses; classifying failures
/// (conflict, not found, transport) is left to the application layer.
#[allow(async_fn_in_trait)]
pub trait NoteApi {
    async fn list_notes(&self, query: &ListQuery) -> Result<Vec<Note>, ApiError>;

    async fn get_note(&self, id: &NoteId) -> Result<Note, ApiError>;

    async fn create_note(&self, fields: &NoteFields) -> Result<Note, ApiError>;

    /// Must carry `update.version` to the backend untouched
    async fn update_note(&self, id: &NoteId, update: &NoteUpdate) -> Result<Note, ApiError>;

    async fn delete_note(&self, id: &NoteId) -> Result<(), ApiError>;

    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, ApiError>;

    async fn search_analytics(&self, days: u32) -> Result<SearchAnalytics, ApiError>;

    async fn health(&self) -> Result<HealthReport, ApiError>;
}

impl<T: NoteApi> NoteApi for Rc<T> {
    async fn list_notes(&self, query: &ListQuery) -> Result<Vec<Note>, ApiError> {
        (**self).list_notes(query).await
    }

    async fn get_note(&self, id: &NoteId) -> Result<Note, ApiError> {
        (**self).get_note(id).await
    }

    async fn create_note(&self, fields: &NoteFields) -> Result<Note, ApiError> {
        (**self).create_note(fields).await
    }

    async fn update_note(&self, id: &NoteId, update: &NoteUpdate) -> Result<Note, ApiError> {
        (**self).update_note(id, update).await
    }

    async fn delete_note(&self, id: &NoteId) -> Result<(), ApiError> {
        (**self).delete_note(id).await
    }

    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, ApiError> {
        (**self).search(request).await
    }

    async fn search_analytics(&self, days: u32) -> Result<SearchAnalytics, ApiError> {
        (**self).search_analytics(days).await
    }

    async fn health(&self) -> Result<HealthReport, ApiError> {
        (**self).health().await
    }
}
