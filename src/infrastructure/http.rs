// src/infrastructure/http.rs
use anyhow::{Context, Result};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::application::ports::{ListQuery, NoteApi};
use crate::domain::{
    ApiError, HealthReport, Note, NoteFields, NoteId, NoteUpdate, SearchAnalytics, SearchRequest,
    SearchResponse,
};

/// Typed HTTP client for the Smart Notes API.
#[derive(Debug, Clone)]
pub struct HttpNoteApi {
    base_url: Url,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

impl HttpNoteApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .with_context(|| format!("Invalid server URL: {base_url}"))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("Server URL cannot carry paths: {base_url}");
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        info!(%base_url, "Using Smart Notes API");
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Network(format!("cannot extend URL {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

fn network_error(error: reqwest::Error) -> ApiError {
    ApiError::Network(error.to_string())
}

/// Pull FastAPI's `{"detail": ...}` out of an error body, falling back to the raw text.
fn error_detail(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            detail: serde_json::Value::String(detail),
        }) => detail,
        Ok(ErrorBody { detail }) => detail.to_string(),
        Err(_) => body.trim().to_string(),
    }
}

async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    debug!(status = status.as_u16(), %body, "Request failed");
    Err(ApiError::Status {
        status: status.as_u16(),
        detail: error_detail(&body),
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    check_status(response)
        .await?
        .json::<T>()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}

impl NoteApi for HttpNoteApi {
    #[instrument(level = "debug", skip(self))]
    async fn list_notes(&self, query: &ListQuery) -> Result<Vec<Note>, ApiError> {
        let response = self
            .client
            .get(self.endpoint(&["notes"])?)
            .query(query)
            .send()
            .await
            .map_err(network_error)?;
        decode(response).await
    }

    #[instrument(level = "debug", skip(self))]
    async fn get_note(&self, id: &NoteId) -> Result<Note, ApiError> {
        let response = self
            .client
            .get(self.endpoint(&["notes", id.as_str()])?)
            .send()
            .await
            .map_err(network_error)?;
        decode(response).await
    }

    #[instrument(level = "debug", skip(self, fields))]
    async fn create_note(&self, fields: &NoteFields) -> Result<Note, ApiError> {
        let response = self
            .client
            .post(self.endpoint(&["notes"])?)
            .json(fields)
            .send()
            .await
            .map_err(network_error)?;
        decode(response).await
    }

    #[instrument(level = "debug", skip(self, update), fields(version = update.version))]
    async fn update_note(&self, id: &NoteId, update: &NoteUpdate) -> Result<Note, ApiError> {
        let response = self
            .client
            .put(self.endpoint(&["notes", id.as_str()])?)
            .json(update)
            .send()
            .await
            .map_err(network_error)?;
        decode(response).await
    }

    #[instrument(level = "debug", skip(self))]
    async fn delete_note(&self, id: &NoteId) -> Result<(), ApiError> {
        let response = self
            .client
            .delete(self.endpoint(&["notes", id.as_str()])?)
            .send()
            .await
            .map_err(network_error)?;
        check_status(response).await?;
        Ok(())
    }

    #[instrument(level = "debug", skip(self, request), fields(query = %request.query, mode = %request.search_type))]
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, ApiError> {
        let response = self
            .client
            .post(self.endpoint(&["search"])?)
            .json(request)
            .send()
            .await
            .map_err(network_error)?;
        decode(response).await
    }

    #[instrument(level = "debug", skip(self))]
    async fn search_analytics(&self, days: u32) -> Result<SearchAnalytics, ApiError> {
        let response = self
            .client
            .get(self.endpoint(&["analytics", "search"])?)
            .query(&[("days", days)])
            .send()
            .await
            .map_err(network_error)?;
        decode(response).await
    }

    #[instrument(level = "debug", skip(self))]
    async fn health(&self) -> Result<HealthReport, ApiError> {
        let response = self
            .client
            .get(self.endpoint(&["health"])?)
            .send()
            .await
            .map_err(network_error)?;
        decode(response).await
    }
}
