use anyhow::{Context, Result};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use smartnotes::application::ListQuery;
use smartnotes::domain::{Note, NoteFields, NoteId, NoteUpdate, SearchRequest, SearchResponse, SearchResult};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Note with fixed timestamps, handy for payload assertions
#[allow(dead_code)]
pub fn sample_note(id: &str, version: i64) -> Note {
    let at = fixed_time();
    Note {
        id: NoteId::new(id),
        title: format!("Title of {id}"),
        content: format!("Content of {id}"),
        tags: "rust,notes".to_string(),
        is_public: false,
        view_count: 0,
        version,
        created_at: at,
        updated_at: at,
    }
}

fn fixed_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 4, 1)
        .and_then(|d| d.and_hms_micro_opt(9, 15, 0, 123_456))
        .expect("valid fixture date")
}

type ApiResult<T> = std::result::Result<Json<T>, (StatusCode, Json<Value>)>;

fn problem(status: StatusCode, detail: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "detail": detail })))
}

#[derive(Default)]
struct Store {
    notes: Vec<Note>,
    next_id: u64,
    searches: Vec<SearchRequest>,
}

type Shared = Arc<Mutex<Store>>;

/// In-process Smart Notes backend on an ephemeral port.
///
/// Mirrors the real service's optimistic concurrency: `PUT /notes/{id}`
/// answers 409 when the submitted version is stale.
#[allow(dead_code)]
pub struct FakeBackend {
    base_url: String,
    store: Shared,
    server: JoinHandle<()>,
}

#[allow(dead_code)]
impl FakeBackend {
    pub async fn start() -> Result<Self> {
        let store = Shared::default();
        let app = Router::new()
            .route("/notes", get(list_notes).post(create_note))
            .route("/notes/:id", get(get_note).put(update_note).delete(delete_note))
            .route("/search", post(search))
            .route("/analytics/search", get(analytics))
            .route("/health", get(health))
            .with_state(store.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("Failed to bind fake backend")?;
        let addr = listener.local_addr()?;
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            base_url: format!("http://{addr}"),
            store,
            server,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Seed a note directly into the store
    pub fn insert(&self, title: &str, content: &str, is_public: bool) -> Note {
        let mut store = self.store.lock().expect("store lock");
        store.next_id += 1;
        let note = Note {
            title: title.to_string(),
            content: content.to_string(),
            is_public,
            ..sample_note(&format!("srv-{}", store.next_id), 1)
        };
        store.notes.insert(0, note.clone());
        note
    }

    /// Simulate a write from another client by bumping the stored version
    pub fn touch(&self, id: &NoteId) {
        let mut store = self.store.lock().expect("store lock");
        if let Some(note) = store.notes.iter_mut().find(|n| &n.id == id) {
            note.version += 1;
            note.updated_at = Utc::now().naive_utc();
        }
    }

    pub fn stored(&self, id: &NoteId) -> Option<Note> {
        let store = self.store.lock().expect("store lock");
        store.notes.iter().find(|n| &n.id == id).cloned()
    }

    pub fn searches(&self) -> Vec<SearchRequest> {
        self.store.lock().expect("store lock").searches.clone()
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn list_notes(State(store): State<Shared>, Query(query): Query<ListQuery>) -> Json<Vec<Note>> {
    let store = store.lock().expect("store lock");
    let notes = store
        .notes
        .iter()
        .filter(|n| !query.public_only || n.is_public)
        .skip(query.skip as usize)
        .take(query.limit as usize)
        .cloned()
        .collect();
    Json(notes)
}

async fn get_note(State(store): State<Shared>, Path(id): Path<String>) -> ApiResult<Note> {
    let mut store = store.lock().expect("store lock");
    let note = store
        .notes
        .iter_mut()
        .find(|n| n.id.as_str() == id)
        .ok_or_else(|| problem(StatusCode::NOT_FOUND, "Note not found"))?;
    note.view_count += 1;
    Ok(Json(note.clone()))
}

async fn create_note(State(store): State<Shared>, Json(fields): Json<NoteFields>) -> Json<Note> {
    let mut store = store.lock().expect("store lock");
    store.next_id += 1;
    let now = Utc::now().naive_utc();
    let note = Note {
        id: NoteId::new(format!("srv-{}", store.next_id)),
        title: fields.title,
        content: fields.content,
        tags: fields.tags,
        is_public: fields.is_public,
        view_count: 0,
        version: 1,
        created_at: now,
        updated_at: now,
    };
    store.notes.insert(0, note.clone());
    Json(note)
}

async fn update_note(
    State(store): State<Shared>,
    Path(id): Path<String>,
    Json(update): Json<NoteUpdate>,
) -> ApiResult<Note> {
    let mut store = store.lock().expect("store lock");
    let note = store
        .notes
        .iter_mut()
        .find(|n| n.id.as_str() == id)
        .ok_or_else(|| problem(StatusCode::NOT_FOUND, "Note not found"))?;
    if note.version != update.version {
        return Err(problem(
            StatusCode::CONFLICT,
            "Note was modified by another user. Please refresh.",
        ));
    }
    note.title = update.fields.title;
    note.content = update.fields.content;
    note.tags = update.fields.tags;
    note.is_public = update.fields.is_public;
    note.version += 1;
    note.updated_at = Utc::now().naive_utc();
    Ok(Json(note.clone()))
}

async fn delete_note(State(store): State<Shared>, Path(id): Path<String>) -> ApiResult<Value> {
    let mut store = store.lock().expect("store lock");
    let before = store.notes.len();
    store.notes.retain(|n| n.id.as_str() != id);
    if store.notes.len() == before {
        return Err(problem(StatusCode::NOT_FOUND, "Note not found"));
    }
    Ok(Json(json!({ "message": "Note deleted successfully" })))
}

async fn search(State(store): State<Shared>, Json(request): Json<SearchRequest>) -> Json<SearchResponse> {
    let mut store = store.lock().expect("store lock");
    store.searches.push(request.clone());
    let needle = request.query.to_lowercase();
    let results: Vec<SearchResult> = store
        .notes
        .iter()
        .filter(|n| {
            n.title.to_lowercase().contains(&needle) || n.content.to_lowercase().contains(&needle)
        })
        .take(request.limit as usize)
        .map(|n| SearchResult {
            note: n.clone(),
            relevance_score: 1.0,
            matched_chunks: if request.include_content {
                vec![n.content.clone()]
            } else {
                Vec::new()
            },
        })
        .collect();
    Json(SearchResponse {
        total_found: results.len(),
        results,
        search_time: 0.002,
        search_type: request.search_type,
    })
}

#[derive(Deserialize)]
struct DaysQuery {
    days: u32,
}

async fn analytics(State(store): State<Shared>, Query(query): Query<DaysQuery>) -> Json<Value> {
    let store = store.lock().expect("store lock");
    Json(json!({
        "period_days": query.days,
        "total_searches": store.searches.len(),
        "average_response_time": 0.002,
        "search_types": { "keyword": store.searches.len() },
        "popular_queries": store
            .searches
            .iter()
            .map(|s| json!({ "query": s.query, "count": 1 }))
            .collect::<Vec<_>>(),
    }))
}

async fn health(State(store): State<Shared>) -> Json<Value> {
    let store = store.lock().expect("store lock");
    Json(json!({
        "status": "healthy",
        "timestamp": "2024-04-01T09:15:00",
        "database": {
            "note_count": store.notes.len(),
            "embedding_count": 0,
            "database_type": "sqlite"
        },
        "version": "1.0.0"
    }))
}
