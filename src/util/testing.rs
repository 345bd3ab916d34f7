// src/util/testing.rs

use anyhow::Result;
use chrono::Utc;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::env;
use tokio::sync::oneshot;
use tracing::{debug, info};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::application::ports::{ListQuery, NoteApi};
use crate::domain::error::{STATUS_CONFLICT, STATUS_NOT_FOUND};
use crate::domain::{
    ApiError, DatabaseHealth, HealthReport, Note, NoteFields, NoteId, NoteUpdate, SearchAnalytics,
    SearchRequest, SearchResponse,
};

/// Every request the mock receives, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    ListNotes(ListQuery),
    GetNote(NoteId),
    CreateNote(NoteFields),
    UpdateNote(NoteId, NoteUpdate),
    DeleteNote(NoteId),
    Search(SearchRequest),
    SearchAnalytics(u32),
    Health,
}

/// Operations that can be configured to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Get,
    Create,
    Update,
    Delete,
    Search,
    Analytics,
    Health,
}

/// In-memory stand-in for the Smart Notes backend.
///
/// Behaves like the real server for notes: create assigns version 1, update
/// compares versions and answers 409 on mismatch, delete answers 404 for
/// unknown ids. Search answers whatever was configured per query, and can be
/// held back with [`MockNoteApi::gate_search`] to force out-of-order completion.
///
/// # Examples
///
/// ```
/// use smartnotes::util::testing::{MockNoteApi, Operation};
/// use smartnotes::domain::ApiError;
///
/// let mock = MockNoteApi::builder()
///     .with_note("n1", "Title", "Body")
///     .with_failure(Operation::Delete, ApiError::Network("offline".to_string()))
///     .build();
/// assert!(mock.calls().is_empty());
/// ```
pub struct MockNoteApi {
    notes: RefCell<Vec<Note>>,
    calls: RefCell<Vec<ApiCall>>,
    failures: RefCell<HashMap<Operation, ApiError>>,
    search_responses: HashMap<String, SearchResponse>,
    search_gates: RefCell<HashMap<String, oneshot::Receiver<()>>>,
    analytics: SearchAnalytics,
    next_id: Cell<u64>,
}

impl MockNoteApi {
    pub fn builder() -> MockNoteApiBuilder {
        MockNoteApiBuilder::new()
    }

    /// Requests received so far.
    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.borrow().clone()
    }

    /// Number of search requests received.
    pub fn search_calls(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| matches!(call, ApiCall::Search(_)))
            .count()
    }

    /// Current server-side copy of a note.
    pub fn stored_note(&self, id: &NoteId) -> Option<Note> {
        self.notes.borrow().iter().find(|n| &n.id == id).cloned()
    }

    /// Simulate another client saving the note: bumps its server version.
    pub fn touch_remote(&self, id: &NoteId) {
        if let Some(note) = self.notes.borrow_mut().iter_mut().find(|n| &n.id == id) {
            note.version += 1;
            note.updated_at = Utc::now().naive_utc();
        }
    }

    /// Make an operation fail from now on.
    pub fn fail(&self, operation: Operation, error: ApiError) {
        self.failures.borrow_mut().insert(operation, error);
    }

    /// Make a previously failing operation succeed again.
    pub fn recover(&self, operation: Operation) {
        self.failures.borrow_mut().remove(&operation);
    }

    /// Hold back the response to `query` until the returned sender fires.
    pub fn gate_search(&self, query: &str) -> oneshot::Sender<()> {
        let (release, gate) = oneshot::channel();
        self.search_gates.borrow_mut().insert(query.to_string(), gate);
        release
    }

    fn record(&self, call: ApiCall) {
        self.calls.borrow_mut().push(call);
    }

    fn check(&self, operation: Operation) -> Result<(), ApiError> {
        match self.failures.borrow().get(&operation) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn not_found() -> ApiError {
        ApiError::Status {
            status: STATUS_NOT_FOUND,
            detail: "Note not found".to_string(),
        }
    }
}

impl NoteApi for MockNoteApi {
    async fn list_notes(&self, query: &ListQuery) -> Result<Vec<Note>, ApiError> {
        self.record(ApiCall::ListNotes(*query));
        self.check(Operation::List)?;

        Ok(self
            .notes
            .borrow()
            .iter()
            .filter(|n| !query.public_only || n.is_public)
            .skip(query.skip as usize)
            .take(query.limit as usize)
            .cloned()
            .collect())
    }

    async fn get_note(&self, id: &NoteId) -> Result<Note, ApiError> {
        self.record(ApiCall::GetNote(id.clone()));
        self.check(Operation::Get)?;

        let mut notes = self.notes.borrow_mut();
        let note = notes
            .iter_mut()
            .find(|n| &n.id == id)
            .ok_or_else(Self::not_found)?;
        note.view_count += 1;
        Ok(note.clone())
    }

    async fn create_note(&self, fields: &NoteFields) -> Result<Note, ApiError> {
        self.record(ApiCall::CreateNote(fields.clone()));
        self.check(Operation::Create)?;

        let sequence = self.next_id.get() + 1;
        self.next_id.set(sequence);
        let note = stored_note(format!("note-{sequence}"), fields, 1);
        self.notes.borrow_mut().insert(0, note.clone());
        Ok(note)
    }

    async fn update_note(&self, id: &NoteId, update: &NoteUpdate) -> Result<Note, ApiError> {
        self.record(ApiCall::UpdateNote(id.clone(), update.clone()));
        self.check(Operation::Update)?;

        let mut notes = self.notes.borrow_mut();
        let note = notes
            .iter_mut()
            .find(|n| &n.id == id)
            .ok_or_else(Self::not_found)?;
        if note.version != update.version {
            return Err(ApiError::Status {
                status: STATUS_CONFLICT,
                detail: "Note was modified by another user. Please refresh.".to_string(),
            });
        }

        let fields = &update.fields;
        note.title = fields.title.trim().to_string();
        note.content = fields.content.trim().to_string();
        note.tags = fields.tags.trim().to_string();
        note.is_public = fields.is_public;
        note.version += 1;
        note.updated_at = Utc::now().naive_utc();
        Ok(note.clone())
    }

    async fn delete_note(&self, id: &NoteId) -> Result<(), ApiError> {
        self.record(ApiCall::DeleteNote(id.clone()));
        self.check(Operation::Delete)?;

        let mut notes = self.notes.borrow_mut();
        let before = notes.len();
        notes.retain(|n| &n.id != id);
        if notes.len() == before {
            return Err(Self::not_found());
        }
        Ok(())
    }

    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, ApiError> {
        self.record(ApiCall::Search(request.clone()));

        let gate = self.search_gates.borrow_mut().remove(&request.query);
        if let Some(gate) = gate {
            debug!(query = %request.query, "Holding search response until released");
            let _ = gate.await;
        }
        self.check(Operation::Search)?;

        Ok(self
            .search_responses
            .get(&request.query)
            .cloned()
            .unwrap_or_else(|| SearchResponse {
                search_type: request.search_type,
                ..Default::default()
            }))
    }

    async fn search_analytics(&self, days: u32) -> Result<SearchAnalytics, ApiError> {
        self.record(ApiCall::SearchAnalytics(days));
        self.check(Operation::Analytics)?;
        Ok(self.analytics.clone())
    }

    async fn health(&self) -> Result<HealthReport, ApiError> {
        self.record(ApiCall::Health);
        self.check(Operation::Health)?;
        Ok(HealthReport {
            status: "healthy".to_string(),
            timestamp: Some(Utc::now().naive_utc().to_string()),
            database: Some(DatabaseHealth {
                note_count: self.notes.borrow().len() as u64,
                embedding_count: 0,
                database_type: "SQLite".to_string(),
            }),
            version: Some("2.1.0".to_string()),
            error: None,
        })
    }
}

fn stored_note(id: String, fields: &NoteFields, version: i64) -> Note {
    let now = Utc::now().naive_utc();
    Note {
        id: NoteId::new(id),
        title: fields.title.trim().to_string(),
        content: fields.content.trim().to_string(),
        tags: fields.tags.trim().to_string(),
        is_public: fields.is_public,
        view_count: 0,
        version,
        created_at: now,
        updated_at: now,
    }
}

/// Builder for MockNoteApi
///
/// Provides a fluent interface for configuring mock behavior.
pub struct MockNoteApiBuilder {
    notes: Vec<Note>,
    failures: HashMap<Operation, ApiError>,
    search_responses: HashMap<String, SearchResponse>,
    analytics: SearchAnalytics,
}

impl MockNoteApiBuilder {
    pub fn new() -> Self {
        Self {
            notes: vec![],
            failures: HashMap::new(),
            search_responses: HashMap::new(),
            analytics: SearchAnalytics::default(),
        }
    }

    /// Seed a private note at version 1
    pub fn with_note(self, id: &str, title: &str, content: &str) -> Self {
        let fields = NoteFields {
            title: title.to_string(),
            content: content.to_string(),
            ..Default::default()
        };
        self.with_stored_note(stored_note(id.to_string(), &fields, 1))
    }

    /// Seed a fully specified note
    pub fn with_stored_note(mut self, note: Note) -> Self {
        self.notes.push(note);
        self
    }

    /// Configure an operation to fail with `error`
    pub fn with_failure(mut self, operation: Operation, error: ApiError) -> Self {
        self.failures.insert(operation, error);
        self
    }

    /// Configure the response returned for a specific search query
    pub fn with_search_response(mut self, query: &str, response: SearchResponse) -> Self {
        self.search_responses.insert(query.to_string(), response);
        self
    }

    pub fn with_analytics(mut self, analytics: SearchAnalytics) -> Self {
        self.analytics = analytics;
        self
    }

    pub fn build(self) -> MockNoteApi {
        MockNoteApi {
            notes: RefCell::new(self.notes),
            calls: RefCell::new(vec![]),
            failures: RefCell::new(self.failures),
            search_responses: self.search_responses,
            search_gates: RefCell::new(HashMap::new()),
            analytics: self.analytics,
            next_id: Cell::new(0),
        }
    }
}

impl Default for MockNoteApiBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn init_test_setup() -> Result<()> {
    // Set up logging first
    setup_test_logging();

    info!("Test Setup complete");
    Ok(())
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "trace");
    }

    // Create a filter for noisy modules
    let noisy_modules = ["hyper", "reqwest", "mio", "h2"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}
