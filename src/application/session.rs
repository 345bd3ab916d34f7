// src/application/session.rs
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::application::editing_session::{EditingSessionController, EditorSession, SubmitOutcome};
use crate::application::note_cache::NoteListCache;
use crate::application::note_repository::ConflictAwareNoteRepository;
use crate::application::ports::{ListQuery, NoteApi};
use crate::application::search_orchestrator::{
    ExcerptPolicy, SearchOrchestrator, SearchOutcome, SearchState,
};
use crate::config::Config;
use crate::domain::{
    DomainError, DraftChange, HealthReport, Note, NoteId, SearchAnalytics, SearchMode,
};

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub list_limit: u32,
    pub share_origin: String,
    pub excerpts: ExcerptPolicy,
}

impl From<&Config> for SessionSettings {
    fn from(config: &Config) -> Self {
        Self {
            list_limit: config.notes.list_limit,
            share_origin: config.server.share_origin.clone(),
            excerpts: ExcerptPolicy {
                max_excerpts: config.search.max_excerpts,
                excerpt_length: config.search.excerpt_length,
            },
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

/// Everything the client currently shows, in one serializable value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub notes: NoteListCache,
    pub editor: EditorSession,
    pub search: SearchState,
}

/// One user's view of the notes service: the note list, the editor and the
/// search panel, all reaching the backend through the same `NoteApi`.
pub struct NotesSession<A: NoteApi + Clone> {
    repository: ConflictAwareNoteRepository<A>,
    search: SearchOrchestrator<A>,
    editor: EditingSessionController,
    cache: NoteListCache,
    share_origin: String,
}

impl<A: NoteApi + Clone> NotesSession<A> {
    pub fn new(api: A, settings: SessionSettings) -> Self {
        Self {
            repository: ConflictAwareNoteRepository::new(api.clone()),
            search: SearchOrchestrator::new(api, settings.excerpts),
            editor: EditingSessionController::new(),
            cache: NoteListCache::new(settings.list_limit),
            share_origin: settings.share_origin,
        }
    }

    pub fn repository(&self) -> &ConflictAwareNoteRepository<A> {
        &self.repository
    }

    pub fn notes(&self) -> &[Note] {
        self.cache.notes()
    }

    pub fn editor(&self) -> &EditorSession {
        self.editor.session()
    }

    pub fn search_state(&self) -> SearchState {
        self.search.state()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            notes: self.cache.clone(),
            editor: self.editor.session().clone(),
            search: self.search.state(),
        }
    }

    pub async fn refresh(&mut self) -> Result<&[Note], DomainError> {
        self.cache.refresh(&self.repository).await
    }

    /// One page of notes, outside the cached snapshot.
    pub async fn list_page(&self, query: &ListQuery) -> Result<Vec<Note>, DomainError> {
        self.repository.list_page(query).await
    }

    pub async fn get(&self, id: &NoteId) -> Result<Note, DomainError> {
        self.repository.get(id).await
    }

    pub fn open_create(&mut self) -> bool {
        self.editor.open_create()
    }

    /// Open the editor on the listed snapshot of a note, fetching it when it
    /// is not in the list. The draft's base version is whatever that snapshot says.
    #[instrument(level = "debug", skip(self))]
    pub async fn open_edit(&mut self, id: &NoteId) -> Result<bool, DomainError> {
        if !self.editor.state().is_closed() {
            debug!("Editor already open");
            return Ok(false);
        }
        let note = match self.cache.find(id) {
            Some(note) => note.clone(),
            None => self.repository.get(id).await?,
        };
        Ok(self.editor.open_edit(note))
    }

    pub fn change(&mut self, change: DraftChange) {
        self.editor.change(change);
    }

    pub fn cancel(&mut self) {
        self.editor.cancel();
    }

    pub async fn submit(&mut self) -> SubmitOutcome {
        self.editor.submit(&self.repository, &mut self.cache).await
    }

    /// Delete a note and reload the list. A failed delete leaves the list as is.
    ///
    /// Returns whether the list was reloaded; a failed reload does not undo
    /// the delete.
    #[instrument(level = "debug", skip(self))]
    pub async fn delete(&mut self, id: &NoteId) -> Result<bool, DomainError> {
        self.repository.delete(id).await?;
        match self.cache.refresh(&self.repository).await {
            Ok(_) => Ok(true),
            Err(error) => {
                warn!(%error, note_id = %id, "Deleted note but could not reload list");
                Ok(false)
            }
        }
    }

    pub async fn search(
        &self,
        query: &str,
        mode: SearchMode,
        limit: u32,
        include_content: bool,
    ) -> Result<SearchOutcome, DomainError> {
        self.search.search(query, mode, limit, include_content).await
    }

    pub async fn analytics(&self, days: u32) -> Result<SearchAnalytics, DomainError> {
        self.search.analytics(days).await
    }

    /// Share link for a note, looked up in the list first and fetched otherwise.
    pub async fn share_link(&self, id: &NoteId) -> Result<String, DomainError> {
        match self.cache.find(id) {
            Some(note) => note.share_url(&self.share_origin),
            None => self.repository.get(id).await?.share_url(&self.share_origin),
        }
    }

    pub async fn health(&self) -> Result<HealthReport, DomainError> {
        Ok(self.repository.api().health().await?)
    }
}
