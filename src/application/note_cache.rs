// src/application/note_cache.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::application::note_repository::ConflictAwareNoteRepository;
use crate::application::ports::NoteApi;
use crate::constants::DEFAULT_LIST_LIMIT;
use crate::domain::{DomainError, Note, NoteId};

/// Snapshot of the note list as last returned by the server.
///
/// The snapshot is only ever replaced as a whole. After a create, update or
/// delete the caller refreshes instead of patching the affected entry, so
/// server-maintained fields (`version`, `view_count`, `updated_at`) always
/// come from the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteListCache {
    notes: Vec<Note>,
    limit: u32,
    last_refreshed: Option<DateTime<Utc>>,
}

impl Default for NoteListCache {
    fn default() -> Self {
        Self::new(DEFAULT_LIST_LIMIT)
    }
}

impl NoteListCache {
    pub fn new(limit: u32) -> Self {
        Self {
            notes: vec![],
            limit,
            last_refreshed: None,
        }
    }

    /// Replace the snapshot with a fresh list. On failure the old snapshot stays.
    #[instrument(level = "debug", skip(self, repository), fields(limit = self.limit))]
    pub async fn refresh<A: NoteApi>(
        &mut self,
        repository: &ConflictAwareNoteRepository<A>,
    ) -> Result<&[Note], DomainError> {
        let notes = repository.list(self.limit).await?;
        debug!(count = notes.len(), "Replacing cached note list");
        self.notes = notes;
        self.last_refreshed = Some(Utc::now());
        Ok(&self.notes)
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn find(&self, id: &NoteId) -> Option<&Note> {
        self.notes.iter().find(|n| &n.id == id)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn last_refreshed(&self) -> Option<DateTime<Utc>> {
        self.last_refreshed
    }
}
