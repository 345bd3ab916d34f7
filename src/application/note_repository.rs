// src/application/note_repository.rs
use tracing::{debug, info, instrument, warn};

use crate::application::ports::{ListQuery, NoteApi};
use crate::domain::error::{STATUS_CONFLICT, STATUS_NOT_FOUND};
use crate::domain::{ApiError, DomainError, Note, NoteFields, NoteId, NoteUpdate};

const DEFAULT_CONFLICT_MESSAGE: &str = "Note was modified by another user. Please refresh.";

/// Note mutations against the versioned remote resource.
///
/// The server alone decides whether an update conflicts. This repository only
/// carries the version it is handed and classifies the response; it never
/// retries, merges or re-reads on its own.
pub struct ConflictAwareNoteRepository<A: NoteApi> {
    api: A,
}

impl<A: NoteApi> ConflictAwareNoteRepository<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub async fn list(&self, limit: u32) -> Result<Vec<Note>, DomainError> {
        self.list_page(&ListQuery::new(limit)).await
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn list_page(&self, query: &ListQuery) -> Result<Vec<Note>, DomainError> {
        let notes = self.api.list_notes(query).await?;
        debug!(count = notes.len(), "Listed notes");
        Ok(notes)
    }

    /// Fetch a single note. The backend counts this as a view.
    #[instrument(level = "debug", skip(self))]
    pub async fn get(&self, id: &NoteId) -> Result<Note, DomainError> {
        self.api
            .get_note(id)
            .await
            .map_err(|e| classify_lookup(id, e))
    }

    #[instrument(level = "debug", skip(self, fields), fields(title = %fields.title))]
    pub async fn create(&self, fields: &NoteFields) -> Result<Note, DomainError> {
        fields.validate()?;

        let note = self.api.create_note(fields).await?;
        info!(note_id = %note.id, version = note.version, "Created note");
        Ok(note)
    }

    /// Update a note, carrying the version the caller last observed.
    ///
    /// A version mismatch on the server surfaces as `DomainError::Conflict`.
    #[instrument(level = "debug", skip(self, update), fields(version = update.version))]
    pub async fn update(&self, id: &NoteId, update: &NoteUpdate) -> Result<Note, DomainError> {
        update.fields.validate()?;

        match self.api.update_note(id, update).await {
            Ok(note) => {
                info!(note_id = %note.id, version = note.version, "Updated note");
                Ok(note)
            }
            Err(e) if e.status() == Some(STATUS_CONFLICT) => {
                warn!(note_id = %id, base_version = update.version, "Update rejected, note changed on server");
                Err(DomainError::Conflict {
                    id: id.clone(),
                    message: e.detail().unwrap_or(DEFAULT_CONFLICT_MESSAGE).to_string(),
                })
            }
            Err(e) => Err(classify_lookup(id, e)),
        }
    }

    /// Delete a note. Every failure, "already gone" included, is a transport error.
    #[instrument(level = "debug", skip(self))]
    pub async fn delete(&self, id: &NoteId) -> Result<(), DomainError> {
        self.api.delete_note(id).await?;
        info!(note_id = %id, "Deleted note");
        Ok(())
    }
}

fn classify_lookup(id: &NoteId, error: ApiError) -> DomainError {
    if error.status() == Some(STATUS_NOT_FOUND) {
        DomainError::NoteNotFound(id.clone())
    } else {
        DomainError::from(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::testing::{ApiCall, MockNoteApi, Operation};

    fn fields(title: &str, content: &str) -> NoteFields {
        NoteFields {
            title: title.to_string(),
            content: content.to_string(),
            tags: "rust".to_string(),
            is_public: false,
        }
    }

    #[tokio::test]
    async fn given_valid_fields_when_creating_then_returns_version_one() {
        // Arrange
        let repository = ConflictAwareNoteRepository::new(MockNoteApi::builder().build());

        // Act
        let note = repository.create(&fields("Title", "Body")).await.unwrap();

        // Assert
        assert_eq!(note.version, 1);
        assert_eq!(note.title, "Title");
    }

    #[tokio::test]
    async fn given_empty_title_when_creating_then_fails_without_request() {
        // Arrange
        let repository = ConflictAwareNoteRepository::new(MockNoteApi::builder().build());

        // Act
        let result = repository.create(&fields("", "Body")).await;

        // Assert
        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert!(repository.api().calls().is_empty());
    }

    #[tokio::test]
    async fn given_empty_content_when_updating_then_fails_without_request() {
        // Arrange
        let api = MockNoteApi::builder().with_note("n1", "Old", "Old body").build();
        let repository = ConflictAwareNoteRepository::new(api);

        // Act
        let result = repository
            .update(&NoteId::new("n1"), &NoteUpdate::new(fields("New", " "), 1))
            .await;

        // Assert
        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert!(repository.api().calls().is_empty());
    }

    #[tokio::test]
    async fn given_current_version_when_updating_then_server_advances_version() {
        // Arrange
        let api = MockNoteApi::builder().with_note("n1", "Old", "Old body").build();
        let repository = ConflictAwareNoteRepository::new(api);

        // Act
        let note = repository
            .update(&NoteId::new("n1"), &NoteUpdate::new(fields("New", "New body"), 1))
            .await
            .unwrap();

        // Assert
        assert_eq!(note.version, 2);
        assert_eq!(note.title, "New");
    }

    #[tokio::test]
    async fn given_stale_version_when_updating_then_returns_conflict() {
        // Arrange
        let api = MockNoteApi::builder().with_note("n1", "Old", "Old body").build();
        api.touch_remote(&NoteId::new("n1"));
        let repository = ConflictAwareNoteRepository::new(api);

        // Act
        let result = repository
            .update(&NoteId::new("n1"), &NoteUpdate::new(fields("New", "New body"), 1))
            .await;

        // Assert
        match result {
            Err(DomainError::Conflict { id, message }) => {
                assert_eq!(id.as_str(), "n1");
                assert!(!message.is_empty());
            }
            other => panic!("Expected Conflict, got {other:?}"),
        }
        assert_eq!(repository.api().calls().len(), 1);
    }

    #[tokio::test]
    async fn given_missing_note_when_updating_then_returns_not_found() {
        let repository = ConflictAwareNoteRepository::new(MockNoteApi::builder().build());

        let result = repository
            .update(&NoteId::new("ghost"), &NoteUpdate::new(fields("T", "C"), 1))
            .await;

        assert!(matches!(result, Err(DomainError::NoteNotFound(id)) if id.as_str() == "ghost"));
    }

    #[tokio::test]
    async fn given_server_error_when_creating_then_returns_transport_error() {
        let api = MockNoteApi::builder()
            .with_failure(Operation::Create, ApiError::Status { status: 409, detail: "dup".to_string() })
            .build();
        let repository = ConflictAwareNoteRepository::new(api);

        let result = repository.create(&fields("T", "C")).await;

        assert!(matches!(result, Err(DomainError::Transport(_))));
    }

    #[tokio::test]
    async fn given_missing_note_when_deleting_then_returns_transport_error() {
        let repository = ConflictAwareNoteRepository::new(MockNoteApi::builder().build());

        let result = repository.delete(&NoteId::new("ghost")).await;

        assert!(matches!(result, Err(DomainError::Transport(_))));
    }

    #[tokio::test]
    async fn given_list_limit_when_listing_then_passes_limit_through() {
        let api = MockNoteApi::builder()
            .with_note("a", "A", "a")
            .with_note("b", "B", "b")
            .with_note("c", "C", "c")
            .build();
        let repository = ConflictAwareNoteRepository::new(api);

        let notes = repository.list(2).await.unwrap();

        assert_eq!(notes.len(), 2);
        assert_eq!(repository.api().calls(), vec![ApiCall::ListNotes(ListQuery::new(2))]);
    }
}
