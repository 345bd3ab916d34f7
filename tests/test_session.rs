mod helpers;

use helpers::sample_note;
use pretty_assertions::assert_eq;
use smartnotes::application::{
    EditorNotice, EditorState, NotesSession, SearchOutcome, SessionSettings, SessionSnapshot,
    SubmitOutcome,
};
use smartnotes::domain::{
    ApiError, DomainError, DraftChange, NoteId, SearchMode, SearchResponse, SearchResult,
};
use smartnotes::util::testing::{ApiCall, MockNoteApi, Operation};
use std::rc::Rc;

fn session_over(mock: &Rc<MockNoteApi>) -> NotesSession<Rc<MockNoteApi>> {
    NotesSession::new(Rc::clone(mock), SessionSettings::default())
}

fn response_with_chunks(query_note: &str, chunks: Vec<String>) -> SearchResponse {
    SearchResponse {
        results: vec![SearchResult {
            note: sample_note(query_note, 1),
            relevance_score: 0.9,
            matched_chunks: chunks,
        }],
        total_found: 1,
        search_time: 0.01,
        search_type: SearchMode::Semantic,
    }
}

#[tokio::test]
async fn given_blank_title_when_submitting_then_nothing_is_sent_and_draft_stays_open() {
    // Arrange
    let mock = Rc::new(MockNoteApi::builder().build());
    let mut session = session_over(&mock);
    session.open_create();
    session.change(DraftChange::Title("   ".to_string()));
    session.change(DraftChange::Content("Body".to_string()));

    // Act
    let outcome = session.submit().await;

    // Assert
    assert!(matches!(outcome, SubmitOutcome::Rejected(DomainError::Validation(_))));
    assert!(mock.calls().is_empty());
    assert!(matches!(
        session.editor().state.notice(),
        Some(EditorNotice::Invalid(_))
    ));
    assert_eq!(session.editor().state.draft().map(|d| d.content.as_str()), Some("Body"));
}

#[tokio::test]
async fn given_valid_draft_when_creating_then_note_appears_in_reloaded_list() {
    // Arrange
    let mock = Rc::new(MockNoteApi::builder().with_note("n0", "Older", "Body").build());
    let mut session = session_over(&mock);
    session.refresh().await.expect("initial load");
    session.open_create();
    session.change(DraftChange::Title("Fresh".to_string()));
    session.change(DraftChange::Content("Thoughts".to_string()));

    // Act
    let outcome = session.submit().await;

    // Assert
    let note = match outcome {
        SubmitOutcome::Saved { note, refreshed } => {
            assert!(refreshed);
            note
        }
        other => panic!("Expected save, got {other:?}"),
    };
    assert_eq!(note.version, 1);
    assert_eq!(session.notes().first().map(|n| &n.id), Some(&note.id));
    assert_eq!(session.notes().len(), 2);
    assert!(session.editor().state.is_closed());
}

#[tokio::test]
async fn given_note_updated_elsewhere_when_saving_then_conflict_keeps_draft() {
    // Arrange
    let mock = Rc::new(MockNoteApi::builder().with_note("n1", "Plan", "v1 body").build());
    let mut session = session_over(&mock);
    session.refresh().await.expect("initial load");
    let id = NoteId::new("n1");
    assert_eq!(session.open_edit(&id).await, Ok(true));
    session.change(DraftChange::Content("my edit".to_string()));
    mock.touch_remote(&id);

    // Act
    let outcome = session.submit().await;

    // Assert
    assert!(matches!(outcome, SubmitOutcome::Rejected(ref e) if e.is_conflict()));
    match &session.editor().state {
        EditorState::Drafting { draft, notice, .. } => {
            assert_eq!(draft.content, "my edit");
            assert_eq!(draft.version, 1);
            assert!(matches!(notice, Some(EditorNotice::Conflict(_))));
        }
        other => panic!("Expected drafting state, got {other:?}"),
    }
    assert_eq!(mock.stored_note(&id).map(|n| n.content), Some("v1 body".to_string()));
}

#[tokio::test]
async fn given_current_snapshot_when_editing_then_sends_observed_version_and_list_shows_new_one() {
    // Arrange
    let mock = Rc::new(MockNoteApi::builder().with_note("n1", "Plan", "Body").build());
    let mut session = session_over(&mock);
    session.refresh().await.expect("initial load");
    let id = NoteId::new("n1");
    session.open_edit(&id).await.expect("open editor");
    session.change(DraftChange::Title("Plan B".to_string()));

    // Act
    let outcome = session.submit().await;

    // Assert
    assert!(matches!(outcome, SubmitOutcome::Saved { .. }));
    let sent_version = mock.calls().iter().find_map(|call| match call {
        ApiCall::UpdateNote(_, update) => Some(update.version),
        _ => None,
    });
    assert_eq!(sent_version, Some(1));
    assert_eq!(session.notes()[0].version, 2);
    assert_eq!(session.notes()[0].title, "Plan B");
}

#[tokio::test]
async fn given_whitespace_query_when_searching_then_clears_without_request() {
    let mock = Rc::new(MockNoteApi::builder().build());
    let session = session_over(&mock);

    let outcome = session.search("   ", SearchMode::Keyword, 10, true).await;

    assert_eq!(outcome, Ok(SearchOutcome::Applied(vec![])));
    assert_eq!(mock.search_calls(), 0);
    assert!(session.search_state().hits.is_empty());
}

#[tokio::test]
async fn given_overlapping_searches_when_first_finishes_last_then_second_stays_displayed() {
    // Arrange
    let mock = Rc::new(
        MockNoteApi::builder()
            .with_search_response("alpha", response_with_chunks("a1", vec![]))
            .with_search_response("beta", response_with_chunks("b1", vec![]))
            .build(),
    );
    let session = session_over(&mock);
    let release_alpha = mock.gate_search("alpha");

    // Act - alpha parks on its gate, beta completes and then lets alpha through
    let (first, second) = tokio::join!(
        session.search("alpha", SearchMode::Semantic, 10, true),
        async {
            let outcome = session.search("beta", SearchMode::Semantic, 10, true).await;
            let _ = release_alpha.send(());
            outcome
        }
    );

    // Assert
    assert!(matches!(first, Ok(SearchOutcome::Stale { .. })));
    assert!(matches!(second, Ok(SearchOutcome::Applied(_))));
    let state = session.search_state();
    assert_eq!(state.query, "beta");
    assert_eq!(state.hits[0].note.id, NoteId::new("b1"));
}

#[tokio::test]
async fn given_many_long_chunks_when_searching_then_shows_two_truncated_excerpts() {
    // Arrange
    let chunks: Vec<String> = (0..5).map(|i| format!("{i}{}", "x".repeat(300))).collect();
    let mock = Rc::new(
        MockNoteApi::builder()
            .with_search_response("long", response_with_chunks("n1", chunks))
            .build(),
    );
    let session = session_over(&mock);

    // Act
    session
        .search("long", SearchMode::Semantic, 10, true)
        .await
        .expect("search succeeds");

    // Assert
    let hit = &session.search_state().hits[0];
    assert_eq!(hit.excerpts.len(), 2);
    assert_eq!(hit.hidden_excerpts, 3);
    for excerpt in &hit.excerpts {
        assert!(excerpt.ends_with("..."));
        assert_eq!(excerpt.chars().count(), 153);
    }
}

#[tokio::test]
async fn given_listed_note_when_deleting_then_list_no_longer_contains_it() {
    // Arrange
    let mock = Rc::new(
        MockNoteApi::builder()
            .with_note("n1", "Keep", "Body")
            .with_note("n2", "Drop", "Body")
            .build(),
    );
    let mut session = session_over(&mock);
    session.refresh().await.expect("initial load");

    // Act
    let refreshed = session.delete(&NoteId::new("n2")).await.expect("delete succeeds");

    // Assert
    assert!(refreshed);
    let ids: Vec<&str> = session.notes().iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["n1"]);
}

#[tokio::test]
async fn given_list_unavailable_when_delete_succeeds_then_reports_success_without_refresh() {
    // Arrange
    let mock = Rc::new(
        MockNoteApi::builder()
            .with_note("n1", "Keep", "Body")
            .with_note("n2", "Drop", "Body")
            .build(),
    );
    let mut session = session_over(&mock);
    session.refresh().await.expect("initial load");
    mock.fail(Operation::List, ApiError::Network("connection reset".to_string()));

    // Act
    let result = session.delete(&NoteId::new("n2")).await;

    // Assert
    assert_eq!(result, Ok(false));
    assert!(mock.stored_note(&NoteId::new("n2")).is_none());
    assert_eq!(session.notes().len(), 2);
}

#[tokio::test]
async fn given_failing_backend_when_deleting_then_list_is_unchanged() {
    // Arrange
    let mock = Rc::new(MockNoteApi::builder().with_note("n1", "Keep", "Body").build());
    let mut session = session_over(&mock);
    session.refresh().await.expect("initial load");
    mock.fail(Operation::Delete, ApiError::Network("connection reset".to_string()));

    // Act
    let result = session.delete(&NoteId::new("n1")).await;

    // Assert
    assert!(matches!(result, Err(DomainError::Transport(_))));
    assert_eq!(session.notes().len(), 1);
}

#[tokio::test]
async fn given_public_and_private_notes_when_sharing_then_only_public_gets_link() {
    // Arrange
    let mut public = sample_note("pub-1", 1);
    public.is_public = true;
    let mock = Rc::new(
        MockNoteApi::builder()
            .with_stored_note(public)
            .with_stored_note(sample_note("priv-1", 1))
            .build(),
    );
    let mut session = session_over(&mock);
    session.refresh().await.expect("initial load");

    // Act
    let shared = session.share_link(&NoteId::new("pub-1")).await;
    let private = session.share_link(&NoteId::new("priv-1")).await;

    // Assert
    assert_eq!(shared, Ok("http://localhost:5173/shared/pub-1".to_string()));
    assert_eq!(private, Err(DomainError::NotShareable(NoteId::new("priv-1"))));
}

#[tokio::test]
async fn given_open_draft_when_snapshotting_then_state_round_trips_through_json() {
    // Arrange
    let mock = Rc::new(MockNoteApi::builder().with_note("n1", "Plan", "Body").build());
    let mut session = session_over(&mock);
    session.refresh().await.expect("initial load");
    session.open_edit(&NoteId::new("n1")).await.expect("open editor");
    session.change(DraftChange::Tags("work".to_string()));

    // Act
    let json = serde_json::to_string(&session.snapshot()).expect("serialize snapshot");
    let restored: SessionSnapshot = serde_json::from_str(&json).expect("deserialize snapshot");

    // Assert
    assert_eq!(restored, session.snapshot());
    assert_eq!(restored.editor.state.draft().map(|d| d.tags.as_str()), Some("work"));
}
