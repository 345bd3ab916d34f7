// src/application/mod.rs
pub mod editing_session;
pub mod note_cache;
pub mod note_repository;
pub mod ports;
pub mod search_orchestrator;
pub mod session;

pub use editing_session::{
    DraftMode, EditingSessionController, EditorEvent, EditorNotice, EditorSession, EditorState,
    SaveIntent, SubmitOutcome,
};
pub use note_cache::NoteListCache;
pub use note_repository::ConflictAwareNoteRepository;
pub use ports::{ListQuery, NoteApi};
pub use search_orchestrator::{ExcerptPolicy, SearchOrchestrator, SearchOutcome, SearchState};
pub use session::{NotesSession, SessionSettings, SessionSnapshot};
