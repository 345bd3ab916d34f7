// src/application/editing_session.rs
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::application::note_cache::NoteListCache;
use crate::application::note_repository::ConflictAwareNoteRepository;
use crate::application::ports::NoteApi;
use crate::domain::{DomainError, Draft, DraftChange, Note, NoteFields, NoteId, NoteUpdate};

/// What the open editor will do on save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DraftMode {
    Create,
    /// `base_version` is the note's version when the editor opened.
    Edit { source: Note, base_version: i64 },
}

/// Message shown in the editor after a failed save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum EditorNotice {
    /// The note changed on the server; cancel and re-open to continue.
    Conflict(String),
    Invalid(String),
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EditorState {
    #[default]
    Closed,
    Drafting {
        mode: DraftMode,
        draft: Draft,
        notice: Option<EditorNotice>,
    },
    Saving {
        mode: DraftMode,
        draft: Draft,
        generation: u64,
    },
}

impl EditorState {
    pub fn draft(&self) -> Option<&Draft> {
        match self {
            EditorState::Closed => None,
            EditorState::Drafting { draft, .. } | EditorState::Saving { draft, .. } => Some(draft),
        }
    }

    pub fn notice(&self) -> Option<&EditorNotice> {
        match self {
            EditorState::Drafting { notice, .. } => notice.as_ref(),
            _ => None,
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, EditorState::Closed)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    OpenCreate,
    OpenEdit(Note),
    Change(DraftChange),
    Submit,
    Saved { generation: u64 },
    Failed { generation: u64, error: DomainError },
    Cancel,
}

/// Request the caller must send to the repository.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveIntent {
    Create(NoteFields),
    Update { id: NoteId, update: NoteUpdate },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    Dispatch { generation: u64, intent: SaveIntent },
    Rejected(DomainError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub session: EditorSession,
    pub effect: Effect,
}

/// Editor state plus the mutation generation counter.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EditorSession {
    pub state: EditorState,
    /// Generation handed to the most recent save.
    pub generation: u64,
}

impl EditorSession {
    /// Pure transition: the next session and what the caller must do.
    ///
    /// Pairs not listed below leave the session unchanged:
    /// - `Closed` opens on `OpenCreate` / `OpenEdit`
    /// - `Drafting` accepts `Change`, `Submit`, `Cancel`
    /// - `Saving` accepts only the `Saved` / `Failed` completion carrying its generation
    pub fn on(&self, event: EditorEvent) -> Transition {
        match (&self.state, event) {
            (EditorState::Closed, EditorEvent::OpenCreate) => self.to(EditorState::Drafting {
                mode: DraftMode::Create,
                draft: Draft::default(),
                notice: None,
            }),
            (EditorState::Closed, EditorEvent::OpenEdit(note)) => self.to(EditorState::Drafting {
                draft: Draft::from_note(&note),
                mode: DraftMode::Edit {
                    base_version: note.version,
                    source: note,
                },
                notice: None,
            }),
            (EditorState::Drafting { mode, draft, notice }, EditorEvent::Change(change)) => {
                let mut draft = draft.clone();
                draft.apply(change);
                self.to(EditorState::Drafting {
                    mode: mode.clone(),
                    draft,
                    notice: notice.clone(),
                })
            }
            (EditorState::Drafting { mode, draft, .. }, EditorEvent::Submit) => {
                self.submit(mode, draft)
            }
            (EditorState::Drafting { .. }, EditorEvent::Cancel) => self.to(EditorState::Closed),
            (EditorState::Saving { generation, .. }, EditorEvent::Saved { generation: done })
                if *generation == done =>
            {
                self.to(EditorState::Closed)
            }
            (
                EditorState::Saving { mode, draft, generation },
                EditorEvent::Failed { generation: done, error },
            ) if *generation == done => {
                let notice = match error {
                    DomainError::Conflict { message, .. } => EditorNotice::Conflict(message),
                    DomainError::Validation(message) => EditorNotice::Invalid(message),
                    other => EditorNotice::Error(other.to_string()),
                };
                self.to(EditorState::Drafting {
                    mode: mode.clone(),
                    draft: draft.clone(),
                    notice: Some(notice),
                })
            }
            _ => self.to(self.state.clone()),
        }
    }

    fn submit(&self, mode: &DraftMode, draft: &Draft) -> Transition {
        let fields = draft.fields();
        if let Err(error) = fields.validate() {
            return Transition {
                session: EditorSession {
                    state: EditorState::Drafting {
                        mode: mode.clone(),
                        draft: draft.clone(),
                        notice: Some(EditorNotice::Invalid(error.to_string())),
                    },
                    generation: self.generation,
                },
                effect: Effect::Rejected(error),
            };
        }

        let intent = match mode {
            DraftMode::Create => SaveIntent::Create(fields),
            DraftMode::Edit { source, base_version } => SaveIntent::Update {
                id: source.id.clone(),
                update: NoteUpdate::new(fields, *base_version),
            },
        };
        let generation = self.generation + 1;
        Transition {
            session: EditorSession {
                state: EditorState::Saving {
                    mode: mode.clone(),
                    draft: draft.clone(),
                    generation,
                },
                generation,
            },
            effect: Effect::Dispatch { generation, intent },
        }
    }

    fn to(&self, state: EditorState) -> Transition {
        Transition {
            session: EditorSession {
                state,
                generation: self.generation,
            },
            effect: Effect::None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Saved and the editor closed. `refreshed` is false when the list reload
    /// afterwards failed; the save itself stands.
    Saved { note: Note, refreshed: bool },
    Rejected(DomainError),
    /// Nothing to submit: editor closed or a save already running.
    Ignored,
}

/// Drives an `EditorSession` against the repository and the note list cache.
#[derive(Debug, Clone, Default)]
pub struct EditingSessionController {
    session: EditorSession,
}

impl EditingSessionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    pub fn state(&self) -> &EditorState {
        &self.session.state
    }

    /// Returns false when the editor was not closed.
    pub fn open_create(&mut self) -> bool {
        if !self.state().is_closed() {
            return false;
        }
        self.fire(EditorEvent::OpenCreate);
        true
    }

    /// Open on a snapshot of `note`. Returns false when the editor was not closed.
    pub fn open_edit(&mut self, note: Note) -> bool {
        if !self.state().is_closed() {
            return false;
        }
        self.fire(EditorEvent::OpenEdit(note));
        true
    }

    pub fn change(&mut self, change: DraftChange) {
        self.fire(EditorEvent::Change(change));
    }

    pub fn cancel(&mut self) {
        self.fire(EditorEvent::Cancel);
    }

    /// Save the draft. On success the cache is reloaded as a whole.
    pub async fn submit<A: NoteApi>(
        &mut self,
        repository: &ConflictAwareNoteRepository<A>,
        cache: &mut NoteListCache,
    ) -> SubmitOutcome {
        let (generation, intent) = match self.fire(EditorEvent::Submit) {
            Effect::Dispatch { generation, intent } => (generation, intent),
            Effect::Rejected(error) => {
                debug!(%error, "Draft rejected before dispatch");
                return SubmitOutcome::Rejected(error);
            }
            Effect::None => {
                debug!("Submit ignored");
                return SubmitOutcome::Ignored;
            }
        };

        let result = match &intent {
            SaveIntent::Create(fields) => repository.create(fields).await,
            SaveIntent::Update { id, update } => repository.update(id, update).await,
        };

        match result {
            Ok(note) => {
                self.fire(EditorEvent::Saved { generation });
                let refreshed = match cache.refresh(repository).await {
                    Ok(_) => true,
                    Err(error) => {
                        warn!(%error, note_id = %note.id, "Saved note but could not reload list");
                        false
                    }
                };
                info!(note_id = %note.id, version = note.version, "Editor saved note");
                SubmitOutcome::Saved { note, refreshed }
            }
            Err(error) => {
                if error.is_conflict() {
                    warn!(%error, "Save hit a version conflict, keeping draft");
                }
                self.fire(EditorEvent::Failed {
                    generation,
                    error: error.clone(),
                });
                SubmitOutcome::Rejected(error)
            }
        }
    }

    fn fire(&mut self, event: EditorEvent) -> Effect {
        let Transition { session, effect } = self.session.on(event);
        self.session = session;
        effect
    }
}
