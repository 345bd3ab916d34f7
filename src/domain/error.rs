// src/domain/error.rs
use thiserror::Error;

use crate::domain::NoteId;

pub const STATUS_NOT_FOUND: u16 = 404;
pub const STATUS_CONFLICT: u16 = 409;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Note {id} was modified elsewhere: {message}")]
    Conflict { id: NoteId, message: String },
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Note not found: {0}")]
    NoteNotFound(NoteId),
    #[error("Note {0} is private and has no share link")]
    NotShareable(NoteId),
}

impl DomainError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, DomainError::Conflict { .. })
    }
}

/// Failure reported by a `NoteApi` implementation, before classification.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("HTTP {status}: {detail}")]
    Status { status: u16, detail: String },
    #[error("request failed: {0}")]
    Network(String),
    #[error("could not decode response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Status { detail, .. } if !detail.is_empty() => Some(detail),
            _ => None,
        }
    }
}

impl From<ApiError> for DomainError {
    fn from(error: ApiError) -> Self {
        DomainError::Transport(error.to_string())
    }
}
