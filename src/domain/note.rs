// src/domain/note.rs
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::MAX_TITLE_LENGTH;
use crate::domain::DomainError;

/// Server-assigned note identity. Opaque to the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NoteId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for NoteId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A note as the backend reports it.
///
/// `view_count`, `version`, `created_at` and `updated_at` are maintained by the
/// server. The client only ever echoes `version` back on update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub view_count: u64,
    pub version: i64,
    #[serde(with = "timestamp")]
    pub created_at: NaiveDateTime,
    #[serde(with = "timestamp")]
    pub updated_at: NaiveDateTime,
}

impl Note {
    /// Tags split on commas, trimmed, empties dropped.
    pub fn tag_list(&self) -> Vec<&str> {
        self.tags
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .collect()
    }

    /// Writable fields of this note, as they would be sent on create.
    pub fn fields(&self) -> NoteFields {
        NoteFields {
            title: self.title.clone(),
            content: self.content.clone(),
            tags: self.tags.clone(),
            is_public: self.is_public,
        }
    }

    /// Deterministic share link `<origin>/shared/{id}`. Only public notes have one.
    pub fn share_url(&self, origin: &str) -> Result<String, DomainError> {
        if !self.is_public {
            return Err(DomainError::NotShareable(self.id.clone()));
        }
        Ok(format!("{}/shared/{}", origin.trim_end_matches('/'), self.id))
    }
}

/// Body of `POST /notes`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NoteFields {
    pub title: String,
    pub content: String,
    pub is_public: bool,
    pub tags: String,
}

impl NoteFields {
    /// Checks the fields the backend requires before anything is sent.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.title.trim().is_empty() {
            return Err(DomainError::Validation("title must not be empty".to_string()));
        }
        if self.content.trim().is_empty() {
            return Err(DomainError::Validation("content must not be empty".to_string()));
        }
        let title_length = self.title.chars().count();
        if title_length > MAX_TITLE_LENGTH {
            return Err(DomainError::Validation(format!(
                "title is {} characters long, at most {} are allowed",
                title_length, MAX_TITLE_LENGTH
            )));
        }
        Ok(())
    }
}

/// Body of `PUT /notes/{id}`: the new field values plus the version the
/// client last observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteUpdate {
    #[serde(flatten)]
    pub fields: NoteFields,
    pub version: i64,
}

impl NoteUpdate {
    pub fn new(fields: NoteFields, version: i64) -> Self {
        Self { fields, version }
    }
}

/// Client-owned working copy of a note while the editor is open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub title: String,
    pub content: String,
    pub tags: String,
    pub is_public: bool,
    pub version: i64,
}

impl Default for Draft {
    fn default() -> Self {
        Self {
            title: String::new(),
            content: String::new(),
            tags: String::new(),
            is_public: false,
            version: 1,
        }
    }
}

impl Draft {
    pub fn from_note(note: &Note) -> Self {
        Self {
            title: note.title.clone(),
            content: note.content.clone(),
            tags: note.tags.clone(),
            is_public: note.is_public,
            version: note.version,
        }
    }

    pub fn fields(&self) -> NoteFields {
        NoteFields {
            title: self.title.clone(),
            content: self.content.clone(),
            tags: self.tags.clone(),
            is_public: self.is_public,
        }
    }

    pub fn apply(&mut self, change: DraftChange) {
        match change {
            DraftChange::Title(title) => self.title = title,
            DraftChange::Content(content) => self.content = content,
            DraftChange::Tags(tags) => self.tags = tags,
            DraftChange::Public(is_public) => self.is_public = is_public,
        }
    }
}

/// A single user edit to a draft field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DraftChange {
    Title(String),
    Content(String),
    Tags(String),
    Public(bool),
}

/// The backend emits naive ISO-8601 timestamps; RFC 3339 with an offset is
/// accepted too and normalized to UTC.
pub(crate) mod timestamp {
    use chrono::{DateTime, NaiveDateTime};
    use serde::{de, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid timestamp: {raw}")))
    }

    pub fn parse(raw: &str) -> Option<NaiveDateTime> {
        if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
            return Some(with_offset.naive_utc());
        }
        NaiveDateTime::parse_from_str(raw, FORMAT).ok()
    }
}
