// src/ports/terminal.rs
use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt::Write;

use crate::application::{EditorNotice, SearchState};
use crate::domain::{HealthReport, Note, SearchAnalytics};
use crate::util::text::first_line;

/// Renders client state for the terminal, as text or as pretty JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPresenter {
    json: bool,
}

impl TerminalPresenter {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
        serde_json::to_string_pretty(value).context("Failed to serialize output")
    }

    pub fn render_notes(&self, notes: &[Note]) -> Result<String> {
        if self.json {
            return Self::to_json(notes);
        }
        if notes.is_empty() {
            return Ok("No notes found.".to_string());
        }

        let mut out = String::new();
        for note in notes {
            let visibility = if note.is_public { "public" } else { "private" };
            writeln!(
                out,
                "{}\t{}\tv{}\t{}\t{} views",
                note.id, note.title, note.version, visibility, note.view_count
            )?;
        }
        Ok(out.trim_end().to_string())
    }

    pub fn render_note(&self, note: &Note) -> Result<String> {
        if self.json {
            return Self::to_json(note);
        }

        let mut out = String::new();
        writeln!(out, "# {}", note.title)?;
        writeln!(out, "id:       {}", note.id)?;
        writeln!(out, "version:  {}", note.version)?;
        writeln!(out, "public:   {}", note.is_public)?;
        writeln!(out, "views:    {}", note.view_count)?;
        writeln!(out, "updated:  {}", note.updated_at.format("%Y-%m-%d %H:%M:%S"))?;
        let tags = note.tag_list();
        if !tags.is_empty() {
            writeln!(out, "tags:     {}", tags.join(", "))?;
        }
        writeln!(out)?;
        write!(out, "{}", note.content)?;
        Ok(out)
    }

    pub fn render_search(&self, state: &SearchState) -> Result<String> {
        if self.json {
            return Self::to_json(state);
        }
        if state.query.is_empty() {
            return Ok("Empty query, nothing searched.".to_string());
        }
        if state.hits.is_empty() {
            return Ok(format!("No {} results for \"{}\".", state.mode, state.query));
        }

        let mut out = String::new();
        writeln!(
            out,
            "{} {} result(s) for \"{}\" in {:.3}s",
            state.total_found, state.mode, state.query, state.search_time
        )?;
        for (rank, hit) in state.hits.iter().enumerate() {
            writeln!(
                out,
                "{:>2}. [{:.2}] {} ({})",
                rank + 1,
                hit.relevance_score,
                hit.note.title,
                hit.note.id
            )?;
            if hit.excerpts.is_empty() {
                let preview = first_line(&hit.note.content);
                if !preview.is_empty() {
                    writeln!(out, "      {}", preview)?;
                }
            }
            for excerpt in &hit.excerpts {
                writeln!(out, "      > {}", excerpt)?;
            }
            if hit.hidden_excerpts > 0 {
                writeln!(out, "      (+{} more)", hit.hidden_excerpts)?;
            }
        }
        Ok(out.trim_end().to_string())
    }

    pub fn render_analytics(&self, analytics: &SearchAnalytics, days: u32) -> Result<String> {
        if self.json {
            return Self::to_json(analytics);
        }

        let mut out = String::new();
        writeln!(out, "Search analytics, last {} day(s)", days)?;
        writeln!(out, "total searches:        {}", analytics.total_searches)?;
        writeln!(out, "average response time: {:.3}s", analytics.average_response_time)?;
        for (mode, value) in &analytics.search_types {
            writeln!(out, "  {:<10} {}", mode, value)?;
        }
        if !analytics.popular_queries.is_empty() {
            writeln!(out, "popular queries:")?;
            for query in &analytics.popular_queries {
                writeln!(out, "  {}", query.query())?;
            }
        }
        Ok(out.trim_end().to_string())
    }

    pub fn render_health(&self, report: &HealthReport) -> Result<String> {
        if self.json {
            return Self::to_json(report);
        }

        let mut out = format!("status: {}", report.status);
        if let Some(version) = &report.version {
            write!(out, "\nversion: {}", version)?;
        }
        if let Some(database) = &report.database {
            write!(
                out,
                "\ndatabase: {} ({} notes, {} embeddings)",
                database.database_type, database.note_count, database.embedding_count
            )?;
        }
        if let Some(error) = &report.error {
            write!(out, "\nerror: {}", error)?;
        }
        Ok(out)
    }

    pub fn render_notice(&self, notice: &EditorNotice) -> String {
        match notice {
            EditorNotice::Conflict(message) => {
                format!("Conflict: {message}\nReload the note and apply your changes again.")
            }
            EditorNotice::Invalid(message) => format!("Invalid note: {message}"),
            EditorNotice::Error(message) => format!("Save failed: {message}"),
        }
    }
}
