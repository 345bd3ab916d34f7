// src/lib.rs
pub mod application;
pub mod cli;
pub mod config;
pub mod constants;
pub mod domain;
pub mod infrastructure;
pub mod ports;
pub mod util;

use anyhow::{bail, Context, Result};
use std::time::Duration;
use tracing::{debug, info};

use crate::application::{EditorNotice, ListQuery, NotesSession, SessionSettings, SubmitOutcome};
use crate::cli::args::{Args, Command};
use crate::config::Config;
use crate::domain::{DraftChange, NoteId};
use crate::infrastructure::HttpNoteApi;
use crate::ports::TerminalPresenter;

pub async fn run(args: Args) -> Result<()> {
    debug!(?args, "Starting smartnotes with arguments");

    // Writing a config must not depend on the current one being readable
    if let Command::InitConfig { path, force } = &args.command {
        return init_config(path.clone(), *force);
    }

    // Initialize infrastructure
    let config = Config::resolve(args.config.as_deref(), args.server.as_deref())?;
    let api = HttpNoteApi::new(
        &config.server.base_url,
        Duration::from_secs(config.server.timeout_secs),
    )?;

    // Initialize application
    let mut session = NotesSession::new(api, SessionSettings::from(&config));

    // Initialize presentation
    let presenter = TerminalPresenter::new(args.json);

    let output = match args.command {
        Command::List {
            limit,
            skip,
            public_only,
        } => {
            let query = ListQuery {
                limit: limit.unwrap_or(config.notes.list_limit),
                skip,
                public_only,
            };
            let notes = session.list_page(&query).await?;
            presenter.render_notes(&notes)?
        }
        Command::Show { note_id } => {
            let note = session.get(&NoteId::new(note_id)).await?;
            presenter.render_note(&note)?
        }
        Command::Create {
            title,
            content,
            tags,
            public,
        } => {
            session.open_create();
            session.change(DraftChange::Title(title));
            session.change(DraftChange::Content(content));
            session.change(DraftChange::Tags(tags));
            session.change(DraftChange::Public(public));
            let note = save(&mut session, &presenter).await?;
            info!(note_id = %note.id, "Created note");
            presenter.render_note(&note)?
        }
        Command::Edit {
            note_id,
            title,
            content,
            tags,
            public,
        } => {
            session.open_edit(&NoteId::new(note_id)).await?;
            let changes = [
                title.map(DraftChange::Title),
                content.map(DraftChange::Content),
                tags.map(DraftChange::Tags),
                public.map(DraftChange::Public),
            ];
            for change in changes.into_iter().flatten() {
                session.change(change);
            }
            let note = save(&mut session, &presenter).await?;
            presenter.render_note(&note)?
        }
        Command::Delete { note_id } => {
            let id = NoteId::new(note_id);
            if !session.delete(&id).await? {
                debug!("Note list could not be reloaded after delete");
            }
            format!("Deleted note {id}")
        }
        Command::Search {
            query,
            mode,
            limit,
            no_content,
        } => {
            let mode = mode.unwrap_or(config.search.mode);
            let limit = limit.unwrap_or(config.search.limit);
            let include_content = config.search.include_content && !no_content;
            session.search(&query, mode, limit, include_content).await?;
            presenter.render_search(&session.search_state())?
        }
        Command::Analytics { days } => {
            let analytics = session.analytics(days).await?;
            presenter.render_analytics(&analytics, days)?
        }
        Command::Share { note_id } => session.share_link(&NoteId::new(note_id)).await?,
        Command::Health => {
            let report = session.health().await?;
            presenter.render_health(&report)?
        }
        Command::InitConfig { path, force } => return init_config(path, force),
    };

    println!("{output}");
    Ok(())
}

async fn save(
    session: &mut NotesSession<HttpNoteApi>,
    presenter: &TerminalPresenter,
) -> Result<domain::Note> {
    match session.submit().await {
        SubmitOutcome::Saved { note, refreshed } => {
            if !refreshed {
                debug!("Note list could not be reloaded after save");
            }
            Ok(note)
        }
        SubmitOutcome::Rejected(error) => {
            let notice = session
                .editor()
                .state
                .notice()
                .map(|notice| presenter.render_notice(notice))
                .unwrap_or_else(|| presenter.render_notice(&EditorNotice::Error(error.to_string())));
            Err(error).context(notice)
        }
        SubmitOutcome::Ignored => bail!("Editor was not open, nothing to save"),
    }
}

fn init_config(path: Option<std::path::PathBuf>, force: bool) -> Result<()> {
    let path = match path {
        Some(path) => path,
        None => Config::default_path().context("Could not determine config directory")?,
    };
    if path.exists() && !force {
        bail!("Config file already exists at {} (use --force to overwrite)", path.display());
    }

    Config::create_default(&path)?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}
