// src/cli/args.rs
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::constants::DEFAULT_ANALYTICS_DAYS;
use crate::domain::SearchMode;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)] // Read from `Cargo.toml`
#[command(arg_required_else_help = true, disable_help_subcommand = true)]
pub struct Args {
    /// Path to configuration file (optional)
    #[arg(short, long, value_name = "CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Smart Notes API base URL, overrides config and SMARTNOTES_URL
    #[arg(short, long, value_name = "URL", global = true)]
    pub server: Option<String>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbosity level (-v = debug, -vv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List notes, most recently updated first
    List {
        /// Maximum number of notes (defaults to config)
        #[arg(short, long)]
        limit: Option<u32>,

        /// Number of notes to skip
        #[arg(long, default_value_t = 0)]
        skip: u32,

        /// Only list public notes
        #[arg(long)]
        public_only: bool,
    },

    /// Show a single note
    Show {
        #[arg(value_name = "NOTE_ID")]
        note_id: String,
    },

    /// Create a note
    Create {
        #[arg(short, long)]
        title: String,

        #[arg(short = 'b', long)]
        content: String,

        /// Comma-separated tags
        #[arg(long, default_value = "")]
        tags: String,

        /// Make the note shareable
        #[arg(long)]
        public: bool,
    },

    /// Edit a note; fields not given keep their current value
    Edit {
        #[arg(value_name = "NOTE_ID")]
        note_id: String,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short = 'b', long)]
        content: Option<String>,

        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,

        /// Set visibility (true = public)
        #[arg(long, value_name = "BOOL")]
        public: Option<bool>,
    },

    /// Delete a note
    Delete {
        #[arg(value_name = "NOTE_ID")]
        note_id: String,
    },

    /// Search notes by keyword, meaning, or both
    Search {
        #[arg(value_name = "QUERY")]
        query: String,

        /// keyword, semantic or hybrid (defaults to config)
        #[arg(short, long)]
        mode: Option<SearchMode>,

        /// Maximum number of results, 1-50 (defaults to config)
        #[arg(short, long)]
        limit: Option<u32>,

        /// Ask the backend to leave note content out of results
        #[arg(long)]
        no_content: bool,
    },

    /// Show search analytics reported by the backend
    Analytics {
        #[arg(short, long, default_value_t = DEFAULT_ANALYTICS_DAYS)]
        days: u32,
    },

    /// Print the share link of a public note
    Share {
        #[arg(value_name = "NOTE_ID")]
        note_id: String,
    },

    /// Check backend health
    Health,

    /// Write a default configuration file
    InitConfig {
        /// Target path (defaults to the platform config directory)
        #[arg(value_name = "PATH")]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
