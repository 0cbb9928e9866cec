//! CLI module - Command-line interface for animelog
//!
//! One subcommand per file under `commands/`; `--user` applies to all of them.

mod commands;

use clap::{Parser, Subcommand};

/// animelog - Anime watchlist tracker
/// Tracks watched seasons and finds new ones through MyAnimeList relations
#[derive(Parser)]
#[command(name = "animelog")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// User whose watchlist to operate on (defaults to `general.default_user`)
    #[arg(long, short, global = true)]
    pub user: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search MyAnimeList without adding anything
    #[command(alias = "s")]
    Search {
        /// Search query
        #[arg(required = true)]
        query: Vec<String>,
    },

    /// Resolve and print the seasons related to a MAL id
    Resolve {
        /// MyAnimeList id of the starting entry
        mal_id: i32,
    },

    /// Search, resolve seasons and add a show to the watchlist
    #[command(alias = "a")]
    Add {
        /// Search query for anime
        #[arg(required = true)]
        query: Vec<String>,
        /// Initial watch status
        #[arg(long, default_value = "watching")]
        status: String,
        /// Keep every resolved season without asking
        #[arg(long, short)]
        yes: bool,
    },

    /// List tracked shows grouped by title
    #[command(alias = "ls", alias = "l")]
    List,

    /// Update progress, status or rating of one tracked season
    #[command(alias = "p")]
    Progress {
        /// Entry id (see `list`)
        id: String,
        /// Episodes watched
        #[arg(long)]
        watched: Option<i32>,
        /// watching, completed, on_hold, dropped, plan_to_watch
        #[arg(long)]
        status: Option<String>,
        /// Rating from 1 to 10
        #[arg(long)]
        rating: Option<i32>,
        /// Total episodes
        #[arg(long)]
        total: Option<i32>,
        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// Remove one tracked season
    #[command(alias = "rm", alias = "r")]
    Remove {
        /// Entry id
        id: String,
    },

    /// Show the ranking, or rank one show
    Rank {
        /// Show title; omit to print the ranking
        title: Vec<String>,
        /// New rank, 1 is the top
        #[arg(long, conflicts_with = "remove")]
        to: Option<i32>,
        /// Take the show out of the ranking
        #[arg(long)]
        remove: bool,
    },

    /// Check tracked shows for new episodes and seasons
    #[command(alias = "-c", alias = "--check")]
    Check {
        /// Check every user instead of only the selected one
        #[arg(long)]
        all: bool,
    },

    /// Show notifications
    #[command(alias = "n")]
    Notifications {
        /// Mark all notifications as read after listing them
        #[arg(long)]
        mark_read: bool,
        /// Mark a single notification as read
        #[arg(long, value_name = "ID")]
        read: Option<String>,
    },

    /// Run as background daemon with scheduler
    #[command(alias = "-d", alias = "--daemon")]
    Daemon,

    /// Create default config file
    #[command(alias = "--init")]
    Init,
}

pub use commands::*;
