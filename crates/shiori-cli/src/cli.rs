use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;

use shiori_core::request::ListStatus;

#[derive(Parser)]
#[command(name = "shiori")]
#[command(author, version, about = "Render AniList lists, entries, searches and stats from note blocks")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve and fetch a block of `key: value` lines
    Block {
        /// File holding the block body, or `-` for stdin
        #[arg(default_value = "-")]
        input: PathBuf,
    },

    /// Resolve and fetch an inline link such as `anilist:user/stats`
    Link {
        /// Link target
        href: String,
    },

    /// Search AniList by title
    Search {
        /// Search term
        term: String,

        /// Search manga instead of anime
        #[arg(long)]
        manga: bool,

        /// Result page (starts at 1)
        #[arg(long)]
        page: Option<u32>,

        /// Results per page
        #[arg(long)]
        per_page: Option<u32>,
    },

    /// Change one field of your list entry (needs an access token)
    #[command(group(ArgGroup::new("field").required(true).args(["status", "score", "progress"])))]
    Update {
        /// AniList media ID
        media_id: u64,

        /// New list status, e.g. COMPLETED
        #[arg(long)]
        status: Option<ListStatus>,

        /// New score
        #[arg(long)]
        score: Option<f64>,

        /// New progress (episodes or chapters)
        #[arg(long)]
        progress: Option<u32>,
    },
}
