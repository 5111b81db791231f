// src/cli/args.rs
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, name = "pocktag")]
#[command(about = "Mirror a Pocket library into SQLite and auto-categorize saved pages")]
pub struct Cli {
    /// Path to the config file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-d for debug, -dd for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Write a default config file and exit
    #[arg(long)]
    pub generate_config: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Pull saved items into the local database
    Fetch {
        /// Ignore the stored cursor and re-fetch the whole library
        #[arg(long)]
        all: bool,

        /// Path to the Pocket auth file
        #[arg(long, value_name = "FILE")]
        auth: Option<PathBuf>,

        /// Skip the progress summary before fetching
        #[arg(long)]
        silent: bool,
    },

    /// Categorize fetched items
    Autotag {
        /// Retry only items whose last attempt failed
        #[arg(long, conflicts_with = "all")]
        errors: bool,

        /// Re-categorize every item, including already-categorized ones
        #[arg(long)]
        all: bool,

        /// Remote categorization endpoint (overrides config)
        #[arg(long, value_name = "URL")]
        categorize_url: Option<String>,

        /// Also dump fetched page HTML into this directory
        #[arg(long, value_name = "DIR")]
        save_html: Option<PathBuf>,
    },

    /// Push top categories back to Pocket as tags
    AutotagSync {
        /// Sync at most this many records
        #[arg(short, long, value_name = "N")]
        num: Option<usize>,

        /// Path to the Pocket auth file
        #[arg(long, value_name = "FILE")]
        auth: Option<PathBuf>,
    },

    /// Create an empty, migrated database
    CreateDb {
        /// Where to create the database file
        path: PathBuf,
    },

    /// Print library counts
    Info,
}
