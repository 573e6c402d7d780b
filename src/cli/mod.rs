pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "feedloom")]
#[command(about = "RSS/Atom aggregation and article extraction service", long_about = None)]
pub struct Cli {
    /// Path to the config file (default: ~/.config/feedloom/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API
    Serve {
        /// Address to listen on (overrides the config file)
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Fetch and normalize a single feed
    Feed {
        /// URL of the feed
        url: String,
    },
    /// Aggregate several feeds, newest articles first
    Feeds {
        /// URLs of the feeds
        urls: Vec<String>,

        /// Also read feed URLs from an OPML file
        #[arg(long)]
        opml: Option<PathBuf>,
    },
    /// Extract the readable content of an article page
    Extract {
        /// URL of the article
        url: String,

        /// Write the offline snapshot HTML to this file
        #[arg(long)]
        html_out: Option<PathBuf>,
    },
}
