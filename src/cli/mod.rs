//! CLI module for FocusTube.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use crate::youtube::{DurationFilter, Level};
use clap::{Parser, Subcommand};

/// FocusTube - distraction-free educational video portal
///
/// Serves the FocusTube API and exposes its search and transcript tools on the
/// command line.
#[derive(Parser, Debug)]
#[command(name = "focustube")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "FOCUSTUBE_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Host to bind to (defaults to server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (defaults to server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Search YouTube for educational videos
    Videos {
        /// Search query
        query: String,

        /// Subject to focus on (e.g. "Mathematics")
        #[arg(short, long)]
        subject: Option<String>,

        /// Video length: short, medium or long
        #[arg(short, long)]
        duration: Option<DurationFilter>,

        /// Learner level: beginner, intermediate or advanced
        #[arg(short, long)]
        level: Option<Level>,

        /// Restrict results to one channel ID
        #[arg(long)]
        channel: Option<String>,
    },

    /// Show trending educational videos
    Trending {
        /// Which trending query to use (rotates through the configured list)
        #[arg(long, default_value = "0")]
        seed: usize,
    },

    /// Summarize a video's transcript and generate study questions
    Process {
        /// YouTube URL or video ID
        url: String,

        /// Video title, used in prompts
        #[arg(short, long)]
        title: Option<String>,

        /// Write the result as JSON to this file instead of printing it
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Ask the AI tutor a question about a video
    Ask {
        /// YouTube URL or video ID
        url: String,

        /// The question to ask
        question: String,

        /// Video title, used in prompts
        #[arg(short, long)]
        title: Option<String>,
    },

    /// Keyword search inside a video's transcript
    Search {
        /// YouTube URL or video ID
        url: String,

        /// Words to look for
        query: String,
    },

    /// Check system requirements and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
