use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    name = "lectern",
    version,
    about = "Reading assistance for e-books: highlights, font and layout controls, text-to-speech.",
    long_about = None
)]
pub struct Cli {
    /// Use a specific configuration file
    #[clap(short = 'c', long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[clap(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Enable debug output
    #[clap(long, global = true)]
    pub debug: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the highlights stored for a book
    Highlights {
        /// Book URL or path
        #[clap(name = "SOURCE")]
        source: String,

        /// Print as JSON
        #[clap(long)]
        json: bool,

        /// Copy highlighted passages to the clipboard
        #[clap(long)]
        copy: bool,
    },

    /// Delete one highlight by its range token
    Delete {
        #[clap(name = "SOURCE")]
        source: String,

        #[clap(name = "RANGE")]
        range: String,
    },

    /// Forget every highlight stored for a book
    Clear {
        #[clap(name = "SOURCE")]
        source: String,
    },

    /// Read text aloud with the configured TTS engine
    Speak {
        #[clap(name = "TEXT", required = true)]
        text: Vec<String>,
    },

    /// Show the active configuration
    Config {
        /// Write the effective settings to the configuration file
        #[clap(long)]
        write: bool,
    },
}
