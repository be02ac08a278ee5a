//! Command-line interface for shiritori.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use shiritori::ParticipantId;

/// Shiritori - word-chain elimination game
#[derive(Parser, Debug)]
#[command(name = "shiritori")]
#[command(about = "Turn-based word-chain elimination game", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play a session on this terminal; type `name: word` to answer
    Play {
        /// Participants, comma separated
        #[arg(short, long, value_delimiter = ',')]
        players: Vec<String>,

        /// Word list (comma or newline separated); overrides the config file
        #[arg(short, long)]
        dictionary: Option<PathBuf>,

        /// TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Seconds per turn; overrides the config file
        #[arg(long)]
        timeout: Option<u64>,

        /// Seed for the turn order; overrides the config file
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Check words against a dictionary without playing
    Check {
        /// Word list (comma or newline separated)
        #[arg(short, long)]
        dictionary: PathBuf,

        /// Words to look up
        words: Vec<String>,
    },
}

/// Builds participant ids from `--players`, trimming names and skipping blanks.
pub fn participants(players: &[String]) -> Vec<ParticipantId> {
    players
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .map(ParticipantId::from)
        .collect()
}
