//! Shiritori - terminal front end
//!
//! Plays an elimination session on stdin/stdout.

#![warn(missing_docs)]

mod cli;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command, participants};
use shiritori::{
    Collaborators, ConsoleChannel, ConsoleLobby, GameConfig, SessionController,
    SessionError, ShiritoriValidator, TokioDeadlineTimer, WordDictionary,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // stdout belongs to the game channel; logs go to stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Play {
            players,
            dictionary,
            config,
            timeout,
            seed,
        } => run_play(players, dictionary, config, timeout, seed).await,
        Command::Check { dictionary, words } => run_check(dictionary, words),
    }
}

/// Resolves configuration from the optional file and command-line overrides.
#[instrument]
fn load_config(
    config: Option<PathBuf>,
    dictionary: Option<PathBuf>,
    timeout: Option<u64>,
    seed: Option<u64>,
) -> Result<GameConfig> {
    let mut game_config = match config {
        Some(path) => GameConfig::from_file(path)?,
        None => GameConfig::default(),
    };
    if let Some(path) = dictionary {
        game_config = game_config.with_dictionary(path);
    }
    if let Some(secs) = timeout {
        game_config = game_config.with_turn_timeout_secs(secs);
    }
    if let Some(seed) = seed {
        game_config = game_config.with_shuffle_seed(seed);
    }
    game_config.validate()?;
    Ok(game_config)
}

/// Plays one session, reading `name: word` lines from stdin.
async fn run_play(
    players: Vec<String>,
    dictionary: Option<PathBuf>,
    config: Option<PathBuf>,
    timeout: Option<u64>,
    seed: Option<u64>,
) -> Result<()> {
    let game_config = load_config(config, dictionary, timeout, seed)?;
    let dictionary_path = game_config
        .dictionary()
        .clone()
        .context("No dictionary given: pass --dictionary or set `dictionary` in the config")?;
    let dictionary = Arc::new(WordDictionary::from_file(&dictionary_path)?);

    let channel = Arc::new(ConsoleChannel::stdout());
    let (lobby, mut finished) = ConsoleLobby::pair();
    let session = SessionController::new(
        participants(&players),
        Box::new(ShiritoriValidator::new(dictionary)),
        Collaborators::new(
            channel.clone(),
            Arc::new(TokioDeadlineTimer::from_current()?),
            Arc::new(lobby),
        ),
        game_config.session_config(),
    );

    match session.start() {
        Ok(()) => {}
        Err(SessionError::EmptyRoster) => {
            warn!("No players given; nothing to play");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    loop {
        tokio::select! {
            outcome = &mut finished => {
                let outcome = outcome.context("Session ended without an outcome")?;
                info!(%outcome, "Game over");
                return Ok(());
            }
            line = lines.next_line(), if stdin_open => {
                match line? {
                    Some(line) => {
                        if let Some(message) = channel.receive(&line) {
                            let submission =
                                session.submit_word(&message.author, &message.content, message.handle);
                            info!(author = %message.author, ?submission, "Handled message");
                        }
                    }
                    None => {
                        info!("Input closed; remaining turns will time out");
                        stdin_open = false;
                    }
                }
            }
        }
    }
}

/// Looks words up in a dictionary and prints the verdicts.
#[instrument(skip(words))]
fn run_check(dictionary: PathBuf, words: Vec<String>) -> Result<()> {
    let dictionary = WordDictionary::from_file(&dictionary)?;
    info!(words = dictionary.len(), "Dictionary ready");
    for word in words {
        let verdict = if dictionary.contains(&word) {
            "known"
        } else {
            "unknown"
        };
        println!("{}: {}", word, verdict);
    }
    Ok(())
}
