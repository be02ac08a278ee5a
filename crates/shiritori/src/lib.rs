//! Shiritori - turn-based word-chain elimination sessions
//!
//! A session rotates the turn through a shuffled roster. The active
//! participant must play a legal word before the turn deadline; an illegal
//! word or a missed deadline eliminates them. The last participant standing
//! wins.
//!
//! # Architecture
//!
//! - **Session**: the state machine; the only place turns are resolved
//! - **Roster**: turn order over the survivors
//! - **Deadline**: cancellable per-turn timers
//! - **Validator / Dictionary**: the word-chain rule, injected per session
//! - **Channel / Lobby**: the chat surface the session plays in
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use shiritori::{
//!     Collaborators, ConsoleChannel, ConsoleLobby, ParticipantId, SessionConfig,
//!     SessionController, ShiritoriValidator, TokioDeadlineTimer, WordDictionary,
//! };
//!
//! # async fn example() -> anyhow::Result<()> {
//! let dictionary = Arc::new(WordDictionary::of(["apple", "eagle", "elephant"]));
//! let (lobby, finished) = ConsoleLobby::pair();
//! let session = SessionController::new(
//!     [ParticipantId::new("alice"), ParticipantId::new("bob")],
//!     Box::new(ShiritoriValidator::new(dictionary)),
//!     Collaborators::new(
//!         Arc::new(ConsoleChannel::stdout()),
//!         Arc::new(TokioDeadlineTimer::from_current()?),
//!         Arc::new(lobby),
//!     ),
//!     SessionConfig::default(),
//! );
//! session.start()?;
//! let outcome = finished.await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod channel;
mod config;
mod console;
mod deadline;
mod dictionary;
mod participant;
mod roster;
mod session;
mod validator;

// Crate-level exports - Data model
pub use participant::{Participant, ParticipantId, ParticipantStatus};
pub use roster::Roster;

// Crate-level exports - Deadlines
pub use deadline::{DeadlineCallback, DeadlineHandle, DeadlineTimer, TimerError, TokioDeadlineTimer};

// Crate-level exports - Word rules
pub use dictionary::{DictionaryError, WordDictionary};
pub use validator::{IllegalWordError, IllegalWordReason, ShiritoriValidator, WordValidator};

// Crate-level exports - Presentation boundary
pub use channel::{Channel, Lobby, MessageHandle, Reaction};
pub use console::{ConsoleChannel, ConsoleLobby, InboundMessage};

// Crate-level exports - Session
pub use session::{
    Collaborators, DEFAULT_TURN_TIMEOUT, SessionConfig, SessionController, SessionError,
    SessionOutcome, SessionSnapshot, SessionState, Submission, TurnId,
};

// Crate-level exports - Configuration
pub use config::{ConfigError, GameConfig};
