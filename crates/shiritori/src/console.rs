//! Terminal rendition of the channel and lobby, used by the `play` command.

use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use tokio::sync::oneshot;
use tracing::{debug, instrument, warn};

use crate::{Channel, Lobby, MessageHandle, ParticipantId, Reaction, SessionOutcome};

/// A message typed on the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Who wrote it.
    pub author: ParticipantId,
    /// What they wrote.
    pub content: String,
    /// Handle the session uses to react to or delete it.
    pub handle: MessageHandle,
}

/// [`Channel`] that prints to a writer, one line per event.
pub struct ConsoleChannel {
    out: Mutex<Box<dyn Write + Send>>,
    next_id: AtomicU64,
}

impl std::fmt::Debug for ConsoleChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleChannel")
            .field("next_id", &self.next_id)
            .finish_non_exhaustive()
    }
}

impl ConsoleChannel {
    /// Creates a channel writing to `out`.
    pub fn new(out: impl Write + Send + 'static) -> Self {
        Self {
            out: Mutex::new(Box::new(out)),
            next_id: AtomicU64::new(1),
        }
    }

    /// Creates a channel writing to stdout.
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }

    /// Parses a `name: word` line into an inbound message.
    ///
    /// Returns `None` for lines without an author.
    #[instrument(skip(self))]
    pub fn receive(&self, line: &str) -> Option<InboundMessage> {
        let (author, content) = line.split_once(':')?;
        let author = author.trim();
        if author.is_empty() {
            debug!("Ignoring line without an author");
            return None;
        }
        Some(InboundMessage {
            author: ParticipantId::new(author),
            content: content.trim().to_string(),
            handle: self.allocate(),
        })
    }

    fn allocate(&self) -> MessageHandle {
        MessageHandle::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    fn print(&self, line: std::fmt::Arguments<'_>) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(out, "{}", line).and_then(|()| out.flush()) {
            warn!(error = %e, "Failed to write to console");
        }
    }
}

impl Channel for ConsoleChannel {
    fn clear_history(&self) {
        self.print(format_args!("---- new game ----"));
    }

    fn send_message(&self, text: &str) -> MessageHandle {
        let handle = self.allocate();
        self.print(format_args!("[{}] {}", handle.raw(), text));
        handle
    }

    fn delete_message(&self, message: MessageHandle) {
        self.print(format_args!("[{}] (deleted)", message.raw()));
    }

    fn react(&self, message: MessageHandle, reaction: Reaction) {
        self.print(format_args!("[{}] {}", message.raw(), reaction));
    }

    fn mention(&self, participant: &ParticipantId) -> String {
        format!("@{}", participant)
    }
}

/// [`Lobby`] that reports the outcome through a oneshot channel.
#[derive(Debug)]
pub struct ConsoleLobby {
    sender: Mutex<Option<oneshot::Sender<SessionOutcome>>>,
}

impl ConsoleLobby {
    /// Creates the lobby and the receiver that resolves when a session ends.
    pub fn pair() -> (Self, oneshot::Receiver<SessionOutcome>) {
        let (sender, receiver) = oneshot::channel();
        let lobby = Self {
            sender: Mutex::new(Some(sender)),
        };
        (lobby, receiver)
    }
}

impl Lobby for ConsoleLobby {
    fn resume(&self, outcome: SessionOutcome) {
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match sender {
            Some(sender) => {
                if sender.send(outcome).is_err() {
                    debug!("Nobody is waiting for the session outcome");
                }
            }
            None => warn!(%outcome, "Lobby resumed more than once"),
        }
    }
}
