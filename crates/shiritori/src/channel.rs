//! Presentation boundary: the chat channel a session plays in, and the lobby
//! that takes the channel back once the session is over.

use derive_more::Display;

use crate::{ParticipantId, ParticipantStatus, SessionOutcome};

/// Handle to a message posted in (or received from) a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display("message#{}", _0)]
pub struct MessageHandle(u64);

impl MessageHandle {
    /// Wraps a raw message id.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw message id.
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Acknowledgment attached to a submitted word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Reaction {
    /// The word was accepted.
    #[display("\u{2705}")]
    Accepted,
    /// The word was refused.
    #[display("\u{274C}")]
    Rejected,
}

/// The chat channel a session runs in.
///
/// Every call is fire-and-forget from the session's point of view; only
/// the handle returned by [`Channel::send_message`] is kept, so the message
/// can be retracted later. Implementations must not call back into the
/// session synchronously.
pub trait Channel: Send + Sync {
    /// Removes earlier messages before a game starts.
    fn clear_history(&self);

    /// Posts a message.
    fn send_message(&self, text: &str) -> MessageHandle;

    /// Deletes a message: a retracted announcement or a moderated submission.
    fn delete_message(&self, message: MessageHandle);

    /// Reacts to a message.
    fn react(&self, message: MessageHandle, reaction: Reaction);

    /// Mention-able display name of a participant.
    fn mention(&self, participant: &ParticipantId) -> String;

    /// Reflects a participant's status change (roles, nick decorations).
    fn show_status(&self, _participant: &ParticipantId, _status: ParticipantStatus) {}

    /// Releases whatever the channel holds for a participant at session end.
    fn release(&self, _participant: &ParticipantId) {}
}

/// Regains control of the channel when a session ends.
pub trait Lobby: Send + Sync {
    /// Called exactly once per session, after a win or an aborted start.
    fn resume(&self, outcome: SessionOutcome);
}
