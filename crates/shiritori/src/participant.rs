//! Participants in an elimination session.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Opaque handle to the external actor behind a participant.
///
/// Only used for display and equality; the channel decides how it is mentioned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize)]
pub struct ParticipantId(String);

impl ParticipantId {
    /// Creates a participant id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ParticipantId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ParticipantId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Visible status of a participant.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, strum::Display,
)]
#[strum(serialize_all = "lowercase")]
pub enum ParticipantStatus {
    /// Still in play.
    Alive,
    /// Knocked out of the session.
    Eliminated,
    /// No visible status: before the game starts, and the winner afterwards.
    #[default]
    Hidden,
}

/// A participant and its current status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    id: ParticipantId,
    status: ParticipantStatus,
}

impl Participant {
    /// Creates a participant with no visible status.
    #[instrument]
    pub fn new(id: ParticipantId) -> Self {
        Self {
            id,
            status: ParticipantStatus::Hidden,
        }
    }

    /// Returns the participant's id.
    pub fn id(&self) -> &ParticipantId {
        &self.id
    }

    /// Returns the participant's status.
    pub fn status(&self) -> ParticipantStatus {
        self.status
    }

    pub(crate) fn set_status(&mut self, status: ParticipantStatus) {
        self.status = status;
    }
}
