//! Roster of alive and eliminated participants, and turn rotation.

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, instrument};

use crate::{Participant, ParticipantId, ParticipantStatus};

/// Ordered alive participants plus the eliminated ones.
///
/// The order of `alive` is the turn order. Removing a participant keeps the
/// relative order of everyone else, so rotation is always a cyclic walk over
/// the survivors of the initial order.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    alive: Vec<Participant>,
    dead: Vec<Participant>,
}

impl Roster {
    /// Creates a roster in the given order. Duplicate ids are dropped.
    #[instrument(skip(ids))]
    pub fn new(ids: impl IntoIterator<Item = ParticipantId>) -> Self {
        let mut alive: Vec<Participant> = Vec::new();
        for id in ids {
            if alive.iter().any(|p| *p.id() == id) {
                debug!(participant = %id, "Dropping duplicate participant");
                continue;
            }
            alive.push(Participant::new(id));
        }
        Self {
            alive,
            dead: Vec::new(),
        }
    }

    /// Shuffles the turn order once.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.alive.shuffle(rng);
    }

    /// Number of alive participants.
    pub fn len(&self) -> usize {
        self.alive.len()
    }

    /// Returns `true` if nobody is alive.
    pub fn is_empty(&self) -> bool {
        self.alive.is_empty()
    }

    /// Alive participants in turn order.
    pub fn iter(&self) -> impl Iterator<Item = &Participant> {
        self.alive.iter()
    }

    /// Alive participant at `index` in turn order.
    pub fn get(&self, index: usize) -> Option<&Participant> {
        self.alive.get(index)
    }

    /// Position of an alive participant in turn order.
    pub fn index_of(&self, id: &ParticipantId) -> Option<usize> {
        self.alive.iter().position(|p| p.id() == id)
    }

    /// Eliminated participants.
    pub fn dead(&self) -> &[Participant] {
        &self.dead
    }

    /// Looks a participant up in either list.
    pub fn find(&self, id: &ParticipantId) -> Option<&Participant> {
        self.alive
            .iter()
            .chain(self.dead.iter())
            .find(|p| p.id() == id)
    }

    /// Sets the status of every alive participant.
    pub(crate) fn mark_all(&mut self, status: ParticipantStatus) {
        for participant in &mut self.alive {
            participant.set_status(status);
        }
    }

    /// Sets the status of an alive participant. Returns `false` if not alive.
    pub(crate) fn set_status(&mut self, id: &ParticipantId, status: ParticipantStatus) -> bool {
        match self.alive.iter_mut().find(|p| p.id() == id) {
            Some(participant) => {
                participant.set_status(status);
                true
            }
            None => false,
        }
    }

    /// Removes an alive participant, returning its former index.
    ///
    /// The removed participant is not moved to the dead list; see [`Roster::eliminate`].
    #[instrument(skip(self), fields(participant = %id))]
    pub fn remove(&mut self, id: &ParticipantId) -> Option<(usize, Participant)> {
        let index = self.index_of(id)?;
        let participant = self.alive.remove(index);
        debug!(index, remaining = self.alive.len(), "Removed participant from rotation");
        Some((index, participant))
    }

    /// Moves an alive participant to the dead list and marks it eliminated.
    ///
    /// Returns the index it occupied in the turn order.
    #[instrument(skip(self), fields(participant = %id))]
    pub fn eliminate(&mut self, id: &ParticipantId) -> Option<usize> {
        let (index, mut participant) = self.remove(id)?;
        participant.set_status(ParticipantStatus::Eliminated);
        self.dead.push(participant);
        Some(index)
    }

    /// Index of the participant whose turn follows the one at `index`.
    ///
    /// With `vacated` set, `index` is the former position of a participant
    /// that was just removed, so the survivor now sitting there is next.
    pub fn next_index(&self, index: usize, vacated: bool) -> Option<usize> {
        if self.alive.is_empty() {
            return None;
        }
        let next = if vacated { index } else { index + 1 };
        Some(next % self.alive.len())
    }

    /// Ids of every participant, alive first.
    pub fn all_ids(&self) -> Vec<ParticipantId> {
        self.alive
            .iter()
            .chain(self.dead.iter())
            .map(|p| p.id().clone())
            .collect()
    }
}
