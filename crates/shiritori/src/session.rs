//! Elimination session controller.
//!
//! A session owns a [`Roster`] and rotates the active turn through it. Each
//! turn arms a deadline; the turn ends either when the active participant
//! submits a word or when the deadline fires, whichever reaches the session
//! lock first. Every armed deadline carries the turn number it was armed for,
//! and a firing for any other turn is ignored, so a deadline that loses the
//! race to a submission can never eliminate anyone.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_new::new;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, instrument, warn};

use crate::{
    Channel, DeadlineHandle, DeadlineTimer, IllegalWordError, Lobby, MessageHandle, Participant,
    ParticipantId, ParticipantStatus, Reaction, Roster, WordValidator,
};

/// Time a participant has to answer when nothing else is configured.
pub const DEFAULT_TURN_TIMEOUT: Duration = Duration::from_secs(30);

/// Sequence number of a turn, starting at 1 for the first turn.
pub type TurnId = u64;

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum SessionState {
    /// Created, not started.
    Init,
    /// Turns are being played.
    Running,
    /// Won or aborted.
    Finished,
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
pub enum SessionOutcome {
    /// One participant outlasted everyone else.
    #[display("{} wins", _0)]
    Winner(ParticipantId),
    /// The session could not start.
    #[display("aborted")]
    Aborted,
}

impl SessionOutcome {
    /// Returns the winner if there is one.
    pub fn winner(&self) -> Option<&ParticipantId> {
        match self {
            Self::Winner(id) => Some(id),
            Self::Aborted => None,
        }
    }
}

/// Errors starting a session.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum SessionError {
    /// The roster had nobody in it.
    #[display("Unable to start a game with no players")]
    EmptyRoster,
    /// `start` was called on a session that already left `Init`.
    #[display("Session has already been started")]
    AlreadyStarted,
}

/// What happened to a submitted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// The active participant played a legal word and keeps playing.
    Accepted,
    /// The active participant played an illegal word and was eliminated.
    Rejected(IllegalWordError),
    /// The author is not the active participant; the message was moderated.
    OffTurn,
    /// The session is not running; nothing was done.
    NotRunning,
}

/// Tunables of a session.
#[derive(Debug, Clone, PartialEq, Eq, Getters, new)]
pub struct SessionConfig {
    /// Time each participant has to submit a word.
    turn_timeout: Duration,
    /// Seed for the turn-order shuffle; random when `None`.
    shuffle_seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            turn_timeout: DEFAULT_TURN_TIMEOUT,
            shuffle_seed: None,
        }
    }
}

/// External collaborators a session talks to.
#[derive(Clone, new)]
pub struct Collaborators {
    channel: Arc<dyn Channel>,
    timer: Arc<dyn DeadlineTimer>,
    lobby: Arc<dyn Lobby>,
}

/// Consistent view of a session taken under its lock.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct SessionSnapshot {
    /// Lifecycle state.
    state: SessionState,
    /// Participant whose turn it is.
    active: Option<ParticipantId>,
    /// Alive participants in turn order.
    alive: Vec<Participant>,
    /// Eliminated participants in elimination order.
    dead: Vec<Participant>,
    /// Current turn number; 0 before the first turn.
    turn: TurnId,
    /// Whether a deadline is armed.
    deadline_armed: bool,
    /// How the session ended, once finished.
    outcome: Option<SessionOutcome>,
}

impl SessionSnapshot {
    /// Ids of the alive participants in turn order.
    pub fn alive_ids(&self) -> Vec<ParticipantId> {
        self.alive.iter().map(|p| p.id().clone()).collect()
    }

    /// Ids of the eliminated participants.
    pub fn dead_ids(&self) -> Vec<ParticipantId> {
        self.dead.iter().map(|p| p.id().clone()).collect()
    }

    /// Status of a participant, alive or dead.
    pub fn status_of(&self, id: &ParticipantId) -> Option<ParticipantStatus> {
        self.alive
            .iter()
            .chain(self.dead.iter())
            .find(|p| p.id() == id)
            .map(Participant::status)
    }
}

struct SessionShared {
    // Blocking lock; `Channel` calls run while it is held.
    core: Mutex<SessionCore>,
    lobby: Arc<dyn Lobby>,
}

/// Drives one elimination game.
///
/// Cloning yields another handle to the same session. All mutation goes
/// through one lock: [`SessionController::start`],
/// [`SessionController::submit_word`] and
/// [`SessionController::on_deadline_fired`] never interleave.
#[derive(Clone)]
pub struct SessionController {
    shared: Arc<SessionShared>,
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController").finish_non_exhaustive()
    }
}

impl SessionController {
    /// Creates a session over `participants`. Nothing happens until
    /// [`SessionController::start`].
    #[instrument(skip_all, fields(participants = tracing::field::Empty))]
    pub fn new(
        participants: impl IntoIterator<Item = ParticipantId>,
        validator: Box<dyn WordValidator>,
        collaborators: Collaborators,
        config: SessionConfig,
    ) -> Self {
        let roster = Roster::new(participants);
        tracing::Span::current().record("participants", roster.len());
        let Collaborators {
            channel,
            timer,
            lobby,
        } = collaborators;

        let shared = Arc::new_cyclic(|weak| SessionShared {
            core: Mutex::new(SessionCore {
                state: SessionState::Init,
                roster,
                active: None,
                turn: 0,
                pending_deadline: None,
                turn_display: None,
                outcome: None,
                handoff: None,
                validator,
                channel,
                timer,
                config,
                shared: weak.clone(),
            }),
            lobby,
        });
        info!("Created session");
        Self { shared }
    }

    /// Starts the game and arms the first deadline.
    ///
    /// # Errors
    ///
    /// [`SessionError::EmptyRoster`] if there is nobody to play; the session
    /// is then finished and the lobby has already taken over.
    /// [`SessionError::AlreadyStarted`] if called more than once.
    #[instrument(skip(self))]
    pub fn start(&self) -> Result<(), SessionError> {
        let (result, handoff) = {
            let mut core = self.lock();
            let result = core.start();
            (result, core.handoff.take())
        };
        self.hand_off(handoff);
        result
    }

    /// Handles a message posted by `actor` during the session.
    ///
    /// Messages from anyone but the active participant are deleted and
    /// leave the session untouched.
    #[instrument(skip(self), fields(participant = %actor))]
    pub fn submit_word(
        &self,
        actor: &ParticipantId,
        word: &str,
        message: MessageHandle,
    ) -> Submission {
        let (submission, handoff) = {
            let mut core = self.lock();
            let submission = core.submit_word(actor, word, message);
            (submission, core.handoff.take())
        };
        self.hand_off(handoff);
        submission
    }

    /// Times out the active participant if `turn` is still the current turn.
    ///
    /// Called by the deadline armed for `turn`; any other turn number is a
    /// stale firing and does nothing.
    #[instrument(skip(self))]
    pub fn on_deadline_fired(&self, turn: TurnId) {
        let handoff = {
            let mut core = self.lock();
            core.on_deadline_fired(turn);
            core.handoff.take()
        };
        self.hand_off(handoff);
    }

    /// Takes a consistent snapshot of the session.
    pub fn snapshot(&self) -> SessionSnapshot {
        let core = self.lock();
        SessionSnapshot {
            state: core.state,
            active: core.active.clone(),
            alive: core.roster.iter().cloned().collect(),
            dead: core.roster.dead().to_vec(),
            turn: core.turn,
            deadline_armed: core.pending_deadline.is_some(),
            outcome: core.outcome.clone(),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.lock().state
    }

    /// Participant whose turn it is.
    pub fn active_participant(&self) -> Option<ParticipantId> {
        self.lock().active.clone()
    }

    /// How the session ended, once finished.
    pub fn outcome(&self) -> Option<SessionOutcome> {
        self.lock().outcome.clone()
    }

    fn lock(&self) -> MutexGuard<'_, SessionCore> {
        self.shared
            .core
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // Runs outside the session lock so the lobby may inspect the session.
    fn hand_off(&self, outcome: Option<SessionOutcome>) {
        if let Some(outcome) = outcome {
            info!(%outcome, "Handing channel back to lobby");
            self.shared.lobby.resume(outcome);
        }
    }
}

struct SessionCore {
    state: SessionState,
    roster: Roster,
    active: Option<ParticipantId>,
    turn: TurnId,
    pending_deadline: Option<DeadlineHandle>,
    turn_display: Option<MessageHandle>,
    outcome: Option<SessionOutcome>,
    handoff: Option<SessionOutcome>,
    validator: Box<dyn WordValidator>,
    channel: Arc<dyn Channel>,
    timer: Arc<dyn DeadlineTimer>,
    config: SessionConfig,
    shared: Weak<SessionShared>,
}

impl SessionCore {
    fn start(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::Init {
            warn!(state = %self.state, "Ignoring repeated start");
            return Err(SessionError::AlreadyStarted);
        }

        self.channel.clear_history();
        if self.roster.is_empty() {
            warn!("Aborting session with an empty roster");
            self.channel
                .send_message(&SessionError::EmptyRoster.to_string());
            self.finish(SessionOutcome::Aborted);
            return Err(SessionError::EmptyRoster);
        }

        self.roster.mark_all(ParticipantStatus::Alive);
        for participant in self.roster.iter() {
            self.channel
                .show_status(participant.id(), ParticipantStatus::Alive);
        }

        let mut rng = match self.config.shuffle_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        self.roster.shuffle(&mut rng);

        self.state = SessionState::Running;
        info!(
            participants = self.roster.len(),
            order = ?self.roster.iter().map(|p| p.id().as_str()).collect::<Vec<_>>(),
            "Session started"
        );
        self.advance_turn(None);
        Ok(())
    }

    fn submit_word(
        &mut self,
        actor: &ParticipantId,
        word: &str,
        message: MessageHandle,
    ) -> Submission {
        if self.state != SessionState::Running {
            debug!(state = %self.state, "Ignoring submission outside a running session");
            return Submission::NotRunning;
        }
        if self.active.as_ref() != Some(actor) {
            debug!(active = ?self.active, "Moderating off-turn submission");
            self.channel.delete_message(message);
            return Submission::OffTurn;
        }

        match self.validator.submit_word(word) {
            Ok(()) => {
                info!(turn = self.turn, word, "Word accepted");
                self.resolve_turn_outcome(true);
                self.channel.react(message, Reaction::Accepted);
                Submission::Accepted
            }
            Err(illegal) => {
                warn!(turn = self.turn, reason = %illegal.reason, word, "Word rejected");
                self.resolve_turn_outcome(false);
                self.channel.react(message, Reaction::Rejected);
                Submission::Rejected(illegal)
            }
        }
    }

    fn on_deadline_fired(&mut self, turn: TurnId) {
        if self.state != SessionState::Running || turn != self.turn {
            debug!(
                turn,
                current = self.turn,
                state = %self.state,
                "Ignoring stale deadline"
            );
            return;
        }
        info!(turn, active = ?self.active, "Turn timed out");
        self.channel.send_message("Time's Up!");
        self.resolve_turn_outcome(false);
    }

    /// Ends the current turn. The only place turns are resolved.
    fn resolve_turn_outcome(&mut self, survived: bool) {
        self.cancel_deadline();
        let Some(active) = self.active.clone() else {
            warn!("Resolving a turn with no active participant");
            return;
        };

        if survived {
            self.roster.set_status(&active, ParticipantStatus::Alive);
            self.channel.show_status(&active, ParticipantStatus::Alive);
            self.advance_turn(None);
        } else {
            let vacated = self.roster.eliminate(&active);
            self.channel
                .show_status(&active, ParticipantStatus::Eliminated);
            info!(
                participant = %active,
                remaining = self.roster.len(),
                "Participant eliminated"
            );
            self.advance_turn(vacated);
        }
    }

    /// Picks the next active participant, or declares the last one standing.
    ///
    /// `vacated` is the former index of an active participant who was just
    /// eliminated.
    fn advance_turn(&mut self, vacated: Option<usize>) {
        if self.roster.len() == 1 {
            if let Some(winner) = self.roster.get(0).map(|p| p.id().clone()) {
                self.declare_winner(winner);
            }
            return;
        }

        let next_index = match (vacated, &self.active) {
            (Some(index), _) => self.roster.next_index(index, true),
            (None, Some(active)) => self
                .roster
                .index_of(active)
                .and_then(|index| self.roster.next_index(index, false)),
            (None, None) => self.roster.next_index(0, true),
        };
        let Some(next) = next_index
            .and_then(|index| self.roster.get(index))
            .map(|p| p.id().clone())
        else {
            warn!(active = ?self.active, "No participant to hand the turn to");
            return;
        };

        if let Some(previous) = self.turn_display.take() {
            self.channel.delete_message(previous);
        }
        let mention = self.channel.mention(&next);
        self.turn_display = Some(
            self.channel
                .send_message(&format!("Next Player: {}", mention)),
        );

        self.turn += 1;
        info!(turn = self.turn, participant = %next, "Turn started");
        self.active = Some(next);
        self.arm_deadline();
    }

    fn arm_deadline(&mut self) {
        self.cancel_deadline();
        let turn = self.turn;
        let shared = self.shared.clone();
        let handle = self.timer.arm(
            self.config.turn_timeout,
            Box::new(move || {
                if let Some(shared) = shared.upgrade() {
                    SessionController { shared }.on_deadline_fired(turn);
                }
            }),
        );
        debug!(turn, deadline = %handle, "Deadline armed");
        self.pending_deadline = Some(handle);
    }

    fn cancel_deadline(&mut self) {
        if let Some(handle) = self.pending_deadline.take() {
            self.timer.cancel(handle);
        }
    }

    fn declare_winner(&mut self, winner: ParticipantId) {
        self.roster.set_status(&winner, ParticipantStatus::Hidden);
        self.channel.show_status(&winner, ParticipantStatus::Hidden);
        let mention = self.channel.mention(&winner);
        self.channel.send_message(&format!("{} WINS!", mention));
        info!(participant = %winner, turns = self.turn, "Winner declared");
        self.finish(SessionOutcome::Winner(winner));
    }

    fn finish(&mut self, outcome: SessionOutcome) {
        self.cancel_deadline();
        self.active = None;
        self.state = SessionState::Finished;
        for id in self.roster.all_ids() {
            self.channel.release(&id);
        }
        self.outcome = Some(outcome.clone());
        self.handoff = Some(outcome);
    }
}
