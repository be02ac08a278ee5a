//! Fakes shared by the integration tests.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use shiritori::{
    Channel, Collaborators, DeadlineCallback, DeadlineHandle, DeadlineTimer, IllegalWordError,
    IllegalWordReason, Lobby, MessageHandle, ParticipantId, ParticipantStatus, Reaction,
    SessionConfig, SessionController, SessionOutcome, Submission, WordValidator,
};

/// Everything the session told the channel, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    Cleared,
    Sent(MessageHandle, String),
    Deleted(MessageHandle),
    Reacted(MessageHandle, Reaction),
    Status(ParticipantId, ParticipantStatus),
    Released(ParticipantId),
}

/// Channel that records every call.
#[derive(Debug, Default)]
pub struct RecordingChannel {
    events: Mutex<Vec<ChannelEvent>>,
    next_id: AtomicU64,
}

impl RecordingChannel {
    /// Allocates a handle for a message typed by a participant.
    pub fn inbound(&self) -> MessageHandle {
        MessageHandle::new(1000 + self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    pub fn events(&self) -> Vec<ChannelEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ChannelEvent::Sent(_, text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn deleted(&self) -> Vec<MessageHandle> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ChannelEvent::Deleted(handle) => Some(handle),
                _ => None,
            })
            .collect()
    }

    pub fn reactions(&self) -> Vec<(MessageHandle, Reaction)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ChannelEvent::Reacted(handle, reaction) => Some((handle, reaction)),
                _ => None,
            })
            .collect()
    }

    /// Handle of the most recent message whose text equals `text`.
    pub fn handle_of(&self, text: &str) -> Option<MessageHandle> {
        self.events().into_iter().rev().find_map(|e| match e {
            ChannelEvent::Sent(handle, sent) if sent == text => Some(handle),
            _ => None,
        })
    }

    fn push(&self, event: ChannelEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl Channel for RecordingChannel {
    fn clear_history(&self) {
        self.push(ChannelEvent::Cleared);
    }

    fn send_message(&self, text: &str) -> MessageHandle {
        let handle = MessageHandle::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.push(ChannelEvent::Sent(handle, text.to_string()));
        handle
    }

    fn delete_message(&self, message: MessageHandle) {
        self.push(ChannelEvent::Deleted(message));
    }

    fn react(&self, message: MessageHandle, reaction: Reaction) {
        self.push(ChannelEvent::Reacted(message, reaction));
    }

    fn mention(&self, participant: &ParticipantId) -> String {
        format!("@{}", participant)
    }

    fn show_status(&self, participant: &ParticipantId, status: ParticipantStatus) {
        self.push(ChannelEvent::Status(participant.clone(), status));
    }

    fn release(&self, participant: &ParticipantId) {
        self.push(ChannelEvent::Released(participant.clone()));
    }
}

/// What happened to the manual timer, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    Armed(DeadlineHandle, Duration),
    Cancelled(DeadlineHandle),
}

#[derive(Default)]
struct ManualState {
    next_id: u64,
    armed: BTreeMap<u64, DeadlineCallback>,
    history: Vec<TimerEvent>,
    max_armed: usize,
}

/// Deadline timer that only fires when a test tells it to.
#[derive(Default)]
pub struct ManualTimer {
    state: Mutex<ManualState>,
}

impl ManualTimer {
    pub fn armed(&self) -> Vec<DeadlineHandle> {
        let state = self.state.lock().unwrap();
        state.armed.keys().map(|id| DeadlineHandle::new(*id)).collect()
    }

    pub fn history(&self) -> Vec<TimerEvent> {
        self.state.lock().unwrap().history.clone()
    }

    /// Largest number of deadlines that were ever armed at once.
    pub fn max_armed(&self) -> usize {
        self.state.lock().unwrap().max_armed
    }

    /// Unregisters the newest deadline as if its time had come, without
    /// running it yet.
    pub fn expire_latest(&self) -> Option<DeadlineCallback> {
        let mut state = self.state.lock().unwrap();
        let id = *state.armed.keys().next_back()?;
        state.armed.remove(&id)
    }

    /// Fires the newest deadline. Returns `false` if nothing was armed.
    pub fn fire_latest(&self) -> bool {
        match self.expire_latest() {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }
}

impl DeadlineTimer for ManualTimer {
    fn arm(&self, duration: Duration, callback: DeadlineCallback) -> DeadlineHandle {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = state.next_id;
        state.armed.insert(id, callback);
        state.max_armed = state.max_armed.max(state.armed.len());
        let handle = DeadlineHandle::new(id);
        state.history.push(TimerEvent::Armed(handle, duration));
        handle
    }

    fn cancel(&self, handle: DeadlineHandle) {
        let mut state = self.state.lock().unwrap();
        if state.armed.remove(&handle.raw()).is_some() {
            state.history.push(TimerEvent::Cancelled(handle));
        }
    }
}

/// Lobby that records each handoff.
#[derive(Debug, Default)]
pub struct RecordingLobby {
    outcomes: Mutex<Vec<SessionOutcome>>,
}

impl RecordingLobby {
    pub fn outcomes(&self) -> Vec<SessionOutcome> {
        self.outcomes.lock().unwrap().clone()
    }
}

impl Lobby for RecordingLobby {
    fn resume(&self, outcome: SessionOutcome) {
        self.outcomes.lock().unwrap().push(outcome);
    }
}

/// Validator that accepts exactly the words it was given.
#[derive(Debug, Clone)]
pub struct AcceptList {
    legal: HashSet<String>,
}

impl AcceptList {
    pub fn new(words: &[&str]) -> Self {
        Self {
            legal: words.iter().map(|w| w.to_string()).collect(),
        }
    }
}

impl WordValidator for AcceptList {
    fn submit_word(&mut self, word: &str) -> Result<(), IllegalWordError> {
        if self.legal.contains(word) {
            Ok(())
        } else {
            Err(IllegalWordError::new(word, IllegalWordReason::NotInDictionary))
        }
    }
}

/// A session wired to fakes.
pub struct Harness {
    pub session: SessionController,
    pub channel: Arc<RecordingChannel>,
    pub timer: Arc<ManualTimer>,
    pub lobby: Arc<RecordingLobby>,
}

impl Harness {
    /// Session over `names` where only "ok" and "fine" are legal words.
    pub fn new(names: &[&str]) -> Self {
        Self::with_validator(names, Box::new(AcceptList::new(&["ok", "fine"])))
    }

    pub fn with_validator(names: &[&str], validator: Box<dyn WordValidator>) -> Self {
        let channel = Arc::new(RecordingChannel::default());
        let timer = Arc::new(ManualTimer::default());
        let lobby = Arc::new(RecordingLobby::default());
        let session = SessionController::new(
            names.iter().map(|n| ParticipantId::new(*n)),
            validator,
            Collaborators::new(channel.clone(), timer.clone(), lobby.clone()),
            SessionConfig::new(Duration::from_secs(30), Some(7)),
        );
        Self {
            session,
            channel,
            timer,
            lobby,
        }
    }

    /// Posts `word` as `author`.
    pub fn say(&self, author: &ParticipantId, word: &str) -> Submission {
        let handle = self.channel.inbound();
        self.session.submit_word(author, word, handle)
    }

    pub fn active(&self) -> ParticipantId {
        self.session
            .active_participant()
            .expect("Session should have an active participant")
    }

    /// Alive participants in turn order.
    pub fn order(&self) -> Vec<ParticipantId> {
        self.session.snapshot().alive_ids()
    }
}
