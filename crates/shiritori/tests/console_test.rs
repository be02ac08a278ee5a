//! Tests for the terminal channel and lobby.

use std::io::Write;
use std::sync::{Arc, Mutex};

use shiritori::{
    Channel, ConsoleChannel, ConsoleLobby, Lobby, ParticipantId, Reaction, SessionOutcome,
};

/// Writer whose output the test can read back.
#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).expect("Console output is UTF-8")
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_receive_parses_author_and_word() {
    let channel = ConsoleChannel::new(SharedBuffer::default());

    let message = channel.receive("alice:  apple ").expect("Line has an author");
    assert_eq!(message.author, ParticipantId::new("alice"));
    assert_eq!(message.content, "apple");

    let next = channel.receive("bob: eagle").expect("Line has an author");
    assert_ne!(message.handle, next.handle);
}

#[test]
fn test_receive_ignores_lines_without_author() {
    let channel = ConsoleChannel::new(SharedBuffer::default());
    assert!(channel.receive("apple").is_none());
    assert!(channel.receive("  : apple").is_none());
}

#[test]
fn test_outbound_events_are_printed() {
    let buffer = SharedBuffer::default();
    let channel = ConsoleChannel::new(buffer.clone());

    let handle = channel.send_message(&format!(
        "Next Player: {}",
        channel.mention(&ParticipantId::new("alice"))
    ));
    channel.react(handle, Reaction::Accepted);
    channel.delete_message(handle);

    let output = buffer.contents();
    let id = handle.raw();
    assert!(output.contains(&format!("[{id}] Next Player: @alice")));
    assert!(output.contains(&format!("[{id}] \u{2705}")));
    assert!(output.contains(&format!("[{id}] (deleted)")));
}

#[tokio::test]
async fn test_lobby_reports_outcome_once() {
    let (lobby, finished) = ConsoleLobby::pair();
    let winner = SessionOutcome::Winner(ParticipantId::new("alice"));

    lobby.resume(winner.clone());
    lobby.resume(SessionOutcome::Aborted);

    assert_eq!(finished.await.expect("Outcome should be sent"), winner);
}
