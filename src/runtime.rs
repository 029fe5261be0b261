use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::session::SessionState;

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    /// Countdown tick scheduled under the given timer generation.
    Tick(u64),
}

/// Source of terminal events (keyboard, resize, ticks)
pub trait EventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError>;

    /// Sender for producers other than the terminal, e.g. the tick thread.
    fn sender(&self) -> Sender<AppEvent>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    tx: Sender<AppEvent>,
    rx: Receiver<AppEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        let key_tx = tx.clone();

        std::thread::spawn(move || loop {
            let forwarded = match event::read() {
                // Windows reports releases too; only presses are keystrokes
                Ok(CtEvent::Key(key)) if key.kind != KeyEventKind::Release => {
                    key_tx.send(AppEvent::Key(key))
                }
                Ok(CtEvent::Resize(_, _)) => key_tx.send(AppEvent::Resize),
                Ok(_) => Ok(()),
                Err(_) => break,
            };
            if forwarded.is_err() {
                break;
            }
        });

        Self { tx, rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    fn sender(&self) -> Sender<AppEvent> {
        self.tx.clone()
    }
}

/// Test event source fed by a channel the test holds the other end of
pub struct TestEventSource {
    tx: Sender<AppEvent>,
    rx: Receiver<AppEvent>,
}

impl TestEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }
}

impl Default for TestEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    fn sender(&self) -> Sender<AppEvent> {
        self.tx.clone()
    }
}

/// Runner that hands the application one event at a time
pub struct Runner<E: EventSource> {
    event_source: E,
    poll_interval: Duration,
}

impl<E: EventSource> Runner<E> {
    pub fn new(event_source: E, poll_interval: Duration) -> Self {
        Self {
            event_source,
            poll_interval,
        }
    }

    /// Blocks up to the poll interval; `None` means nothing happened and the
    /// host may refresh its display.
    pub fn step(&self) -> Option<AppEvent> {
        match self.event_source.recv_timeout(self.poll_interval) {
            Ok(ev) => Some(ev),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    pub fn sender(&self) -> Sender<AppEvent> {
        self.event_source.sender()
    }
}

/// What a key press means to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Fragment(String),
    /// End the current run (or leave, if it already ended).
    Exit,
    Retry,
    NextMode,
    Quit,
    None,
}

pub fn command_for_key(key: &KeyEvent, state: SessionState) -> Command {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Command::Quit,
            _ => Command::None,
        };
    }

    match (state, key.code) {
        (_, KeyCode::Esc) => Command::Exit,
        (SessionState::Finished, KeyCode::Char('r')) => Command::Retry,
        (SessionState::Finished, KeyCode::Char('m')) => Command::NextMode,
        (SessionState::Finished, _) => Command::None,
        (SessionState::Idle, KeyCode::Tab) => Command::NextMode,
        (_, KeyCode::Char(c)) => Command::Fragment(c.to_string()),
        _ => Command::None,
    }
}
