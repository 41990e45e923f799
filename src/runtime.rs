use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent, MouseButton, MouseEventKind};

/// Unified event type consumed by the game loop
#[derive(Clone, Debug)]
pub enum GameEvent {
    Key(KeyEvent),
    /// Left mouse button pressed at the given terminal cell
    Click { column: u16, row: u16 },
    Resize,
    Tick,
}

/// Source of terminal events (keyboard, mouse, resize)
pub trait EventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    rx: Receiver<GameEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            match event::read() {
                Ok(CtEvent::Key(key)) => {
                    if tx.send(GameEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(CtEvent::Mouse(mouse)) => {
                    if mouse.kind == MouseEventKind::Down(MouseButton::Left)
                        && tx
                            .send(GameEvent::Click {
                                column: mouse.column,
                                row: mouse.row,
                            })
                            .is_err()
                    {
                        break;
                    }
                }
                Ok(CtEvent::Resize(_, _)) => {
                    if tx.send(GameEvent::Resize).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(_) => break,
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<GameEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<GameEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that advances the game one event/tick at a time
pub struct Runner<E: EventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: EventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Blocks up to tick interval and returns the next event, or Tick on timeout
    pub fn step(&self) -> GameEvent {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => GameEvent::Tick,
        }
    }
}

/// One-shot callbacks the session schedules against the timer service
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerKind {
    /// Spawn a shape, then reschedule
    Spawn,
    /// The round's duration has elapsed
    RoundOver,
}

/// The timer collaborator: fire `kind` once, `delay` from now.
/// No lateness guarantee and no cancellation; a timer that outlives the
/// round it was scheduled in is neutralized by the session's state guards.
pub trait TimerService {
    fn schedule(&mut self, kind: TimerKind, delay: Duration);
}

/// Pending one-shot timers, drained by the event loop on every tick
#[derive(Debug, Default)]
pub struct DeferredTimers {
    pending: Vec<(Instant, TimerKind)>,
}

impl DeferredTimers {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    pub fn schedule_at(&mut self, kind: TimerKind, deadline: Instant) {
        self.pending.push((deadline, kind));
    }

    /// Remove and return every timer whose deadline has passed, in deadline order
    pub fn due(&mut self, now: Instant) -> Vec<TimerKind> {
        let mut fired: Vec<(Instant, TimerKind)> = Vec::new();
        self.pending.retain(|&(deadline, kind)| {
            if deadline <= now {
                fired.push((deadline, kind));
                false
            } else {
                true
            }
        });
        fired.sort_by_key(|&(deadline, _)| deadline);
        fired.into_iter().map(|(_, kind)| kind).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl TimerService for DeferredTimers {
    fn schedule(&mut self, kind: TimerKind, delay: Duration) {
        self.schedule_at(kind, Instant::now() + delay);
    }
}
