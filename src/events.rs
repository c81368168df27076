//! Game event system for decoupled communication between systems.
//!
//! The engine emits events while it steps; the shell (audio, UI, the headless
//! driver's log) drains and reacts to them at the end of the frame.

use crate::error::PathError;

/// Game events that systems can emit and subscribe to
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// A new level is in place
    LevelGenerated { rooms: usize, props: usize },
    /// The shift is a few seconds away; the heartbeat started
    ShiftWarning,
    /// The screen starts fading to black
    ShiftStarted,
    /// The shift completed and the screen is visible again
    ShiftFinished,
    /// The guide path to the exit could not be computed
    PathLost(PathError),
    /// The player walked into the exit room
    ExitReached { room: usize },
}

/// Simple event queue - events are pushed during update, processed at end of frame
#[derive(Default)]
pub struct EventQueue {
    events: Vec<GameEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Push an event to be processed later
    pub fn push(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Drain all events for processing
    pub fn drain(&mut self) -> impl Iterator<Item = GameEvent> + '_ {
        self.events.drain(..)
    }

    /// Check if there are pending events
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
