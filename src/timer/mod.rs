//! Delayed actions keyed by a subject.
//!
//! A running timer is nothing more than an entry in a [`TimerRegistry`]; the
//! host advances the registry from its main loop and every callback runs on
//! that same thread. There is at most one timer per (subject, kind).

pub mod duration;
pub mod registry;
pub mod service;

use std::fmt;

pub use duration::{Duration, TimeUnit, TICKS_PER_SECOND};
pub use registry::TickTimerRegistry;
pub use service::{TimerBundle, TimerCapability, TimerService, TimerSettings};

use crate::errors::MyWarpError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimerKind {
    Warmup,
    Cooldown,
}

impl fmt::Display for TimerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerKind::Warmup => f.write_str("warmup"),
            TimerKind::Cooldown => f.write_str("cooldown"),
        }
    }
}

/// Work that runs once when its timer expires.
pub trait TimerAction<S>: Send {
    fn subject(&self) -> &S;
    fn run(self: Box<Self>);
}

/// A timer action the registry polls every tick; it is dropped without
/// running as soon as `abort` returns true.
pub trait AbortableTimerAction<S>: TimerAction<S> {
    fn abort(&mut self) -> bool;
}

/// An action handed to a registry.
pub enum Scheduled<S> {
    Plain(Box<dyn TimerAction<S>>),
    Abortable(Box<dyn AbortableTimerAction<S>>),
}

impl<S> Scheduled<S> {
    pub fn subject(&self) -> &S {
        match self {
            Scheduled::Plain(action) => action.subject(),
            Scheduled::Abortable(action) => action.subject(),
        }
    }

    /// Poll the abort condition. Plain actions never abort.
    pub fn abort(&mut self) -> bool {
        match self {
            Scheduled::Plain(_) => false,
            Scheduled::Abortable(action) => action.abort(),
        }
    }

    pub fn run(self) {
        match self {
            Scheduled::Plain(action) => action.run(),
            Scheduled::Abortable(action) => action.run(),
        }
    }
}

/// Tracks running timers; implemented by the host scheduler.
pub trait TimerRegistry<S>: Send + Sync {
    /// Start `action` for `duration`. Fails if the subject already runs a timer of `kind`.
    fn start(&self, kind: TimerKind, duration: Duration, action: Scheduled<S>) -> Result<(), MyWarpError>;

    /// Remaining time of the subject's running timer of `kind`, if any.
    fn remaining(&self, subject: &S, kind: TimerKind) -> Option<Duration>;

    fn has(&self, subject: &S, kind: TimerKind) -> bool {
        self.remaining(subject, kind).is_some()
    }
}
