use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard};

use log::debug;

use super::{Duration, Scheduled, TimerKind, TimerRegistry};
use crate::errors::MyWarpError;

struct RunningTimer<S> {
    remaining_ticks: u64,
    action: Scheduled<S>,
}

/// A timer registry advanced one game tick at a time.
///
/// Every [`tick`](TickTimerRegistry::tick) polls the abort condition of each
/// abortable timer, counts the survivors down and runs the ones that expire.
/// Expired actions run after the registry lock is released, so they may start
/// new timers (a warmup starting its cooldown).
pub struct TickTimerRegistry<S> {
    timers: Mutex<HashMap<(S, TimerKind), RunningTimer<S>>>,
}

impl<S> TickTimerRegistry<S>
where
    S: Eq + Hash + Clone + Debug + Send,
{
    pub fn new() -> Self {
        Self {
            timers: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<(S, TimerKind), RunningTimer<S>>> {
        self.timers.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Advance every running timer by one tick.
    pub fn tick(&self) {
        let mut expired = Vec::new();
        {
            let mut timers = self.lock();
            timers.retain(|(subject, kind), timer| {
                if timer.action.abort() {
                    debug!("Aborted {} timer for {:?}", kind, subject);
                    return false;
                }
                timer.remaining_ticks = timer.remaining_ticks.saturating_sub(1);
                true
            });
            let due: Vec<(S, TimerKind)> = timers
                .iter()
                .filter(|(_, timer)| timer.remaining_ticks == 0)
                .map(|(key, _)| key.clone())
                .collect();
            for key in due {
                if let Some(timer) = timers.remove(&key) {
                    expired.push((key, timer.action));
                }
            }
        }

        for ((subject, kind), action) in expired {
            debug!("Running expired {} timer for {:?}", kind, subject);
            action.run();
        }
    }

    /// Advance `ticks` ticks.
    pub fn advance(&self, ticks: u64) {
        for _ in 0..ticks {
            self.tick();
        }
    }

    /// Drop a running timer without running it.
    pub fn cancel(&self, subject: &S, kind: TimerKind) -> bool {
        self.lock().remove(&(subject.clone(), kind)).is_some()
    }

    pub fn running(&self) -> usize {
        self.lock().len()
    }
}

impl<S> Default for TickTimerRegistry<S>
where
    S: Eq + Hash + Clone + Debug + Send,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> TimerRegistry<S> for TickTimerRegistry<S>
where
    S: Eq + Hash + Clone + Debug + Send,
{
    fn start(&self, kind: TimerKind, duration: Duration, action: Scheduled<S>) -> Result<(), MyWarpError> {
        let key = (action.subject().clone(), kind);
        let mut timers = self.lock();
        if timers.contains_key(&key) {
            return Err(MyWarpError::TimerAlreadyRunning {
                subject: format!("{:?}", key.0),
                kind,
            });
        }
        debug!("Starting {} timer for {:?} ({} ticks)", kind, key.0, duration.ticks());
        timers.insert(
            key,
            RunningTimer {
                remaining_ticks: duration.ticks(),
                action,
            },
        );
        Ok(())
    }

    fn remaining(&self, subject: &S, kind: TimerKind) -> Option<Duration> {
        self.lock()
            .get(&(subject.clone(), kind))
            .map(|timer| Duration::from_ticks(timer.remaining_ticks))
    }
}
