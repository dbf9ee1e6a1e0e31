//! Warmup and cooldown gating in front of a teleport.
//!
//! A request first waits out a warmup, which is aborted when the player moves
//! away or takes damage. A teleport that actually moved the player starts a
//! cooldown. Both timers live in the host's timer registry keyed by the
//! player's UUID; the registry never holds two timers of one kind for the
//! same player.

use std::sync::Arc;

use log::{debug, info, warn};
use uuid::Uuid;

use super::{TeleportService, TeleportStatus};
use crate::host::{Game, LocalEntity, LocalPlayer, Position, WorldId};
use crate::messages::{self, Message};
use crate::permissions::{TIMER_DISOBEY_DAMAGE, TIMER_DISOBEY_MOVE};
use crate::timer::{AbortableTimerAction, Scheduled, TimerAction, TimerCapability, TimerKind};
use crate::warp::Warp;

pub struct TimerTeleportService {
    inner: Arc<dyn TeleportService>,
    timers: Arc<dyn TimerCapability>,
    game: Arc<dyn Game>,
}

impl TimerTeleportService {
    pub fn new(inner: Arc<dyn TeleportService>, timers: Arc<dyn TimerCapability>, game: Arc<dyn Game>) -> Self {
        Self { inner, timers, game }
    }
}

impl TeleportService for TimerTeleportService {
    fn teleport(&self, entity: &dyn LocalEntity, warp: &Warp) -> TeleportStatus {
        let Some(player) = entity.as_player() else {
            return self.inner.teleport(entity, warp);
        };
        if self.timers.can_disobey(player) {
            return self.inner.teleport(entity, warp);
        }

        let subject = player.uuid();
        if let Some(remaining) = self.timers.remaining(&subject, TimerKind::Cooldown) {
            player.send_message(
                Message::error(messages::COOLDOWN_RUNNING)
                    .arg(&warp.name)
                    .arg(remaining),
            );
            return TeleportStatus::None;
        }
        if let Some(remaining) = self.timers.remaining(&subject, TimerKind::Warmup) {
            player.send_message(
                Message::error(messages::WARMUP_RUNNING)
                    .arg(&warp.name)
                    .arg(remaining),
            );
            return TeleportStatus::None;
        }

        let duration = self.timers.duration(player, TimerKind::Warmup);
        let warmup = WarpWarmup {
            subject,
            warp: warp.clone(),
            initial_world: player.world(),
            initial_position: player.position(),
            initial_health: player.health(),
            inner: Arc::clone(&self.inner),
            timers: Arc::clone(&self.timers),
            game: Arc::clone(&self.game),
        };
        match self.timers.start(TimerKind::Warmup, duration, Scheduled::Abortable(Box::new(warmup))) {
            Ok(()) => {
                debug!("Warmup of {} for {} to '{}'", duration, player.name(), warp.name);
                if self.timers.notify_on_warmup_start() {
                    player.send_message(
                        Message::info(messages::WARMUP_STARTED)
                            .arg(&warp.name)
                            .arg(duration),
                    );
                }
            }
            Err(e) => {
                warn!("Could not start warmup for {}: {}", player.name(), e);
                player.send_message(Message::error(messages::WARMUP_RUNNING).arg(&warp.name));
            }
        }
        TeleportStatus::None
    }
}

/// Pending teleport of one player, waiting for its warmup to elapse.
pub struct WarpWarmup {
    subject: Uuid,
    warp: Warp,
    initial_world: WorldId,
    initial_position: Position,
    initial_health: f64,
    inner: Arc<dyn TeleportService>,
    timers: Arc<dyn TimerCapability>,
    game: Arc<dyn Game>,
}

impl WarpWarmup {
    pub fn warp(&self) -> &Warp {
        &self.warp
    }

    fn moved_too_far(&self, player: &dyn LocalPlayer) -> bool {
        player.world() != self.initial_world
            || player.position().distance(&self.initial_position) > self.timers.allowed_distance()
    }
}

impl TimerAction<Uuid> for WarpWarmup {
    fn subject(&self) -> &Uuid {
        &self.subject
    }

    fn run(self: Box<Self>) {
        let Some(player) = self.game.player(&self.subject) else {
            debug!("Dropping warmup to '{}': {} is offline", self.warp.name, self.subject);
            return;
        };

        let status = self.inner.teleport(player.as_entity(), &self.warp);
        if !status.is_position_modified() {
            return;
        }

        let cooldown = self.timers.duration(player.as_ref(), TimerKind::Cooldown);
        let action = WarpCooldown {
            subject: self.subject,
            game: Arc::clone(&self.game),
            notify: self.timers.notify_on_cooldown_finish(),
        };
        if let Err(e) = self.timers.start(TimerKind::Cooldown, cooldown, Scheduled::Plain(Box::new(action))) {
            warn!("Could not start cooldown for {}: {}", player.name(), e);
        }
    }
}

impl AbortableTimerAction<Uuid> for WarpWarmup {
    fn abort(&mut self) -> bool {
        let Some(player) = self.game.player(&self.subject) else {
            return false;
        };

        if self.timers.abort_warmup_on_move()
            && !player.has_permission(TIMER_DISOBEY_MOVE)
            && self.moved_too_far(player.as_ref())
        {
            info!("Warmup of {} to '{}' aborted: moved", player.name(), self.warp.name);
            player.send_message(Message::error(messages::WARMUP_ABORT_MOVE).arg(&self.warp.name));
            return true;
        }

        if self.timers.abort_warmup_on_damage()
            && !player.has_permission(TIMER_DISOBEY_DAMAGE)
            && player.health() < self.initial_health
        {
            info!("Warmup of {} to '{}' aborted: damaged", player.name(), self.warp.name);
            player.send_message(Message::error(messages::WARMUP_ABORT_DAMAGE).arg(&self.warp.name));
            return true;
        }

        false
    }
}

/// Blocks new teleports until it expires.
pub struct WarpCooldown {
    subject: Uuid,
    game: Arc<dyn Game>,
    notify: bool,
}

impl TimerAction<Uuid> for WarpCooldown {
    fn subject(&self) -> &Uuid {
        &self.subject
    }

    fn run(self: Box<Self>) {
        if !self.notify {
            return;
        }
        if let Some(player) = self.game.player(&self.subject) {
            player.send_message(Message::info(messages::COOLDOWN_FINISHED));
        }
    }
}
