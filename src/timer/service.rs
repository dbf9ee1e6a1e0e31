use std::sync::Arc;

use log::debug;
use uuid::Uuid;

use super::{Duration, Scheduled, TimeUnit, TimerKind, TimerRegistry};
use crate::errors::MyWarpError;
use crate::host::LocalPlayer;
use crate::permissions::{
    bundle_permission, first_permitted, PermissionDefault, PermissionNode, PermissionRegistry,
    TIMER_BUNDLE_PREFIX, TIMER_DISOBEY,
};

/// Warmup and cooldown lengths granted by one permission.
#[derive(Debug, Clone, PartialEq)]
pub struct TimerBundle {
    pub identifier: String,
    pub warmup: Duration,
    pub cooldown: Duration,
}

impl TimerBundle {
    pub fn new(identifier: impl Into<String>, warmup: Duration, cooldown: Duration) -> Self {
        Self {
            identifier: identifier.into(),
            warmup,
            cooldown,
        }
    }

    pub fn permission(&self) -> String {
        bundle_permission(TIMER_BUNDLE_PREFIX, &self.identifier)
    }

    pub fn duration(&self, kind: TimerKind) -> Duration {
        match kind {
            TimerKind::Warmup => self.warmup,
            TimerKind::Cooldown => self.cooldown,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TimerSettings {
    pub enabled: bool,
    pub default: TimerBundle,
    /// Ordered by identifier.
    pub bundles: Vec<TimerBundle>,
    pub abort_on_move: bool,
    pub abort_on_damage: bool,
    /// Blocks a player may move during a warmup before it aborts.
    pub allowed_distance: f64,
    pub notify_on_warmup_start: bool,
    pub notify_on_cooldown_finish: bool,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            default: TimerBundle::new(
                "default",
                Duration::of(5, TimeUnit::Seconds),
                Duration::of(30, TimeUnit::Seconds),
            ),
            bundles: Vec::new(),
            abort_on_move: true,
            abort_on_damage: true,
            allowed_distance: 2.0,
            notify_on_warmup_start: true,
            notify_on_cooldown_finish: true,
        }
    }
}

/// Scheduling primitives and timer policy as seen by the teleport pipeline.
pub trait TimerCapability: Send + Sync {
    fn duration(&self, player: &dyn LocalPlayer, kind: TimerKind) -> Duration;
    fn start(&self, kind: TimerKind, duration: Duration, action: Scheduled<Uuid>) -> Result<(), MyWarpError>;
    fn remaining(&self, subject: &Uuid, kind: TimerKind) -> Option<Duration>;

    fn has(&self, subject: &Uuid, kind: TimerKind) -> bool {
        self.remaining(subject, kind).is_some()
    }

    fn can_disobey(&self, player: &dyn LocalPlayer) -> bool;
    fn notify_on_warmup_start(&self) -> bool;
    fn notify_on_cooldown_finish(&self) -> bool;
    fn abort_warmup_on_damage(&self) -> bool;
    fn abort_warmup_on_move(&self) -> bool;
    fn allowed_distance(&self) -> f64;
}

/// Timer policy from configuration on top of a host registry.
pub struct TimerService {
    settings: TimerSettings,
    registry: Arc<dyn TimerRegistry<Uuid>>,
}

impl TimerService {
    pub fn new(settings: TimerSettings, registry: Arc<dyn TimerRegistry<Uuid>>) -> Self {
        Self { settings, registry }
    }

    pub fn settings(&self) -> &TimerSettings {
        &self.settings
    }

    /// The bundle that applies to `player`: the first permitted configured one, else the default.
    pub fn bundle(&self, player: &dyn LocalPlayer) -> &TimerBundle {
        first_permitted(&self.settings.bundles, player, TimerBundle::permission)
            .unwrap_or(&self.settings.default)
    }

    pub fn register_permissions(&self, permissions: &PermissionRegistry) {
        for bundle in &self.settings.bundles {
            permissions.register(PermissionNode::new(
                bundle.permission(),
                format!("Use the '{}' warmup and cooldown", bundle.identifier),
                PermissionDefault::False,
            ));
        }
    }

    pub fn unregister_permissions(&self, permissions: &PermissionRegistry) {
        for bundle in &self.settings.bundles {
            permissions.unregister(&bundle.permission());
        }
    }
}

impl TimerCapability for TimerService {
    fn duration(&self, player: &dyn LocalPlayer, kind: TimerKind) -> Duration {
        let bundle = self.bundle(player);
        debug!("{} {} for {} from bundle '{}'", kind, bundle.duration(kind), player.name(), bundle.identifier);
        bundle.duration(kind)
    }

    fn start(&self, kind: TimerKind, duration: Duration, action: Scheduled<Uuid>) -> Result<(), MyWarpError> {
        self.registry.start(kind, duration, action)
    }

    fn remaining(&self, subject: &Uuid, kind: TimerKind) -> Option<Duration> {
        self.registry.remaining(subject, kind)
    }

    fn can_disobey(&self, player: &dyn LocalPlayer) -> bool {
        player.has_permission(TIMER_DISOBEY)
    }

    fn notify_on_warmup_start(&self) -> bool {
        self.settings.notify_on_warmup_start
    }

    fn notify_on_cooldown_finish(&self) -> bool {
        self.settings.notify_on_cooldown_finish
    }

    fn abort_warmup_on_damage(&self) -> bool {
        self.settings.abort_on_damage
    }

    fn abort_warmup_on_move(&self) -> bool {
        self.settings.abort_on_move
    }

    fn allowed_distance(&self) -> f64 {
        self.settings.allowed_distance
    }
}
