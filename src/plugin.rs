//! The assembled warp core a host plugin talks to.

use std::sync::Arc;

use log::{debug, info};
use uuid::Uuid;

use crate::config::{Config, Settings};
use crate::economy::{EconomyService, FeeType, Ledger};
use crate::errors::MyWarpError;
use crate::host::{CommandSender, Game, LocalPlayer, WorldId};
use crate::limits::{EvaluationResult, Limit, LimitCapability, LimitEvaluator, LimitType, SimpleLimitService, WarpsPerLimitIndex};
use crate::messages::{self, Message};
use crate::permissions::{select_group_resolver, GroupResolver, PermissionRegistry, ResolverProbe};
use crate::teleport::{
    BlockCenterCorrection, HandlerTeleportService, SafetySearch, TeleportPipeline, TeleportService, TeleportStatus,
    WorldSafety,
};
use crate::timer::{TickTimerRegistry, TimerRegistry, TimerService};
use crate::warp::{WarpStore, WarpType};

/// Capabilities supplied by the hosting server.
pub struct HostServices {
    pub game: Arc<dyn Game>,
    pub warps: Arc<dyn WarpStore>,
    pub ledger: Arc<dyn Ledger>,
    pub safety: Arc<dyn WorldSafety>,
    pub permissions: Arc<PermissionRegistry>,
    /// Group plugins to try, in order, before falling back to permission groups.
    pub resolver_probes: Vec<ResolverProbe>,
}

/// Services built from one validated configuration. Replaced as a whole on reload.
struct Loaded {
    settings: Settings,
    limits: Arc<SimpleLimitService>,
    timers: Arc<TimerService>,
    economy: Arc<EconomyService>,
    evaluator: LimitEvaluator,
    teleport: Arc<dyn TeleportService>,
}

impl Loaded {
    fn register_permissions(&self, permissions: &PermissionRegistry) {
        self.limits.register_permissions(permissions);
        self.timers.register_permissions(permissions);
        self.economy.register_permissions(permissions);
    }

    fn unregister_permissions(&self, permissions: &PermissionRegistry) {
        self.limits.unregister_permissions(permissions);
        self.timers.unregister_permissions(permissions);
        self.economy.unregister_permissions(permissions);
    }
}

pub struct MyWarp {
    game: Arc<dyn Game>,
    warps: Arc<dyn WarpStore>,
    ledger: Arc<dyn Ledger>,
    safety: Arc<dyn WorldSafety>,
    permissions: Arc<PermissionRegistry>,
    groups: Box<dyn GroupResolver>,
    registry: Arc<TickTimerRegistry<Uuid>>,
    loaded: Loaded,
}

impl MyWarp {
    pub fn new(config: &Config, host: HostServices) -> Result<Self, MyWarpError> {
        let settings = config.validate()?;
        let registry = Arc::new(TickTimerRegistry::new());
        let groups = select_group_resolver(&host.resolver_probes);

        host.permissions.register_builtin();
        let loaded = Self::build(&host.game, &host.warps, &host.ledger, &host.safety, &registry, settings);
        loaded.register_permissions(&host.permissions);
        info!(
            "MyWarp ready: {} limit, {} timer, {} fee bundles",
            loaded.settings.limits.bundles.len(),
            loaded.settings.timers.bundles.len(),
            loaded.settings.fees.bundles.len()
        );

        Ok(Self {
            game: host.game,
            warps: host.warps,
            ledger: host.ledger,
            safety: host.safety,
            permissions: host.permissions,
            groups,
            registry,
            loaded,
        })
    }

    fn build(
        game: &Arc<dyn Game>,
        warps: &Arc<dyn WarpStore>,
        ledger: &Arc<dyn Ledger>,
        safety: &Arc<dyn WorldSafety>,
        registry: &Arc<TickTimerRegistry<Uuid>>,
        settings: Settings,
    ) -> Loaded {
        let limits = Arc::new(SimpleLimitService::new(settings.limits.clone(), Arc::clone(game)));
        let timer_registry: Arc<dyn TimerRegistry<Uuid>> = registry.clone();
        let timers = Arc::new(TimerService::new(settings.timers.clone(), timer_registry));
        let economy = Arc::new(EconomyService::new(settings.fees.clone(), Arc::clone(ledger)));

        let mut handler = HandlerTeleportService::new(Arc::clone(warps));
        if settings.teleport.correct_legacy_positions {
            handler = handler.with_validation(BlockCenterCorrection);
        }
        if settings.teleport.safety_search {
            handler = handler.with_validation(SafetySearch::new(
                Arc::clone(safety),
                settings.teleport.safety_search_radius,
            ));
        }

        let mut pipeline = TeleportPipeline::new(Arc::new(handler));
        if settings.timers.enabled {
            pipeline = pipeline.with_timers(timers.clone(), Arc::clone(game));
        }
        if settings.fees.enabled {
            pipeline = pipeline.with_economy(economy.clone(), FeeType::Warp);
        }

        let evaluator = LimitEvaluator::new(limits.clone(), Arc::clone(warps));
        Loaded {
            settings,
            limits,
            timers,
            economy,
            evaluator,
            teleport: pipeline.build(),
        }
    }

    /// Swap in a new configuration. On a validation error the running
    /// configuration stays untouched.
    pub fn reload(&mut self, config: &Config) -> Result<(), MyWarpError> {
        let settings = config.validate()?;
        self.loaded.unregister_permissions(&self.permissions);
        self.loaded = Self::build(&self.game, &self.warps, &self.ledger, &self.safety, &self.registry, settings);
        self.loaded.register_permissions(&self.permissions);
        info!("Configuration reloaded");
        Ok(())
    }

    /// Advance running warmups and cooldowns by one game tick.
    pub fn tick(&self) {
        self.registry.tick();
    }

    pub fn settings(&self) -> &Settings {
        &self.loaded.settings
    }

    pub fn permissions(&self) -> &PermissionRegistry {
        &self.permissions
    }

    pub fn timers(&self) -> &TickTimerRegistry<Uuid> {
        &self.registry
    }

    pub fn warps(&self) -> &Arc<dyn WarpStore> {
        &self.warps
    }

    /// Teleport `player` to the named warp through the configured pipeline.
    pub fn warp_to(&self, player: &dyn LocalPlayer, name: &str) -> TeleportStatus {
        let Some(warp) = self.warps.get(name) else {
            player.send_message(Message::error(messages::WARP_NOT_FOUND).arg(name));
            return TeleportStatus::None;
        };
        if !warp.is_usable_by(player, self.groups.as_ref()) {
            debug!("{} may not use warp '{}'", player.name(), warp.name);
            player.send_message(Message::error(messages::WARP_NOT_USABLE).arg(&warp.name));
            return TeleportStatus::None;
        }
        self.loaded.teleport.teleport(player.as_entity(), &warp)
    }

    /// Whether the sender may create another warp of `warp_type` in `world`.
    ///
    /// Fails with `NotAPlayer` for the console. An exceeded limit is reported
    /// to the player and returned, not raised.
    pub fn check_create(
        &self,
        sender: &CommandSender<'_>,
        world: &WorldId,
        warp_type: WarpType,
    ) -> Result<EvaluationResult, MyWarpError> {
        let player = sender.player()?;
        if !self.loaded.settings.limits.enabled {
            return Ok(EvaluationResult::LimitMet);
        }

        let limit_type = match warp_type {
            WarpType::Private => LimitType::Private,
            WarpType::Public => LimitType::Public,
        };
        let result = self.loaded.evaluator.evaluate_limit(player, world, limit_type, true);
        if let EvaluationResult::Exceeded { limit_type, maximum } = result {
            player.send_message(
                Message::error(messages::LIMIT_EXCEEDED)
                    .arg(limit_type)
                    .arg(maximum)
                    .arg(world),
            );
        }
        Ok(result)
    }

    /// The bundle that governs `player` in `world`.
    pub fn limit(&self, player: &dyn LocalPlayer, world: &WorldId) -> Limit {
        self.loaded.limits.limit(player, world)
    }

    pub fn effective_limits(&self, player: &dyn LocalPlayer) -> Vec<Limit> {
        self.loaded.limits.effective_limits(player)
    }

    pub fn warps_per_limit(&self, player: &dyn LocalPlayer) -> WarpsPerLimitIndex {
        self.loaded.evaluator.warps_per_limit(player)
    }
}
