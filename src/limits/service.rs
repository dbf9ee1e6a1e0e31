use std::collections::BTreeSet;
use std::sync::Arc;

use log::{debug, warn};

use super::{Limit, LimitSettings};
use crate::host::{Game, LocalPlayer, WorldId};
use crate::permissions::{PermissionDefault, PermissionNode, PermissionRegistry};

/// Resolves which limit bundles apply to a player.
pub trait LimitCapability: Send + Sync {
    /// The single bundle that governs `player` in `world`.
    fn limit(&self, player: &dyn LocalPlayer, world: &WorldId) -> Limit;

    /// Every bundle that applies to `player` in at least one world, in precedence order.
    fn effective_limits(&self, player: &dyn LocalPlayer) -> Vec<Limit>;
}

/// Worlds already governed by a higher-precedence bundle.
#[derive(Default)]
struct Coverage {
    everything: bool,
    worlds: BTreeSet<WorldId>,
}

impl Coverage {
    fn covers(&self, limit: &Limit, loaded: &[WorldId]) -> bool {
        if self.everything {
            return true;
        }
        match limit.configured_worlds() {
            Some(worlds) => worlds.is_subset(&self.worlds),
            None => !loaded.is_empty() && loaded.iter().all(|w| self.worlds.contains(w)),
        }
    }

    fn add(&mut self, limit: &Limit) {
        match limit.configured_worlds() {
            Some(worlds) => self.worlds.extend(worlds.iter().cloned()),
            None => self.everything = true,
        }
    }
}

/// Limit bundles from configuration, gated by permissions.
pub struct SimpleLimitService {
    settings: LimitSettings,
    game: Arc<dyn Game>,
}

impl SimpleLimitService {
    pub fn new(settings: LimitSettings, game: Arc<dyn Game>) -> Self {
        let loaded = game.worlds();
        for bundle in &settings.bundles {
            if let Some(worlds) = bundle.configured_worlds() {
                for world in worlds.iter().filter(|w| !loaded.contains(w)) {
                    warn!(
                        "Limit bundle '{}' names world '{}' which is not loaded",
                        bundle.identifier(),
                        world
                    );
                }
            }
        }
        Self { settings, game }
    }

    pub fn settings(&self) -> &LimitSettings {
        &self.settings
    }

    pub fn register_permissions(&self, permissions: &PermissionRegistry) {
        for bundle in &self.settings.bundles {
            permissions.register(PermissionNode::new(
                bundle.base_permission(),
                format!("Use the '{}' warp limits", bundle.identifier()),
                PermissionDefault::False,
            ));
        }
    }

    pub fn unregister_permissions(&self, permissions: &PermissionRegistry) {
        for bundle in &self.settings.bundles {
            permissions.unregister(&bundle.base_permission());
        }
    }
}

impl LimitCapability for SimpleLimitService {
    fn limit(&self, player: &dyn LocalPlayer, world: &WorldId) -> Limit {
        let limit = self
            .settings
            .bundles
            .iter()
            .find(|bundle| bundle.applies_to(world) && player.has_permission(&bundle.base_permission()))
            .unwrap_or(&self.settings.default);
        debug!("Limit '{}' applies to {} in {}", limit.identifier(), player.name(), world);
        limit.clone()
    }

    fn effective_limits(&self, player: &dyn LocalPlayer) -> Vec<Limit> {
        let loaded = self.game.worlds();
        let mut coverage = Coverage::default();
        let mut effective = Vec::with_capacity(self.settings.bundles.len() + 1);

        for bundle in &self.settings.bundles {
            if !player.has_permission(&bundle.base_permission()) || coverage.covers(bundle, &loaded) {
                continue;
            }
            coverage.add(bundle);
            effective.push(bundle.clone());
        }
        if !coverage.covers(&self.settings.default, &loaded) {
            effective.push(self.settings.default.clone());
        }
        effective
    }
}
