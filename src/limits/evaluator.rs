use std::sync::Arc;

use log::{debug, info};

use super::{Limit, LimitCapability, LimitType};
use crate::errors::MyWarpError;
use crate::host::{LocalPlayer, WorldId};
use crate::warp::{is_creator, Warp, WarpStore};

/// Outcome of a limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationResult {
    LimitMet,
    Exceeded { limit_type: LimitType, maximum: u32 },
}

impl EvaluationResult {
    pub fn exceeds_limit(&self) -> bool {
        matches!(self, EvaluationResult::Exceeded { .. })
    }

    /// The type whose cap was reached. Only valid for an exceeded result.
    pub fn exceeded_limit(&self) -> Result<LimitType, MyWarpError> {
        match self {
            EvaluationResult::Exceeded { limit_type, .. } => Ok(*limit_type),
            EvaluationResult::LimitMet => Err(MyWarpError::LimitNotExceeded),
        }
    }

    /// The cap that was reached. Only valid for an exceeded result.
    pub fn limit_maximum(&self) -> Result<u32, MyWarpError> {
        match self {
            EvaluationResult::Exceeded { maximum, .. } => Ok(*maximum),
            EvaluationResult::LimitMet => Err(MyWarpError::LimitNotExceeded),
        }
    }
}

/// A player's warps grouped under every bundle that may govern them.
///
/// Bundles with overlapping worlds list the same warp more than once.
#[derive(Debug, Clone, Default)]
pub struct WarpsPerLimitIndex {
    entries: Vec<(Limit, Vec<Warp>)>,
}

impl WarpsPerLimitIndex {
    pub fn get(&self, identifier: &str) -> Option<&[Warp]> {
        self.entries
            .iter()
            .find(|(limit, _)| limit.identifier() == identifier)
            .map(|(_, warps)| warps.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Limit, &[Warp])> {
        self.entries.iter().map(|(limit, warps)| (limit, warps.as_slice()))
    }

    pub fn limits(&self) -> Vec<&Limit> {
        self.entries.iter().map(|(limit, _)| limit).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Decides whether a player may create another warp.
pub struct LimitEvaluator {
    limits: Arc<dyn LimitCapability>,
    warps: Arc<dyn WarpStore>,
}

impl LimitEvaluator {
    pub fn new(limits: Arc<dyn LimitCapability>, warps: Arc<dyn WarpStore>) -> Self {
        Self { limits, warps }
    }

    /// Check whether `player` may create one more warp of `limit_type` in `world`.
    ///
    /// With `evaluate_parents` the parent types are checked after `limit_type`;
    /// the first type whose cap is reached is reported.
    pub fn evaluate_limit(
        &self,
        player: &dyn LocalPlayer,
        world: &WorldId,
        limit_type: LimitType,
        evaluate_parents: bool,
    ) -> EvaluationResult {
        if limit_type.can_disobey(player, world) {
            debug!("{} may disobey the {} limit in {}", player.name(), limit_type, world);
            return EvaluationResult::LimitMet;
        }

        let owned = self.warps.filter(&is_creator(player.uuid()));
        let limit = self.limits.limit(player, world);

        let mut to_check = vec![limit_type];
        if evaluate_parents {
            to_check.extend(limit_type.parents());
        }

        for checked in to_check {
            let maximum = limit.limit(checked);
            let count = owned.iter().filter(|warp| checked.matches(warp)).count();
            if count >= maximum as usize {
                info!(
                    "{} reached the {} limit of bundle '{}' ({} of {})",
                    player.name(),
                    checked,
                    limit.identifier(),
                    count,
                    maximum
                );
                return EvaluationResult::Exceeded {
                    limit_type: checked,
                    maximum,
                };
            }
        }
        EvaluationResult::LimitMet
    }

    /// Group the warps `player` owns under each of their effective bundles.
    pub fn warps_per_limit(&self, player: &dyn LocalPlayer) -> WarpsPerLimitIndex {
        let owned = self.warps.filter(&is_creator(player.uuid()));
        let entries = self
            .limits
            .effective_limits(player)
            .into_iter()
            .map(|limit| {
                let warps = owned
                    .iter()
                    .filter(|warp| limit.applies_to(&warp.world))
                    .cloned()
                    .collect();
                (limit, warps)
            })
            .collect();
        WarpsPerLimitIndex { entries }
    }
}
