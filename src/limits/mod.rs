//! Per-player caps on how many warps can be created.
//!
//! A [`Limit`] bundles one cap per [`LimitType`] with the worlds it applies
//! to. Exactly one bundle is the default and covers every world; every other
//! bundle is granted by its own permission node and bundles with earlier
//! identifiers take precedence.

pub mod evaluator;
pub mod service;

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

pub use evaluator::{EvaluationResult, LimitEvaluator, WarpsPerLimitIndex};
pub use service::{LimitCapability, SimpleLimitService};

use crate::host::{Permissible, WorldId};
use crate::permissions::{bundle_permission, LIMIT_BUNDLE_PREFIX, LIMIT_DISOBEY_PREFIX};
use crate::warp::{Warp, WarpType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LimitType {
    Total,
    Private,
    Public,
}

impl LimitType {
    pub const ALL: [LimitType; 3] = [LimitType::Total, LimitType::Private, LimitType::Public];

    pub fn lower_case_name(&self) -> &'static str {
        match self {
            LimitType::Total => "total",
            LimitType::Private => "private",
            LimitType::Public => "public",
        }
    }

    /// Whether `warp` counts against this type.
    pub fn matches(&self, warp: &Warp) -> bool {
        match self {
            LimitType::Total => true,
            LimitType::Private => warp.is_type(WarpType::Private),
            LimitType::Public => warp.is_type(WarpType::Public),
        }
    }

    pub fn parent(&self) -> Option<LimitType> {
        match self {
            LimitType::Total => None,
            LimitType::Private | LimitType::Public => Some(LimitType::Total),
        }
    }

    /// All ancestors, nearest first.
    pub fn parents(&self) -> Vec<LimitType> {
        let mut parents = Vec::new();
        let mut current = self.parent();
        while let Some(parent) = current {
            parents.push(parent);
            current = parent.parent();
        }
        parents
    }

    /// Permission that lifts this limit in `world`.
    pub fn disobey_permission(&self, world: &WorldId) -> String {
        format!("{}.{}.{}", LIMIT_DISOBEY_PREFIX, world.name(), self.lower_case_name())
    }

    pub fn can_disobey<P>(&self, player: &P, world: &WorldId) -> bool
    where
        P: Permissible + ?Sized,
    {
        player.has_permission(&self.disobey_permission(world))
    }
}

impl fmt::Display for LimitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.lower_case_name())
    }
}

/// One cap per limit type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitCaps {
    pub total: u32,
    pub private: u32,
    pub public: u32,
}

impl LimitCaps {
    pub const fn new(total: u32, private: u32, public: u32) -> Self {
        Self {
            total,
            private,
            public,
        }
    }

    pub fn get(&self, limit_type: LimitType) -> u32 {
        match limit_type {
            LimitType::Total => self.total,
            LimitType::Private => self.private,
            LimitType::Public => self.public,
        }
    }
}

/// A named bundle of caps. Identity and ordering follow the identifier.
#[derive(Debug, Clone, Serialize)]
pub struct Limit {
    identifier: String,
    caps: LimitCaps,
    /// `None` covers every world.
    affected_worlds: Option<BTreeSet<WorldId>>,
}

impl Limit {
    pub fn new(identifier: impl Into<String>, caps: LimitCaps, affected_worlds: Option<BTreeSet<WorldId>>) -> Self {
        Self {
            identifier: identifier.into(),
            caps,
            affected_worlds: affected_worlds.filter(|worlds| !worlds.is_empty()),
        }
    }

    pub fn global(identifier: impl Into<String>, caps: LimitCaps) -> Self {
        Self::new(identifier, caps, None)
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn base_permission(&self) -> String {
        bundle_permission(LIMIT_BUNDLE_PREFIX, &self.identifier)
    }

    pub fn caps(&self) -> LimitCaps {
        self.caps
    }

    pub fn limit(&self, limit_type: LimitType) -> u32 {
        self.caps.get(limit_type)
    }

    pub fn is_global(&self) -> bool {
        self.affected_worlds.is_none()
    }

    pub fn applies_to(&self, world: &WorldId) -> bool {
        self.affected_worlds
            .as_ref()
            .map_or(true, |worlds| worlds.contains(world))
    }

    /// The configured world set, if this bundle is not global.
    pub fn configured_worlds(&self) -> Option<&BTreeSet<WorldId>> {
        self.affected_worlds.as_ref()
    }
}

impl PartialEq for Limit {
    fn eq(&self, other: &Self) -> bool {
        self.identifier == other.identifier
    }
}

impl Eq for Limit {}

impl Hash for Limit {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identifier.hash(state);
    }
}

impl PartialOrd for Limit {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Limit {
    fn cmp(&self, other: &Self) -> Ordering {
        self.identifier.cmp(&other.identifier)
    }
}

/// The validated limit configuration.
#[derive(Debug, Clone)]
pub struct LimitSettings {
    pub enabled: bool,
    pub default: Limit,
    /// Sorted by identifier.
    pub bundles: Vec<Limit>,
}

impl LimitSettings {
    pub fn new(enabled: bool, default_caps: LimitCaps, mut bundles: Vec<Limit>) -> Self {
        bundles.sort();
        Self {
            enabled,
            default: Limit::global("default", default_caps),
            bundles,
        }
    }
}
