//! Permission nodes and the registry that tracks which ones are declared.
//!
//! Bundle permissions (`mywarp.limit.<id>`, `mywarp.timer.<id>`,
//! `mywarp.economy.<id>`) come and go with configuration reloads, so they are
//! registered and unregistered explicitly instead of living in a global table.

pub mod groups;

use std::collections::BTreeMap;
use std::sync::RwLock;

use log::debug;

use crate::host::Permissible;

pub use groups::{select_group_resolver, GroupResolver, PermissionGroupResolver, ResolverProbe};

pub const LIMIT_BUNDLE_PREFIX: &str = "mywarp.limit";
pub const LIMIT_DISOBEY_PREFIX: &str = "mywarp.limit.disobey";
pub const TIMER_BUNDLE_PREFIX: &str = "mywarp.timer";
pub const TIMER_DISOBEY: &str = "mywarp.timer.disobey";
pub const TIMER_DISOBEY_MOVE: &str = "mywarp.timer.disobey.move";
pub const TIMER_DISOBEY_DAMAGE: &str = "mywarp.timer.disobey.damage";
pub const ECONOMY_BUNDLE_PREFIX: &str = "mywarp.economy";
pub const ECONOMY_DISOBEY: &str = "mywarp.economy.disobey";
pub const OVERRIDE_USE: &str = "mywarp.override.use";

/// Who holds a node when no permission plugin says otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionDefault {
    True,
    False,
    Op,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionNode {
    pub name: String,
    pub description: String,
    pub default: PermissionDefault,
}

impl PermissionNode {
    pub fn new(name: impl Into<String>, description: impl Into<String>, default: PermissionDefault) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            default,
        }
    }
}

/// Declared permission nodes, shared by every service that owns some.
pub struct PermissionRegistry {
    nodes: RwLock<BTreeMap<String, PermissionNode>>,
}

impl PermissionRegistry {
    pub fn new() -> Self {
        Self {
            nodes: RwLock::new(BTreeMap::new()),
        }
    }

    /// Register a node. Returns false if a node with that name already existed.
    pub fn register(&self, node: PermissionNode) -> bool {
        let mut nodes = self.nodes.write().unwrap_or_else(|e| e.into_inner());
        debug!("Registering permission {}", node.name);
        nodes.insert(node.name.clone(), node).is_none()
    }

    pub fn unregister(&self, name: &str) -> Option<PermissionNode> {
        let mut nodes = self.nodes.write().unwrap_or_else(|e| e.into_inner());
        let removed = nodes.remove(name);
        if removed.is_some() {
            debug!("Unregistered permission {}", name);
        }
        removed
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.nodes
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(name)
    }

    /// All registered nodes, ordered by name.
    pub fn registered(&self) -> Vec<PermissionNode> {
        self.nodes
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .cloned()
            .collect()
    }

    /// Declare the static nodes that do not depend on configuration.
    pub fn register_builtin(&self) {
        for (name, description, default) in [
            (TIMER_DISOBEY, "Skip warmups and cooldowns", PermissionDefault::Op),
            (TIMER_DISOBEY_MOVE, "Move during a warmup", PermissionDefault::Op),
            (TIMER_DISOBEY_DAMAGE, "Take damage during a warmup", PermissionDefault::Op),
            (ECONOMY_DISOBEY, "Use warps without paying fees", PermissionDefault::Op),
            (OVERRIDE_USE, "Use every warp", PermissionDefault::Op),
        ] {
            self.register(PermissionNode::new(name, description, default));
        }
    }
}

/// Node name of a configured bundle, e.g. `mywarp.limit.vip`.
pub fn bundle_permission(prefix: &str, identifier: &str) -> String {
    format!("{}.{}", prefix, identifier)
}

/// The first bundle, in the given order, whose permission the holder has.
pub fn first_permitted<'a, B, H>(
    bundles: &'a [B],
    holder: &H,
    permission: impl Fn(&B) -> String,
) -> Option<&'a B>
where
    H: Permissible + ?Sized,
{
    bundles
        .iter()
        .find(|bundle| holder.has_permission(&permission(bundle)))
}

impl Default for PermissionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
