//! Warps: named positions owned by a player.
//!
//! The core reads warps but does not own their lifecycle; creation and
//! deletion go through a [`WarpStore`].

pub mod store;

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use store::{MemoryWarpStore, WarpEvent, WarpField, WarpObserver, WarpStore};

use crate::host::{LocalPlayer, Position, Profile, WorldId};
use crate::permissions::{GroupResolver, OVERRIDE_USE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarpType {
    Private,
    Public,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Warp {
    pub name: String,
    pub creator: Profile,
    pub warp_type: WarpType,
    pub world: WorldId,
    pub position: Position,
    pub created_at: DateTime<Utc>,
    pub visits: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub welcome_message: Option<String>,
    #[serde(default)]
    pub invited_players: BTreeSet<Uuid>,
    #[serde(default)]
    pub invited_groups: BTreeSet<String>,
}

impl Warp {
    pub fn builder(name: impl Into<String>, creator: Profile, world: WorldId, position: Position) -> WarpBuilder {
        WarpBuilder {
            warp: Warp {
                name: name.into(),
                creator,
                warp_type: WarpType::Public,
                world,
                position,
                created_at: Utc::now(),
                visits: 0,
                welcome_message: None,
                invited_players: BTreeSet::new(),
                invited_groups: BTreeSet::new(),
            },
        }
    }

    pub fn is_type(&self, warp_type: WarpType) -> bool {
        self.warp_type == warp_type
    }

    pub fn is_creator(&self, uuid: &Uuid) -> bool {
        self.creator.uuid == *uuid
    }

    pub fn is_player_invited(&self, uuid: &Uuid) -> bool {
        self.invited_players.contains(uuid)
    }

    pub fn is_group_invited(&self, group: &str) -> bool {
        self.invited_groups.contains(&group.to_ascii_lowercase())
    }

    /// Whether `player` may teleport to this warp.
    pub fn is_usable_by(&self, player: &dyn LocalPlayer, groups: &dyn GroupResolver) -> bool {
        if self.warp_type == WarpType::Public || player.has_permission(OVERRIDE_USE) {
            return true;
        }
        let uuid = player.uuid();
        self.is_creator(&uuid)
            || self.is_player_invited(&uuid)
            || self
                .invited_groups
                .iter()
                .any(|group| groups.has_group(player, group))
    }

    /// The welcome message with `%player%` and `%warp%` substituted.
    pub fn parsed_welcome_message(&self, player_name: &str) -> Option<String> {
        self.welcome_message
            .as_ref()
            .filter(|m| !m.trim().is_empty())
            .map(|m| m.replace("%player%", player_name).replace("%warp%", &self.name))
    }
}

/// Predicate matching warps created by the given player.
pub fn is_creator(uuid: Uuid) -> impl Fn(&Warp) -> bool {
    move |warp| warp.is_creator(&uuid)
}

pub struct WarpBuilder {
    warp: Warp,
}

impl WarpBuilder {
    pub fn warp_type(mut self, warp_type: WarpType) -> Self {
        self.warp.warp_type = warp_type;
        self
    }

    pub fn welcome_message(mut self, message: impl Into<String>) -> Self {
        self.warp.welcome_message = Some(message.into());
        self
    }

    pub fn invite_player(mut self, uuid: Uuid) -> Self {
        self.warp.invited_players.insert(uuid);
        self
    }

    pub fn invite_group(mut self, group: &str) -> Self {
        self.warp.invited_groups.insert(group.to_ascii_lowercase());
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.warp.created_at = created_at;
        self
    }

    pub fn build(self) -> Warp {
        self.warp
    }
}
