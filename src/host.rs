//! Capabilities the game server host provides to the warp core.
//!
//! The core never talks to a concrete server implementation. Players, worlds
//! and the game itself are reached through these traits so the same logic runs
//! inside a server plugin and inside the test suite.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::MyWarpError;
use crate::messages::Message;

/// Name of a loaded world.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorldId(String);

impl WorldId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WorldId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// A position inside a world, in block units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn distance(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Integer coordinates of the block containing this position.
    pub fn block(&self) -> (i64, i64, i64) {
        (
            self.x.floor() as i64,
            self.y.floor() as i64,
            self.z.floor() as i64,
        )
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}, {:.1}, {:.1}", self.x, self.y, self.z)
    }
}

/// A player's stable identity plus the last known name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Profile {
    pub uuid: Uuid,
    pub name: String,
}

impl Profile {
    pub fn new(uuid: Uuid, name: impl Into<String>) -> Self {
        Self {
            uuid,
            name: name.into(),
        }
    }
}

/// Anything that can hold permission nodes.
pub trait Permissible {
    fn has_permission(&self, node: &str) -> bool;
}

/// Something that can receive user-facing messages.
pub trait Actor: Permissible {
    fn name(&self) -> &str;
    fn send_message(&self, message: Message);
}

/// An entity that exists in a world and can be moved.
pub trait LocalEntity {
    fn world(&self) -> WorldId;
    fn position(&self) -> Position;
    fn teleport(&self, world: &WorldId, position: Position);

    /// The player behind this entity, if it is one.
    fn as_player(&self) -> Option<&dyn LocalPlayer> {
        None
    }
}

/// An online player.
pub trait LocalPlayer: Actor + LocalEntity + Send + Sync {
    fn profile(&self) -> &Profile;
    fn health(&self) -> f64;

    /// This player as a movable entity.
    fn as_entity(&self) -> &dyn LocalEntity;

    fn uuid(&self) -> Uuid {
        self.profile().uuid
    }
}

/// The running game: loaded worlds and online players.
pub trait Game: Send + Sync {
    fn worlds(&self) -> Vec<WorldId>;
    fn player(&self, uuid: &Uuid) -> Option<Arc<dyn LocalPlayer>>;
}

/// Whoever issued a command.
pub enum CommandSender<'a> {
    Player(&'a dyn LocalPlayer),
    Console,
}

impl<'a> CommandSender<'a> {
    /// The sending player, or `NotAPlayer` for the console.
    pub fn player(&self) -> Result<&'a dyn LocalPlayer, MyWarpError> {
        match self {
            CommandSender::Player(player) => Ok(*player),
            CommandSender::Console => Err(MyWarpError::NotAPlayer("console".to_string())),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            CommandSender::Player(player) => player.name(),
            CommandSender::Console => "console",
        }
    }
}
