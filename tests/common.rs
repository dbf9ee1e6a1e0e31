//! Test utilities & fixtures.
//! In-memory stand-ins for the host capabilities the warp core consumes.
#![allow(dead_code)] // Each integration test binary uses a different subset.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use uuid::Uuid;

use mywarp::economy::Ledger;
use mywarp::host::{Actor, Game, LocalEntity, LocalPlayer, Permissible, Position, Profile, WorldId};
use mywarp::messages::Message;
use mywarp::permissions::PermissionRegistry;
use mywarp::plugin::HostServices;
use mywarp::teleport::{TeleportService, TeleportStatus, WorldSafety};
use mywarp::warp::{MemoryWarpStore, Warp, WarpType};

pub const SPAWN: Position = Position::new(0.5, 64.0, 0.5);

/// A player whose permissions, position and health tests can change at will.
pub struct TestPlayer {
    profile: Profile,
    permissions: Mutex<BTreeSet<String>>,
    world: Mutex<WorldId>,
    position: Mutex<Position>,
    health: Mutex<f64>,
    messages: Mutex<Vec<Message>>,
    teleports: Mutex<Vec<(WorldId, Position)>>,
}

impl TestPlayer {
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            profile: Profile::new(Uuid::new_v4(), name),
            permissions: Mutex::new(BTreeSet::new()),
            world: Mutex::new(WorldId::new("world")),
            position: Mutex::new(SPAWN),
            health: Mutex::new(20.0),
            messages: Mutex::new(Vec::new()),
            teleports: Mutex::new(Vec::new()),
        })
    }

    pub fn with_permissions(name: &str, permissions: &[&str]) -> Arc<Self> {
        let player = Self::new(name);
        for permission in permissions {
            player.grant(permission);
        }
        player
    }

    pub fn grant(&self, permission: &str) {
        self.permissions.lock().unwrap().insert(permission.to_string());
    }

    pub fn set_health(&self, health: f64) {
        *self.health.lock().unwrap() = health;
    }

    /// Walk to `position` without teleporting.
    pub fn walk_to(&self, position: Position) {
        *self.position.lock().unwrap() = position;
    }

    pub fn messages(&self) -> Vec<Message> {
        self.messages.lock().unwrap().clone()
    }

    pub fn message_keys(&self) -> Vec<&'static str> {
        self.messages.lock().unwrap().iter().map(|m| m.key).collect()
    }

    pub fn received(&self, key: &str) -> bool {
        self.message_keys().iter().any(|k| *k == key)
    }

    pub fn teleports(&self) -> Vec<(WorldId, Position)> {
        self.teleports.lock().unwrap().clone()
    }
}

impl Permissible for TestPlayer {
    fn has_permission(&self, node: &str) -> bool {
        self.permissions.lock().unwrap().contains(node)
    }
}

impl Actor for TestPlayer {
    fn name(&self) -> &str {
        &self.profile.name
    }

    fn send_message(&self, message: Message) {
        self.messages.lock().unwrap().push(message);
    }
}

impl LocalEntity for TestPlayer {
    fn world(&self) -> WorldId {
        self.world.lock().unwrap().clone()
    }

    fn position(&self) -> Position {
        *self.position.lock().unwrap()
    }

    fn teleport(&self, world: &WorldId, position: Position) {
        *self.world.lock().unwrap() = world.clone();
        *self.position.lock().unwrap() = position;
        self.teleports.lock().unwrap().push((world.clone(), position));
    }

    fn as_player(&self) -> Option<&dyn LocalPlayer> {
        Some(self)
    }
}

impl LocalPlayer for TestPlayer {
    fn profile(&self) -> &Profile {
        &self.profile
    }

    fn health(&self) -> f64 {
        *self.health.lock().unwrap()
    }

    fn as_entity(&self) -> &dyn LocalEntity {
        self
    }
}

/// A non-player entity, e.g. a boat or a mob.
#[derive(Default)]
pub struct TestEntity {
    pub teleports: Mutex<Vec<(WorldId, Position)>>,
}

impl LocalEntity for TestEntity {
    fn world(&self) -> WorldId {
        WorldId::new("world")
    }

    fn position(&self) -> Position {
        SPAWN
    }

    fn teleport(&self, world: &WorldId, position: Position) {
        self.teleports.lock().unwrap().push((world.clone(), position));
    }
}

/// Loaded worlds plus the players currently online.
pub struct TestGame {
    worlds: Vec<WorldId>,
    online: Mutex<HashMap<Uuid, Arc<TestPlayer>>>,
}

impl TestGame {
    pub fn new(worlds: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            worlds: worlds.iter().map(|w| WorldId::new(*w)).collect(),
            online: Mutex::new(HashMap::new()),
        })
    }

    pub fn join(&self, player: &Arc<TestPlayer>) {
        self.online.lock().unwrap().insert(player.uuid(), Arc::clone(player));
    }

    pub fn leave(&self, player: &TestPlayer) {
        self.online.lock().unwrap().remove(&player.uuid());
    }
}

impl Game for TestGame {
    fn worlds(&self) -> Vec<WorldId> {
        self.worlds.clone()
    }

    fn player(&self, uuid: &Uuid) -> Option<Arc<dyn LocalPlayer>> {
        let player = self.online.lock().unwrap().get(uuid).cloned()?;
        Some(player)
    }
}

/// Balances per player plus a log of every withdrawal.
#[derive(Default)]
pub struct RecordingLedger {
    balances: Mutex<HashMap<Uuid, f64>>,
    withdrawals: Mutex<Vec<(Uuid, f64)>>,
}

impl RecordingLedger {
    pub fn set_balance(&self, player: &TestPlayer, balance: f64) {
        self.balances.lock().unwrap().insert(player.uuid(), balance);
    }

    pub fn balance(&self, player: &TestPlayer) -> f64 {
        self.balances.lock().unwrap().get(&player.uuid()).copied().unwrap_or(0.0)
    }

    pub fn withdrawals(&self) -> Vec<(Uuid, f64)> {
        self.withdrawals.lock().unwrap().clone()
    }
}

impl Ledger for RecordingLedger {
    fn has(&self, player: &dyn LocalPlayer, amount: f64) -> bool {
        self.balances.lock().unwrap().get(&player.uuid()).copied().unwrap_or(0.0) >= amount
    }

    fn withdraw(&self, player: &dyn LocalPlayer, amount: f64) {
        *self.balances.lock().unwrap().entry(player.uuid()).or_insert(0.0) -= amount;
        self.withdrawals.lock().unwrap().push((player.uuid(), amount));
    }
}

/// Every block is safe except the listed ones.
#[derive(Default)]
pub struct TestSafety {
    unsafe_blocks: Mutex<BTreeSet<(i64, i64, i64)>>,
}

impl TestSafety {
    pub fn mark_unsafe(&self, block: (i64, i64, i64)) {
        self.unsafe_blocks.lock().unwrap().insert(block);
    }
}

impl WorldSafety for TestSafety {
    fn is_safe(&self, _world: &WorldId, block: (i64, i64, i64)) -> bool {
        !self.unsafe_blocks.lock().unwrap().contains(&block)
    }
}

/// Innermost stage stand-in that counts calls and moves the entity to the
/// stored position when configured to report a move.
pub struct CountingStage {
    calls: AtomicUsize,
    status: TeleportStatus,
}

impl CountingStage {
    pub fn new(status: TeleportStatus) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            status,
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TeleportService for CountingStage {
    fn teleport(&self, entity: &dyn LocalEntity, warp: &Warp) -> TeleportStatus {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.status.is_position_modified() {
            entity.teleport(&warp.world, warp.position);
        }
        self.status
    }
}

pub fn warp(name: &str, owner: &TestPlayer, world: &str, warp_type: WarpType) -> Warp {
    Warp::builder(name, owner.profile().clone(), WorldId::new(world), Position::new(100.5, 70.0, -20.5))
        .warp_type(warp_type)
        .build()
}

/// Add `count` warps of `warp_type` owned by `owner` in `world`.
pub fn add_warps(store: &MemoryWarpStore, owner: &TestPlayer, world: &str, warp_type: WarpType, count: usize) {
    use mywarp::warp::WarpStore;
    for i in 0..count {
        let name = format!("{}-{}-{:?}-{}", owner.name(), world, warp_type, i);
        assert!(store.add(warp(&name, owner, world, warp_type)));
    }
}

pub struct TestHost {
    pub game: Arc<TestGame>,
    pub warps: Arc<MemoryWarpStore>,
    pub ledger: Arc<RecordingLedger>,
    pub safety: Arc<TestSafety>,
    pub permissions: Arc<PermissionRegistry>,
}

impl TestHost {
    pub fn new(worlds: &[&str]) -> Self {
        Self {
            game: TestGame::new(worlds),
            warps: Arc::new(MemoryWarpStore::new()),
            ledger: Arc::new(RecordingLedger::default()),
            safety: Arc::new(TestSafety::default()),
            permissions: Arc::new(PermissionRegistry::new()),
        }
    }

    pub fn services(&self) -> HostServices {
        HostServices {
            game: self.game.clone(),
            warps: self.warps.clone(),
            ledger: self.ledger.clone(),
            safety: self.safety.clone(),
            permissions: Arc::clone(&self.permissions),
            resolver_probes: Vec::new(),
        }
    }
}
