use std::sync::Arc;

use mywarp::host::{LocalEntity, LocalPlayer, Position};
use mywarp::messages;
use mywarp::teleport::{TeleportService, TeleportStatus, TimerTeleportService};
use mywarp::timer::{Duration, TickTimerRegistry, TimeUnit, TimerBundle, TimerKind, TimerRegistry, TimerService, TimerSettings};
use mywarp::warp::{Warp, WarpType};

mod common;
use common::{warp, CountingStage, TestGame, TestPlayer, SPAWN};

const WARMUP_TICKS: u64 = 100;
const COOLDOWN_TICKS: u64 = 200;

struct Fixture {
    game: Arc<TestGame>,
    registry: Arc<TickTimerRegistry<uuid::Uuid>>,
    inner: Arc<CountingStage>,
    service: TimerTeleportService,
    player: Arc<TestPlayer>,
    warp: Warp,
}

fn fixture_with(settings: TimerSettings, inner_status: TeleportStatus) -> Fixture {
    let game = TestGame::new(&["world"]);
    let registry = Arc::new(TickTimerRegistry::<uuid::Uuid>::new());
    let timer_registry: Arc<dyn TimerRegistry<uuid::Uuid>> = registry.clone();
    let timers = Arc::new(TimerService::new(settings, timer_registry));
    let inner = CountingStage::new(inner_status);
    let service = TimerTeleportService::new(inner.clone(), timers, game.clone());

    let player = TestPlayer::new("alice");
    game.join(&player);
    let warp = warp("home", &player, "world", WarpType::Public);
    Fixture {
        game,
        registry,
        inner,
        service,
        player,
        warp,
    }
}

fn settings() -> TimerSettings {
    TimerSettings {
        default: TimerBundle::new(
            "default",
            Duration::of(5, TimeUnit::Seconds),
            Duration::of(10, TimeUnit::Seconds),
        ),
        ..TimerSettings::default()
    }
}

fn fixture() -> Fixture {
    fixture_with(settings(), TeleportStatus::Original)
}

impl Fixture {
    fn request(&self) -> TeleportStatus {
        self.service.teleport(self.player.as_entity(), &self.warp)
    }

    fn has(&self, kind: TimerKind) -> bool {
        self.registry.has(&self.player.uuid(), kind)
    }
}

#[test]
fn request_starts_warmup_without_teleporting() {
    let f = fixture();

    assert_eq!(f.request(), TeleportStatus::None);
    assert_eq!(f.inner.calls(), 0);
    assert!(f.has(TimerKind::Warmup));
    assert!(f.player.received(messages::WARMUP_STARTED));
}

#[test]
fn warmup_expiry_teleports_and_starts_cooldown() {
    let f = fixture();
    f.request();

    f.registry.advance(WARMUP_TICKS - 1);
    assert_eq!(f.inner.calls(), 0);

    f.registry.tick();
    assert_eq!(f.inner.calls(), 1);
    assert!(!f.has(TimerKind::Warmup));
    assert!(f.has(TimerKind::Cooldown));
    assert_eq!(f.player.position(), f.warp.position);
}

#[test]
fn second_request_during_warmup_is_refused() {
    let f = fixture();
    f.request();
    f.registry.advance(10);

    assert_eq!(f.request(), TeleportStatus::None);
    assert!(f.player.received(messages::WARMUP_RUNNING));
    assert_eq!(f.registry.running(), 1);

    // The original warmup keeps its schedule
    f.registry.advance(WARMUP_TICKS - 10);
    assert_eq!(f.inner.calls(), 1);
}

#[test]
fn request_during_cooldown_reports_remaining_time() {
    let f = fixture();
    f.request();
    f.registry.advance(WARMUP_TICKS);
    f.registry.advance(40);

    assert_eq!(f.request(), TeleportStatus::None);
    let message = f.player.messages().pop().unwrap();
    assert_eq!(message.key, messages::COOLDOWN_RUNNING);
    assert_eq!(message.args, vec!["home".to_string(), Duration::from_ticks(COOLDOWN_TICKS - 40).to_string()]);
    assert!(!f.has(TimerKind::Warmup));
}

#[test]
fn cooldown_expiry_notifies_and_frees_the_player() {
    let f = fixture();
    f.request();
    f.registry.advance(WARMUP_TICKS + COOLDOWN_TICKS);

    assert!(!f.has(TimerKind::Cooldown));
    assert!(f.player.received(messages::COOLDOWN_FINISHED));
    assert_eq!(f.request(), TeleportStatus::None);
    assert!(f.has(TimerKind::Warmup));
}

#[test]
fn warmup_and_cooldown_never_overlap() {
    let f = fixture();
    f.request();
    for _ in 0..(WARMUP_TICKS + COOLDOWN_TICKS) {
        assert!(!(f.has(TimerKind::Warmup) && f.has(TimerKind::Cooldown)));
        f.registry.tick();
    }
}

#[test]
fn offline_player_is_not_teleported() {
    let f = fixture();
    f.request();
    f.game.leave(&f.player);

    f.registry.advance(WARMUP_TICKS);
    assert_eq!(f.inner.calls(), 0);
    assert!(!f.has(TimerKind::Cooldown));
    assert_eq!(f.registry.running(), 0);
}

#[test]
fn moving_away_aborts_warmup() {
    let f = fixture();
    f.request();
    f.registry.advance(3);
    f.player.walk_to(Position::new(SPAWN.x + 3.0, SPAWN.y, SPAWN.z));

    f.registry.tick();
    assert!(!f.has(TimerKind::Warmup));
    assert!(f.player.received(messages::WARMUP_ABORT_MOVE));
    f.registry.advance(WARMUP_TICKS);
    assert_eq!(f.inner.calls(), 0);
}

#[test]
fn small_movement_is_tolerated() {
    let f = fixture();
    f.request();
    f.player.walk_to(Position::new(SPAWN.x + 1.5, SPAWN.y, SPAWN.z));

    f.registry.advance(WARMUP_TICKS);
    assert_eq!(f.inner.calls(), 1);
}

#[test]
fn damage_aborts_warmup() {
    let f = fixture();
    f.request();
    f.player.set_health(15.0);

    f.registry.tick();
    assert!(!f.has(TimerKind::Warmup));
    assert!(f.player.received(messages::WARMUP_ABORT_DAMAGE));
    assert_eq!(f.inner.calls(), 0);
}

#[test]
fn disobey_permissions_keep_warmup_running() {
    let f = fixture();
    f.player.grant("mywarp.timer.disobey.damage");
    f.player.grant("mywarp.timer.disobey.move");
    f.request();
    f.player.set_health(5.0);
    f.player.walk_to(Position::new(SPAWN.x + 30.0, SPAWN.y, SPAWN.z));

    f.registry.advance(WARMUP_TICKS);
    assert_eq!(f.inner.calls(), 1);
}

#[test]
fn disabled_abort_conditions_are_ignored() {
    let settings = TimerSettings {
        abort_on_move: false,
        abort_on_damage: false,
        ..settings()
    };
    let f = fixture_with(settings, TeleportStatus::Original);
    f.request();
    f.player.set_health(1.0);
    f.player.walk_to(Position::new(SPAWN.x + 30.0, SPAWN.y, SPAWN.z));

    f.registry.advance(WARMUP_TICKS);
    assert_eq!(f.inner.calls(), 1);
}

#[test]
fn timer_disobey_teleports_immediately() {
    let f = fixture();
    f.player.grant("mywarp.timer.disobey");

    assert_eq!(f.request(), TeleportStatus::Original);
    assert_eq!(f.inner.calls(), 1);
    assert_eq!(f.registry.running(), 0);
}

#[test]
fn failed_teleport_starts_no_cooldown() {
    let f = fixture_with(settings(), TeleportStatus::None);
    f.request();

    f.registry.advance(WARMUP_TICKS);
    assert_eq!(f.inner.calls(), 1);
    assert!(!f.has(TimerKind::Cooldown));
}

#[test]
fn permitted_bundle_sets_durations() {
    let settings = TimerSettings {
        bundles: vec![TimerBundle::new("fast", Duration::ZERO, Duration::of(1, TimeUnit::Seconds))],
        ..settings()
    };
    let f = fixture_with(settings, TeleportStatus::Original);
    f.player.grant("mywarp.timer.fast");
    f.request();

    // A zero warmup fires on the next tick
    f.registry.tick();
    assert_eq!(f.inner.calls(), 1);
    assert_eq!(
        f.registry.remaining(&f.player.uuid(), TimerKind::Cooldown),
        Some(Duration::of(1, TimeUnit::Seconds))
    );
}

#[test]
fn non_players_skip_timers() {
    let f = fixture();
    let entity = common::TestEntity::default();

    assert_eq!(f.service.teleport(&entity, &f.warp), TeleportStatus::Original);
    assert_eq!(f.inner.calls(), 1);
    assert_eq!(f.registry.running(), 0);
}
