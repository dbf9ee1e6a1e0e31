use std::collections::BTreeSet;
use std::sync::Arc;

use mywarp::config::Config;
use mywarp::errors::MyWarpError;
use mywarp::host::{CommandSender, WorldId};
use mywarp::limits::{EvaluationResult, Limit, LimitCaps, LimitEvaluator, LimitSettings, LimitType, SimpleLimitService};
use mywarp::messages;
use mywarp::plugin::MyWarp;
use mywarp::warp::{MemoryWarpStore, WarpType};

mod common;
use common::{add_warps, TestGame, TestHost, TestPlayer};

fn evaluator(settings: LimitSettings, store: &Arc<MemoryWarpStore>) -> LimitEvaluator {
    let game = TestGame::new(&["world", "nether"]);
    let limits = Arc::new(SimpleLimitService::new(settings, game));
    LimitEvaluator::new(limits, store.clone())
}

fn worlds(names: &[&str]) -> Option<BTreeSet<WorldId>> {
    Some(names.iter().map(|n| WorldId::new(*n)).collect())
}

#[test]
fn exceeded_exactly_when_count_reaches_cap() {
    let world = WorldId::new("world");
    for owned in 0..6 {
        let store = Arc::new(MemoryWarpStore::new());
        let player = TestPlayer::new("alice");
        add_warps(&store, &player, "world", WarpType::Private, owned);

        let eval = evaluator(LimitSettings::new(true, LimitCaps::new(100, 3, 100), Vec::new()), &store);
        let result = eval.evaluate_limit(&*player, &world, LimitType::Private, false);
        if owned >= 3 {
            assert_eq!(
                result,
                EvaluationResult::Exceeded {
                    limit_type: LimitType::Private,
                    maximum: 3
                },
                "{} owned warps",
                owned
            );
        } else {
            assert_eq!(result, EvaluationResult::LimitMet, "{} owned warps", owned);
        }
    }
}

#[test]
fn total_cap_reported_before_larger_private_cap() {
    let store = Arc::new(MemoryWarpStore::new());
    let player = TestPlayer::new("alice");
    add_warps(&store, &player, "world", WarpType::Private, 5);
    let eval = evaluator(LimitSettings::new(true, LimitCaps::new(5, 10, 10), Vec::new()), &store);

    let result = eval.evaluate_limit(&*player, &WorldId::new("world"), LimitType::Private, true);
    assert_eq!(
        result,
        EvaluationResult::Exceeded {
            limit_type: LimitType::Total,
            maximum: 5
        }
    );
    assert_eq!(result.exceeded_limit().unwrap(), LimitType::Total);
    assert_eq!(result.limit_maximum().unwrap(), 5);

    // Without parents only the private cap is consulted
    let result = eval.evaluate_limit(&*player, &WorldId::new("world"), LimitType::Private, false);
    assert_eq!(result, EvaluationResult::LimitMet);
}

#[test]
fn own_type_is_checked_before_parents() {
    let store = Arc::new(MemoryWarpStore::new());
    let player = TestPlayer::new("alice");
    add_warps(&store, &player, "world", WarpType::Public, 2);
    let eval = evaluator(LimitSettings::new(true, LimitCaps::new(2, 5, 2), Vec::new()), &store);

    let result = eval.evaluate_limit(&*player, &WorldId::new("world"), LimitType::Public, true);
    assert_eq!(result.exceeded_limit().unwrap(), LimitType::Public);
}

#[test]
fn other_players_warps_do_not_count() {
    let store = Arc::new(MemoryWarpStore::new());
    let alice = TestPlayer::new("alice");
    let bob = TestPlayer::new("bob");
    add_warps(&store, &bob, "world", WarpType::Public, 4);
    let eval = evaluator(LimitSettings::new(true, LimitCaps::new(1, 1, 1), Vec::new()), &store);

    let result = eval.evaluate_limit(&*alice, &WorldId::new("world"), LimitType::Public, true);
    assert!(!result.exceeds_limit());
}

#[test]
fn disobey_permission_skips_evaluation() {
    let store = Arc::new(MemoryWarpStore::new());
    let player = TestPlayer::with_permissions("alice", &["mywarp.limit.disobey.world.total"]);
    add_warps(&store, &player, "world", WarpType::Public, 3);
    let eval = evaluator(LimitSettings::new(true, LimitCaps::new(0, 0, 0), Vec::new()), &store);

    let world = WorldId::new("world");
    assert_eq!(
        eval.evaluate_limit(&*player, &world, LimitType::Total, true),
        EvaluationResult::LimitMet
    );
    // The escape hatch is per world and per type
    assert!(eval
        .evaluate_limit(&*player, &WorldId::new("nether"), LimitType::Total, true)
        .exceeds_limit());
    assert!(eval
        .evaluate_limit(&*player, &world, LimitType::Public, true)
        .exceeds_limit());
}

#[test]
fn world_scoped_bundle_only_governs_its_worlds() {
    let store = Arc::new(MemoryWarpStore::new());
    let player = TestPlayer::with_permissions("alice", &["mywarp.limit.nether"]);
    add_warps(&store, &player, "world", WarpType::Public, 2);
    let settings = LimitSettings::new(
        true,
        LimitCaps::new(2, 2, 2),
        vec![Limit::new("nether", LimitCaps::new(50, 50, 50), worlds(&["nether"]))],
    );
    let eval = evaluator(settings, &store);

    assert!(eval
        .evaluate_limit(&*player, &WorldId::new("world"), LimitType::Public, true)
        .exceeds_limit());
    assert!(!eval
        .evaluate_limit(&*player, &WorldId::new("nether"), LimitType::Public, true)
        .exceeds_limit());
}

#[test]
fn first_bundle_by_identifier_wins() {
    let store = Arc::new(MemoryWarpStore::new());
    let player = TestPlayer::with_permissions("alice", &["mywarp.limit.alpha", "mywarp.limit.beta"]);
    add_warps(&store, &player, "world", WarpType::Public, 3);
    let settings = LimitSettings::new(
        true,
        LimitCaps::new(0, 0, 0),
        vec![
            Limit::global("beta", LimitCaps::new(100, 100, 100)),
            Limit::global("alpha", LimitCaps::new(3, 3, 3)),
        ],
    );
    let eval = evaluator(settings, &store);

    let result = eval.evaluate_limit(&*player, &WorldId::new("world"), LimitType::Public, false);
    assert_eq!(result.limit_maximum().unwrap(), 3);
}

#[test]
fn warps_per_limit_lists_overlapping_bundles() {
    let store = Arc::new(MemoryWarpStore::new());
    let player = TestPlayer::with_permissions("alice", &["mywarp.limit.caves", "mywarp.limit.nether"]);
    add_warps(&store, &player, "world", WarpType::Public, 1);
    add_warps(&store, &player, "nether", WarpType::Private, 2);
    let settings = LimitSettings::new(
        true,
        LimitCaps::new(10, 10, 10),
        vec![
            Limit::new("caves", LimitCaps::new(5, 5, 5), worlds(&["nether", "world"])),
            Limit::new("nether", LimitCaps::new(5, 5, 5), worlds(&["nether"])),
        ],
    );
    let eval = evaluator(settings, &store);

    let index = eval.warps_per_limit(&*player);
    // "nether" is subsumed by "caves"; the default is covered by "caves" on both loaded worlds
    assert_eq!(index.len(), 1);
    assert_eq!(index.get("caves").map(|w| w.len()), Some(3));
}

#[test]
fn warps_per_limit_repeats_warps_under_each_bundle() {
    let store = Arc::new(MemoryWarpStore::new());
    let player = TestPlayer::with_permissions("alice", &["mywarp.limit.nether"]);
    add_warps(&store, &player, "world", WarpType::Public, 1);
    add_warps(&store, &player, "nether", WarpType::Private, 2);
    let settings = LimitSettings::new(
        true,
        LimitCaps::new(10, 10, 10),
        vec![Limit::new("nether", LimitCaps::new(5, 5, 5), worlds(&["nether"]))],
    );
    let eval = evaluator(settings, &store);

    let index = eval.warps_per_limit(&*player);
    assert_eq!(index.len(), 2);
    assert_eq!(index.get("nether").map(|w| w.len()), Some(2));
    // The global default also governs the nether warps
    assert_eq!(index.get("default").map(|w| w.len()), Some(3));
}

#[test]
fn check_create_requires_a_player() {
    let host = TestHost::new(&["world"]);
    let mywarp = MyWarp::new(&Config::default(), host.services()).unwrap();

    let result = mywarp.check_create(&CommandSender::Console, &WorldId::new("world"), WarpType::Public);
    assert!(matches!(result, Err(MyWarpError::NotAPlayer(_))));
}

#[test]
fn check_create_tells_the_player_about_the_exceeded_cap() {
    let host = TestHost::new(&["world"]);
    let config: Config = toml::from_str(
        r#"
        [limits.default]
        total = 2
        private = 2
        public = 2
        "#,
    )
    .unwrap();
    let mywarp = MyWarp::new(&config, host.services()).unwrap();
    let player = TestPlayer::new("alice");
    add_warps(&host.warps, &player, "world", WarpType::Public, 2);

    let sender = CommandSender::Player(&*player);
    let result = mywarp
        .check_create(&sender, &WorldId::new("world"), WarpType::Private)
        .unwrap();
    assert_eq!(
        result,
        EvaluationResult::Exceeded {
            limit_type: LimitType::Total,
            maximum: 2
        }
    );
    let message = player.messages().pop().unwrap();
    assert_eq!(message.key, messages::LIMIT_EXCEEDED);
    assert_eq!(message.args, vec!["total", "2", "world"]);
}

#[test]
fn disabled_limits_always_allow() {
    let host = TestHost::new(&["world"]);
    let mut config = Config::default();
    config.limits.enabled = false;
    config.limits.default = mywarp::config::CapsConfig::new(0, 0, 0);
    let mywarp = MyWarp::new(&config, host.services()).unwrap();
    let player = TestPlayer::new("alice");

    let result = mywarp
        .check_create(&CommandSender::Player(&*player), &WorldId::new("world"), WarpType::Public)
        .unwrap();
    assert_eq!(result, EvaluationResult::LimitMet);
}
