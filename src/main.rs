//! Binary entrypoint for the MyWarp CLI.
//!
//! Commands:
//! - `init` - write a starter `config.toml`
//! - `check` - load and validate the configuration, then list the declared permissions
//! - `limits --permission <node>... [--world <name>...]` - print the limit bundles a
//!   player holding the given permissions would get, as JSON
//!
//! See the library crate docs for module-level details: `mywarp::`.
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::{info, warn};
use serde::Serialize;
use uuid::Uuid;

use mywarp::config::Config;
use mywarp::economy::Ledger;
use mywarp::host::{Actor, Game, LocalEntity, LocalPlayer, Permissible, Position, Profile, WorldId};
use mywarp::limits::Limit;
use mywarp::messages::Message;
use mywarp::permissions::PermissionRegistry;
use mywarp::plugin::{HostServices, MyWarp};
use mywarp::teleport::WorldSafety;
use mywarp::warp::MemoryWarpStore;

#[derive(Parser)]
#[command(name = "mywarp")]
#[command(about = "Warp limits, fees and timers for game servers")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init,
    /// Validate the configuration file
    Check,
    /// Show the limit bundles a player with the given permissions gets
    Limits {
        /// Permission node held by the simulated player (repeatable)
        #[arg(short, long = "permission")]
        permissions: Vec<String>,
        /// Loaded world (repeatable)
        #[arg(short, long = "world", default_values_t = vec!["world".to_string()])]
        worlds: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let pre_config = match cli.command {
        Commands::Init => None,
        _ => Config::load(&cli.config).await.ok(),
    };
    init_logging(&pre_config, cli.verbose);

    match cli.command {
        Commands::Init => {
            Config::create_default(&cli.config).await?;
            println!("Created default configuration at {}", cli.config);
        }
        Commands::Check => {
            let config = match pre_config {
                Some(config) => config,
                None => Config::load(&cli.config).await?,
            };
            let mywarp = MyWarp::new(&config, console_host(Vec::new()))?;
            let settings = mywarp.settings();
            info!(
                "Limits {} ({} bundles), timers {} ({} bundles), economy {} ({} bundles)",
                enabled(settings.limits.enabled),
                settings.limits.bundles.len(),
                enabled(settings.timers.enabled),
                settings.timers.bundles.len(),
                enabled(settings.fees.enabled),
                settings.fees.bundles.len()
            );
            for node in mywarp.permissions().registered() {
                info!("  {} - {}", node.name, node.description);
            }
            println!("{} is valid", cli.config);
        }
        Commands::Limits { permissions, worlds } => {
            let config = match pre_config {
                Some(config) => config,
                None => {
                    warn!("No readable configuration at {}, using defaults", cli.config);
                    Config::default()
                }
            };
            let worlds: Vec<WorldId> = worlds.iter().map(|w| WorldId::new(w.as_str())).collect();
            let mywarp = MyWarp::new(&config, console_host(worlds.clone()))?;

            let player = ConsolePlayer::new(permissions.iter().cloned().collect(), worlds.first().cloned());
            let report = LimitsReport {
                permissions: &permissions,
                effective: mywarp.effective_limits(&player),
                per_world: worlds
                    .iter()
                    .map(|w| (w.to_string(), mywarp.limit(&player, w).identifier().to_string()))
                    .collect(),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn enabled(flag: bool) -> &'static str {
    if flag {
        "enabled"
    } else {
        "disabled"
    }
}

#[derive(Serialize)]
struct LimitsReport<'a> {
    permissions: &'a [String],
    effective: Vec<Limit>,
    /// World name to the identifier of the governing bundle.
    per_world: BTreeMap<String, String>,
}

fn console_host(worlds: Vec<WorldId>) -> HostServices {
    HostServices {
        game: Arc::new(ConsoleGame { worlds }),
        warps: Arc::new(MemoryWarpStore::new()),
        ledger: Arc::new(NoLedger),
        safety: Arc::new(OpenWorld),
        permissions: Arc::new(PermissionRegistry::new()),
        resolver_probes: Vec::new(),
    }
}

/// Offline stand-in for the server while inspecting configuration.
struct ConsoleGame {
    worlds: Vec<WorldId>,
}

impl Game for ConsoleGame {
    fn worlds(&self) -> Vec<WorldId> {
        self.worlds.clone()
    }

    fn player(&self, _uuid: &Uuid) -> Option<Arc<dyn LocalPlayer>> {
        None
    }
}

struct NoLedger;

impl Ledger for NoLedger {
    fn has(&self, _player: &dyn LocalPlayer, _amount: f64) -> bool {
        true
    }

    fn withdraw(&self, _player: &dyn LocalPlayer, _amount: f64) {}
}

struct OpenWorld;

impl WorldSafety for OpenWorld {
    fn is_safe(&self, _world: &WorldId, _block: (i64, i64, i64)) -> bool {
        true
    }
}

/// A player that exists only to evaluate permissions from the command line.
struct ConsolePlayer {
    profile: Profile,
    permissions: BTreeSet<String>,
    world: WorldId,
}

impl ConsolePlayer {
    fn new(permissions: BTreeSet<String>, world: Option<WorldId>) -> Self {
        Self {
            profile: Profile::new(Uuid::new_v4(), "console"),
            permissions,
            world: world.unwrap_or_else(|| WorldId::new("world")),
        }
    }
}

impl Permissible for ConsolePlayer {
    fn has_permission(&self, node: &str) -> bool {
        self.permissions.contains(node)
    }
}

impl Actor for ConsolePlayer {
    fn name(&self) -> &str {
        &self.profile.name
    }

    fn send_message(&self, message: Message) {
        info!("[to {}] {}", self.profile.name, message);
    }
}

impl LocalEntity for ConsolePlayer {
    fn world(&self) -> WorldId {
        self.world.clone()
    }

    fn position(&self) -> Position {
        Position::new(0.5, 64.0, 0.5)
    }

    fn teleport(&self, _world: &WorldId, _position: Position) {}

    fn as_player(&self) -> Option<&dyn LocalPlayer> {
        Some(self)
    }
}

impl LocalPlayer for ConsolePlayer {
    fn profile(&self) -> &Profile {
        &self.profile
    }

    fn health(&self) -> f64 {
        20.0
    }

    fn as_entity(&self) -> &dyn LocalEntity {
        self
    }
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity raises the configured level, never lowers it
    let configured = config
        .as_ref()
        .and_then(|cfg| cfg.logging.level.parse::<log::LevelFilter>().ok())
        .unwrap_or(log::LevelFilter::Info);
    let base_level = match verbosity {
        0 => configured,
        1 => configured.max(log::LevelFilter::Debug),
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let log_file = config.as_ref().and_then(|cfg| cfg.logging.file.clone()).and_then(|file| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(file)
            .ok()
    });

    if let Some(f) = log_file {
        let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
        // Echo to the console only when someone is watching it
        let is_tty = atty::is(atty::Stream::Stdout);
        builder.format(move |fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            let line = format!("{} [{}] {}", ts, record.level(), record.args());
            if let Ok(mut guard) = write_mutex.lock() {
                let _ = writeln!(guard, "{}", line);
            }
            if is_tty {
                writeln!(fmt, "{}", line)
            } else {
                Ok(())
            }
        });
    } else {
        builder.format(|fmt, record| {
            writeln!(
                fmt,
                "{} [{}] {}",
                chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
                record.level(),
                record.args()
            )
        });
    }
    let _ = builder.try_init();
}
