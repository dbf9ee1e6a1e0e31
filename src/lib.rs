//! # MyWarp - named warps for game servers
//!
//! MyWarp lets players save named positions ("warps") and teleport back to
//! them. This crate is the host-independent core: it decides whether a player
//! may create another warp, and it runs every teleport through a chain of
//! fee, warmup/cooldown and position-safety stages.
//!
//! ## Features
//!
//! - **Creation limits**: permission-scoped bundles capping total, private and public warps per world.
//! - **Warmups and cooldowns**: teleports wait out a warmup that aborts on movement or damage; completed ones start a cooldown.
//! - **Fees**: per-action fees charged through the server's economy once a teleport has moved the player.
//! - **Safe arrival**: legacy block-corner positions are centred and unsafe targets are searched for a nearby safe block.
//! - **Invitations**: private warps are usable by their creator, invited players and invited groups.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mywarp::config::Config;
//! use mywarp::plugin::{HostServices, MyWarp};
//!
//! # async fn run(host: HostServices) -> anyhow::Result<()> {
//! let config = Config::load("config.toml").await?;
//! let mywarp = MyWarp::new(&config, host)?;
//!
//! // From the server's main loop, once per game tick:
//! mywarp.tick();
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`host`] - traits the hosting server implements (players, worlds, game)
//! - [`config`] - TOML configuration and validation into typed settings
//! - [`limits`] - limit bundles, the limit evaluator and per-limit warp index
//! - [`timer`] - durations, timer actions and the tick-driven timer registry
//! - [`economy`] - fee bundles on top of the server's ledger
//! - [`teleport`] - the teleport pipeline and position validation
//! - [`permissions`] - permission nodes, bundle registration and group resolution
//! - [`warp`] - warps and the warp store with change notifications
//! - [`plugin`] - [`MyWarp`](plugin::MyWarp), the assembled core
//!
//! ## Threading
//!
//! Everything runs on the host's main thread. Timers are entries in a
//! registry the host advances through [`plugin::MyWarp::tick`]; the core
//! never spawns threads of its own.

pub mod config;
pub mod economy;
pub mod errors;
pub mod host;
pub mod limits;
pub mod messages;
pub mod permissions;
pub mod plugin;
pub mod teleport;
pub mod timer;
pub mod warp;
