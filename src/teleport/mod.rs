//! Teleporting entities to warps.
//!
//! A teleport passes through a chain of stages that share the
//! [`TeleportService`] contract. Each stage owns the next one and decides
//! whether to delegate:
//!
//! ```text
//! EconomyTeleportService   fee check, charge after a completed move
//!   └─ TimerTeleportService   cooldown/warmup gating
//!        └─ HandlerTeleportService   position validation, the actual move
//! ```
//!
//! With timers enabled the teleport completes only after the warmup, so the
//! outer economy stage becomes a gate that refuses players who cannot pay
//! and a charging stage sits directly around the handler. The warmup calls
//! into that charging stage, which re-checks the balance before moving.
//!
//! Denials are never errors: a stage returns [`TeleportStatus::None`] and
//! tells the player why.

pub mod economy;
pub mod handler;
pub mod position;
pub mod timer;

use std::sync::Arc;

pub use economy::EconomyTeleportService;
pub use handler::HandlerTeleportService;
pub use position::{BlockCenterCorrection, PositionValidation, SafetySearch, WorldSafety};
pub use timer::{TimerTeleportService, WarpCooldown, WarpWarmup};

use crate::economy::{EconomyCapability, FeeType};
use crate::host::{Game, LocalEntity};
use crate::timer::TimerCapability;
use crate::warp::Warp;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeleportStatus {
    /// Nothing moved: denied, or waiting for a warmup.
    None,
    /// Moved to exactly the stored warp position.
    Original,
    /// Moved to an adjusted position.
    Modified,
}

impl TeleportStatus {
    /// True when the entity was actually moved.
    pub fn is_position_modified(&self) -> bool {
        matches!(self, TeleportStatus::Original | TeleportStatus::Modified)
    }
}

pub trait TeleportService: Send + Sync {
    fn teleport(&self, entity: &dyn LocalEntity, warp: &Warp) -> TeleportStatus;
}

/// Composes the standard stage order around a handler, whatever order the
/// optional stages are supplied in.
pub struct TeleportPipeline {
    handler: Arc<dyn TeleportService>,
    timers: Option<(Arc<dyn TimerCapability>, Arc<dyn Game>)>,
    economy: Option<(Arc<dyn EconomyCapability>, FeeType)>,
}

impl TeleportPipeline {
    pub fn new(handler: Arc<dyn TeleportService>) -> Self {
        Self {
            handler,
            timers: None,
            economy: None,
        }
    }

    pub fn with_timers(mut self, timers: Arc<dyn TimerCapability>, game: Arc<dyn Game>) -> Self {
        self.timers = Some((timers, game));
        self
    }

    pub fn with_economy(mut self, economy: Arc<dyn EconomyCapability>, fee: FeeType) -> Self {
        self.economy = Some((economy, fee));
        self
    }

    pub fn build(self) -> Arc<dyn TeleportService> {
        match (self.timers, self.economy) {
            (None, None) => self.handler,
            (None, Some((economy, fee))) => Arc::new(EconomyTeleportService::new(self.handler, economy, fee)),
            (Some((timers, game)), None) => Arc::new(TimerTeleportService::new(self.handler, timers, game)),
            (Some((timers, game)), Some((economy, fee))) => {
                let charging: Arc<dyn TeleportService> =
                    Arc::new(EconomyTeleportService::new(self.handler, Arc::clone(&economy), fee));
                let delayed: Arc<dyn TeleportService> = Arc::new(TimerTeleportService::new(charging, timers, game));
                Arc::new(EconomyTeleportService::gate(delayed, economy, fee))
            }
        }
    }
}
