use std::sync::Arc;

use log::debug;

use super::{TeleportService, TeleportStatus};
use crate::economy::{EconomyCapability, FeeType};
use crate::host::{LocalEntity, LocalPlayer};
use crate::messages::{self, Message};
use crate::warp::Warp;

/// Checks the fee up front and charges it once the entity has actually moved.
///
/// A gate stage only checks: it sits in front of a warmup so a player who
/// cannot pay never starts one, while a charging stage behind the warmup
/// takes the fee when the delayed teleport completes.
pub struct EconomyTeleportService {
    inner: Arc<dyn TeleportService>,
    economy: Arc<dyn EconomyCapability>,
    fee: FeeType,
    charge: bool,
}

impl EconomyTeleportService {
    pub fn new(inner: Arc<dyn TeleportService>, economy: Arc<dyn EconomyCapability>, fee: FeeType) -> Self {
        Self {
            inner,
            economy,
            fee,
            charge: true,
        }
    }

    /// A stage that refuses players who cannot afford the fee but never withdraws.
    pub fn gate(inner: Arc<dyn TeleportService>, economy: Arc<dyn EconomyCapability>, fee: FeeType) -> Self {
        Self {
            charge: false,
            ..Self::new(inner, economy, fee)
        }
    }

    fn can_afford(&self, player: &dyn LocalPlayer, amount: f64, warp: &Warp) -> bool {
        if self.economy.has_at_least(player, amount) {
            return true;
        }
        debug!("{} cannot afford {} for '{}'", player.name(), amount, warp.name);
        player.send_message(Message::error(messages::INSUFFICIENT_FUNDS).arg(format!("{:.2}", amount)));
        false
    }
}

impl TeleportService for EconomyTeleportService {
    fn teleport(&self, entity: &dyn LocalEntity, warp: &Warp) -> TeleportStatus {
        let Some(player) = entity.as_player() else {
            return self.inner.teleport(entity, warp);
        };

        let amount = self.economy.fee(player, self.fee);
        if !self.can_afford(player, amount, warp) {
            return TeleportStatus::None;
        }

        let status = self.inner.teleport(entity, warp);
        if self.charge && status.is_position_modified() {
            self.economy.withdraw(player, amount);
            if self.economy.inform_after_transaction() && amount > 0.0 {
                player.send_message(Message::info(messages::TRANSACTION_COMPLETE).arg(format!("{:.2}", amount)));
            }
        }
        status
    }
}
