use std::sync::Arc;

use log::{debug, info};

use super::position::PositionValidation;
use super::{TeleportService, TeleportStatus};
use crate::host::{LocalEntity, Position};
use crate::messages::{self, Message};
use crate::warp::{Warp, WarpStore};

/// The innermost stage: validates the target position and moves the entity.
pub struct HandlerTeleportService {
    warps: Arc<dyn WarpStore>,
    validations: Vec<Box<dyn PositionValidation>>,
}

impl HandlerTeleportService {
    pub fn new(warps: Arc<dyn WarpStore>) -> Self {
        Self {
            warps,
            validations: Vec::new(),
        }
    }

    /// Append a validation step. Steps run in the order they were added.
    pub fn with_validation(mut self, validation: impl PositionValidation + 'static) -> Self {
        self.validations.push(Box::new(validation));
        self
    }

    fn target(&self, warp: &Warp) -> Option<Position> {
        self.validations
            .iter()
            .try_fold(warp.position, |position, validation| {
                validation.valid_position(position, &warp.world)
            })
    }
}

impl TeleportService for HandlerTeleportService {
    fn teleport(&self, entity: &dyn LocalEntity, warp: &Warp) -> TeleportStatus {
        let Some(target) = self.target(warp) else {
            info!("No safe position at warp '{}' in {}", warp.name, warp.world);
            if let Some(player) = entity.as_player() {
                player.send_message(Message::error(messages::TELEPORT_NO_SAFE_POSITION).arg(&warp.name));
            }
            return TeleportStatus::None;
        };

        entity.teleport(&warp.world, target);
        self.warps.visited(&warp.name);

        let status = if target == warp.position {
            TeleportStatus::Original
        } else {
            TeleportStatus::Modified
        };
        debug!("Teleported to '{}' at {} ({:?})", warp.name, target, status);

        if let Some(player) = entity.as_player() {
            if let Some(welcome) = warp.parsed_welcome_message(player.name()) {
                player.send_message(Message::info(messages::WARP_WELCOME).arg(welcome));
            }
            let key = match status {
                TeleportStatus::Modified => messages::TELEPORT_MODIFIED,
                _ => messages::TELEPORT_SUCCESS,
            };
            player.send_message(Message::success(key).arg(&warp.name));
        }
        status
    }
}
