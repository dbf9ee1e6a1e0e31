use std::sync::Arc;

use log::debug;

use crate::host::{Position, WorldId};

/// One step of target-position validation. Returns the position to use, or
/// `None` when there is no acceptable position.
pub trait PositionValidation: Send + Sync {
    fn valid_position(&self, position: Position, world: &WorldId) -> Option<Position>;
}

/// Moves positions stored on a block corner to the block centre.
///
/// Old warps were saved with integral x/z coordinates, which places players
/// on the edge between four blocks.
pub struct BlockCenterCorrection;

impl PositionValidation for BlockCenterCorrection {
    fn valid_position(&self, position: Position, _world: &WorldId) -> Option<Position> {
        if position.x.fract() == 0.0 && position.z.fract() == 0.0 {
            return Some(Position::new(position.x + 0.5, position.y, position.z + 0.5));
        }
        Some(position)
    }
}

/// Knows which blocks a player can stand in without harm.
pub trait WorldSafety: Send + Sync {
    fn is_safe(&self, world: &WorldId, block: (i64, i64, i64)) -> bool;
}

/// Keeps safe positions and otherwise searches outward for the nearest safe block.
pub struct SafetySearch {
    safety: Arc<dyn WorldSafety>,
    radius: u32,
}

impl SafetySearch {
    pub fn new(safety: Arc<dyn WorldSafety>, radius: u32) -> Self {
        Self { safety, radius }
    }

    /// Offsets `0, 1, -1, 2, -2 ... r, -r`: vertical moves prefer going up.
    fn vertical_offsets(r: i64) -> Vec<i64> {
        let mut offsets = vec![0];
        for d in 1..=r {
            offsets.push(d);
            offsets.push(-d);
        }
        offsets
    }
}

impl PositionValidation for SafetySearch {
    fn valid_position(&self, position: Position, world: &WorldId) -> Option<Position> {
        let (bx, by, bz) = position.block();
        if self.safety.is_safe(world, (bx, by, bz)) {
            return Some(position);
        }

        for r in 1..=self.radius as i64 {
            for dy in Self::vertical_offsets(r) {
                for dx in -r..=r {
                    for dz in -r..=r {
                        if dx.abs().max(dy.abs()).max(dz.abs()) != r {
                            continue;
                        }
                        let block = (bx + dx, by + dy, bz + dz);
                        if self.safety.is_safe(world, block) {
                            debug!("Found safe block {:?} for unsafe {:?} in {}", block, (bx, by, bz), world);
                            return Some(Position::new(
                                block.0 as f64 + 0.5,
                                block.1 as f64,
                                block.2 as f64 + 0.5,
                            ));
                        }
                    }
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct SafeBlocks(HashSet<(i64, i64, i64)>);

    impl WorldSafety for SafeBlocks {
        fn is_safe(&self, _world: &WorldId, block: (i64, i64, i64)) -> bool {
            self.0.contains(&block)
        }
    }

    fn world() -> WorldId {
        WorldId::new("world")
    }

    #[test]
    fn corner_positions_are_centred() {
        let corrected = BlockCenterCorrection.valid_position(Position::new(10.0, 64.0, -3.0), &world());
        assert_eq!(corrected, Some(Position::new(10.5, 64.0, -2.5)));

        let untouched = Position::new(10.25, 64.0, -3.0);
        assert_eq!(BlockCenterCorrection.valid_position(untouched, &world()), Some(untouched));
    }

    #[test]
    fn safe_position_is_kept() {
        let search = SafetySearch::new(Arc::new(SafeBlocks([(0, 64, 0)].into_iter().collect())), 2);
        let pos = Position::new(0.5, 64.0, 0.5);
        assert_eq!(search.valid_position(pos, &world()), Some(pos));
    }

    #[test]
    fn nearby_safe_block_prefers_up() {
        let safe = SafeBlocks([(0, 65, 0), (0, 63, 0)].into_iter().collect());
        let search = SafetySearch::new(Arc::new(safe), 2);
        assert_eq!(
            search.valid_position(Position::new(0.5, 64.0, 0.5), &world()),
            Some(Position::new(0.5, 65.0, 0.5))
        );
    }

    #[test]
    fn nothing_within_radius_yields_none() {
        let search = SafetySearch::new(Arc::new(SafeBlocks([(5, 64, 0)].into_iter().collect())), 2);
        assert_eq!(search.valid_position(Position::new(0.5, 64.0, 0.5), &world()), None);
    }
}
