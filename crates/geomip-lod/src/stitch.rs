//! Crack avoidance between patches of different detail.
//!
//! When a patch borders a coarser neighbor, the mid-edge vertices on that
//! side have no partner on the neighbor's edge and would open a T-junction.
//! The finer patch drops those vertices so both sides of the seam share the
//! coarser vertex set. The coarser patch never changes its edge.

use crate::error::GeomipError;
use crate::patch::Side;

/// Per-side resolution flags for a patch or a fan.
///
/// `true` means the side may render at full resolution; `false` means it must
/// collapse to match a coarser neighbor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EdgeFlags {
    /// Side toward decreasing x.
    pub left: bool,
    /// Side toward increasing y.
    pub up: bool,
    /// Side toward increasing x.
    pub right: bool,
    /// Side toward decreasing y.
    pub down: bool,
}

impl EdgeFlags {
    /// Every side at full resolution.
    pub const FULL: Self = Self {
        left: true,
        up: true,
        right: true,
        down: true,
    };

    /// Flag for one side.
    pub fn get(self, side: Side) -> bool {
        match side {
            Side::Left => self.left,
            Side::Up => self.up,
            Side::Right => self.right,
            Side::Down => self.down,
        }
    }

    /// Set the flag for one side.
    pub fn set(&mut self, side: Side, full: bool) {
        match side {
            Side::Left => self.left = full,
            Side::Up => self.up = full,
            Side::Right => self.right = full,
            Side::Down => self.down = full,
        }
    }

    /// Pack into four bits, bit `side as u8` set for full resolution.
    pub fn mask(self) -> u8 {
        Side::ALL
            .iter()
            .filter(|&&side| self.get(side))
            .fold(0, |mask, &side| mask | (1 << side as u8))
    }

    /// Inverse of [`EdgeFlags::mask`]. Bits above the low four are ignored.
    pub fn from_mask(mask: u8) -> Self {
        let mut flags = Self::FULL;
        for side in Side::ALL {
            flags.set(side, mask & (1 << side as u8) != 0);
        }
        flags
    }

    /// Number of collapsed sides.
    pub fn collapsed_count(self) -> usize {
        Side::ALL.iter().filter(|&&side| !self.get(side)).count()
    }
}

impl Default for EdgeFlags {
    fn default() -> Self {
        Self::FULL
    }
}

/// LOD of each neighbor; `None` where there is no neighbor to match.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NeighborLods {
    /// Neighbor at `px - 1`.
    pub left: Option<u8>,
    /// Neighbor at `pz + 1`.
    pub up: Option<u8>,
    /// Neighbor at `px + 1`.
    pub right: Option<u8>,
    /// Neighbor at `pz - 1`.
    pub down: Option<u8>,
}

impl NeighborLods {
    /// LOD of the neighbor on `side`.
    pub fn get(&self, side: Side) -> Option<u8> {
        match side {
            Side::Left => self.left,
            Side::Up => self.up,
            Side::Right => self.right,
            Side::Down => self.down,
        }
    }

    /// Set the neighbor LOD on `side`.
    pub fn set(&mut self, side: Side, lod: Option<u8>) {
        match side {
            Side::Left => self.left = lod,
            Side::Up => self.up = lod,
            Side::Right => self.right = lod,
            Side::Down => self.down = lod,
        }
    }
}

/// Position of a fan inside its patch's fan grid.
///
/// Column 0 touches the patch's left edge, row 0 its bottom edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FanCoord {
    /// Fan column, `0..fans_per_side`.
    pub col: u32,
    /// Fan row, `0..fans_per_side`.
    pub row: u32,
}

impl FanCoord {
    /// Create a fan coordinate.
    pub const fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }
}

/// Decide which edges of a patch at `lod` may render at full resolution.
///
/// A side stays full when there is no neighbor or the neighbor is the same or
/// finer; it collapses when the neighbor is coarser.
pub fn resolve_patch_edges(
    lod: u8,
    neighbors: &NeighborLods,
    max_lod: u8,
) -> Result<EdgeFlags, GeomipError> {
    check_lod(lod, max_lod)?;
    let mut flags = EdgeFlags::FULL;
    for side in Side::ALL {
        if let Some(neighbor_lod) = neighbors.get(side) {
            check_lod(neighbor_lod, max_lod)?;
            flags.set(side, neighbor_lod <= lod);
        }
    }
    Ok(flags)
}

/// Narrow a patch's edge flags to one fan.
///
/// Only fans on the patch border inherit the patch flag for that border.
/// Interior sides border fans of the same patch, which always share a LOD.
pub fn resolve_fan_edges(
    fan: FanCoord,
    fans_per_side: u32,
    patch_edges: EdgeFlags,
) -> Result<EdgeFlags, GeomipError> {
    if fan.col >= fans_per_side || fan.row >= fans_per_side {
        return Err(GeomipError::FanOutOfBounds {
            col: fan.col,
            row: fan.row,
            fans_per_side,
        });
    }
    let last = fans_per_side - 1;
    Ok(EdgeFlags {
        left: fan.col != 0 || patch_edges.left,
        right: fan.col != last || patch_edges.right,
        down: fan.row != 0 || patch_edges.down,
        up: fan.row != last || patch_edges.up,
    })
}

fn check_lod(lod: u8, max_lod: u8) -> Result<(), GeomipError> {
    if lod > max_lod {
        return Err(GeomipError::InvalidLod { lod, max_lod });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_neighbors_is_full_resolution() {
        let flags = resolve_patch_edges(1, &NeighborLods::default(), 2).unwrap();
        assert_eq!(flags, EdgeFlags::FULL);
    }

    #[test]
    fn test_same_or_finer_neighbor_keeps_full_edge() {
        let neighbors = NeighborLods {
            left: Some(1),
            up: Some(0),
            right: Some(1),
            down: Some(0),
        };
        let flags = resolve_patch_edges(1, &neighbors, 2).unwrap();
        assert_eq!(flags, EdgeFlags::FULL);
    }

    #[test]
    fn test_coarser_neighbor_collapses_edge() {
        let neighbors = NeighborLods {
            left: Some(2),
            up: Some(0),
            right: None,
            down: Some(1),
        };
        let flags = resolve_patch_edges(0, &neighbors, 2).unwrap();
        assert!(!flags.left);
        assert!(flags.up);
        assert!(flags.right);
        assert!(!flags.down);
        assert_eq!(flags.collapsed_count(), 2);
    }

    #[test]
    fn test_stitching_is_one_sided() {
        // A at LOD 0, B at LOD 2 to its right.
        let a = resolve_patch_edges(
            0,
            &NeighborLods {
                right: Some(2),
                ..Default::default()
            },
            2,
        )
        .unwrap();
        let b = resolve_patch_edges(
            2,
            &NeighborLods {
                left: Some(0),
                ..Default::default()
            },
            2,
        )
        .unwrap();
        assert!(!a.right, "finer patch collapses toward the coarser one");
        assert!(b.left, "coarser patch never collapses toward a finer one");
    }

    #[test]
    fn test_invalid_lod_rejected() {
        assert_eq!(
            resolve_patch_edges(3, &NeighborLods::default(), 2),
            Err(GeomipError::InvalidLod { lod: 3, max_lod: 2 })
        );
        let bad_neighbor = NeighborLods {
            up: Some(9),
            ..Default::default()
        };
        assert_eq!(
            resolve_patch_edges(0, &bad_neighbor, 2),
            Err(GeomipError::InvalidLod { lod: 9, max_lod: 2 })
        );
    }

    #[test]
    fn test_interior_fans_are_full() {
        let collapsed = EdgeFlags::from_mask(0);
        let flags = resolve_fan_edges(FanCoord::new(1, 2), 4, collapsed).unwrap();
        assert_eq!(flags, EdgeFlags::FULL);
    }

    #[test]
    fn test_corner_fans_inherit_two_sides() {
        let collapsed = EdgeFlags::from_mask(0);
        let bottom_left = resolve_fan_edges(FanCoord::new(0, 0), 4, collapsed).unwrap();
        assert_eq!(
            bottom_left,
            EdgeFlags {
                left: false,
                up: true,
                right: true,
                down: false
            }
        );
        let top_right = resolve_fan_edges(FanCoord::new(3, 3), 4, collapsed).unwrap();
        assert_eq!(
            top_right,
            EdgeFlags {
                left: true,
                up: false,
                right: false,
                down: true
            }
        );
    }

    #[test]
    fn test_single_fan_inherits_every_side() {
        let patch_edges = EdgeFlags {
            left: false,
            up: true,
            right: false,
            down: true,
        };
        let flags = resolve_fan_edges(FanCoord::new(0, 0), 1, patch_edges).unwrap();
        assert_eq!(flags, patch_edges);
    }

    #[test]
    fn test_fan_out_of_bounds() {
        assert_eq!(
            resolve_fan_edges(FanCoord::new(4, 0), 4, EdgeFlags::FULL),
            Err(GeomipError::FanOutOfBounds {
                col: 4,
                row: 0,
                fans_per_side: 4
            })
        );
        assert!(resolve_fan_edges(FanCoord::new(0, 0), 0, EdgeFlags::FULL).is_err());
    }

    #[test]
    fn test_mask_covers_all_combinations() {
        let mut seen = std::collections::HashSet::new();
        for mask in 0..16u8 {
            let flags = EdgeFlags::from_mask(mask);
            assert_eq!(flags.mask(), mask);
            seen.insert(flags);
        }
        assert_eq!(seen.len(), 16);
        assert_eq!(EdgeFlags::FULL.mask(), 0b1111);
    }
}
