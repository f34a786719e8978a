//! Precomputed patch index buffers for every LOD and stitch combination.

use std::sync::Arc;

use geomip_lod::{EdgeFlags, GeomipError, max_lod_for_patch_size};

use crate::fan::{TriangleFan, mesh_patch};

/// Edge flag combinations per LOD: four sides, each full or collapsed.
const EDGE_COMBINATIONS: usize = 16;

/// One `(lod, edge flags)` combination.
#[derive(Clone, Debug)]
struct Entry {
    fans: Arc<[TriangleFan]>,
    triangles: Vec<u32>,
}

/// Fans and triangle-list indices for a patch at each `(lod, edge flags)`
/// pair.
///
/// Every patch shares one vertex layout, so a renderer can upload these once
/// and pick a slice per patch instead of re-meshing each frame.
#[derive(Clone, Debug)]
pub struct PatchIndexTable {
    patch_size: u32,
    max_lod: u8,
    entries: Vec<Entry>,
}

impl PatchIndexTable {
    /// Mesh every combination for patches of `patch_size` vertices per side.
    pub fn build(patch_size: u32) -> Result<Self, GeomipError> {
        let max_lod = max_lod_for_patch_size(patch_size);
        let mut entries = Vec::with_capacity((usize::from(max_lod) + 1) * EDGE_COMBINATIONS);
        for lod in 0..=max_lod {
            for mask in 0..EDGE_COMBINATIONS as u8 {
                let fans = mesh_patch(patch_size, lod, EdgeFlags::from_mask(mask))?;
                let triangles: Vec<u32> = fans
                    .iter()
                    .flat_map(|fan| fan.triangles())
                    .flatten()
                    .collect();
                entries.push(Entry {
                    fans: fans.into(),
                    triangles,
                });
            }
        }
        let table = Self {
            patch_size,
            max_lod,
            entries,
        };
        tracing::debug!(
            patch_size,
            max_lod,
            indices = table.total_indices(),
            "built patch index table"
        );
        Ok(table)
    }

    /// Vertices per patch side the table was built for.
    pub fn patch_size(&self) -> u32 {
        self.patch_size
    }

    /// Coarsest LOD in the table.
    pub fn max_lod(&self) -> u8 {
        self.max_lod
    }

    /// Triangle-list indices for a patch at `lod` with `edges`, or `None` if
    /// `lod` is past the table.
    pub fn get(&self, lod: u8, edges: EdgeFlags) -> Option<&[u32]> {
        self.entry(lod, edges).map(|e| e.triangles.as_slice())
    }

    /// Shared fan list for a patch at `lod` with `edges`, as [`mesh_patch`]
    /// would emit it.
    pub fn fans(&self, lod: u8, edges: EdgeFlags) -> Option<&Arc<[TriangleFan]>> {
        self.entry(lod, edges).map(|e| &e.fans)
    }

    fn entry(&self, lod: u8, edges: EdgeFlags) -> Option<&Entry> {
        if lod > self.max_lod {
            return None;
        }
        let slot = usize::from(lod) * EDGE_COMBINATIONS + usize::from(edges.mask());
        self.entries.get(slot)
    }

    /// Number of `(lod, edges)` entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of index counts across all entries.
    pub fn total_indices(&self) -> usize {
        self.entries.iter().map(|e| e.triangles.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fan::fans_per_side;

    #[test]
    fn test_table_has_sixteen_entries_per_lod() {
        let table = PatchIndexTable::build(17).unwrap();
        assert_eq!(table.max_lod(), 2);
        assert_eq!(table.len(), 3 * 16);
        assert!(!table.is_empty());
        assert!(table.get(3, EdgeFlags::FULL).is_none());
    }

    #[test]
    fn test_entries_match_direct_meshing() {
        let table = PatchIndexTable::build(17).unwrap();
        for lod in 0..=2 {
            for mask in 0..16u8 {
                let edges = EdgeFlags::from_mask(mask);
                let expected: Vec<u32> = mesh_patch(17, lod, edges)
                    .unwrap()
                    .iter()
                    .flat_map(|f| f.triangles())
                    .flatten()
                    .collect();
                assert_eq!(table.get(lod, edges), Some(expected.as_slice()));
                let fans = table.fans(lod, edges).unwrap();
                assert_eq!(&fans[..], mesh_patch(17, lod, edges).unwrap().as_slice());
            }
        }
    }

    #[test]
    fn test_full_entry_triangle_count() {
        let table = PatchIndexTable::build(33).unwrap();
        for lod in 0..=table.max_lod() {
            let fans = fans_per_side(lod, 33) as usize;
            let indices = table.get(lod, EdgeFlags::FULL).unwrap();
            assert_eq!(indices.len(), fans * fans * 8 * 3, "lod={lod}");
        }
    }

    #[test]
    fn test_collapsing_reduces_triangles() {
        let table = PatchIndexTable::build(17).unwrap();
        let full = table.get(1, EdgeFlags::FULL).unwrap().len();
        let collapsed = table.get(1, EdgeFlags::from_mask(0)).unwrap().len();
        // Four fans per side, one triangle lost per collapsed fan side.
        assert_eq!(full - collapsed, 4 * 4 * 3);
    }

    #[test]
    fn test_indices_stay_inside_vertex_buffer() {
        let table = PatchIndexTable::build(9).unwrap();
        assert!(table.total_indices() > 0);
        for lod in 0..=table.max_lod() {
            for mask in 0..16u8 {
                let indices = table.get(lod, EdgeFlags::from_mask(mask)).unwrap();
                assert!(indices.iter().all(|&i| i < 81));
            }
        }
    }

    #[test]
    fn test_too_small_patch_fails() {
        assert!(PatchIndexTable::build(2).is_err());
        assert!(PatchIndexTable::build(7).is_err());
        assert!(PatchIndexTable::build(17).unwrap().fans(3, EdgeFlags::FULL).is_none());
    }
}
