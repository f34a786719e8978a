use std::collections::{BTreeSet, HashMap};

use geomip_heightfield::{FaultParams, HeightGrid, fault};
use geomip_lod::{LodPolicy, PatchCoord};
use geomip_mesh::{
    GeomipTerrain, MAX_FAN_INDICES, MIN_FAN_INDICES, TerrainFrame, TerrainSettings, VisiblePatch,
};
use glam::Vec3;

const GRID_SIZE: u32 = 256;
const PATCH_SIZE: u32 = 17;

fn fault_field() -> HeightGrid {
    let params = FaultParams {
        iterations: 16,
        ..FaultParams::default()
    };
    fault::generate(GRID_SIZE + 1, &params).unwrap()
}

fn terrain(distance_unit: f32) -> GeomipTerrain<HeightGrid> {
    let settings = TerrainSettings {
        grid_size: GRID_SIZE,
        patch_size: PATCH_SIZE,
        lod_policy: LodPolicy::Linear { distance_unit },
        height_scale: 40.0,
    };
    GeomipTerrain::new(fault_field(), settings).unwrap()
}

/// Local rows (or columns) a patch references along one of its edges.
fn edge_positions(
    patch: &VisiblePatch,
    on_edge: impl Fn(u32, u32) -> Option<u32>,
) -> BTreeSet<u32> {
    patch
        .fans
        .iter()
        .flat_map(|f| f.indices.iter().copied())
        .filter_map(|i| on_edge(i % PATCH_SIZE, i / PATCH_SIZE))
        .collect()
}

fn by_coord(frame: &TerrainFrame) -> HashMap<PatchCoord, &VisiblePatch> {
    frame.patches.iter().map(|p| (p.coord, p)).collect()
}

#[test]
fn layout_for_256_grid_of_17_vertex_patches() {
    let terrain = terrain(300.0);
    assert_eq!(terrain.grid().patches_per_side(), 16);
    assert_eq!(terrain.grid().patch_count(), 256);
    assert_eq!(terrain.grid().max_lod(), 2);
    assert_eq!(terrain.index_table().len(), 3 * 16);
}

#[test]
fn viewer_over_center_patch_renders_it_at_finest_lod() {
    let mut terrain = terrain(300.0);
    // Patch (8, 8) spans 128..=144 on both axes.
    let frame = terrain.frame(Vec3::new(136.0, 136.0, 500.0)).unwrap();
    let patches = by_coord(&frame);
    let center = patches[&PatchCoord::new(8, 8)];
    assert_eq!(center.lod, 0);
    assert_eq!(center.fans.len(), 64);
    // Every patch is within one distance unit here.
    assert_eq!(frame.stats.culled, 0);
    assert!(frame.patches.iter().all(|p| p.lod == 0));
}

#[test]
fn lod_follows_distance_and_culls_past_max_lod() {
    let unit = 40.0;
    let mut terrain = terrain(unit);
    let viewer = Vec3::new(136.0, 136.0, 0.0);
    let frame = terrain.frame(viewer).unwrap();
    let patches = by_coord(&frame);

    assert!(frame.stats.culled > 0);
    assert!(frame.stats.patches > 0);
    for patch in terrain.grid().patches() {
        let d = patch.center.distance(viewer.truncate());
        let level = (d / unit).floor() as u32;
        match patches.get(&patch.coord) {
            Some(visible) => {
                assert!(level <= 2, "{:?} at {d} should be culled", patch.coord);
                assert_eq!(u32::from(visible.lod), level);
            }
            None => assert!(level > 2, "{:?} at {d} should be visible", patch.coord),
        }
    }
}

/// Adjacent visible patches stay within one LOD and reference the same
/// vertices along their shared edge.
fn assert_seams_match(frame: &TerrainFrame) {
    let patches = by_coord(frame);
    let last = PATCH_SIZE - 1;
    for a in &frame.patches {
        let right = PatchCoord::new(a.coord.px + 1, a.coord.pz);
        if let Some(b) = patches.get(&right) {
            assert!(a.lod.abs_diff(b.lod) <= 1, "{:?} | {:?}", a.coord, b.coord);
            let a_rows = edge_positions(a, |x, y| (x == last).then_some(y));
            let b_rows = edge_positions(b, |x, y| (x == 0).then_some(y));
            assert_eq!(a_rows, b_rows, "seam {:?} | {:?}", a.coord, b.coord);
        }
        let up = PatchCoord::new(a.coord.px, a.coord.pz + 1);
        if let Some(b) = patches.get(&up) {
            assert!(a.lod.abs_diff(b.lod) <= 1, "{:?} / {:?}", a.coord, b.coord);
            let a_cols = edge_positions(a, |x, y| (y == last).then_some(x));
            let b_cols = edge_positions(b, |x, y| (y == 0).then_some(x));
            assert_eq!(a_cols, b_cols, "seam {:?} / {:?}", a.coord, b.coord);
        }
    }
}

#[test]
fn seams_between_visible_patches_share_vertices() {
    let mut terrain = terrain(40.0);
    for viewer in [
        Vec3::new(136.0, 136.0, 0.0),
        Vec3::new(20.0, 200.0, 0.0),
        Vec3::new(250.0, 3.0, 0.0),
    ] {
        assert_seams_match(&terrain.frame(viewer).unwrap());
    }
}

#[test]
fn seams_hold_when_lod_steps_are_shorter_than_a_patch() {
    // With an 8-unit step, neighboring centers 16 apart would be two LODs
    // apart without refinement.
    let mut terrain = terrain(8.0);
    for viewer in [
        Vec3::new(8.0, 8.0, 0.0),
        Vec3::new(136.0, 136.0, 0.0),
        Vec3::new(61.0, 203.0, 0.0),
    ] {
        let frame = terrain.frame(viewer).unwrap();
        assert!(frame.stats.patches > 1);
        assert_seams_match(&frame);
    }

    let frame = terrain.frame(Vec3::new(8.0, 8.0, 0.0)).unwrap();
    let patches = by_coord(&frame);
    assert_eq!(patches[&PatchCoord::new(0, 0)].lod, 0);
    // Center 32 units away selects LOD 4 > max and is culled; (1, 0) at 16
    // units selects LOD 2 and is refined to 1.
    assert_eq!(patches[&PatchCoord::new(1, 0)].lod, 1);
    assert!(!patches.contains_key(&PatchCoord::new(2, 0)));
}

#[test]
fn fans_stay_within_index_bounds() {
    let mut terrain = terrain(40.0);
    let frame = terrain.frame(Vec3::new(60.0, 90.0, 10.0)).unwrap();
    let vertex_count = PATCH_SIZE * PATCH_SIZE;
    for patch in &frame.patches {
        assert_eq!(
            terrain.vertices(patch.coord).unwrap().len(),
            vertex_count as usize
        );
        for fan in patch.fans.iter() {
            assert!((MIN_FAN_INDICES..=MAX_FAN_INDICES).contains(&fan.indices.len()));
            assert!(fan.indices.iter().all(|&i| i < vertex_count));
        }
    }
}

#[test]
fn repeated_frames_are_identical() {
    let mut terrain = terrain(40.0);
    let viewer = Vec3::new(100.0, 40.0, 25.0);
    let first = terrain.frame(viewer).unwrap();
    for _ in 0..5 {
        assert_eq!(terrain.frame(viewer).unwrap(), first);
    }
    assert_eq!(terrain.frame_count(), 6);
}

#[test]
fn moving_viewer_changes_detail() {
    let mut terrain = terrain(40.0);
    let near = terrain.frame(Vec3::new(8.0, 8.0, 0.0)).unwrap();
    let far = terrain.frame(Vec3::new(248.0, 248.0, 0.0)).unwrap();
    let lod_at = |frame: &TerrainFrame, coord: PatchCoord| {
        frame
            .patches
            .iter()
            .find(|p| p.coord == coord)
            .map(|p| p.lod)
    };
    let origin = PatchCoord::new(0, 0);
    assert_eq!(lod_at(&near, origin), Some(0));
    assert_eq!(lod_at(&far, origin), None);
    // The culled patch keeps the LOD it last rendered at.
    assert_eq!(terrain.grid().patch(origin).unwrap().lod, 0);
}

#[test]
fn same_seed_builds_same_terrain() {
    let a = terrain(300.0);
    let b = terrain(300.0);
    let coord = PatchCoord::new(3, 11);
    assert_eq!(a.vertices(coord).unwrap(), b.vertices(coord).unwrap());
}
