use std::collections::HashMap;
use std::path::PathBuf;

use cgmath::Point3;

use voxel_world::engine_state::settings::WorldSettings;
use voxel_world::engine_state::voxels::block::STONE;
use voxel_world::engine_state::voxels::chunk::ChunkCoord;
use voxel_world::engine_state::voxels::generation::noise::FlatNoise;
use voxel_world::engine_state::{EngineState, FrameUpdate};

const FRAME_LIMIT: usize = 20_000;
const WIDTH: i32 = 8;
/// Flat noise of 0.5 puts the surface at 20 + mean(22, 10, 40) / 4 = 26.
const SURFACE: i32 = 26;

fn scratch_dir() -> PathBuf {
    std::env::temp_dir().join(format!("voxel-world-lifecycle-{}", fastrand::u64(..)))
}

fn small_settings(save_root: PathBuf, threaded: bool) -> WorldSettings {
    let mut settings = WorldSettings::default();
    settings.chunk_width = WIDTH as usize;
    settings.chunk_height = 48;
    settings.world_size_in_chunks = 8;
    settings.view_distance = 1;
    settings.load_distance = 2;
    settings.terrain.solid_ground_height = 20;
    settings.enable_threading = threaded;
    settings.worker_count = 2;
    settings.save_root = save_root;
    settings
}

fn open_flat(save_root: PathBuf, threaded: bool) -> EngineState {
    EngineState::with_noise(small_settings(save_root, threaded), "flat", 42, |_| {
        Box::new(FlatNoise(0.5))
    })
    .unwrap()
}

/// Centre of chunk (4, 4), a few voxels above the surface.
fn viewer() -> Point3<f32> {
    Point3::new(36.0, 40.0, 36.0)
}

fn mesh_counts(update: &FrameUpdate) -> HashMap<ChunkCoord, usize> {
    let mut counts = HashMap::new();
    for mesh in &update.meshes {
        *counts.entry(mesh.coord).or_insert(0) += 1;
    }
    counts
}

fn settle(engine_state: &mut EngineState) -> FrameUpdate {
    let update = engine_state.run_until_idle(viewer(), FRAME_LIMIT);
    assert!(engine_state.is_idle(), "engine did not settle");
    update
}

#[test]
fn threaded_and_inline_runs_reach_idle() {
    for threaded in [true, false] {
        let root = scratch_dir();
        let mut engine_state =
            EngineState::new(small_settings(root.clone(), threaded), "perlin", 7).unwrap();
        assert_eq!(engine_state.task_manager.is_inline(), !threaded);

        let update = settle(&mut engine_state);
        assert_eq!(update.activated.len(), 9);

        let meshed = mesh_counts(&update);
        for dx in -1..=1 {
            for dz in -1..=1 {
                let coord = ChunkCoord::new(4 + dx, 4 + dz);
                assert!(meshed.contains_key(&coord), "chunk {coord} never meshed");
                let chunk = engine_state.world().chunk(coord).unwrap();
                assert!(chunk.is_editable());
                assert!(chunk.is_active());
            }
        }
        assert!(update.meshes.iter().all(|mesh| !mesh.mesh.is_empty()));

        engine_state.shutdown();
        std::fs::remove_dir_all(root).ok();
    }
}

#[test]
fn flat_world_has_the_expected_column() {
    let root = scratch_dir();
    let mut engine_state = open_flat(root.clone(), false);
    settle(&mut engine_state);

    let world = engine_state.world();
    let id_at = |y: i32| world.voxel_state(Point3::new(35, y, 35)).unwrap().id;
    assert_eq!(id_at(SURFACE), 3);
    assert_eq!(id_at(SURFACE - 1), 6);
    assert_eq!(id_at(SURFACE - 3), 6);
    assert_eq!(id_at(SURFACE - 4), STONE);
    assert_eq!(id_at(SURFACE + 1), 0);
    assert_eq!(id_at(0), 1);

    let light_at = |y: i32| world.voxel_state(Point3::new(35, y, 35)).unwrap().light;
    assert_eq!(light_at(SURFACE + 1), 1.0);
    assert!(light_at(SURFACE - 10) < light_at(SURFACE));

    std::fs::remove_dir_all(root).ok();
}

#[test]
fn boundary_edit_remeshes_owner_and_neighbor_only() {
    for threaded in [true, false] {
        let root = scratch_dir();
        let mut engine_state = open_flat(root.clone(), threaded);
        settle(&mut engine_state);

        // local x = 0, z = 3 of chunk (4, 4): borders chunk (3, 4) only
        let position = Point3::new(4 * WIDTH, SURFACE + 1, 4 * WIDTH + 3);
        assert!(engine_state.edit_voxel(position, STONE));

        let update = settle(&mut engine_state);
        let meshed = mesh_counts(&update);
        let expected: HashMap<ChunkCoord, usize> =
            [(ChunkCoord::new(4, 4), 1), (ChunkCoord::new(3, 4), 1)].into();
        assert_eq!(meshed, expected);
        assert_eq!(
            engine_state.world().voxel_state(position).map(|voxel| voxel.id),
            Some(STONE)
        );

        engine_state.shutdown();
        std::fs::remove_dir_all(root).ok();
    }
}

#[test]
fn repeated_edit_is_applied_once() {
    let root = scratch_dir();
    let mut engine_state = open_flat(root.clone(), true);
    settle(&mut engine_state);
    let chunk = engine_state.world().chunk(ChunkCoord::new(4, 4)).unwrap();
    let quads_before = chunk.mesh().unwrap().quad_count();

    let position = Point3::new(4 * WIDTH + 3, SURFACE + 1, 4 * WIDTH + 3);
    assert!(engine_state.edit_voxel(position, STONE));
    assert!(engine_state.edit_voxel(position, STONE));

    let update = settle(&mut engine_state);
    assert_eq!(update.meshes.len(), 1);
    assert_eq!(update.meshes[0].coord, ChunkCoord::new(4, 4));
    assert_eq!(engine_state.stats().modified, 1);

    // five new faces on the block, one grass top hidden under it
    assert_eq!(update.meshes[0].mesh.quad_count(), quads_before + 4);

    engine_state.shutdown();
    std::fs::remove_dir_all(root).ok();
}

#[test]
fn saved_edits_survive_a_restart() {
    let root = scratch_dir();
    let owner = ChunkCoord::new(4, 4);
    let position = Point3::new(4 * WIDTH + 2, SURFACE + 1, 4 * WIDTH + 5);

    let saved_store = {
        let mut engine_state = open_flat(root.clone(), true);
        settle(&mut engine_state);
        assert!(engine_state.edit_voxel(position, 10));
        settle(&mut engine_state);

        let store = engine_state
            .world()
            .editable_chunk_data(owner)
            .unwrap()
            .map
            .get()
            .clone();
        let report = engine_state.shutdown();
        assert!(report.is_complete());
        assert_eq!(report.written, 1);
        store
    };

    // the stored seed wins over the one passed in
    let mut engine_state =
        EngineState::with_noise(small_settings(root.clone(), false), "flat", 9, |seed| {
            assert_eq!(seed, 42);
            Box::new(FlatNoise(0.5))
        })
        .unwrap();
    settle(&mut engine_state);

    let world = engine_state.world();
    assert_eq!(world.voxel_state(position).map(|voxel| voxel.id), Some(10));
    let loaded_store = world.editable_chunk_data(owner).unwrap().map.get().clone();
    assert_eq!(loaded_store, saved_store);
    assert_eq!(engine_state.stats().modified, 0);

    engine_state.shutdown();
    std::fs::remove_dir_all(root).ok();
}

#[test]
fn shutdown_keeps_edits_that_were_just_accepted() {
    for threaded in [true, false] {
        let root = scratch_dir();
        let position = Point3::new(35, SURFACE + 1, 35);
        {
            let mut engine_state = open_flat(root.clone(), threaded);
            settle(&mut engine_state);
            assert!(engine_state.edit_voxel(position, STONE));

            let report = engine_state.shutdown();
            assert!(report.is_complete());
            assert_eq!(report.written, 1);
        }

        let mut engine_state = open_flat(root.clone(), false);
        settle(&mut engine_state);
        assert_eq!(
            engine_state.world().voxel_state(position).map(|voxel| voxel.id),
            Some(STONE)
        );

        engine_state.shutdown();
        std::fs::remove_dir_all(root).ok();
    }
}

#[test]
fn edits_are_rejected_until_the_chunk_is_editable() {
    let root = scratch_dir();
    let mut engine_state = open_flat(root.clone(), false);
    let inside = Point3::new(35, SURFACE + 1, 35);

    assert!(!engine_state.edit_voxel(inside, STONE));
    assert!(!engine_state.edit_voxel(Point3::new(-1, 10, 3), STONE));
    assert!(!engine_state.edit_voxel(Point3::new(3, 48, 3), STONE));

    settle(&mut engine_state);
    assert!(!engine_state.edit_voxel(inside, 200));
    assert!(engine_state.edit_voxel(inside, STONE));

    std::fs::remove_dir_all(root).ok();
}

#[test]
fn leaving_view_distance_only_deactivates() {
    let root = scratch_dir();
    let mut engine_state = open_flat(root.clone(), false);
    settle(&mut engine_state);

    let east = Point3::new(44.0, 40.0, 36.0);
    let update = engine_state.update(east);
    let mut deactivated = update.deactivated.clone();
    deactivated.sort();
    assert_eq!(
        deactivated,
        vec![
            ChunkCoord::new(3, 3),
            ChunkCoord::new(3, 4),
            ChunkCoord::new(3, 5)
        ]
    );
    assert_eq!(update.activated.len(), 3);

    let west = engine_state.world().chunk(ChunkCoord::new(3, 4)).unwrap();
    assert!(!west.is_active());
    assert!(west.is_editable());
    assert!(west.mesh().is_some());

    engine_state.run_until_idle(east, FRAME_LIMIT);
    assert!(engine_state.is_idle());
    std::fs::remove_dir_all(root).ok();
}
