use std::path::PathBuf;
use std::sync::Arc;

use voxel_world::{
    ChunkPath, CpuGeometryStore, EngineConfig, EngineState, GeneratorKind, CHUNK_DIMENSION,
};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("voxel_world_engine_{}", name));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

fn engine(config: EngineConfig) -> (EngineState, Arc<CpuGeometryStore>) {
    let store = Arc::new(CpuGeometryStore::new());
    (EngineState::with_geometry_store(config, store.clone()), store)
}

#[test]
fn saved_edits_survive_a_restart() {
    let dir = scratch_dir("restart");
    let config = EngineConfig {
        save_directory: dir.clone(),
        generator: GeneratorKind::Heightmap,
        spawn_radius: 1,
        ..EngineConfig::default()
    };

    let (mut first, _) = engine(config.clone());
    first.init();
    assert!(first.set_block(3, 12, 3, 4));
    assert!(first.set_block(-1, 0, -1, 0));
    assert_eq!(first.save_all(), 9);
    first.shutdown();

    let (mut second, _) = engine(config);
    second.init();
    assert_eq!(second.world().sample_block(3, 12, 3), 0);
    assert_eq!(second.load_all(), 9);
    assert_eq!(second.world().sample_block(3, 12, 3), 4);
    assert_eq!(second.world().sample_block(-1, 0, -1), 0);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn missing_save_files_are_not_fatal() {
    let config = EngineConfig {
        save_directory: scratch_dir("missing"),
        generator: GeneratorKind::Solid,
        spawn_radius: 0,
        ..EngineConfig::default()
    };
    let (mut engine, _) = engine(config);
    engine.init();
    assert_eq!(engine.load_all(), 0);
    assert_eq!(engine.world().sample_block(0, 0, 0), 1);
    assert_eq!(engine.draw_list().len(), 1);
}

#[test]
fn remeshing_never_leaks_geometry() {
    let (mut engine, store) = engine(EngineConfig {
        generator: GeneratorKind::Solid,
        spawn_radius: 1,
        ..EngineConfig::default()
    });
    engine.init();
    assert_eq!(store.live_count(), 9);

    for x in 0..CHUNK_DIMENSION {
        engine.set_block(x, 8, 8, 0);
    }
    assert_eq!(store.live_count(), 9);
    assert_eq!(store.total_uploads() - store.total_releases(), 9);

    engine.shutdown();
    assert_eq!(store.live_count(), 0);
}

#[test]
fn deep_neighbors_cull_their_shared_face() {
    let (mut engine, store) = engine(EngineConfig {
        generator: GeneratorKind::Solid,
        spawn_radius: 0,
        ..EngineConfig::default()
    });

    let mut parent = ChunkPath::root();
    for _ in 0..11 {
        parent.append(3, 3, 1);
    }
    let east = parent.child(3, 3, 1);
    let west = parent.child(2, 3, 1);

    assert!(engine.request_chunk(east.clone()));
    assert!(engine.request_chunk(west.clone()));
    assert!(!engine.request_chunk(east.clone()));

    let draw_list = engine.draw_list();
    assert_eq!(draw_list.len(), 2);
    assert!(draw_list.iter().all(|record| record.quad_count == 5));
    assert_eq!(draw_list[0].origin.x.wrapping_add(CHUNK_DIMENSION), draw_list[1].origin.x);
    assert_eq!(store.live_count(), 2);
}

#[test]
fn emptied_chunk_drops_out_of_the_draw_list() {
    let (mut engine, store) = engine(EngineConfig {
        generator: GeneratorKind::Empty,
        spawn_radius: 0,
        ..EngineConfig::default()
    });
    engine.init();
    assert!(engine.draw_list().is_empty());

    engine.set_block(4, 4, 4, 2);
    assert_eq!(engine.draw_list().len(), 1);
    assert_eq!(store.live_count(), 1);

    engine.set_block(4, 4, 4, 0);
    assert!(engine.draw_list().is_empty());
    assert_eq!(store.live_count(), 0);
}

#[test]
fn background_workers_match_inline_draw_lists() {
    let base = EngineConfig {
        generator: GeneratorKind::Random,
        seed: 3,
        spawn_radius: 1,
        ..EngineConfig::default()
    };

    let (mut inline, _) = engine(base.clone());
    inline.init();
    inline.request_chunk(ChunkPath::root().child(2, 0, 0));

    let (mut workers, _) = engine(EngineConfig {
        mesh_workers: 4,
        ..base
    });
    workers.init();
    workers.flush();
    workers.request_chunk(ChunkPath::root().child(2, 0, 0));
    while workers.pending_tasks() > 0 {
        workers.frame();
    }

    let summary = |engine: &EngineState| -> Vec<_> {
        engine
            .draw_list()
            .into_iter()
            .map(|record| (record.identifier, record.quad_count, record.triangle_count))
            .collect()
    };
    assert_eq!(summary(&inline), summary(&workers));
}

#[test]
fn config_file_drives_the_engine() {
    let dir = scratch_dir("config");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("config.json");
    std::fs::write(&path, r#"{ "generator": "solid", "spawn_radius": 0 }"#).unwrap();

    let config = EngineConfig::load(&path).unwrap();
    assert_eq!(config.mesh_workers, 0);
    let (mut engine, _) = engine(config);
    assert_eq!(engine.init(), 1);
    assert_eq!(engine.draw_list()[0].quad_count, 6);

    assert!(EngineConfig::load(dir.join("absent.json")).is_err());
    let _ = std::fs::remove_dir_all(&dir);
}
