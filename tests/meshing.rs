use std::sync::Arc;

use cgmath::Point3;
use voxel_world::{
    greedy_mesh, is_solid, AirSampler, Chunk, ChunkCoord, NeighborSampler, Quad, UniformGenerator,
    World, CHUNK_DIMENSION,
};

fn random_chunk(seed: u64, fill: f32) -> Chunk {
    let mut chunk = Chunk::new(Point3::new(0, 0, 0));
    let mut rng = fastrand::Rng::with_seed(seed);
    for y in 0..CHUNK_DIMENSION {
        for z in 0..CHUNK_DIMENSION {
            for x in 0..CHUNK_DIMENSION {
                if rng.f32() < fill {
                    chunk.set(x, y, z, rng.u8(1..5));
                }
            }
        }
    }
    chunk
}

fn exposed_faces(chunk: &Chunk) -> usize {
    let mut count = 0;
    for (position, _) in chunk.solid_blocks() {
        for axis in 0..3 {
            for sign in [-1, 1] {
                let mut neighbor = [position.x, position.y, position.z];
                neighbor[axis] += sign;
                if !is_solid(chunk.get(neighbor[0], neighbor[1], neighbor[2])) {
                    count += 1;
                }
            }
        }
    }
    count
}

/// The voxel a quad cell shows, in chunk-local coordinates.
fn owner(quad: &Quad, i: usize, j: usize) -> [i32; 3] {
    let mut local = [0i32; 3];
    local[quad.axis] = if quad.normal_sign > 0 {
        quad.plane() - 1
    } else {
        quad.plane()
    };
    local[(quad.axis + 1) % 3] = i as i32;
    local[(quad.axis + 2) % 3] = j as i32;
    local
}

#[test]
fn quads_cover_every_exposed_face_exactly_once() {
    for (seed, fill) in [(1, 0.1), (2, 0.5), (3, 0.9)] {
        let chunk = random_chunk(seed, fill);
        let mesh = greedy_mesh(&chunk, &AirSampler).unwrap();

        let covered: usize = mesh.quads.iter().map(Quad::area).sum();
        assert_eq!(covered, exposed_faces(&chunk), "seed {}", seed);
        assert_eq!(mesh.vertex_count(), mesh.quad_count() * 4);
        assert_eq!(mesh.triangle_count(), mesh.quad_count() * 2);
    }
}

#[test]
fn quads_only_merge_faces_of_one_block_id() {
    let chunk = random_chunk(4, 0.6);
    let mesh = greedy_mesh(&chunk, &AirSampler).unwrap();

    for quad in &mesh.quads {
        for (i, j) in quad.cells() {
            let [x, y, z] = owner(quad, i, j);
            assert_eq!(chunk.get(x, y, z), quad.block_id);

            let mut beyond = [x, y, z];
            beyond[quad.axis] += quad.normal_sign as i32;
            assert!(!is_solid(chunk.get(beyond[0], beyond[1], beyond[2])));
        }
    }
}

#[test]
fn faces_between_loaded_chunks_are_culled() {
    let mut world = World::new(Arc::new(UniformGenerator::new(2)));
    let west = world.add_chunk_at(ChunkCoord::new(0, 0, 0));
    world.add_chunk_at(ChunkCoord::new(1, 0, 0));

    let mesh = greedy_mesh(&west.get(), &world).unwrap();
    assert_eq!(mesh.quad_count(), 5);
    assert!(mesh
        .quads
        .iter()
        .all(|quad| !(quad.axis == 0 && quad.plane() == CHUNK_DIMENSION)));

    let isolated = greedy_mesh(&west.get(), &AirSampler).unwrap();
    assert_eq!(isolated.quad_count(), 6);
}

#[test]
fn closures_can_stand_in_for_neighbors() {
    let mut chunk = Chunk::new(Point3::new(0, 0, 0));
    chunk.set(0, 0, 0, 1);

    let solid_below = |_x: i32, y: i32, _z: i32| -> u8 { if y < 0 { 3 } else { 0 } };
    assert_eq!(solid_below.sample(0, -1, 0), 3);

    let mesh = greedy_mesh(&chunk, &solid_below).unwrap();
    assert_eq!(mesh.quad_count(), 5);
}
