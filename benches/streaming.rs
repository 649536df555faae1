use criterion::{criterion_group, criterion_main, Criterion, black_box};

use chunkstream::core::types::Vec3;
use chunkstream::math::Frustum;
use chunkstream::render::RenderQueues;
use chunkstream::streaming::ProximityIndex;
use chunkstream::world::chunk::{ChunkCoord, ChunkStatus};
use chunkstream::world::provider::ChunkProvider;

/// Provider where every chunk is ready
struct ReadyWorld;

impl ChunkProvider for ReadyWorld {
    type View = ();

    fn status(&self, _coord: ChunkCoord) -> ChunkStatus {
        ChunkStatus::Complete
    }

    fn view_around(&self, _coord: ChunkCoord) -> Option<()> {
        Some(())
    }
}

fn bench_proximity_full_rebuild_32(c: &mut Criterion) {
    c.bench_function("proximity_full_rebuild_32", |b| {
        b.iter(|| {
            let mut index = ProximityIndex::new(32);
            index.update(
                black_box(ChunkCoord::new(0, 0)),
                black_box(Vec3::new(8.0, 64.0, 8.0)),
                false,
                &ReadyWorld,
            );
            index.len()
        });
    });
}

fn bench_proximity_one_chunk_step_32(c: &mut Criterion) {
    let mut index = ProximityIndex::new(32);
    index.update(ChunkCoord::new(0, 0), Vec3::new(8.0, 64.0, 8.0), false, &ReadyWorld);
    let mut x = 0;

    c.bench_function("proximity_one_chunk_step_32", |b| {
        b.iter(|| {
            x += 1;
            index.update(
                black_box(ChunkCoord::new(x, 0)),
                black_box(Vec3::new(x as f32 * 16.0 + 8.0, 64.0, 8.0)),
                false,
                &ReadyWorld,
            )
        });
    });
}

fn bench_queue_build_and_drain_1024(c: &mut Criterion) {
    let viewer = Vec3::new(8.0, 64.0, 8.0);
    let coords: Vec<(ChunkCoord, f32)> = (-16..16)
        .flat_map(|x| (-16..16).map(move |z| ChunkCoord::new(x, z)))
        .map(|coord| (coord, coord.distance_to(viewer)))
        .collect();

    c.bench_function("queue_build_and_drain_1024", |b| {
        b.iter(|| {
            let mut queues = RenderQueues::new();
            for &(coord, distance) in black_box(&coords) {
                queues.push_opaque(coord);
                queues.push_water(coord, distance);
            }
            queues.drain()
        });
    });
}

fn bench_frustum_cull_1024(c: &mut Criterion) {
    let view_proj = glam::Mat4::perspective_rh(1.2, 16.0 / 9.0, 0.1, 1000.0)
        * glam::Mat4::look_at_rh(Vec3::new(8.0, 128.0, 8.0), Vec3::new(8.0, 0.0, 200.0), Vec3::Y);
    let frustum = Frustum::from_view_projection(&view_proj);
    let coords: Vec<ChunkCoord> = (-16..16)
        .flat_map(|x| (-16..16).map(move |z| ChunkCoord::new(x, z)))
        .collect();

    c.bench_function("frustum_cull_1024", |b| {
        b.iter(|| {
            coords
                .iter()
                .filter(|coord| frustum.intersects_aabb(black_box(&coord.aabb())))
                .count()
        });
    });
}

criterion_group!(
    benches,
    bench_proximity_full_rebuild_32,
    bench_proximity_one_chunk_step_32,
    bench_queue_build_and_drain_1024,
    bench_frustum_cull_1024
);
criterion_main!(benches);
