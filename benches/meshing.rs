use criterion::{criterion_group, criterion_main, Criterion, black_box};

use glam::{IVec3, Mat4, Vec3};

use voxmesh::chunk::chunk::{MeshScratch, RemeshContext};
use voxmesh::chunk::{Chunk, ChunkConfig, ChunkManager, FrameInput, MeshMode, ViewBounds};
use voxmesh::math::Frustum;
use voxmesh::render::HeadlessDevice;
use voxmesh::voxel::{testmaps, VoxelGrid};

fn frame_input(grid: &VoxelGrid) -> FrameInput {
    let size = grid.size();
    let centre = Vec3::new(size.width as f32, size.height as f32, size.depth as f32) * 0.5;
    let eye = centre + Vec3::new(0.0, 0.0, size.depth as f32 * 1.5);
    let view = Mat4::look_at_rh(eye, centre, Vec3::Y);
    let proj = Mat4::perspective_rh(std::f32::consts::FRAC_PI_2, 1.0, 0.1, 1000.0);
    FrameInput {
        frustum: Frustum::from_view_projection(&(proj * view)),
        camera_position: eye,
        view: ViewBounds::full(size),
    }
}

fn bench_chunk_remesh(c: &mut Criterion) {
    let grid = testmaps::ball(64, 32).unwrap();
    let view = ViewBounds::full(grid.size());
    // Chunk crossing the shell
    let coord = IVec3::new(1, 1, 3);

    for (name, mode) in [("chunk_remesh_per_voxel", MeshMode::PerVoxel), ("chunk_remesh_greedy", MeshMode::Greedy)] {
        let ctx = RemeshContext { grid: &grid, camera_chunk: IVec3::new(2, 2, 8), view: &view, mode };
        let mut scratch = MeshScratch::default();
        let mut chunk = Chunk::new(coord, &grid);

        c.bench_function(name, |b| {
            b.iter(|| {
                chunk.invalidate();
                chunk.update(black_box(&ctx), &mut scratch)
            });
        });
    }
}

fn bench_manager_update(c: &mut Criterion) {
    let grid = testmaps::ball(64, 32).unwrap();
    let input = frame_input(&grid);

    for (name, mode) in [("manager_update_per_voxel", MeshMode::PerVoxel), ("manager_update_greedy", MeshMode::Greedy)] {
        let config = ChunkConfig { mesh_mode: mode, ..Default::default() };
        let mut manager = ChunkManager::new(&grid, config);
        let mut device = HeadlessDevice::new();

        c.bench_function(name, |b| {
            b.iter(|| {
                manager.invalidate_all();
                manager.update(&grid, black_box(&input), &mut device).unwrap()
            });
        });
    }
}

fn bench_compute_all_visible_faces(c: &mut Criterion) {
    let mut grid = testmaps::ball(128, 64).unwrap();

    c.bench_function("compute_all_visible_faces_128", |b| {
        b.iter(|| {
            grid.compute_all_visible_faces();
            black_box(grid.visible_face_count())
        });
    });
}

criterion_group!(
    benches,
    bench_chunk_remesh,
    bench_manager_update,
    bench_compute_all_visible_faces,
);
criterion_main!(benches);
