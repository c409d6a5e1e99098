//! Build or load a voxel grid, mesh every chunk headless and log statistics.
//!
//! Usage: cargo run --release --bin voxel_stats -- [OPTIONS]
//!
//! Options:
//!   --ball <SIDE>      Ball map edge length (default: 64)
//!   --inner <SIDE>     Hollow core edge length (default: SIDE / 2)
//!   --greedy           Greedy meshing instead of one quad per face
//!   --save <PATH>      Write the generated grid here
//!   --load <PATH>      Read the grid from here, regenerating on mismatch
//!   --config <PATH>    Chunk config json
//!   --jobs <N>         Rayon worker threads (default: all cores)

use std::path::{Path, PathBuf};
use std::time::Instant;

use glam::{Mat4, Vec3};

use voxmesh::chunk::{ChunkConfig, ChunkManager, FrameInput, MeshMode, ViewBounds};
use voxmesh::core::{logging, Result};
use voxmesh::math::Frustum;
use voxmesh::render::HeadlessDevice;
use voxmesh::voxel::{persist, testmaps, GridSize, VoxelGrid};

fn main() {
    logging::init();

    let args: Vec<String> = std::env::args().collect();
    let side = parse_u32_arg(&args, "--ball").unwrap_or(64);
    let inner = parse_u32_arg(&args, "--inner").unwrap_or(side / 2);
    let greedy = args.iter().any(|a| a == "--greedy");
    let save_path = parse_str_arg(&args, "--save").map(PathBuf::from);
    let load_path = parse_str_arg(&args, "--load").map(PathBuf::from);
    let config_path = parse_str_arg(&args, "--config").map(PathBuf::from);

    if let Some(jobs) = parse_usize_arg(&args, "--jobs") {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .expect("Failed to configure thread pool");
    }

    let mut config = match &config_path {
        Some(path) => match ChunkConfig::load_sync(path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("Failed to read chunk config {}: {e}", path.display());
                std::process::exit(1);
            }
        },
        None => ChunkConfig::default(),
    };
    if greedy {
        config.mesh_mode = MeshMode::Greedy;
    }

    if let Err(e) = run(side, inner, config, load_path.as_deref(), save_path.as_deref()) {
        log::error!("voxel_stats failed: {e}");
        std::process::exit(1);
    }
}

fn run(side: u32, inner: u32, config: ChunkConfig, load: Option<&Path>, save: Option<&Path>) -> Result<()> {
    let size = GridSize::cubic(side);
    let generate = || -> Result<VoxelGrid> {
        let start = Instant::now();
        let grid = testmaps::ball(side, inner)?;
        log::info!("Generated {}³ ball (inner {}) in {:.1}ms", side, inner, ms(start));
        Ok(grid)
    };

    let mut grid = match load {
        Some(path) => persist::load_or_generate(path, size, generate)?,
        None => generate()?,
    };
    grid.set_policy(config.policy);

    let slopes = grid.assign_slope_dirs();
    let hidden = grid.undefine_hidden_voxels();
    grid.compute_all_visible_faces();
    log::info!(
        "{} slopes shaped, {} hidden voxels undefined, {} visible faces",
        slopes, hidden, grid.visible_face_count()
    );

    if let Some(path) = save {
        persist::save(&grid, path)?;
    }

    let start = Instant::now();
    let mut manager = ChunkManager::new(&grid, config);
    let mut device = HeadlessDevice::new();
    let input = looking_down(&grid);
    let stats = manager.update(&grid, &input, &mut device)?;
    let update_ms = ms(start);
    manager.draw(&mut device);

    log::info!(
        "{:?} mesh: {} chunks rendered, {} remeshed, {} vertices in {:.1}ms",
        config.mesh_mode, stats.chunks_rendered, stats.chunk_recalcs, stats.vertices_rendered, update_ms
    );
    log::info!(
        "{} draws, {} buffers, {} KiB uploaded",
        device.draws.len(), device.buffers_created, device.bytes_written / 1024
    );
    Ok(())
}

/// Camera above the grid centre looking straight down with everything in view
fn looking_down(grid: &VoxelGrid) -> FrameInput {
    let size = grid.size();
    let centre = Vec3::new(size.width as f32, size.height as f32, size.depth as f32) * 0.5;
    let eye = centre + Vec3::new(0.0, 0.0, size.depth as f32 * 1.5);
    let view = Mat4::look_at_rh(eye, centre, Vec3::Y);
    let proj = Mat4::perspective_rh(std::f32::consts::FRAC_PI_2, 1.0, 0.1, size.depth as f32 * 4.0);
    FrameInput {
        frustum: Frustum::from_view_projection(&(proj * view)),
        camera_position: eye,
        view: ViewBounds::full(size),
    }
}

fn ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

fn parse_u32_arg(args: &[String], flag: &str) -> Option<u32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_usize_arg(args: &[String], flag: &str) -> Option<usize> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}
