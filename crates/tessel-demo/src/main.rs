//! Renders a spinning, textured torus over a floor into an in-memory RGB565
//! display and saves the last frame as a PNG.

mod scene;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use glam::{Mat4, Vec3};
use tessel_engine::logging::{init_logging, LoggingConfig};
use tessel_engine::pixel::{Rgb565, RgbF32};
use tessel_engine::texture::Texture;
use tessel_engine::{ColorRgba, MemoryDevice, Mesh, Pixel, Psc, RasterConfig, Rasterizer, TileOrder, Transform};

use scene::{checker_texture, dither, floor, torus, DemoVertex, Lambert, Shaded, Textured};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Order {
    /// Row-major.
    Linear,
    /// Z-order curve.
    Morton,
}

impl From<Order> for TileOrder {
    fn from(o: Order) -> Self {
        match o {
            Order::Linear => TileOrder::Linear,
            Order::Morton => TileOrder::Morton,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "tessel-demo", version, about = "Tile-based software rasterizer demo")]
struct Args {
    #[arg(long, default_value_t = 320)]
    width: u32,

    #[arg(long, default_value_t = 240)]
    height: u32,

    /// Square tile edge in pixels.
    #[arg(long, default_value_t = 32)]
    tile: u32,

    /// Frames to render; the last one is saved.
    #[arg(long, default_value_t = 24)]
    frames: u32,

    #[arg(long, short, default_value = "tessel.png")]
    output: PathBuf,

    #[arg(long, value_enum, default_value_t = Order::Morton)]
    order: Order,

    /// Post-transform cache slots (0 disables the cache).
    #[arg(long, default_value_t = 8)]
    cache_slots: usize,

    /// Simulated DMA slots on the display (0 writes synchronously).
    #[arg(long, default_value_t = 2)]
    transfer_slots: usize,

    /// Log filter, e.g. "debug" or "tessel_engine=trace". Defaults to RUST_LOG.
    #[arg(long)]
    log: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(match &args.log {
        Some(filter) => LoggingConfig::with_filter(filter.as_str()),
        None => LoggingConfig::default(),
    });

    let config = RasterConfig::new()
        .with_tile_size(args.tile, args.tile)
        .with_tile_order(args.order.into())
        .with_vertex_cache_slots(args.cache_slots)
        .with_transfer_queue_depth(args.transfer_slots)
        .with_persistent_depth(false);
    let device = MemoryDevice::<Rgb565>::new(args.width, args.height).with_transfer(args.transfer_slots, 3);
    let mut raster: Rasterizer<_, RgbF32> =
        Rasterizer::init(config, device).context("failed to initialize the rasterizer")?;
    raster.set_clear_color(ColorRgba::rgb(0.05, 0.06, 0.1));

    // Assets go through their blob form, as they would when baked into flash.
    let texture_blob = checker_texture(64, 8);
    let texture = Texture::<Rgb565>::from_blob(&texture_blob).context("checker texture blob")?;
    let torus_blob = torus(1.0, 0.35, 48, 16).to_blob();
    let torus_mesh = Mesh::<DemoVertex>::from_blob(&torus_blob).context("torus mesh blob")?;
    let floor_blob = floor(3.0, -1.0).to_blob();
    let floor_mesh = Mesh::<DemoVertex>::from_blob(&floor_blob).context("floor mesh blob")?;
    log::info!(
        "torus: {} clusters in {} segments, floor: {} clusters",
        torus_mesh.cluster_count(),
        torus_mesh.segment_count(),
        floor_mesh.cluster_count()
    );

    let aspect = args.width as f32 / args.height as f32;
    let projection = Mat4::perspective_rh(60f32.to_radians(), aspect, 0.1, 50.0);
    let lambert = Lambert::new(Vec3::new(0.4, 0.8, 0.3));

    for frame_index in 0..args.frames {
        let t = frame_index as f32 / args.frames.max(1) as f32 * core::f32::consts::TAU;
        let eye = Vec3::new(4.0 * t.cos(), 1.8, 4.0 * t.sin());
        let view = Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y);
        let spin = Mat4::from_rotation_y(t * 2.0) * Mat4::from_rotation_x(-1.1);

        let textured = Psc::new(
            torus_mesh,
            lambert,
            Textured::new(texture),
            Transform::new(spin, view, projection),
        )
        .with_segment(0);
        let gold = Psc::new(
            torus_mesh,
            lambert,
            Shaded(ColorRgba::rgb(0.9, 0.7, 0.2)),
            Transform::new(spin, view, projection),
        )
        .with_segment(1);
        let ground = Psc::new(
            floor_mesh,
            lambert,
            Shaded(ColorRgba::rgb(0.35, 0.4, 0.45)),
            Transform::new(Mat4::IDENTITY, view, projection),
        );

        let mut frame = raster.begin_frame();
        frame.dispatch_pso(&textured).context("dispatching the textured half")?;
        frame.dispatch_pso(&gold).context("dispatching the gold half")?;
        frame.dispatch_pso(&ground).context("dispatching the floor")?;
        let stats = frame.commit_with(&dither).context("committing the frame")?;
        log::debug!(
            "frame {frame_index}: {} clusters binned, {} culled, {} pixels shaded",
            stats.clusters_binned,
            stats.clusters_culled(),
            stats.pixels_shaded
        );

        draw_hud(&mut raster, frame_index + 1, args.frames);
    }

    raster.log_stats();
    save_png(raster.into_device(), &args.output)?;
    log::info!("wrote {}", args.output.display());
    Ok(())
}

/// Progress bar along the bottom edge.
fn draw_hud(raster: &mut Rasterizer<MemoryDevice<Rgb565>, RgbF32>, done: u32, total: u32) {
    let vp = raster.viewport();
    let (w, h) = (vp.width as i32, vp.height as i32);
    if w < 16 || h < 16 {
        return;
    }
    let filled = (w - 8) * done as i32 / total.max(1) as i32;

    let frame_color = Rgb565::from_rgba(ColorRgba::rgb(0.8, 0.8, 0.8));
    raster.fast_draw_rect(3, h - 9, w - 6, 6, &mut |_: i32, _: i32| frame_color);
    raster.fast_draw_rect(4, h - 8, w - 8, 4, &mut |_: i32, _: i32| Rgb565(0));
    // Gradient fill; draw_rect clips if the bar ever overshoots.
    raster.draw_rect(4, h - 8, filled, 4, &mut |x: i32, _: i32| {
        let t = x as f32 / w as f32;
        Rgb565::from_rgba(ColorRgba::rgb(0.2 + 0.8 * t, 0.9 - 0.5 * t, 0.3))
    });
}

fn save_png(device: MemoryDevice<Rgb565>, path: &Path) -> Result<()> {
    let (w, h) = tessel_engine::Device::size(&device);
    let img = image::RgbImage::from_fn(w, h, |x, y| image::Rgb(device.pixel(x, y).to_rgb8()));
    img.save(path).with_context(|| format!("failed to write {}", path.display()))
}
