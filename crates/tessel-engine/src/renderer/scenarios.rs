use std::cell::Cell;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};

use super::*;
use crate::config::{DepthConvention, TileOrder};
use crate::device::MemoryDevice;
use crate::error::CapacityLimit;
use crate::geometry::{ClusterLimits, MeshData, Vertex};
use crate::pixel::{BlendMode, L8, Rgb565, RgbF32};
use crate::pso::{Psc, Transform};
use crate::shader::{PixelShader, VertexShader};
use crate::state::{CullMode, DepthTest, Interpolation, RenderState};

// ── fixtures ──────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct Pos {
    p: [f32; 3],
}

impl Vertex for Pos {
    const FORMAT: u32 = 0x7050;
    fn position(&self) -> [f32; 3] {
        self.p
    }
}

/// Clip-space vertex carrying one scalar attribute.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct ClipU {
    clip: [f32; 4],
    u: f32,
}

impl Vertex for ClipU {
    const FORMAT: u32 = 0x7051;
    fn position(&self) -> [f32; 3] {
        let [x, y, z, w] = self.clip;
        [x / w, y / w, z / w]
    }
}

struct Project;

impl VertexShader for Project {
    type Vertex = Pos;
    type Position = Vec4;
    type Varyings = ();

    fn shade(&self, transform: &Transform, v: &Pos) -> (Vec4, ()) {
        (transform.object_to_clip * Vec3::from(v.p).extend(1.0), ())
    }
}

struct RawClip;

impl VertexShader for RawClip {
    type Vertex = ClipU;
    type Position = Vec4;
    type Varyings = f32;

    fn shade(&self, _: &Transform, v: &ClipU) -> (Vec4, f32) {
        (Vec4::from(v.clip), v.u)
    }
}

struct Flat(ColorRgba);

impl<T: Pixel> PixelShader<T> for Flat {
    type Varyings = ();
    fn shade(&self, _: &(), _: u32) -> T {
        T::from_rgba(self.0)
    }
}

struct Gray;

impl<T: Pixel> PixelShader<T> for Gray {
    type Varyings = f32;
    fn shade(&self, u: &f32, _: u32) -> T {
        T::from_rgba(ColorRgba::rgb(*u, *u, *u))
    }
}

struct Counting<'c> {
    hits: &'c Cell<u32>,
    color: ColorRgba,
}

impl<T: Pixel> PixelShader<T> for Counting<'_> {
    type Varyings = ();
    fn shade(&self, _: &(), _: u32) -> T {
        self.hits.set(self.hits.get() + 1);
        T::from_rgba(self.color)
    }
}

const RED: ColorRgba = ColorRgba::rgb(1.0, 0.0, 0.0);
const BLUE: ColorRgba = ColorRgba::rgb(0.0, 0.0, 1.0);

/// Counter-clockwise quad in NDC at depth `z`.
fn quad(x0: f32, y0: f32, x1: f32, y1: f32, z: f32) -> MeshData<Pos> {
    let verts = [
        Pos { p: [x0, y0, z] },
        Pos { p: [x1, y0, z] },
        Pos { p: [x1, y1, z] },
        Pos { p: [x0, y1, z] },
    ];
    MeshData::build(&verts, &[&[0, 1, 2, 0, 2, 3]], ClusterLimits::default())
}

fn full_screen(z: f32) -> MeshData<Pos> {
    quad(-1.0, -1.0, 1.0, 1.0, z)
}

/// Small triangle inside the top-left 32x32 tile of a 64x64 screen.
fn corner_triangle(z: f32) -> MeshData<Pos> {
    let verts = [Pos { p: [-0.8, 0.2, z] }, Pos { p: [-0.4, 0.2, z] }, Pos { p: [-0.8, 0.6, z] }];
    MeshData::build(&verts, &[&[0, 1, 2]], ClusterLimits::default())
}

fn raster<P: Pixel, T: Pixel>(config: RasterConfig, w: u32, h: u32) -> Rasterizer<MemoryDevice<P>, T> {
    Rasterizer::init(config, MemoryDevice::new(w, h)).unwrap()
}

fn no_depth() -> RenderState {
    RenderState::new().with_depth(DepthTest::disabled())
}

// ── init ──────────────────────────────────────────────────────────────────

#[test]
fn init_rejects_invalid_config() {
    let r = Rasterizer::<_, RgbF32>::init(RasterConfig::new().with_tile_size(0, 8), MemoryDevice::<Rgb565>::new(8, 8));
    assert!(matches!(r, Err(RasterError::InvalidConfig(_))));

    let r = Rasterizer::<_, RgbF32>::init(RasterConfig::new(), MemoryDevice::<Rgb565>::new(0, 8));
    assert!(matches!(r, Err(RasterError::InvalidConfig(_))));
}

#[test]
fn depth_buffer_exists_only_when_persistent() {
    let r: Rasterizer<MemoryDevice<Rgb565>, RgbF32> = raster(RasterConfig::new(), 64, 64);
    assert!(r.depth_buffer().is_none());
    let r: Rasterizer<MemoryDevice<Rgb565>, RgbF32> = raster(RasterConfig::new().with_persistent_depth(true), 64, 64);
    assert_eq!(r.depth_buffer().map(<[f32]>::len), Some(64 * 64));
}

// ── basic rendering ───────────────────────────────────────────────────────

#[test]
fn red_triangle_lands_in_one_tile() {
    let mut r = raster::<Rgb565, RgbF32>(RasterConfig::new().with_persistent_depth(true), 64, 64);
    let mesh = corner_triangle(0.5);
    let psc = Psc::new(mesh.as_mesh(), Project, Flat(RED), Transform::default());

    let mut frame = r.begin_frame();
    frame.dispatch_pso(&psc).unwrap();
    let stats = frame.commit().unwrap();

    assert_eq!(stats.dispatches, 1);
    assert_eq!(stats.clusters_binned, 1);
    assert_eq!(stats.bin_entries, 1);
    assert_eq!(stats.tiles_committed, 4);
    assert!(stats.pixels_shaded > 0);

    let red = Rgb565::from_rgba(RED);
    let black = Rgb565::from_rgba(ColorRgba::black());
    assert_eq!(r.device().pixel(9, 22), red);
    assert_eq!(r.device().pixel(20, 12), black);
    assert_eq!(r.device().pixel(40, 40), black);

    let depth = r.depth_buffer().unwrap();
    assert!((depth[22 * 64 + 9] - 0.5).abs() < 1e-5);
    assert_eq!(depth[40 * 64 + 40], 1.0);
    assert_eq!(r.stats(), &stats);
}

#[test]
fn empty_commit_leaves_the_clear_color() {
    let mut r = raster::<Rgb565, RgbF32>(RasterConfig::new(), 64, 48);
    r.device_mut().fill(Rgb565(0xffff));
    r.set_clear_color(BLUE);

    let stats = r.begin_frame().commit().unwrap();
    assert_eq!(stats.tiles_committed, 4);
    let blue = Rgb565::from_rgba(BLUE);
    assert!(r.device().pixels().iter().all(|&p| p == blue));
}

#[test]
fn morton_order_covers_a_ragged_grid() {
    let config = RasterConfig::new().with_tile_size(16, 16).with_tile_order(TileOrder::Morton);
    let mut r = raster::<L8, L8>(config, 80, 40);
    r.set_clear_color(ColorRgba::white());

    let stats = r.begin_frame().commit().unwrap();
    assert_eq!(stats.tiles_committed, 15);
    assert_eq!(r.device().tiles_written(), 15);
    assert!(r.device().pixels().iter().all(|&p| p == L8(255)));
}

#[test]
fn rendering_is_deterministic() {
    let render = || {
        let mut r = raster::<Rgb565, RgbF32>(RasterConfig::new(), 64, 64);
        let a = full_screen(0.7);
        let b = corner_triangle(0.3);
        let back = Psc::new(a.as_mesh(), Project, Flat(BLUE), Transform::default());
        let front = Psc::new(b.as_mesh(), Project, Flat(RED), Transform::default());
        for _ in 0..2 {
            let mut frame = r.begin_frame();
            frame.dispatch_pso(&back).unwrap();
            frame.dispatch_pso(&front).unwrap();
            frame.commit().unwrap();
        }
        (r.device().pixels().to_vec(), *r.stats())
    };
    assert_eq!(render(), render());
}

// ── culling ───────────────────────────────────────────────────────────────

#[test]
fn clusters_outside_the_frustum_are_never_binned() {
    let mut r = raster::<Rgb565, RgbF32>(RasterConfig::new(), 64, 64);
    let mesh = quad(2.0, 2.0, 3.0, 3.0, 0.5);
    let psc = Psc::new(mesh.as_mesh(), Project, Flat(RED), Transform::default());

    let mut frame = r.begin_frame();
    frame.dispatch_pso(&psc).unwrap();
    let stats = frame.commit().unwrap();

    assert_eq!(stats.clusters_tested, 1);
    assert_eq!(stats.clusters_culled_frustum, 1);
    assert_eq!(stats.clusters_binned, 0);
    assert_eq!(stats.vertices_shaded, 0);
    assert_eq!(stats.pixels_shaded, 0);
}

#[test]
fn clusters_facing_away_are_cone_culled() {
    let mesh = MeshData::build(
        &[Pos { p: [-1.0, -1.0, 0.0] }, Pos { p: [1.0, -1.0, 0.0] }, Pos { p: [-1.0, 1.0, 0.0] }],
        &[&[0, 1, 2]],
        ClusterLimits::default(),
    );
    let proj = Mat4::perspective_rh(1.0, 1.0, 0.1, 100.0);
    let behind = Transform::new(Mat4::IDENTITY, Mat4::look_at_rh(Vec3::new(0.0, 0.0, -5.0), Vec3::ZERO, Vec3::Y), proj);
    let in_front = Transform::new(Mat4::IDENTITY, Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y), proj);

    let mut r = raster::<Rgb565, RgbF32>(RasterConfig::new(), 64, 64);

    let culled = Psc::new(mesh.as_mesh(), Project, Flat(RED), behind);
    let mut frame = r.begin_frame();
    frame.dispatch_pso(&culled).unwrap();
    let stats = frame.commit().unwrap();
    assert_eq!(stats.clusters_culled_cone, 1);
    assert_eq!(stats.pixels_shaded, 0);

    let two_sided = Psc::new(mesh.as_mesh(), Project, Flat(RED), behind)
        .with_state(RenderState::new().with_cull(CullMode::None));
    let mut frame = r.begin_frame();
    frame.dispatch_pso(&two_sided).unwrap();
    let stats = frame.commit().unwrap();
    assert_eq!(stats.clusters_culled_cone, 0);
    assert!(stats.pixels_shaded > 0);

    let visible = Psc::new(mesh.as_mesh(), Project, Flat(RED), in_front);
    let mut frame = r.begin_frame();
    frame.dispatch_pso(&visible).unwrap();
    let stats = frame.commit().unwrap();
    assert_eq!(stats.clusters_culled_cone, 0);
    assert!(stats.pixels_shaded > 0);
}

#[test]
fn persistent_depth_feeds_hiz_culling_next_frame() {
    let config = RasterConfig::new().with_persistent_depth(true);
    let mut r = raster::<Rgb565, RgbF32>(config, 64, 64);
    let wall = full_screen(0.1);
    let hidden = quad(-0.1, -0.1, 0.1, 0.1, 0.9);
    let wall = Psc::new(wall.as_mesh(), Project, Flat(BLUE), Transform::default());
    let hidden = Psc::new(hidden.as_mesh(), Project, Flat(RED), Transform::default());

    let mut frame = r.begin_frame();
    frame.dispatch_pso(&wall).unwrap();
    frame.commit().unwrap();

    let mut frame = r.begin_frame();
    frame.dispatch_pso(&hidden).unwrap();
    let stats = frame.commit().unwrap();
    assert_eq!(stats.clusters_culled_hiz, 1);
    assert_eq!(stats.pixels_shaded, 0);

    r.clear_depth();
    let mut frame = r.begin_frame();
    frame.dispatch_pso(&hidden).unwrap();
    let stats = frame.commit().unwrap();
    assert_eq!(stats.clusters_culled_hiz, 0);
    assert!(stats.pixels_shaded > 0);
}

#[test]
fn tile_hiz_skips_entries_behind_earlier_draws_in_the_same_frame() {
    let wall = full_screen(0.1);
    let hidden = quad(-0.1, -0.1, 0.1, 0.1, 0.9);

    for hiz in [true, false] {
        let mut r = raster::<Rgb565, RgbF32>(RasterConfig::new().with_hiz_culling(hiz), 64, 64);
        let hits = Cell::new(0);
        let front = Psc::new(wall.as_mesh(), Project, Flat(BLUE), Transform::default());
        let back = Psc::new(hidden.as_mesh(), Project, Counting { hits: &hits, color: RED }, Transform::default());

        let mut frame = r.begin_frame();
        frame.dispatch_pso(&front).unwrap();
        frame.dispatch_pso(&back).unwrap();
        let stats = frame.commit().unwrap();

        // Both draws are binned before any tile has depth.
        assert_eq!(stats.clusters_culled_hiz, 0);
        assert_eq!(hits.get(), 0);
        assert_eq!(stats.pixels_shaded, 64 * 64);
        if hiz {
            // The quad straddles all four tiles.
            assert_eq!(stats.clusters_occluded_in_tile, 4);
            assert_eq!(stats.pixels_depth_rejected, 0);
        } else {
            assert_eq!(stats.clusters_occluded_in_tile, 0);
            assert!(stats.pixels_depth_rejected > 0);
        }
        assert_eq!(r.device().pixel(32, 32), Rgb565::from_rgba(BLUE));
    }
}

// ── depth ─────────────────────────────────────────────────────────────────

#[test]
fn near_draw_wins_in_either_order() {
    for near_first in [false, true] {
        let mut r = raster::<Rgb565, RgbF32>(RasterConfig::new().with_hiz_culling(false), 64, 64);
        let far = full_screen(0.8);
        let near = quad(-0.5, -0.5, 0.5, 0.5, 0.2);
        let far = Psc::new(far.as_mesh(), Project, Flat(BLUE), Transform::default());
        let near = Psc::new(near.as_mesh(), Project, Flat(RED), Transform::default());

        let mut frame = r.begin_frame();
        if near_first {
            frame.dispatch_pso(&near).unwrap();
            frame.dispatch_pso(&far).unwrap();
        } else {
            frame.dispatch_pso(&far).unwrap();
            frame.dispatch_pso(&near).unwrap();
        }
        let stats = frame.commit().unwrap();

        assert_eq!(r.device().pixel(32, 32), Rgb565::from_rgba(RED));
        assert_eq!(r.device().pixel(2, 2), Rgb565::from_rgba(BLUE));
        assert_eq!(stats.pixels_depth_rejected > 0, near_first);
    }
}

#[test]
fn reversed_depth_keeps_larger_values() {
    let config = RasterConfig::new().with_depth_convention(DepthConvention::Reversed).with_persistent_depth(true);
    let mut r = raster::<Rgb565, RgbF32>(config, 64, 64);
    let state = RenderState::new().with_depth(DepthTest::for_convention(DepthConvention::Reversed));
    let near = full_screen(0.8);
    let far = full_screen(0.2);
    let near = Psc::new(near.as_mesh(), Project, Flat(RED), Transform::default()).with_state(state);
    let far = Psc::new(far.as_mesh(), Project, Flat(BLUE), Transform::default()).with_state(state);

    let mut frame = r.begin_frame();
    frame.dispatch_pso(&near).unwrap();
    frame.dispatch_pso(&far).unwrap();
    frame.commit().unwrap();

    assert_eq!(r.device().pixel(10, 50), Rgb565::from_rgba(RED));
    assert!((r.depth_buffer().unwrap()[50 * 64 + 10] - 0.8).abs() < 1e-5);
}

#[test]
fn depth_gate_skips_shading_unless_debug_flag_is_set() {
    for debug in [false, true] {
        let config = RasterConfig::new().with_hiz_culling(false).with_persistent_depth(true);
        let mut r = raster::<Rgb565, RgbF32>(config, 32, 32);
        let hits = Cell::new(0);
        let near = full_screen(0.2);
        let far = full_screen(0.8);
        let near = Psc::new(near.as_mesh(), Project, Flat(BLUE), Transform::default());
        let far = Psc::new(far.as_mesh(), Project, Counting { hits: &hits, color: RED }, Transform::default())
            .with_state(RenderState::new().with_debug_disable_depth_gate(debug));

        let mut frame = r.begin_frame();
        frame.dispatch_pso(&near).unwrap();
        frame.dispatch_pso(&far).unwrap();
        let stats = frame.commit().unwrap();

        assert_eq!(stats.pixels_depth_rejected, 32 * 32);
        if debug {
            assert_eq!(hits.get(), 32 * 32);
            assert_eq!(r.device().pixel(16, 16), Rgb565::from_rgba(RED));
        } else {
            assert_eq!(hits.get(), 0);
            assert_eq!(r.device().pixel(16, 16), Rgb565::from_rgba(BLUE));
        }
        // Failing fragments never write depth.
        assert!((r.depth_buffer().unwrap()[16 * 32 + 16] - 0.2).abs() < 1e-5);
    }
}

// ── interpolation and blending ────────────────────────────────────────────

/// Quad whose right edge sits four times farther away than its left edge.
fn receding_quad() -> MeshData<ClipU> {
    let verts = [
        ClipU { clip: [-0.8, -0.8, 0.5, 1.0], u: 0.0 },
        ClipU { clip: [3.2, -3.2, 2.0, 4.0], u: 1.0 },
        ClipU { clip: [3.2, 3.2, 2.0, 4.0], u: 1.0 },
        ClipU { clip: [-0.8, 0.8, 0.5, 1.0], u: 0.0 },
    ];
    MeshData::build(&verts, &[&[0, 1, 2, 0, 2, 3]], ClusterLimits::default())
}

#[test]
fn perspective_and_linear_interpolation_differ() {
    let mesh = receding_quad();
    let center = |interpolation| {
        let mut r = raster::<RgbF32, RgbF32>(RasterConfig::new(), 32, 32);
        let psc = Psc::new(mesh.as_mesh(), RawClip, Gray, Transform::default())
            .with_state(no_depth().with_interpolation(interpolation));
        let mut frame = r.begin_frame();
        frame.dispatch_pso(&psc).unwrap();
        frame.commit().unwrap();
        r.device().pixel(16, 16).r
    };

    let linear = center(Interpolation::Linear);
    let perspective = center(Interpolation::Perspective);
    assert!((linear - 0.52).abs() < 0.05, "linear {linear}");
    assert!((perspective - 0.21).abs() < 0.05, "perspective {perspective}");
}

#[test]
fn additive_blend_sums_overlapping_draws() {
    let mut r = raster::<RgbF32, RgbF32>(RasterConfig::new(), 32, 32);
    let mesh = full_screen(0.5);
    let state = no_depth().with_blend(BlendMode::Additive);
    let a = Psc::new(mesh.as_mesh(), Project, Flat(ColorRgba::rgb(0.5, 0.0, 0.0)), Transform::default())
        .with_state(state);
    let b = Psc::new(mesh.as_mesh(), Project, Flat(ColorRgba::rgb(0.0, 0.5, 0.0)), Transform::default())
        .with_state(state);

    let mut frame = r.begin_frame();
    frame.dispatch_pso(&a).unwrap();
    frame.dispatch_pso(&b).unwrap();
    frame.commit().unwrap();

    assert_eq!(r.device().pixel(7, 21), RgbF32::new(0.5, 0.5, 0.0));
}

#[test]
fn tile_shader_sees_color_and_depth() {
    let mut r = raster::<L8, RgbF32>(RasterConfig::new(), 64, 64);
    let mesh = corner_triangle(0.25);
    let psc = Psc::new(mesh.as_mesh(), Project, Flat(RED), Transform::default());

    let mut frame = r.begin_frame();
    frame.dispatch_pso(&psc).unwrap();
    let shade_depth = |tile: &TileView<RgbF32>, x: i32, y: i32| L8((tile.depth(x, y) * 100.0).round() as u8);
    frame.commit_with(&shade_depth).unwrap();

    assert_eq!(r.device().pixel(9, 22), L8(25));
    assert_eq!(r.device().pixel(40, 40), L8(100));
}

// ── capacity ──────────────────────────────────────────────────────────────

#[test]
fn strip_overflow_aborts_the_frame() {
    let config = RasterConfig::new().with_cluster_strips(1, 1);
    let mut r = raster::<Rgb565, RgbF32>(config, 64, 64);
    let big = full_screen(0.5);
    let small = corner_triangle(0.5);
    let big = Psc::new(big.as_mesh(), Project, Flat(RED), Transform::default());
    let small = Psc::new(small.as_mesh(), Project, Flat(RED), Transform::default());

    let mut frame = r.begin_frame();
    let err = frame.dispatch_pso(&big).unwrap_err();
    assert!(matches!(err, RasterError::CapacityExceeded { limit: CapacityLimit::ClusterStrips, .. }));
    assert!(frame.is_poisoned());
    assert!(matches!(frame.dispatch_pso(&small), Err(RasterError::FrameAborted)));
    assert!(matches!(frame.commit(), Err(RasterError::FrameAborted)));
    assert_eq!(r.device().tiles_written(), 0);

    // The next frame starts with empty bins.
    let mut frame = r.begin_frame();
    frame.dispatch_pso(&small).unwrap();
    let stats = frame.commit().unwrap();
    assert_eq!(stats.strips_used, 1);
    assert_eq!(r.device().pixel(9, 22), Rgb565::from_rgba(RED));
}

#[test]
fn dispatch_limit_is_enforced() {
    let mut r = raster::<Rgb565, RgbF32>(RasterConfig::new().with_max_dispatches(1), 32, 32);
    let mesh = full_screen(0.5);
    let psc = Psc::new(mesh.as_mesh(), Project, Flat(RED), Transform::default());

    let mut frame = r.begin_frame();
    frame.dispatch_pso(&psc).unwrap();
    let err = frame.dispatch_pso(&psc).unwrap_err();
    assert!(matches!(err, RasterError::CapacityExceeded { limit: CapacityLimit::Dispatches, capacity: 1, requested: 2 }));
}

#[test]
fn oversized_varyings_are_rejected() {
    let mut r = raster::<RgbF32, RgbF32>(RasterConfig::new().with_max_varying_bytes(2), 32, 32);
    let mesh = receding_quad();
    let psc = Psc::new(mesh.as_mesh(), RawClip, Gray, Transform::default());

    let mut frame = r.begin_frame();
    let err = frame.dispatch_pso(&psc).unwrap_err();
    assert!(matches!(err, RasterError::CapacityExceeded { limit: CapacityLimit::VaryingSize, .. }));
}

#[test]
fn dropped_frame_discards_its_bins() {
    let mut r = raster::<Rgb565, RgbF32>(RasterConfig::new(), 64, 64);
    let mesh = full_screen(0.5);
    let psc = Psc::new(mesh.as_mesh(), Project, Flat(RED), Transform::default());

    {
        let mut frame = r.begin_frame();
        frame.dispatch_pso(&psc).unwrap();
    }
    let stats = r.begin_frame().commit().unwrap();
    assert_eq!(stats.pixels_shaded, 0);
    assert_eq!(r.device().pixel(32, 32), Rgb565::from_rgba(ColorRgba::black()));
    assert_eq!(r.peak_usage().dispatches, 1);
}

// ── vertex cache ──────────────────────────────────────────────────────────

#[test]
fn vertex_cache_reuses_clusters_across_tiles() {
    let mesh = full_screen(0.5);
    let run = |slots| {
        let mut r = raster::<Rgb565, RgbF32>(RasterConfig::new().with_vertex_cache_slots(slots), 64, 64);
        let psc = Psc::new(mesh.as_mesh(), Project, Flat(RED), Transform::default());
        let mut frame = r.begin_frame();
        frame.dispatch_pso(&psc).unwrap();
        (frame.commit().unwrap(), r.device().pixels().to_vec())
    };

    let (cached, cached_px) = run(8);
    assert_eq!(cached.vertex_cache_misses, 1);
    assert_eq!(cached.vertex_cache_hits, 3);
    assert_eq!(cached.vertices_shaded, 4);

    let (uncached, uncached_px) = run(0);
    assert_eq!(uncached.vertex_cache_misses, 4);
    assert_eq!(uncached.vertex_cache_hits, 0);
    assert_eq!(uncached.vertices_shaded, 16);
    assert_eq!(cached_px, uncached_px);
}

// ── transfers ─────────────────────────────────────────────────────────────

#[test]
fn busy_transfer_slots_apply_backpressure() {
    let config = RasterConfig::new().with_transfer_queue_depth(1);
    let device = MemoryDevice::<Rgb565>::new(64, 64).with_transfer(1, 3);
    let mut r: Rasterizer<_, RgbF32> = Rasterizer::init(config, device).unwrap();
    let mesh = corner_triangle(0.5);
    let psc = Psc::new(mesh.as_mesh(), Project, Flat(RED), Transform::default());

    let mut frame = r.begin_frame();
    frame.dispatch_pso(&psc).unwrap();
    let stats = frame.commit().unwrap();

    // Three tiles wait on their predecessor, then commit drains the last one.
    assert_eq!(stats.transfer_waits, 4);
    assert!(!r.device().any_busy());
    assert_eq!(r.device().tiles_written(), 4);
    assert_eq!(r.device().pixel(9, 22), Rgb565::from_rgba(RED));
}

// ── immediate mode ────────────────────────────────────────────────────────

#[test]
fn draw_rect_clips_to_the_screen() {
    let mut r = raster::<L8, L8>(RasterConfig::new(), 16, 16);
    r.draw_rect(-4, -4, 8, 8, &mut |x: i32, y: i32| L8((x + y) as u8 + 1));

    assert_eq!(r.device().spans_written(), 4);
    assert_eq!(r.device().pixel(0, 0), L8(1));
    assert_eq!(r.device().pixel(3, 3), L8(7));
    assert_eq!(r.device().pixel(4, 4), L8(0));

    r.draw_rect(20, 0, 4, 4, &mut |_: i32, _: i32| L8(9));
    assert_eq!(r.device().spans_written(), 4);
}

#[test]
fn fast_draw_rect_writes_rows_in_place() {
    let mut r = raster::<L8, L8>(RasterConfig::new(), 16, 16);
    let mut calls = 0;
    r.fast_draw_rect(2, 3, 5, 2, &mut |_: i32, _: i32| {
        calls += 1;
        L8(200)
    });
    assert_eq!(calls, 10);
    assert_eq!(r.device().pixel(6, 4), L8(200));
    assert_eq!(r.device().pixel(7, 4), L8(0));
}
