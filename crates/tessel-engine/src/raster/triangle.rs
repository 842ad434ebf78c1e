use glam::{Vec2, Vec3, Vec4, Vec4Swizzles};

use super::clip::{clip_triangle, outside_one_plane, ClipVertex};
use super::interp::{perspective_weights, to_source};
use crate::coords::{ScreenRect, Viewport};
use crate::pixel::Pixel;
use crate::shader::Interpolate;
use crate::state::{CullMode, Interpolation, RenderState};
use crate::stats::FrameStats;

const SUBPIXEL_BITS: u32 = 4;
const SUBPIXEL: f32 = (1 << SUBPIXEL_BITS) as f32;
const HALF_PIXEL: i64 = 1 << (SUBPIXEL_BITS - 1);
const PIXEL: i64 = 1 << SUBPIXEL_BITS;

/// Screen coordinates are clamped to +-2^22 px (2^26 in fixed point) so edge
/// products stay well inside `i64`.
const GUARD_BAND: f32 = (1 << 22) as f32;

/// Fragments this far outside `[0, 1]` depth are discarded.
const DEPTH_EPSILON: f32 = 1e-6;

/// Color and depth of the tile being rasterized.
pub(crate) struct TileTarget<'a, T> {
    pub rect: ScreenRect,
    pub stride: usize,
    pub color: &'a mut [T],
    pub depth: &'a mut [f32],
}

/// Draw-independent inputs of triangle setup.
#[derive(Debug, Copy, Clone)]
pub(crate) struct RasterParams<'a> {
    pub viewport: Viewport,
    pub near_plane: Vec4,
    pub state: &'a RenderState,
}

impl RasterParams<'_> {
    #[inline]
    fn far_plane(&self) -> Vec4 {
        Vec4::W - self.near_plane
    }
}

/// Rasterizes one clip-space triangle into the tile.
///
/// Returns whether any depth value was written.
pub(crate) fn draw_triangle<T, I, S>(
    target: &mut TileTarget<'_, T>,
    params: &RasterParams<'_>,
    clip: [Vec4; 3],
    varyings: &[I; 3],
    stats: &mut FrameStats,
    mut shade: S,
) -> bool
where
    T: Pixel,
    I: Interpolate,
    S: FnMut(&I) -> T,
{
    if outside_one_plane(&clip, params.near_plane, params.far_plane()) {
        stats.triangles_culled += 1;
        return false;
    }

    let poly = clip_triangle(clip, params.near_plane);
    if poly.len() < 3 {
        stats.triangles_culled += 1;
        return false;
    }

    let mut written = false;
    for i in 1..poly.len() - 1 {
        written |= draw_clipped(target, params, [poly[0], poly[i], poly[i + 1]], varyings, stats, &mut shade);
    }
    written
}

#[derive(Debug, Copy, Clone)]
struct Edge {
    /// Value at the first pixel center of the current row.
    row: i64,
    step_x: i64,
    step_y: i64,
    /// 0 for top and left edges, -1 otherwise: pixels exactly on other
    /// edges belong to the neighbouring triangle.
    bias: i64,
}

impl Edge {
    /// Edge `a -> b`, positive on the interior side of a positive-area triangle.
    fn new(a: [i64; 2], b: [i64; 2], start: [i64; 2]) -> Self {
        let dx = b[0] - a[0];
        let dy = b[1] - a[1];
        let is_top = dy == 0 && dx > 0;
        let is_left = dy < 0;
        Self {
            row: dx * (start[1] - a[1]) - dy * (start[0] - a[0]),
            step_x: -dy * PIXEL,
            step_y: dx * PIXEL,
            bias: if is_top || is_left { 0 } else { -1 },
        }
    }
}

#[inline]
fn floor_div(a: i64, b: i64) -> i64 {
    a.div_euclid(b)
}

#[inline]
fn ceil_div(a: i64, b: i64) -> i64 {
    -(-a).div_euclid(b)
}

fn draw_clipped<T, I, S>(
    target: &mut TileTarget<'_, T>,
    params: &RasterParams<'_>,
    mut v: [ClipVertex; 3],
    varyings: &[I; 3],
    stats: &mut FrameStats,
    shade: &mut S,
) -> bool
where
    T: Pixel,
    I: Interpolate,
    S: FnMut(&I) -> T,
{
    if v.iter().any(|c| c.pos.w <= 0.0) {
        stats.triangles_culled += 1;
        return false;
    }

    let fixed = |c: &ClipVertex| -> [i64; 2] {
        let ndc = c.pos.xy() / c.pos.w;
        let s = params.viewport.ndc_to_screen(ndc).clamp(Vec2::splat(-GUARD_BAND), Vec2::splat(GUARD_BAND));
        [(s.x * SUBPIXEL).round() as i64, (s.y * SUBPIXEL).round() as i64]
    };
    let mut p = [fixed(&v[0]), fixed(&v[1]), fixed(&v[2])];

    let area = (p[1][0] - p[0][0]) * (p[2][1] - p[0][1]) - (p[1][1] - p[0][1]) * (p[2][0] - p[0][0]);
    if area == 0 {
        stats.triangles_culled += 1;
        return false;
    }
    // Screen y points down, so counter-clockwise in NDC has negative area here.
    let front = area < 0;
    let culled = match params.state.cull {
        CullMode::None => false,
        CullMode::Back => !front,
        CullMode::Front => front,
    };
    if culled {
        stats.triangles_culled += 1;
        return false;
    }
    if area < 0 {
        v.swap(1, 2);
        p.swap(1, 2);
    }
    let area = area.abs();
    stats.triangles_setup += 1;

    let rect = target.rect;
    let min = |k: usize| p[0][k].min(p[1][k]).min(p[2][k]);
    let max = |k: usize| p[0][k].max(p[1][k]).max(p[2][k]);
    let x0 = ceil_div(min(0) - HALF_PIXEL, PIXEL).max(rect.x as i64);
    let y0 = ceil_div(min(1) - HALF_PIXEL, PIXEL).max(rect.y as i64);
    let x1 = floor_div(max(0) - HALF_PIXEL, PIXEL).min(rect.right() as i64 - 1);
    let y1 = floor_div(max(1) - HALF_PIXEL, PIXEL).min(rect.bottom() as i64 - 1);
    if x0 > x1 || y0 > y1 {
        return false;
    }

    let start = [x0 * PIXEL + HALF_PIXEL, y0 * PIXEL + HALF_PIXEL];
    let mut edges = [Edge::new(p[1], p[2], start), Edge::new(p[2], p[0], start), Edge::new(p[0], p[1], start)];

    let inv_area = 1.0 / area as f32;
    let inv_w = [1.0 / v[0].pos.w, 1.0 / v[1].pos.w, 1.0 / v[2].pos.w];
    let z = [v[0].pos.z * inv_w[0], v[1].pos.z * inv_w[1], v[2].pos.z * inv_w[2]];
    let bary: [Vec3; 3] = [v[0].bary, v[1].bary, v[2].bary];

    let state = params.state;
    let depth = state.depth;
    let mut written = false;

    for py in y0..=y1 {
        let mut e = [edges[0].row, edges[1].row, edges[2].row];
        let row = (py - rect.y as i64) as usize * target.stride;

        for px in x0..=x1 {
            let inside = e[0] + edges[0].bias >= 0 && e[1] + edges[1].bias >= 0 && e[2] + edges[2].bias >= 0;
            if inside {
                let b = [e[0] as f32 * inv_area, e[1] as f32 * inv_area, e[2] as f32 * inv_area];
                let frag_z = b[0] * z[0] + b[1] * z[1] + b[2] * z[2];

                if (-DEPTH_EPSILON..=1.0 + DEPTH_EPSILON).contains(&frag_z) {
                    let frag_z = frag_z.clamp(0.0, 1.0);
                    let idx = row + (px - rect.x as i64) as usize;
                    let pass = !depth.enabled || depth.compare.passes(frag_z, target.depth[idx]);
                    if !pass {
                        stats.pixels_depth_rejected += 1;
                    }

                    if pass || state.debug_disable_depth_gate {
                        let w = match state.interpolation {
                            Interpolation::Perspective => perspective_weights(b, inv_w),
                            Interpolation::Linear => b,
                        };
                        let w = to_source(w, bary);
                        let attrs = I::weighted(&varyings[0], &varyings[1], &varyings[2], w);
                        let src = shade(&attrs);
                        target.color[idx] = src.blend(target.color[idx], state.blend);
                        stats.pixels_shaded += 1;

                        if pass && depth.enabled && depth.write {
                            target.depth[idx] = frag_z;
                            written = true;
                        }
                    }
                }
            }
            for (ek, edge) in e.iter_mut().zip(&edges) {
                *ek += edge.step_x;
            }
        }
        for edge in &mut edges {
            edge.row += edge.step_y;
        }
    }
    written
}
