//! Pipeline state: what one dispatch draws and how.
//!
//! A [`Psc`] bundles a mesh, a vertex shader, a pixel shader, a transform
//! and fixed-function [`RenderState`]. Frames keep dispatched draws as
//! `&dyn DrawCall<T>`; the single virtual call per bin entry lands in the
//! draw's fully monomorphized cluster rasterizer.

use core::ops::Range;

use glam::{Mat4, Vec3, Vec4};

use crate::arena::{PtvCache, PtvLookup};
use crate::binning::{bin_draw, BinCtx, DrawDesc};
use crate::coords::Viewport;
use crate::error::RasterError;
use crate::geometry::{Eye, Mesh, Vertex};
use crate::pixel::Pixel;
use crate::raster::{draw_triangle, RasterParams, TileTarget};
use crate::shader::{ClipPosition, PixelShader, VertexShader};
use crate::state::RenderState;
use crate::stats::FrameStats;

/// Object-to-clip transform plus what culling needs to know about the camera.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub model: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
    pub object_to_clip: Mat4,
    /// Camera in object space; `None` disables cone culling.
    pub eye: Option<Eye>,
}

impl Default for Transform {
    fn default() -> Self {
        Self::from_clip(Mat4::IDENTITY)
    }
}

impl Transform {
    /// Right-handed model, view and projection matrices.
    ///
    /// A projection whose last row is `(0, 0, 0, 1)` is treated as
    /// orthographic.
    pub fn new(model: Mat4, view: Mat4, projection: Mat4) -> Self {
        let model_view = view * model;
        let eye = if model_view.determinant().abs() > f32::EPSILON {
            let inv = model_view.inverse();
            if projection.row(3) == Vec4::W {
                Some(Eye::Direction(inv.transform_vector3(Vec3::NEG_Z).normalize_or_zero()))
            } else {
                Some(Eye::Position(inv.transform_point3(Vec3::ZERO)))
            }
        } else {
            None
        };

        Self { model, view, projection, object_to_clip: projection * model_view, eye }
    }

    /// A precomputed object-to-clip matrix; cone culling is off.
    pub fn from_clip(object_to_clip: Mat4) -> Self {
        Self {
            model: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            projection: object_to_clip,
            object_to_clip,
            eye: None,
        }
    }

    pub fn with_eye(mut self, eye: Option<Eye>) -> Self {
        self.eye = eye;
        self
    }
}

/// Pipeline state and content of one draw.
#[derive(Debug, Clone)]
pub struct Psc<'a, V, VS, PS> {
    pub mesh: Mesh<'a, V>,
    pub vertex_shader: VS,
    pub pixel_shader: PS,
    pub transform: Transform,
    pub state: RenderState,
    /// Draw one segment instead of the whole mesh.
    pub segment: Option<usize>,
}

impl<'a, V, VS, PS> Psc<'a, V, VS, PS> {
    pub fn new(mesh: Mesh<'a, V>, vertex_shader: VS, pixel_shader: PS, transform: Transform) -> Self {
        Self { mesh, vertex_shader, pixel_shader, transform, state: RenderState::new(), segment: None }
    }

    pub fn with_state(mut self, state: RenderState) -> Self {
        self.state = state;
        self
    }

    pub fn with_segment(mut self, segment: usize) -> Self {
        self.segment = Some(segment);
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Clusters this draw covers; empty for an unknown segment.
    pub fn clusters(&self) -> Range<usize> {
        match self.segment {
            None => 0..self.mesh.cluster_count(),
            Some(i) => self.mesh.segment(i).unwrap_or_else(|| {
                log::warn!("segment {i} out of range ({} segments), drawing nothing", self.mesh.segment_count());
                0..0
            }),
        }
    }
}

/// Per-tile state a draw rasterizes into.
pub(crate) struct TileCtx<'a, T> {
    pub target: TileTarget<'a, T>,
    pub ptv: &'a mut PtvCache,
    pub viewport: Viewport,
    pub near_plane: Vec4,
    pub stats: &'a mut FrameStats,
}

/// Type-erased dispatched draw.
pub(crate) trait DrawCall<T: Pixel> {
    fn state(&self) -> &RenderState;

    fn bin(&self, draw: u16, ctx: &mut BinCtx<'_>) -> Result<(), RasterError>;

    /// Rasterizes `cluster` into the tile; returns whether depth was written.
    fn rasterize(&self, draw: u16, cluster: u32, ctx: &mut TileCtx<'_, T>) -> bool;
}

impl<T, V, VS, PS> DrawCall<T> for Psc<'_, V, VS, PS>
where
    T: Pixel,
    V: Vertex,
    VS: VertexShader<Vertex = V>,
    PS: PixelShader<T>,
    PS::Varyings: From<VS::Varyings>,
{
    fn state(&self) -> &RenderState {
        &self.state
    }

    fn bin(&self, draw: u16, ctx: &mut BinCtx<'_>) -> Result<(), RasterError> {
        let desc = DrawDesc {
            clusters: self.mesh.clusters(),
            range: self.clusters(),
            transform: &self.transform,
            state: &self.state,
            varying_bytes: size_of::<PS::Varyings>(),
        };
        bin_draw(draw, &desc, ctx)
    }

    fn rasterize(&self, draw: u16, cluster: u32, ctx: &mut TileCtx<'_, T>) -> bool {
        let c = self.mesh.cluster(cluster as usize);

        let slot = match ctx.ptv.lookup(draw, cluster) {
            PtvLookup::Hit(slot) => {
                ctx.stats.vertex_cache_hits += 1;
                slot
            }
            PtvLookup::Miss(slot) => {
                ctx.stats.vertex_cache_misses += 1;
                let mut out = ctx.ptv.slot_mut(slot);
                for (i, v) in c.vertices.iter().enumerate() {
                    let (position, varyings) = self.vertex_shader.shade(&self.transform, v);
                    let varyings: PS::Varyings = varyings.into();
                    out.store(i, position.to_clip(), &varyings);
                }
                ctx.stats.vertices_shaded += c.vertices.len() as u32;
                slot
            }
        };

        let ptv = ctx.ptv.slot(slot);
        let params = RasterParams { viewport: ctx.viewport, near_plane: ctx.near_plane, state: &self.state };
        let mut written = false;

        for (t, tri) in c.triangles.iter().enumerate() {
            let primitive = c.record.triangle_offset + t as u32;
            let clip = tri.map(|i| ptv.position(i as usize));
            let varyings = tri.map(|i| ptv.varyings::<PS::Varyings>(i as usize));
            written |= draw_triangle(&mut ctx.target, &params, clip, &varyings, ctx.stats, |v| {
                self.pixel_shader.shade(v, primitive)
            });
        }
        written
    }
}
