//! Cluster culling and tile binning.

use core::ops::Range;

use crate::arena::{BinEntry, Bins};
use crate::config::{DepthConvention, RasterConfig};
use crate::coords::{ScreenRect, Viewport};
use crate::error::{CapacityLimit, RasterError};
use crate::geometry::{screen_bounds, ClusterRecord, Cone, Frustum, Sphere};
use crate::pso::Transform;
use crate::state::{CullMode, RenderState};
use crate::stats::FrameStats;

/// Mutable frame state binning writes into.
pub(crate) struct BinCtx<'a> {
    pub config: &'a RasterConfig,
    pub viewport: Viewport,
    pub tiles_x: u32,
    pub hiz: &'a [f32],
    pub bins: &'a mut Bins,
    pub stats: &'a mut FrameStats,
}

/// What binning needs to know about a draw, independent of its shaders.
pub(crate) struct DrawDesc<'a> {
    pub clusters: &'a [ClusterRecord],
    pub range: Range<usize>,
    pub transform: &'a Transform,
    pub state: &'a RenderState,
    pub varying_bytes: usize,
}

/// Inclusive tile index bounds of a non-empty screen rect.
#[inline]
fn tile_span(rect: ScreenRect, config: &RasterConfig) -> (Range<u32>, Range<u32>) {
    let (tw, th) = (config.tile_width as i32, config.tile_height as i32);
    let xs = (rect.x / tw) as u32..((rect.right() - 1) / tw) as u32 + 1;
    let ys = (rect.y / th) as u32..((rect.bottom() - 1) / th) as u32 + 1;
    (xs, ys)
}

/// Farthest Hi-Z value over a block of tiles.
fn farthest_in(hiz: &[f32], tiles_x: u32, xs: &Range<u32>, ys: &Range<u32>, convention: DepthConvention) -> f32 {
    let mut far = convention.near_value();
    for ty in ys.clone() {
        let row = (ty * tiles_x) as usize;
        for &d in &hiz[row + xs.start as usize..row + xs.end as usize] {
            far = convention.farther(far, d);
        }
    }
    far
}

/// Culls the draw's clusters and records survivors in every overlapped tile.
pub(crate) fn bin_draw(draw: u16, desc: &DrawDesc<'_>, ctx: &mut BinCtx<'_>) -> Result<(), RasterError> {
    let config = ctx.config;
    if desc.varying_bytes > config.max_varying_bytes {
        return Err(RasterError::capacity(CapacityLimit::VaryingSize, config.max_varying_bytes, desc.varying_bytes));
    }

    let object_to_clip = &desc.transform.object_to_clip;
    let frustum = Frustum::from_clip(*object_to_clip);
    let cone_eye = match desc.state.cull {
        CullMode::Back => desc.transform.eye,
        _ => None,
    };
    let convention = config.depth_convention;
    let hiz_on = config.hiz_culling && desc.state.depth.occludable(convention);

    for ci in desc.range.clone() {
        let record = &desc.clusters[ci];
        ctx.stats.clusters_tested += 1;

        let sphere = Sphere::of_cluster(record);
        if !frustum.intersects(&sphere) {
            ctx.stats.clusters_culled_frustum += 1;
            continue;
        }

        if let Some(eye) = cone_eye {
            if Cone::of_cluster(record).is_some_and(|cone| cone.is_backfacing(&sphere, eye)) {
                ctx.stats.clusters_culled_cone += 1;
                continue;
            }
        }

        let bounds = screen_bounds(&sphere, object_to_clip, ctx.viewport);
        if bounds.rect.is_empty() {
            ctx.stats.clusters_culled_frustum += 1;
            continue;
        }
        let near = match convention {
            DepthConvention::Standard => bounds.z_min,
            DepthConvention::Reversed => bounds.z_max,
        };

        let (xs, ys) = tile_span(bounds.rect, config);
        if hiz_on && convention.is_behind(near, farthest_in(ctx.hiz, ctx.tiles_x, &xs, &ys, convention)) {
            ctx.stats.clusters_culled_hiz += 1;
            continue;
        }

        if record.vertex_count as usize > config.max_cluster_vertices {
            return Err(RasterError::capacity(
                CapacityLimit::PtvVertices,
                config.max_cluster_vertices,
                record.vertex_count as usize,
            ));
        }
        if ctx.stats.clusters_binned as usize >= config.max_clusters {
            return Err(RasterError::capacity(
                CapacityLimit::Clusters,
                config.max_clusters,
                ctx.stats.clusters_binned as usize + 1,
            ));
        }

        let entry = BinEntry { near, cluster: ci as u32, draw };
        for ty in ys.clone() {
            for tx in xs.clone() {
                ctx.bins.push((ty * ctx.tiles_x + tx) as usize, entry)?;
            }
        }
        ctx.stats.clusters_binned += 1;
    }

    ctx.stats.strips_used = ctx.bins.strips_used() as u32;
    ctx.stats.bin_entries = ctx.bins.entries_used() as u32;
    log::trace!(
        "draw {draw}: {} clusters binned, {} strips in use",
        ctx.stats.clusters_binned,
        ctx.stats.strips_used
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Mat4, Vec3};

    fn record(center: [f32; 3], radius: f32) -> ClusterRecord {
        ClusterRecord {
            center,
            radius,
            cone_axis: [0.0, 0.0, 1.0],
            cone_cutoff: 2.0,
            vertex_offset: 0,
            vertex_count: 3,
            triangle_offset: 0,
            triangle_count: 1,
        }
    }

    fn camera() -> Transform {
        let proj = Mat4::perspective_rh(90f32.to_radians(), 1.0, 0.1, 100.0);
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 4.0), Vec3::ZERO, Vec3::Y);
        Transform::new(Mat4::IDENTITY, view, proj)
    }

    struct Harness {
        config: RasterConfig,
        bins: Bins,
        hiz: Vec<f32>,
        stats: FrameStats,
    }

    impl Harness {
        fn new(config: RasterConfig) -> Self {
            let (tx, ty) = config.tile_grid(Viewport::new(64, 64));
            let tiles = (tx * ty) as usize;
            Self {
                bins: Bins::new(tiles, config.max_cluster_strips, config.strip_capacity),
                hiz: vec![config.depth_convention.clear_value(); tiles],
                stats: FrameStats::default(),
                config,
            }
        }

        fn bin(&mut self, clusters: &[ClusterRecord], transform: &Transform, state: &RenderState) -> Result<(), RasterError> {
            let (tiles_x, _) = self.config.tile_grid(Viewport::new(64, 64));
            let mut ctx = BinCtx {
                config: &self.config,
                viewport: Viewport::new(64, 64),
                tiles_x,
                hiz: &self.hiz,
                bins: &mut self.bins,
                stats: &mut self.stats,
            };
            let desc = DrawDesc { clusters, range: 0..clusters.len(), transform, state, varying_bytes: 16 };
            bin_draw(0, &desc, &mut ctx)
        }
    }

    fn small() -> RasterConfig {
        RasterConfig::new().with_tile_size(16, 16)
    }

    #[test]
    fn outside_frustum_is_never_binned() {
        let mut h = Harness::new(small());
        h.bin(&[record([100.0, 0.0, 0.0], 1.0), record([0.0, 0.0, 10.0], 1.0)], &camera(), &RenderState::new())
            .unwrap();
        assert_eq!(h.stats.clusters_culled_frustum, 2);
        assert_eq!(h.stats.clusters_binned, 0);
        assert_eq!(h.bins.entries_used(), 0);
    }

    #[test]
    fn small_centered_cluster_lands_in_middle_tiles() {
        let mut h = Harness::new(small());
        h.bin(&[record([0.0, 0.0, 0.0], 0.1)], &camera(), &RenderState::new()).unwrap();
        assert_eq!(h.stats.clusters_binned, 1);
        // The projection straddles the center, touching the four middle tiles.
        for (tx, ty) in [(1, 1), (2, 1), (1, 2), (2, 2)] {
            assert_eq!(h.bins.iter(ty * 4 + tx).count(), 1);
        }
        assert_eq!(h.bins.iter(0).count(), 0);
        assert_eq!(h.stats.bin_entries, 4);
    }

    #[test]
    fn cone_culling_needs_back_face_culling() {
        let mut away = record([0.0, 0.0, 0.0], 0.5);
        away.cone_axis = [0.0, 0.0, -1.0];
        away.cone_cutoff = 0.1;

        let mut h = Harness::new(small());
        h.bin(&[away], &camera(), &RenderState::new()).unwrap();
        assert_eq!(h.stats.clusters_culled_cone, 1);

        let mut h = Harness::new(small());
        h.bin(&[away], &camera(), &RenderState::new().with_cull(CullMode::None)).unwrap();
        assert_eq!(h.stats.clusters_culled_cone, 0);
        assert_eq!(h.stats.clusters_binned, 1);
    }

    #[test]
    fn hiz_rejects_clusters_behind_every_covered_tile() {
        let mut h = Harness::new(small());
        h.hiz.fill(0.5);
        h.bin(&[record([0.0, 0.0, 0.0], 0.1)], &camera(), &RenderState::new()).unwrap();
        assert_eq!(h.stats.clusters_culled_hiz, 1);

        // Hi-Z does not apply when the draw does not test depth.
        let state = RenderState::new().with_depth(crate::state::DepthTest::disabled());
        h.bin(&[record([0.0, 0.0, 0.0], 0.1)], &camera(), &state).unwrap();
        assert_eq!(h.stats.clusters_binned, 1);
    }

    #[test]
    fn limits_are_enforced() {
        let mut h = Harness::new(small().with_max_clusters(1));
        let err = h.bin(&[record([0.0, 0.0, 0.0], 0.1); 2], &camera(), &RenderState::new()).unwrap_err();
        assert!(matches!(err, RasterError::CapacityExceeded { limit: CapacityLimit::Clusters, .. }));

        let mut h = Harness::new(small().with_max_cluster_vertices(2));
        let err = h.bin(&[record([0.0, 0.0, 0.0], 0.1)], &camera(), &RenderState::new()).unwrap_err();
        assert!(matches!(err, RasterError::CapacityExceeded { limit: CapacityLimit::PtvVertices, .. }));

        let mut h = Harness::new(small().with_max_varying_bytes(8));
        let err = h.bin(&[], &camera(), &RenderState::new()).unwrap_err();
        assert!(matches!(err, RasterError::CapacityExceeded { limit: CapacityLimit::VaryingSize, .. }));
    }

    #[test]
    fn tile_span_is_inclusive_of_partial_tiles() {
        let config = small();
        let (xs, ys) = tile_span(ScreenRect::new(15, 16, 2, 16), &config);
        assert_eq!((xs, ys), (0..2, 1..2));
    }
}
