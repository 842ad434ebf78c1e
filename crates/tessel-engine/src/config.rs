//! Static budgets for every buffer the rasterizer owns.
//!
//! A [`RasterConfig`] is usually a `const` next to `main`:
//!
//! ```
//! use tessel_engine::config::{RasterConfig, TileOrder};
//!
//! const CONFIG: RasterConfig = RasterConfig::new()
//!     .with_tile_size(16, 16)
//!     .with_tile_order(TileOrder::Linear)
//!     .with_max_clusters(256)
//!     .with_vertex_cache_slots(4);
//! # assert_eq!(CONFIG.tile_width, 16);
//! ```

use glam::Vec4;

use crate::coords::Viewport;
use crate::error::RasterError;
use crate::pixel::Pixel;

/// Upper bound for `max_dispatches`; dispatch slots live inline in the frame.
pub const MAX_DISPATCH_SLOTS: usize = 64;

/// Order in which tiles are rasterized and transferred.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum TileOrder {
    /// Row by row.
    Linear,
    /// Z-order curve; keeps neighbouring tiles close in time so clusters
    /// spanning them stay in the vertex cache.
    #[default]
    Morton,
}

/// Meaning of depth values.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum DepthConvention {
    /// Near plane at 0, far at 1; cleared to 1.
    #[default]
    Standard,
    /// Near plane at 1, far at 0; cleared to 0.
    Reversed,
}

impl DepthConvention {
    /// Depth buffer clear value (the far plane).
    #[inline]
    pub const fn clear_value(self) -> f32 {
        match self {
            DepthConvention::Standard => 1.0,
            DepthConvention::Reversed => 0.0,
        }
    }

    /// Depth of the near plane.
    #[inline]
    pub const fn near_value(self) -> f32 {
        match self {
            DepthConvention::Standard => 0.0,
            DepthConvention::Reversed => 1.0,
        }
    }

    /// Whether `a` lies strictly behind `b`.
    #[inline]
    pub fn is_behind(self, a: f32, b: f32) -> bool {
        match self {
            DepthConvention::Standard => a > b,
            DepthConvention::Reversed => a < b,
        }
    }

    #[inline]
    pub fn farther(self, a: f32, b: f32) -> f32 {
        if self.is_behind(b, a) { b } else { a }
    }

    #[inline]
    pub fn nearer(self, a: f32, b: f32) -> f32 {
        if self.is_behind(b, a) { a } else { b }
    }

    /// Clip-space plane of the near clip boundary, positive on the visible side.
    #[inline]
    pub const fn near_plane(self) -> Vec4 {
        match self {
            DepthConvention::Standard => Vec4::new(0.0, 0.0, 1.0, 0.0),
            DepthConvention::Reversed => Vec4::new(0.0, 0.0, -1.0, 1.0),
        }
    }
}

/// Rasterizer configuration. Every buffer is sized from it once, at init.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RasterConfig {
    pub tile_width: u32,
    pub tile_height: u32,
    pub tile_order: TileOrder,
    /// Dispatches between two commits, at most [`MAX_DISPATCH_SLOTS`].
    pub max_dispatches: usize,
    /// Clusters binned per frame.
    pub max_clusters: usize,
    /// Strip nodes per frame.
    pub max_cluster_strips: usize,
    /// Bin entries per strip node.
    pub strip_capacity: usize,
    /// Vertices per post-transform slot, at most 256.
    pub max_cluster_vertices: usize,
    /// Bytes of varyings per vertex.
    pub max_varying_bytes: usize,
    /// Post-transform cache slots; 0 disables caching.
    pub vertex_cache_slots: usize,
    /// Display-format tile buffers; 0 transfers synchronously.
    pub transfer_queue_depth: usize,
    /// Keep a frame-sized depth buffer across frames.
    pub persistent_depth: bool,
    pub depth_convention: DepthConvention,
    pub hiz_culling: bool,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RasterConfig {
    pub const fn new() -> Self {
        Self {
            tile_width: 32,
            tile_height: 32,
            tile_order: TileOrder::Morton,
            max_dispatches: 16,
            max_clusters: 1024,
            max_cluster_strips: 512,
            strip_capacity: 16,
            max_cluster_vertices: 64,
            max_varying_bytes: 64,
            vertex_cache_slots: 8,
            transfer_queue_depth: 2,
            persistent_depth: false,
            depth_convention: DepthConvention::Standard,
            hiz_culling: true,
        }
    }

    pub const fn with_tile_size(mut self, width: u32, height: u32) -> Self {
        self.tile_width = width;
        self.tile_height = height;
        self
    }

    pub const fn with_tile_order(mut self, order: TileOrder) -> Self {
        self.tile_order = order;
        self
    }

    pub const fn with_max_dispatches(mut self, n: usize) -> Self {
        self.max_dispatches = n;
        self
    }

    pub const fn with_max_clusters(mut self, n: usize) -> Self {
        self.max_clusters = n;
        self
    }

    pub const fn with_cluster_strips(mut self, strips: usize, capacity: usize) -> Self {
        self.max_cluster_strips = strips;
        self.strip_capacity = capacity;
        self
    }

    pub const fn with_max_cluster_vertices(mut self, n: usize) -> Self {
        self.max_cluster_vertices = n;
        self
    }

    pub const fn with_max_varying_bytes(mut self, n: usize) -> Self {
        self.max_varying_bytes = n;
        self
    }

    pub const fn with_vertex_cache_slots(mut self, n: usize) -> Self {
        self.vertex_cache_slots = n;
        self
    }

    pub const fn with_transfer_queue_depth(mut self, n: usize) -> Self {
        self.transfer_queue_depth = n;
        self
    }

    pub const fn with_persistent_depth(mut self, on: bool) -> Self {
        self.persistent_depth = on;
        self
    }

    pub const fn with_depth_convention(mut self, convention: DepthConvention) -> Self {
        self.depth_convention = convention;
        self
    }

    pub const fn with_hiz_culling(mut self, on: bool) -> Self {
        self.hiz_culling = on;
        self
    }

    /// Tile grid dimensions for a viewport.
    #[inline]
    pub const fn tile_grid(&self, viewport: Viewport) -> (u32, u32) {
        (viewport.width.div_ceil(self.tile_width), viewport.height.div_ceil(self.tile_height))
    }

    #[inline]
    pub const fn tile_pixels(&self) -> usize {
        self.tile_width as usize * self.tile_height as usize
    }

    /// PTV slots carved at init: the cache slots, or one scratch slot.
    #[inline]
    pub const fn ptv_slots(&self) -> usize {
        if self.vertex_cache_slots == 0 { 1 } else { self.vertex_cache_slots }
    }

    pub fn validate(&self, viewport: Viewport) -> Result<(), RasterError> {
        if !viewport.is_valid() {
            return Err(RasterError::InvalidConfig("device size must be non-zero"));
        }
        if self.tile_width == 0 || self.tile_height == 0 {
            return Err(RasterError::InvalidConfig("tile size must be non-zero"));
        }
        if self.max_dispatches == 0 || self.max_dispatches > MAX_DISPATCH_SLOTS {
            return Err(RasterError::InvalidConfig("max_dispatches must be in 1..=64"));
        }
        if self.max_cluster_vertices == 0 || self.max_cluster_vertices > tessel_asset::MAX_CLUSTER_VERTICES {
            return Err(RasterError::InvalidConfig("max_cluster_vertices must be in 1..=256"));
        }
        if self.strip_capacity == 0 {
            return Err(RasterError::InvalidConfig("strip_capacity must be non-zero"));
        }
        if self.max_clusters == 0 || self.max_cluster_strips == 0 {
            return Err(RasterError::InvalidConfig("max_clusters and max_cluster_strips must be non-zero"));
        }
        if self.max_cluster_strips > u32::MAX as usize {
            return Err(RasterError::InvalidConfig("max_cluster_strips must fit in 32 bits"));
        }
        Ok(())
    }

    /// Bytes each buffer category takes for tile format `T` and display format `D`.
    pub fn footprint<T: Pixel, D: Pixel>(&self, viewport: Viewport) -> Footprint {
        let (tx, ty) = self.tile_grid(viewport);
        let tiles = tx as usize * ty as usize;
        let tile_px = self.tile_pixels();
        let f32s = size_of::<f32>();

        Footprint {
            tile_color: tile_px * T::BYTES,
            tile_depth: tile_px * f32s,
            hiz: tiles * f32s,
            frame_depth: if self.persistent_depth { viewport.pixel_count() * f32s } else { 0 },
            bins: self.max_cluster_strips * self.strip_capacity * size_of::<crate::arena::BinEntry>()
                + self.max_cluster_strips * (size_of::<u32>() * 2)
                + tiles * size_of::<u32>() * 2,
            ptv: self.ptv_slots()
                * self.max_cluster_vertices
                * (size_of::<Vec4>() + self.max_varying_bytes),
            transfer: self.transfer_queue_depth.max(1) * tile_px * D::BYTES,
            row_scratch: viewport.width as usize * D::BYTES,
        }
    }
}

/// Byte footprint per buffer category.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Footprint {
    pub tile_color: usize,
    pub tile_depth: usize,
    pub hiz: usize,
    pub frame_depth: usize,
    pub bins: usize,
    pub ptv: usize,
    pub transfer: usize,
    pub row_scratch: usize,
}

impl Footprint {
    pub const fn total(&self) -> usize {
        self.tile_color
            + self.tile_depth
            + self.hiz
            + self.frame_depth
            + self.bins
            + self.ptv
            + self.transfer
            + self.row_scratch
    }
}

impl core::fmt::Display for Footprint {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{} bytes (tile color {}, tile depth {}, hi-z {}, frame depth {}, bins {}, ptv {}, transfer {}, rows {})",
            self.total(),
            self.tile_color,
            self.tile_depth,
            self.hiz,
            self.frame_depth,
            self.bins,
            self.ptv,
            self.transfer,
            self.row_scratch
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::{Rgb565, RgbF32};

    #[test]
    fn defaults_validate() {
        RasterConfig::new().validate(Viewport::new(320, 240)).unwrap();
    }

    #[test]
    fn rejects_out_of_range_limits() {
        let vp = Viewport::new(64, 64);
        assert!(RasterConfig::new().with_tile_size(0, 8).validate(vp).is_err());
        assert!(RasterConfig::new().with_max_dispatches(65).validate(vp).is_err());
        assert!(RasterConfig::new().with_max_cluster_vertices(257).validate(vp).is_err());
        assert!(RasterConfig::new().with_cluster_strips(4, 0).validate(vp).is_err());
        assert!(RasterConfig::new().validate(Viewport::new(0, 1)).is_err());
    }

    #[test]
    fn tile_grid_rounds_up() {
        let c = RasterConfig::new().with_tile_size(32, 16);
        assert_eq!(c.tile_grid(Viewport::new(100, 33)), (4, 3));
    }

    #[test]
    fn footprint_tracks_formats_and_options() {
        let vp = Viewport::new(64, 64);
        let c = RasterConfig::new().with_tile_size(16, 16).with_transfer_queue_depth(0);
        let f = c.footprint::<RgbF32, Rgb565>(vp);
        assert_eq!(f.tile_color, 256 * 12);
        assert_eq!(f.transfer, 256 * 2);
        assert_eq!(f.frame_depth, 0);
        assert_eq!(f.hiz, 16 * 4);

        let p = c.with_persistent_depth(true).footprint::<RgbF32, Rgb565>(vp);
        assert_eq!(p.frame_depth, 64 * 64 * 4);
        assert_eq!(p.total() - f.total(), 64 * 64 * 4);
    }

    #[test]
    fn depth_conventions_are_mirrored() {
        let s = DepthConvention::Standard;
        let r = DepthConvention::Reversed;
        assert!(s.is_behind(0.8, 0.2));
        assert!(r.is_behind(0.2, 0.8));
        assert_eq!(s.farther(0.3, 0.6), 0.6);
        assert_eq!(r.farther(0.3, 0.6), 0.3);
        assert_eq!(s.nearer(0.3, 0.6), 0.3);
        assert_eq!(r.clear_value(), 0.0);
    }
}
