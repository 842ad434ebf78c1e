//! Every buffer the rasterizer uses, carved once from a [`RasterConfig`].

mod bins;
mod ptv;

pub use bins::BinEntry;

pub(crate) use bins::Bins;
pub(crate) use ptv::{PtvCache, PtvLookup};

use crate::config::{DepthConvention, RasterConfig};
use crate::coords::{ScreenRect, Viewport};
use crate::pixel::Pixel;

/// Buffers for tile format `T` and display format `D`.
pub(crate) struct Arena<T, D> {
    pub(crate) tile_color: Box<[T]>,
    pub(crate) tile_depth: Box<[f32]>,
    /// Farthest depth per tile.
    pub(crate) hiz: Box<[f32]>,
    /// Frame-sized depth; empty unless depth is persistent.
    pub(crate) frame_depth: Box<[f32]>,
    pub(crate) bins: Bins,
    pub(crate) ptv: PtvCache,
    /// `transfer_queue_depth.max(1)` display-format tiles, back to back.
    pub(crate) transfer: Box<[D]>,
    pub(crate) row_scratch: Box<[D]>,
}

impl<T: Pixel, D: Pixel> Arena<T, D> {
    pub(crate) fn carve(config: &RasterConfig, viewport: Viewport) -> Self {
        let (tx, ty) = config.tile_grid(viewport);
        let tiles = tx as usize * ty as usize;
        let tile_px = config.tile_pixels();
        let clear = config.depth_convention.clear_value();

        Self {
            tile_color: vec![T::default(); tile_px].into_boxed_slice(),
            tile_depth: vec![clear; tile_px].into_boxed_slice(),
            hiz: vec![clear; tiles].into_boxed_slice(),
            frame_depth: if config.persistent_depth {
                vec![clear; viewport.pixel_count()].into_boxed_slice()
            } else {
                Box::default()
            },
            bins: Bins::new(tiles, config.max_cluster_strips, config.strip_capacity),
            ptv: PtvCache::new(config.vertex_cache_slots, config.max_cluster_vertices, config.max_varying_bytes),
            transfer: vec![D::default(); config.transfer_queue_depth.max(1) * tile_px].into_boxed_slice(),
            row_scratch: vec![D::default(); viewport.width as usize].into_boxed_slice(),
        }
    }

    #[inline]
    pub(crate) fn has_frame_depth(&self) -> bool {
        !self.frame_depth.is_empty()
    }

    /// Clears the tile color buffer and loads depth for `rect`.
    pub(crate) fn load_tile(&mut self, rect: ScreenRect, stride: usize, frame_width: usize, clear: T, clear_depth: f32) {
        self.tile_color.fill(clear);
        if self.has_frame_depth() {
            let w = rect.w as usize;
            for row in 0..rect.h as usize {
                let src = (rect.y as usize + row) * frame_width + rect.x as usize;
                self.tile_depth[row * stride..row * stride + w].copy_from_slice(&self.frame_depth[src..src + w]);
            }
        } else {
            self.tile_depth.fill(clear_depth);
        }
    }

    /// Writes the tile's depth back into the frame depth buffer.
    pub(crate) fn store_depth(&mut self, rect: ScreenRect, stride: usize, frame_width: usize) {
        if !self.has_frame_depth() {
            return;
        }
        let w = rect.w as usize;
        for row in 0..rect.h as usize {
            let dst = (rect.y as usize + row) * frame_width + rect.x as usize;
            self.frame_depth[dst..dst + w].copy_from_slice(&self.tile_depth[row * stride..row * stride + w]);
        }
    }

    /// Clears persistent depth and Hi-Z.
    pub(crate) fn clear_depth(&mut self, convention: DepthConvention) {
        let clear = convention.clear_value();
        self.frame_depth.fill(clear);
        self.hiz.fill(clear);
    }
}

/// Farthest depth within the `rect`-sized region of a tile depth buffer.
pub(crate) fn farthest_depth(depth: &[f32], rect: ScreenRect, stride: usize, convention: DepthConvention) -> f32 {
    let w = rect.w as usize;
    let mut far = convention.near_value();
    for row in 0..rect.h as usize {
        for &d in &depth[row * stride..row * stride + w] {
            far = convention.farther(far, d);
        }
    }
    far
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::{Rgb565, RgbF32};

    fn arena(persistent: bool) -> Arena<RgbF32, Rgb565> {
        let config = RasterConfig::new().with_tile_size(4, 4).with_persistent_depth(persistent);
        Arena::carve(&config, Viewport::new(6, 6))
    }

    #[test]
    fn carve_sizes_buffers_from_config() {
        let a = arena(false);
        assert_eq!(a.tile_color.len(), 16);
        assert_eq!(a.hiz.len(), 4);
        assert!(!a.has_frame_depth());
        assert_eq!(a.transfer.len(), 2 * 16);
        assert_eq!(a.row_scratch.len(), 6);
    }

    #[test]
    fn persistent_depth_round_trips_edge_tiles() {
        let mut a = arena(true);
        let rect = ScreenRect::new(4, 4, 2, 2);
        a.load_tile(rect, 4, 6, RgbF32::default(), 1.0);
        a.tile_depth[0] = 0.25;
        a.tile_depth[5] = 0.5;
        a.store_depth(rect, 4, 6);
        assert_eq!(a.frame_depth[4 * 6 + 4], 0.25);
        assert_eq!(a.frame_depth[5 * 6 + 5], 0.5);
        assert_eq!(a.frame_depth[5 * 6 + 4], 1.0);

        a.tile_depth.fill(9.0);
        a.load_tile(rect, 4, 6, RgbF32::default(), 1.0);
        assert_eq!(a.tile_depth[5], 0.5);
    }

    #[test]
    fn farthest_ignores_padding_outside_rect() {
        let mut depth = [0.1f32; 16];
        depth[3] = 0.9;
        let rect = ScreenRect::new(0, 0, 2, 2);
        assert_eq!(farthest_depth(&depth, rect, 4, DepthConvention::Standard), 0.1);
        depth[5] = 0.7;
        assert_eq!(farthest_depth(&depth, rect, 4, DepthConvention::Standard), 0.7);
        assert_eq!(farthest_depth(&depth, rect, 4, DepthConvention::Reversed), 0.1);
    }
}
