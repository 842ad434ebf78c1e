//! The rasterizer: owns the arena and the device, hands out frames.

mod frame;
mod immediate;
#[cfg(test)]
mod scenarios;

pub use frame::Frame;

use smallvec::SmallVec;

use crate::arena::{farthest_depth, Arena};
use crate::config::{RasterConfig, MAX_DISPATCH_SLOTS};
use crate::coords::{ScreenRect, Viewport};
use crate::device::Device;
use crate::error::RasterError;
use crate::pixel::{ColorRgba, Pixel};
use crate::pso::{DrawCall, TileCtx};
use crate::raster::{TileTarget, TileTraversal};
use crate::shader::{TileShader, TileView};
use crate::stats::{FrameStats, PeakUsage};

/// Tile-based deferred rasterizer rendering tile format `T` to device `D`.
pub struct Rasterizer<D: Device, T: Pixel> {
    config: RasterConfig,
    device: D,
    viewport: Viewport,
    tiles_x: u32,
    tiles_y: u32,
    arena: Arena<T, D::Format>,
    clear_color: T,
    transfer_slots: usize,
    next_slot: usize,
    last_stats: FrameStats,
    peak: PeakUsage,
    frames: u64,
}

impl<D: Device, T: Pixel> Rasterizer<D, T> {
    /// Validates `config` against the device size and carves every buffer.
    pub fn init(config: RasterConfig, device: D) -> Result<Self, RasterError> {
        let (width, height) = device.size();
        let viewport = Viewport::new(width, height);
        config.validate(viewport)?;

        let (tiles_x, tiles_y) = config.tile_grid(viewport);
        let footprint = config.footprint::<T, D::Format>(viewport);
        let transfer_slots = config.transfer_queue_depth.min(device.transfer_slots());

        log::debug!(
            "rasterizer {width}x{height}: {tiles_x}x{tiles_y} tiles of {}x{}, {:?} order, {transfer_slots} transfer slots",
            config.tile_width,
            config.tile_height,
            config.tile_order
        );
        log::debug!("arena footprint {footprint}");

        Ok(Self {
            arena: Arena::carve(&config, viewport),
            config,
            device,
            viewport,
            tiles_x,
            tiles_y,
            clear_color: T::default(),
            transfer_slots,
            next_slot: 0,
            last_stats: FrameStats::default(),
            peak: PeakUsage::default(),
            frames: 0,
        })
    }

    /// Starts collecting dispatches. PSOs must outlive the frame.
    pub fn begin_frame<'p>(&mut self) -> Frame<'_, 'p, D, T> {
        Frame::new(self)
    }

    #[inline]
    pub fn config(&self) -> &RasterConfig {
        &self.config
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[inline]
    pub fn device(&self) -> &D {
        &self.device
    }

    #[inline]
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// Waits for outstanding transfers and returns the device.
    pub fn into_device(mut self) -> D {
        self.wait_transfers();
        self.device
    }

    /// Color every tile starts from.
    pub fn set_clear_color(&mut self, color: ColorRgba) {
        self.clear_color = T::from_rgba(color);
    }

    /// Resets persistent depth and Hi-Z to the far plane.
    pub fn clear_depth(&mut self) {
        self.arena.clear_depth(self.config.depth_convention);
    }

    /// The frame-sized depth buffer, when depth is persistent.
    pub fn depth_buffer(&self) -> Option<&[f32]> {
        self.arena.has_frame_depth().then_some(&*self.arena.frame_depth)
    }

    /// Counters of the last committed frame.
    #[inline]
    pub fn stats(&self) -> &FrameStats {
        &self.last_stats
    }

    #[inline]
    pub fn peak_usage(&self) -> &PeakUsage {
        &self.peak
    }

    /// Logs the last frame's counters and the arena high-water marks.
    pub fn log_stats(&self) {
        let s = &self.last_stats;
        log::info!(
            "frame {}: {} dispatches, clusters {} tested / {} binned (culled: {} frustum, {} cone, {} hi-z, {} in tile)",
            self.frames,
            s.dispatches,
            s.clusters_tested,
            s.clusters_binned,
            s.clusters_culled_frustum,
            s.clusters_culled_cone,
            s.clusters_culled_hiz,
            s.clusters_occluded_in_tile
        );
        log::info!(
            "  vertices {} shaded (cache {} hit / {} miss), triangles {} set up / {} culled",
            s.vertices_shaded,
            s.vertex_cache_hits,
            s.vertex_cache_misses,
            s.triangles_setup,
            s.triangles_culled
        );
        log::info!(
            "  pixels {} shaded / {} depth-rejected, {} tiles, {} transfer waits",
            s.pixels_shaded,
            s.pixels_depth_rejected,
            s.tiles_committed,
            s.transfer_waits
        );
        self.peak.log(&self.config);
    }

    /// Blocks until every transfer slot is idle; returns how many were busy.
    fn wait_transfers(&mut self) -> u32 {
        let mut waits = 0;
        for slot in 0..self.transfer_slots {
            if self.device.is_transfer_busy(slot) {
                waits += 1;
                while self.device.is_transfer_busy(slot) {
                    core::hint::spin_loop();
                }
            }
        }
        waits
    }

    /// Rasterizes every tile of a frame and hands the results to the device.
    fn rasterize_tiles<S>(&mut self, draws: &[&dyn DrawCall<T>], stats: &mut FrameStats, shader: &S)
    where
        S: TileShader<T, D::Format> + ?Sized,
    {
        let config = self.config;
        let convention = config.depth_convention;
        let clear_depth = convention.clear_value();
        let stride = config.tile_width as usize;
        let frame_width = self.viewport.width as usize;
        let occludable: SmallVec<[bool; MAX_DISPATCH_SLOTS]> = draws
            .iter()
            .map(|d| config.hiz_culling && d.state().depth.occludable(convention))
            .collect();

        for (tx, ty) in TileTraversal::new(config.tile_order, self.tiles_x, self.tiles_y) {
            let tile = (ty * self.tiles_x + tx) as usize;
            let origin = ScreenRect::new(
                (tx * config.tile_width) as i32,
                (ty * config.tile_height) as i32,
                config.tile_width as i32,
                config.tile_height as i32,
            );
            let Some(rect) = origin.intersect(self.viewport.rect()) else {
                continue;
            };

            self.arena.load_tile(rect, stride, frame_width, self.clear_color, clear_depth);

            let arena = &mut self.arena;
            let mut far = farthest_depth(&arena.tile_depth, rect, stride, convention);
            let mut ctx = TileCtx {
                target: TileTarget { rect, stride, color: &mut arena.tile_color, depth: &mut arena.tile_depth },
                ptv: &mut arena.ptv,
                viewport: self.viewport,
                near_plane: convention.near_plane(),
                stats: &mut *stats,
            };
            for entry in arena.bins.iter(tile) {
                let draw = entry.draw as usize;
                if occludable[draw] && convention.is_behind(entry.near, far) {
                    ctx.stats.clusters_occluded_in_tile += 1;
                    continue;
                }
                if draws[draw].rasterize(entry.draw, entry.cluster, &mut ctx) {
                    far = farthest_depth(&*ctx.target.depth, rect, stride, convention);
                }
            }
            arena.hiz[tile] = far;

            self.arena.store_depth(rect, stride, frame_width);
            self.transfer_tile(rect, shader, stats);
            stats.tiles_committed += 1;
        }

        stats.transfer_waits += self.wait_transfers();
        if !config.persistent_depth {
            self.arena.hiz.fill(clear_depth);
        }
    }

    /// Runs the tile shader into a transfer buffer and sends it.
    fn transfer_tile<S>(&mut self, rect: ScreenRect, shader: &S, stats: &mut FrameStats)
    where
        S: TileShader<T, D::Format> + ?Sized,
    {
        let tile_px = self.config.tile_pixels();
        let slot = if self.transfer_slots == 0 {
            0
        } else {
            let s = self.next_slot;
            self.next_slot = (s + 1) % self.transfer_slots;
            if self.device.is_transfer_busy(s) {
                stats.transfer_waits += 1;
                while self.device.is_transfer_busy(s) {
                    core::hint::spin_loop();
                }
            }
            s
        };

        let stride = self.config.tile_width as usize;
        let view = TileView::new(&self.arena.tile_color, &self.arena.tile_depth, stride, rect);
        let out = &mut self.arena.transfer[slot * tile_px..slot * tile_px + rect.area()];
        for (row, line) in out.chunks_exact_mut(rect.w as usize).enumerate() {
            let y = rect.y + row as i32;
            for (col, px) in line.iter_mut().enumerate() {
                *px = shader.shade(&view, rect.x + col as i32, y);
            }
        }

        if self.transfer_slots == 0 {
            self.device.write_tile(rect, out);
        } else {
            self.device.start_transfer(slot, rect, out);
        }
    }

    /// Bookkeeping once a frame ends, committed or not.
    fn end_frame(&mut self, stats: &FrameStats) {
        self.arena.bins.reset();
        self.arena.ptv.invalidate();
        self.peak.record(stats);
        self.last_stats = *stats;
        self.frames += 1;
    }
}
