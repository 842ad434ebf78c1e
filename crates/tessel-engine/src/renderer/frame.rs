use smallvec::SmallVec;

use super::Rasterizer;
use crate::binning::BinCtx;
use crate::config::MAX_DISPATCH_SLOTS;
use crate::device::Device;
use crate::error::{CapacityLimit, RasterError};
use crate::geometry::Vertex;
use crate::pixel::Pixel;
use crate::pso::{DrawCall, Psc};
use crate::shader::{ConvertTile, PixelShader, TileShader, VertexShader};
use crate::stats::FrameStats;

/// One frame in flight.
///
/// Dispatches are culled and binned immediately; nothing is rasterized
/// until [`commit`](Self::commit). A failed dispatch poisons the frame: later
/// dispatches and the commit return [`RasterError::FrameAborted`]. Dropping a
/// frame without committing discards its bins.
pub struct Frame<'r, 'p, D: Device, T: Pixel> {
    raster: &'r mut Rasterizer<D, T>,
    draws: SmallVec<[&'p dyn DrawCall<T>; MAX_DISPATCH_SLOTS]>,
    stats: FrameStats,
    poisoned: bool,
    committed: bool,
}

impl<'r, 'p, D: Device, T: Pixel> Frame<'r, 'p, D, T> {
    pub(super) fn new(raster: &'r mut Rasterizer<D, T>) -> Self {
        Self { raster, draws: SmallVec::new(), stats: FrameStats::default(), poisoned: false, committed: false }
    }

    /// Counters gathered so far.
    #[inline]
    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    #[inline]
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Culls and bins every cluster of `pso`.
    pub fn dispatch_pso<'m, V, VS, PS>(&mut self, pso: &'p Psc<'m, V, VS, PS>) -> Result<(), RasterError>
    where
        V: Vertex + 'p,
        VS: VertexShader<Vertex = V> + 'p,
        PS: PixelShader<T> + 'p,
        PS::Varyings: From<VS::Varyings>,
    {
        if self.poisoned {
            return Err(RasterError::FrameAborted);
        }

        let max = self.raster.config.max_dispatches;
        if self.draws.len() >= max {
            self.poisoned = true;
            return Err(RasterError::capacity(CapacityLimit::Dispatches, max, self.draws.len() + 1));
        }

        let draw = self.draws.len() as u16;
        let raster = &mut *self.raster;
        let mut ctx = BinCtx {
            config: &raster.config,
            viewport: raster.viewport,
            tiles_x: raster.tiles_x,
            hiz: &raster.arena.hiz,
            bins: &mut raster.arena.bins,
            stats: &mut self.stats,
        };
        if let Err(e) = DrawCall::<T>::bin(pso, draw, &mut ctx) {
            self.poisoned = true;
            return Err(e);
        }

        self.draws.push(pso);
        self.stats.dispatches += 1;
        Ok(())
    }

    /// Rasterizes every tile and sends it to the device as-is.
    pub fn commit(self) -> Result<FrameStats, RasterError> {
        self.commit_with(&ConvertTile)
    }

    /// Rasterizes every tile, running `shader` on each pixel before transfer.
    pub fn commit_with<S>(mut self, shader: &S) -> Result<FrameStats, RasterError>
    where
        S: TileShader<T, D::Format> + ?Sized,
    {
        self.committed = true;
        if self.poisoned {
            log::warn!("commit of an aborted frame, nothing rasterized");
            return Err(RasterError::FrameAborted);
        }

        let Frame { raster, draws, stats, .. } = &mut self;
        raster.rasterize_tiles(draws, stats, shader);
        log::trace!(
            "frame committed: {} dispatches, {} clusters binned, {} pixels shaded",
            stats.dispatches,
            stats.clusters_binned,
            stats.pixels_shaded
        );
        Ok(self.stats)
    }
}

impl<D: Device, T: Pixel> Drop for Frame<'_, '_, D, T> {
    fn drop(&mut self) {
        if !self.committed && !self.draws.is_empty() {
            log::debug!("frame dropped with {} dispatches, discarding bins", self.draws.len());
        }
        self.raster.end_frame(&self.stats);
    }
}
