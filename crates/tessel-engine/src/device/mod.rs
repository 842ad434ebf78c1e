//! Display device contract.
//!
//! The rasterizer never owns a frame buffer. Finished tiles and immediate-mode
//! spans are handed to a [`Device`], which forwards them to the display (or,
//! for [`MemoryDevice`], into RAM).
//!
//! Devices that push pixels asynchronously (DMA) expose transfer slots. The
//! rasterizer fills a slot's buffer, calls `start_transfer`, and does not
//! touch that buffer again until `is_transfer_busy` reports the slot idle.

mod memory;

pub use memory::MemoryDevice;

use crate::coords::ScreenRect;
use crate::pixel::Pixel;

pub trait Device {
    /// Pixel format the display consumes.
    type Format: Pixel;

    /// Display size in pixels.
    fn size(&self) -> (u32, u32);

    /// Writes a `rect.w * rect.h` row-major block. `rect` lies on screen.
    fn write_tile(&mut self, rect: ScreenRect, pixels: &[Self::Format]);

    /// Writes one horizontal run starting at `(x, y)`.
    fn write_span(&mut self, x: i32, y: i32, pixels: &[Self::Format]);

    /// Number of independent asynchronous transfer slots; 0 means every
    /// write completes before returning.
    fn transfer_slots(&self) -> usize {
        0
    }

    /// Starts pushing a tile through `slot`. Only called for idle slots.
    fn start_transfer(&mut self, slot: usize, rect: ScreenRect, pixels: &[Self::Format]) {
        let _ = slot;
        self.write_tile(rect, pixels);
    }

    /// Whether the transfer last started on `slot` is still reading its buffer.
    fn is_transfer_busy(&mut self, slot: usize) -> bool {
        let _ = slot;
        false
    }
}
