use super::Device;
use crate::coords::ScreenRect;
use crate::pixel::Pixel;

/// Frame buffer in RAM.
///
/// Optionally simulates asynchronous transfers: each started transfer keeps
/// its slot busy for `latency` polls of [`Device::is_transfer_busy`]. Pixels
/// land immediately; only the busy state is simulated.
#[derive(Debug, Clone)]
pub struct MemoryDevice<P> {
    width: u32,
    height: u32,
    pixels: Vec<P>,
    latency: u32,
    busy: Vec<u32>,
    tiles_written: usize,
    spans_written: usize,
}

impl<P: Pixel> MemoryDevice<P> {
    /// Synchronous device filled with `P::default()`.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![P::default(); width as usize * height as usize],
            latency: 0,
            busy: Vec::new(),
            tiles_written: 0,
            spans_written: 0,
        }
    }

    /// Exposes `slots` transfer slots, each busy for `latency` polls after a start.
    pub fn with_transfer(mut self, slots: usize, latency: u32) -> Self {
        self.busy = vec![0; slots];
        self.latency = latency;
        self
    }

    #[inline]
    pub fn pixels(&self) -> &[P] {
        &self.pixels
    }

    /// Pixel at `(x, y)`. Panics when out of range.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> P {
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    pub fn fill(&mut self, value: P) {
        self.pixels.fill(value);
    }

    /// Tiles received through `write_tile` or `start_transfer`.
    #[inline]
    pub fn tiles_written(&self) -> usize {
        self.tiles_written
    }

    #[inline]
    pub fn spans_written(&self) -> usize {
        self.spans_written
    }

    /// Whether any slot is still marked busy.
    pub fn any_busy(&self) -> bool {
        self.busy.iter().any(|&b| b > 0)
    }
}

impl<P: Pixel> Device for MemoryDevice<P> {
    type Format = P;

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn write_tile(&mut self, rect: ScreenRect, pixels: &[P]) {
        assert!(rect.is_within(ScreenRect::new(0, 0, self.width as i32, self.height as i32)));
        assert_eq!(pixels.len(), rect.area());

        let w = rect.w as usize;
        for (row, src) in pixels.chunks_exact(w).enumerate() {
            let start = (rect.y as usize + row) * self.width as usize + rect.x as usize;
            self.pixels[start..start + w].copy_from_slice(src);
        }
        self.tiles_written += 1;
    }

    fn write_span(&mut self, x: i32, y: i32, pixels: &[P]) {
        assert!(x >= 0 && y >= 0 && (y as u32) < self.height);
        assert!(x as usize + pixels.len() <= self.width as usize);

        let start = y as usize * self.width as usize + x as usize;
        self.pixels[start..start + pixels.len()].copy_from_slice(pixels);
        self.spans_written += 1;
    }

    fn transfer_slots(&self) -> usize {
        self.busy.len()
    }

    fn start_transfer(&mut self, slot: usize, rect: ScreenRect, pixels: &[P]) {
        debug_assert_eq!(self.busy[slot], 0, "transfer started on a busy slot");
        self.write_tile(rect, pixels);
        self.busy[slot] = self.latency;
    }

    fn is_transfer_busy(&mut self, slot: usize) -> bool {
        let b = &mut self.busy[slot];
        if *b == 0 {
            return false;
        }
        *b -= 1;
        true
    }
}
