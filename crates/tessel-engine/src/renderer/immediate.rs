//! Immediate-mode rectangles written straight to the device.

use super::Rasterizer;
use crate::coords::ScreenRect;
use crate::device::Device;
use crate::pixel::Pixel;
use crate::shader::RectShader;

impl<D: Device, T: Pixel> Rasterizer<D, T> {
    /// Fills the on-screen part of a rectangle, one device span per row.
    pub fn draw_rect<S>(&mut self, x: i32, y: i32, w: i32, h: i32, shader: &mut S)
    where
        S: RectShader<D::Format> + ?Sized,
    {
        if let Some(rect) = ScreenRect::new(x, y, w, h).intersect(self.viewport.rect()) {
            self.write_rows(rect, shader);
        }
    }

    /// Like [`draw_rect`](Self::draw_rect) without clipping. The rectangle
    /// must lie on screen.
    pub fn fast_draw_rect<S>(&mut self, x: i32, y: i32, w: i32, h: i32, shader: &mut S)
    where
        S: RectShader<D::Format> + ?Sized,
    {
        let rect = ScreenRect::new(x, y, w, h);
        debug_assert!(rect.is_within(self.viewport.rect()), "fast_draw_rect off screen: {rect:?}");
        if !rect.is_empty() {
            self.write_rows(rect, shader);
        }
    }

    fn write_rows<S>(&mut self, rect: ScreenRect, shader: &mut S)
    where
        S: RectShader<D::Format> + ?Sized,
    {
        self.wait_transfers();

        let row = &mut self.arena.row_scratch[..rect.w as usize];
        for y in rect.y..rect.bottom() {
            for (px, x) in row.iter_mut().zip(rect.x..) {
                *px = shader.shade(x, y);
            }
            self.device.write_span(rect.x, y, row);
        }
    }
}
