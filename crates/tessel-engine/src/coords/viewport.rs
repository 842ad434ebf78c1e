use glam::Vec2;

use super::ScreenRect;

/// Frame buffer size in physical pixels.
///
/// Maps normalized device coordinates (x right, y up, `[-1, 1]`) to screen
/// pixels (origin top-left, y down).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub const fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0 && self.width <= i32::MAX as u32 && self.height <= i32::MAX as u32
    }

    #[inline]
    pub const fn pixel_count(self) -> usize {
        self.width as usize * self.height as usize
    }

    #[inline]
    pub const fn rect(self) -> ScreenRect {
        ScreenRect::new(0, 0, self.width as i32, self.height as i32)
    }

    #[inline]
    pub fn ndc_to_screen(self, ndc: Vec2) -> Vec2 {
        Vec2::new(
            (ndc.x * 0.5 + 0.5) * self.width as f32,
            (0.5 - ndc.y * 0.5) * self.height as f32,
        )
    }
}
