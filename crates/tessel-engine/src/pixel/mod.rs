//! Pixel formats and blending.
//!
//! Every storage format implements [`Pixel`]: a fixed-size POD value that
//! converts through the linear [`ColorRgba`]. Formats are picked at compile
//! time (tile format, display format, texture format are type parameters), so
//! conversions inline down to bit twiddling.

mod blend;
mod color;
mod formats;

pub use blend::BlendMode;
pub use color::ColorRgba;
pub use formats::{L8, Rgb565, Rgba5551, Rgba8888, RgbF32};
pub use tessel_asset::PixelFormat;

use bytemuck::Pod;

pub trait Pixel: Pod + Default + PartialEq + core::fmt::Debug {
    /// Blob tag for this layout.
    const FORMAT: PixelFormat;

    /// Storage size in bytes.
    const BYTES: usize = size_of::<Self>();

    fn to_rgba(self) -> ColorRgba;

    fn from_rgba(c: ColorRgba) -> Self;

    #[inline]
    fn convert<Q: Pixel>(self) -> Q {
        Q::from_rgba(self.to_rgba())
    }

    /// Combines `self` (source) with `dst` according to `mode`.
    #[inline]
    fn blend(self, dst: Self, mode: BlendMode) -> Self {
        match mode {
            BlendMode::Replace => self,
            _ => Self::from_rgba(mode.apply(self.to_rgba(), dst.to_rgba())),
        }
    }
}
