//! Read-only textures and compile-time configured samplers.

mod sampler;

pub use sampler::{AddressMode, Bilinear, Clamp, Filter, Mirror, Point, Sampler, Wrap};

use tessel_asset::TextureBlob;

use crate::error::RasterError;
use crate::pixel::Pixel;

/// Immutable texture borrowing its texels (typically from program data).
#[derive(Debug, Clone, Copy)]
pub struct Texture<'a, P: Pixel> {
    width: u32,
    height: u32,
    texels: &'a [P],
}

impl<'a, P: Pixel> Texture<'a, P> {
    /// Wraps `width * height` row-major texels.
    pub fn new(width: u32, height: u32, texels: &'a [P]) -> Result<Self, RasterError> {
        if width == 0 || height == 0 || texels.len() != width as usize * height as usize {
            return Err(RasterError::TextureSize { width, height, found: texels.len() });
        }
        Ok(Self { width, height, texels })
    }

    /// Borrows the texels of a texture blob in place.
    ///
    /// The blob's pixel format must be `P::FORMAT`, and the texel section must
    /// be aligned for `P`.
    pub fn from_blob(blob: &'a [u8]) -> Result<Self, RasterError> {
        let tb = TextureBlob::parse(blob)?;
        if tb.format != P::FORMAT || P::BYTES != tb.format.bytes_per_pixel() {
            return Err(RasterError::FormatMismatch { expected: P::FORMAT, found: tb.format });
        }
        let texels = bytemuck::try_cast_slice(tb.data).map_err(|_| RasterError::Misaligned("texel"))?;
        Self::new(tb.width, tb.height, texels)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn texels(&self) -> &'a [P] {
        self.texels
    }

    /// Texel at integer coordinates. Coordinates must be in range.
    #[inline]
    pub fn texel(&self, x: u32, y: u32) -> P {
        self.texels[y as usize * self.width as usize + x as usize]
    }
}
