use bytemuck::{Pod, Zeroable};

use super::{ColorRgba, Pixel, PixelFormat};

#[inline]
fn quantize(v: f32, max: u32) -> u32 {
    (v.clamp(0.0, 1.0) * max as f32 + 0.5) as u32
}

#[inline]
fn expand(v: u32, max: u32) -> f32 {
    v as f32 / max as f32
}

/// 16-bit RGB, 5/6/5 bits, red in the high bits. The usual SPI panel format.
#[repr(transparent)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Rgb565(pub u16);

impl Rgb565 {
    #[inline]
    pub const fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u16 >> 3) << 11) | ((g as u16 >> 2) << 5) | (b as u16 >> 3))
    }

    /// Channels as 8-bit values with the low bits replicated.
    #[inline]
    pub const fn to_rgb8(self) -> [u8; 3] {
        let r = ((self.0 >> 11) & 0x1F) as u8;
        let g = ((self.0 >> 5) & 0x3F) as u8;
        let b = (self.0 & 0x1F) as u8;
        [(r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2)]
    }
}

impl Pixel for Rgb565 {
    const FORMAT: PixelFormat = PixelFormat::Rgb565;

    #[inline]
    fn to_rgba(self) -> ColorRgba {
        let v = self.0 as u32;
        ColorRgba::rgb(expand(v >> 11, 31), expand((v >> 5) & 0x3F, 63), expand(v & 0x1F, 31))
    }

    #[inline]
    fn from_rgba(c: ColorRgba) -> Self {
        Self(((quantize(c.r, 31) << 11) | (quantize(c.g, 63) << 5) | quantize(c.b, 31)) as u16)
    }
}

/// 16-bit RGBA, 5/5/5 bits color and a 1-bit alpha in bit 0.
#[repr(transparent)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Rgba5551(pub u16);

impl Pixel for Rgba5551 {
    const FORMAT: PixelFormat = PixelFormat::Rgba5551;

    #[inline]
    fn to_rgba(self) -> ColorRgba {
        let v = self.0 as u32;
        ColorRgba::new(
            expand(v >> 11, 31),
            expand((v >> 6) & 0x1F, 31),
            expand((v >> 1) & 0x1F, 31),
            (v & 1) as f32,
        )
    }

    #[inline]
    fn from_rgba(c: ColorRgba) -> Self {
        let a = u32::from(c.a >= 0.5);
        Self(((quantize(c.r, 31) << 11) | (quantize(c.g, 31) << 6) | (quantize(c.b, 31) << 1) | a) as u16)
    }
}

/// 32-bit RGBA, one byte per channel in memory order R, G, B, A.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Rgba8888 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8888 {
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl Pixel for Rgba8888 {
    const FORMAT: PixelFormat = PixelFormat::Rgba8888;

    #[inline]
    fn to_rgba(self) -> ColorRgba {
        ColorRgba::from_u8(self.r, self.g, self.b, self.a)
    }

    #[inline]
    fn from_rgba(c: ColorRgba) -> Self {
        Self::new(
            quantize(c.r, 255) as u8,
            quantize(c.g, 255) as u8,
            quantize(c.b, 255) as u8,
            quantize(c.a, 255) as u8,
        )
    }
}

/// 8-bit luminance. Converting from color keeps the Rec. 601 luma.
#[repr(transparent)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct L8(pub u8);

impl Pixel for L8 {
    const FORMAT: PixelFormat = PixelFormat::L8;

    #[inline]
    fn to_rgba(self) -> ColorRgba {
        let l = expand(self.0 as u32, 255);
        ColorRgba::rgb(l, l, l)
    }

    #[inline]
    fn from_rgba(c: ColorRgba) -> Self {
        Self(quantize(c.luma(), 255) as u8)
    }
}

/// Unclamped float RGB. Useful as an intermediate tile format for HDR work
/// or multi-pass compositing in the tile shader; additive blending may push
/// channels above 1 and the tile shader decides how to map them.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct RgbF32 {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl RgbF32 {
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

impl Pixel for RgbF32 {
    const FORMAT: PixelFormat = PixelFormat::RgbF32;

    #[inline]
    fn to_rgba(self) -> ColorRgba {
        ColorRgba::rgb(self.r, self.g, self.b)
    }

    #[inline]
    fn from_rgba(c: ColorRgba) -> Self {
        Self::new(c.r, c.g, c.b)
    }
}
