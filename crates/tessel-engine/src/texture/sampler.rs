use core::marker::PhantomData;

use glam::Vec2;

use super::Texture;
use crate::pixel::{ColorRgba, Pixel};

/// Maps an integer texel coordinate into `0..size`.
pub trait AddressMode {
    fn resolve(i: i32, size: u32) -> u32;
}

/// Repeats the texture.
#[derive(Debug, Copy, Clone, Default)]
pub struct Wrap;

/// Clamps to the edge texel.
#[derive(Debug, Copy, Clone, Default)]
pub struct Clamp;

/// Repeats the texture, flipping every other copy.
#[derive(Debug, Copy, Clone, Default)]
pub struct Mirror;

impl AddressMode for Wrap {
    #[inline]
    fn resolve(i: i32, size: u32) -> u32 {
        i.rem_euclid(size as i32) as u32
    }
}

impl AddressMode for Clamp {
    #[inline]
    fn resolve(i: i32, size: u32) -> u32 {
        i.clamp(0, size as i32 - 1) as u32
    }
}

impl AddressMode for Mirror {
    #[inline]
    fn resolve(i: i32, size: u32) -> u32 {
        let period = 2 * size as i32;
        let m = i.rem_euclid(period);
        if m >= size as i32 { (period - 1 - m) as u32 } else { m as u32 }
    }
}

/// Reconstruction filter. Coordinates are in texel units (`u * width`).
pub trait Filter {
    fn filter<P: Pixel, A: AddressMode>(tex: &Texture<'_, P>, x: f32, y: f32) -> ColorRgba;
}

/// Nearest texel.
#[derive(Debug, Copy, Clone, Default)]
pub struct Point;

/// Weighted average of the four nearest texel centers.
#[derive(Debug, Copy, Clone, Default)]
pub struct Bilinear;

#[inline]
fn texel_at<P: Pixel, A: AddressMode>(tex: &Texture<'_, P>, x: i32, y: i32) -> P {
    tex.texel(A::resolve(x, tex.width()), A::resolve(y, tex.height()))
}

/// `f32 -> i32` floor that saturates instead of wrapping on huge inputs.
#[inline]
fn floor_i32(v: f32) -> i32 {
    v.floor() as i32
}

impl Filter for Point {
    #[inline]
    fn filter<P: Pixel, A: AddressMode>(tex: &Texture<'_, P>, x: f32, y: f32) -> ColorRgba {
        texel_at::<P, A>(tex, floor_i32(x), floor_i32(y)).to_rgba()
    }
}

impl Filter for Bilinear {
    #[inline]
    fn filter<P: Pixel, A: AddressMode>(tex: &Texture<'_, P>, x: f32, y: f32) -> ColorRgba {
        let x = x - 0.5;
        let y = y - 0.5;
        let fx = x.floor();
        let fy = y.floor();
        let tx = x - fx;
        let ty = y - fy;
        let x0 = fx as i32;
        let y0 = fy as i32;

        let c00 = texel_at::<P, A>(tex, x0, y0).to_rgba();
        let c10 = texel_at::<P, A>(tex, x0.wrapping_add(1), y0).to_rgba();
        let c01 = texel_at::<P, A>(tex, x0, y0.wrapping_add(1)).to_rgba();
        let c11 = texel_at::<P, A>(tex, x0.wrapping_add(1), y0.wrapping_add(1)).to_rgba();

        c00.lerp(c10, tx).lerp(c01.lerp(c11, tx), ty)
    }
}

/// Zero-sized sampler; filter and addressing are chosen at compile time.
///
/// ```
/// use tessel_engine::texture::{Bilinear, Sampler, Wrap};
/// const SAMPLER: Sampler<Bilinear, Wrap> = Sampler::new();
/// # let _ = SAMPLER;
/// ```
pub struct Sampler<F, A> {
    _marker: PhantomData<fn() -> (F, A)>,
}

impl<F, A> Clone for Sampler<F, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<F, A> Copy for Sampler<F, A> {}

impl<F, A> Default for Sampler<F, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F, A> core::fmt::Debug for Sampler<F, A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Sampler")
            .field("filter", &core::any::type_name::<F>())
            .field("address", &core::any::type_name::<A>())
            .finish()
    }
}

impl<F, A> Sampler<F, A> {
    pub const fn new() -> Self {
        Self { _marker: PhantomData }
    }
}

impl<F: Filter, A: AddressMode> Sampler<F, A> {
    /// Samples at normalized coordinates (`[0, 1]` spans the texture once).
    #[inline]
    pub fn sample<P: Pixel>(&self, tex: &Texture<'_, P>, uv: Vec2) -> ColorRgba {
        F::filter::<P, A>(tex, uv.x * tex.width() as f32, uv.y * tex.height() as f32)
    }

    /// Samples with a caller-provided coordinate scale instead of the texture
    /// size, e.g. `scale = 1` to address texels directly.
    #[inline]
    pub fn sample_scaled<P: Pixel>(&self, tex: &Texture<'_, P>, coord: Vec2, scale: Vec2) -> ColorRgba {
        F::filter::<P, A>(tex, coord.x * scale.x, coord.y * scale.y)
    }
}

impl<A: AddressMode> Sampler<Point, A> {
    /// Nearest texel in the texture's own format, without conversion.
    #[inline]
    pub fn fetch<P: Pixel>(&self, tex: &Texture<'_, P>, uv: Vec2) -> P {
        texel_at::<P, A>(
            tex,
            floor_i32(uv.x * tex.width() as f32),
            floor_i32(uv.y * tex.height() as f32),
        )
    }
}
