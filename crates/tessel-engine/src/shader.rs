//! Shader contracts.
//!
//! Every shader is a plain value implementing one of these traits; draws are
//! monomorphized over them, so shading compiles down to direct calls.
//!
//! A pixel shader declares the varyings it reads. A draw only compiles when
//! those can be built `From` the vertex shader's output, which is where
//! unused attributes are dropped before they are stored and interpolated:
//!
//! ```
//! use glam::Vec2;
//! use tessel_engine::pixel::{ColorRgba, Pixel, Rgb565};
//! use tessel_engine::shader::{Interpolate, PixelShader};
//!
//! #[repr(C)]
//! #[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
//! struct Lit { uv: Vec2, light: f32 }
//!
//! impl Interpolate for Lit {
//!     fn weighted(a: &Self, b: &Self, c: &Self, w: [f32; 3]) -> Self {
//!         Lit {
//!             uv: Vec2::weighted(&a.uv, &b.uv, &c.uv, w),
//!             light: f32::weighted(&a.light, &b.light, &c.light, w),
//!         }
//!     }
//! }
//!
//! struct Gray;
//!
//! impl PixelShader<Rgb565> for Gray {
//!     type Varyings = f32;
//!     fn shade(&self, light: &f32, _primitive: u32) -> Rgb565 {
//!         Rgb565::from_rgba(ColorRgba::rgb(*light, *light, *light))
//!     }
//! }
//!
//! // Lit -> f32 keeps only the light term.
//! impl From<Lit> for f32 {
//!     fn from(v: Lit) -> f32 { v.light }
//! }
//! ```

use bytemuck::Pod;
use glam::{Vec2, Vec3, Vec4};

use crate::coords::ScreenRect;
use crate::geometry::Vertex;
use crate::pixel::{ColorRgba, Pixel};
use crate::pso::Transform;

/// Values that can be blended barycentrically across a triangle.
pub trait Interpolate: Pod {
    /// `a * w[0] + b * w[1] + c * w[2]`; weights sum to one.
    fn weighted(a: &Self, b: &Self, c: &Self, w: [f32; 3]) -> Self;
}

impl Interpolate for () {
    #[inline]
    fn weighted(_: &Self, _: &Self, _: &Self, _: [f32; 3]) -> Self {}
}

impl Interpolate for f32 {
    #[inline]
    fn weighted(a: &Self, b: &Self, c: &Self, w: [f32; 3]) -> Self {
        a * w[0] + b * w[1] + c * w[2]
    }
}

macro_rules! interpolate_vec {
    ($($t:ty),*) => {$(
        impl Interpolate for $t {
            #[inline]
            fn weighted(a: &Self, b: &Self, c: &Self, w: [f32; 3]) -> Self {
                *a * w[0] + *b * w[1] + *c * w[2]
            }
        }
    )*};
}

interpolate_vec!(Vec2, Vec3, Vec4);

impl<const N: usize> Interpolate for [f32; N]
where
    [f32; N]: Pod,
{
    #[inline]
    fn weighted(a: &Self, b: &Self, c: &Self, w: [f32; 3]) -> Self {
        core::array::from_fn(|i| a[i] * w[0] + b[i] * w[1] + c[i] * w[2])
    }
}

impl Interpolate for ColorRgba {
    #[inline]
    fn weighted(a: &Self, b: &Self, c: &Self, w: [f32; 3]) -> Self {
        a.scale(w[0]).add(b.scale(w[1])).add(c.scale(w[2]))
    }
}

/// Vertex shader outputs accepted as a position.
///
/// `Vec4` is homogeneous clip space. `Vec3` is already divided (NDC with
/// depth). `Vec2` is NDC at depth 0; 2D draws usually disable depth testing.
pub trait ClipPosition: Copy {
    fn to_clip(self) -> Vec4;
}

impl ClipPosition for Vec4 {
    #[inline]
    fn to_clip(self) -> Vec4 {
        self
    }
}

impl ClipPosition for Vec3 {
    #[inline]
    fn to_clip(self) -> Vec4 {
        self.extend(1.0)
    }
}

impl ClipPosition for Vec2 {
    #[inline]
    fn to_clip(self) -> Vec4 {
        Vec4::new(self.x, self.y, 0.0, 1.0)
    }
}

pub trait VertexShader {
    type Vertex: Vertex;
    type Position: ClipPosition;
    type Varyings: Copy;

    fn shade(&self, transform: &Transform, vertex: &Self::Vertex) -> (Self::Position, Self::Varyings);
}

/// Produces the tile-format color of one fragment.
pub trait PixelShader<T: Pixel> {
    type Varyings: Interpolate;

    /// `primitive` is the triangle's index within the mesh.
    fn shade(&self, varyings: &Self::Varyings, primitive: u32) -> T;
}

/// Read access to a finished tile, addressed in screen coordinates.
#[derive(Debug, Copy, Clone)]
pub struct TileView<'a, T> {
    color: &'a [T],
    depth: &'a [f32],
    stride: usize,
    rect: ScreenRect,
}

impl<'a, T: Pixel> TileView<'a, T> {
    pub(crate) fn new(color: &'a [T], depth: &'a [f32], stride: usize, rect: ScreenRect) -> Self {
        Self { color, depth, stride, rect }
    }

    /// Screen area the tile covers.
    #[inline]
    pub fn rect(&self) -> ScreenRect {
        self.rect
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> usize {
        (y - self.rect.y) as usize * self.stride + (x - self.rect.x) as usize
    }

    /// Color at a screen pixel inside the tile. Panics outside.
    #[inline]
    pub fn color(&self, x: i32, y: i32) -> T {
        debug_assert!(self.rect.contains(x, y));
        self.color[self.index(x, y)]
    }

    /// Depth at a screen pixel inside the tile. Panics outside.
    #[inline]
    pub fn depth(&self, x: i32, y: i32) -> f32 {
        debug_assert!(self.rect.contains(x, y));
        self.depth[self.index(x, y)]
    }

    /// Color at a screen pixel, or `None` outside the tile.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<T> {
        self.rect.contains(x, y).then(|| self.color[self.index(x, y)])
    }
}

/// Post pass turning tile-format pixels into display pixels.
pub trait TileShader<T: Pixel, P: Pixel> {
    fn shade(&self, tile: &TileView<'_, T>, x: i32, y: i32) -> P;
}

/// Plain format conversion.
#[derive(Debug, Copy, Clone, Default)]
pub struct ConvertTile;

impl<T: Pixel, P: Pixel> TileShader<T, P> for ConvertTile {
    #[inline]
    fn shade(&self, tile: &TileView<'_, T>, x: i32, y: i32) -> P {
        tile.color(x, y).convert()
    }
}

impl<T: Pixel, P: Pixel, F> TileShader<T, P> for F
where
    F: Fn(&TileView<'_, T>, i32, i32) -> P,
{
    #[inline]
    fn shade(&self, tile: &TileView<'_, T>, x: i32, y: i32) -> P {
        self(tile, x, y)
    }
}

/// Immediate-mode pixel generator, called once per covered pixel.
pub trait RectShader<P> {
    fn shade(&mut self, x: i32, y: i32) -> P;
}

impl<P, F> RectShader<P> for F
where
    F: FnMut(i32, i32) -> P,
{
    #[inline]
    fn shade(&mut self, x: i32, y: i32) -> P {
        self(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::{L8, RgbF32};

    #[test]
    fn weights_blend_each_type() {
        let w = [0.5, 0.25, 0.25];
        assert_eq!(f32::weighted(&4.0, &8.0, &0.0, w), 4.0);
        assert_eq!(Vec2::weighted(&Vec2::X, &Vec2::Y, &Vec2::ZERO, w), Vec2::new(0.5, 0.25));
        assert_eq!(<[f32; 2]>::weighted(&[1.0, 0.0], &[0.0, 1.0], &[1.0, 1.0], w), [0.75, 0.5]);
        let c = ColorRgba::weighted(&ColorRgba::white(), &ColorRgba::black(), &ColorRgba::black(), w);
        assert_eq!(c, ColorRgba::new(0.5, 0.5, 0.5, 1.0));
    }

    #[test]
    fn positions_extend_to_clip_space() {
        assert_eq!(Vec2::new(0.5, -0.5).to_clip(), Vec4::new(0.5, -0.5, 0.0, 1.0));
        assert_eq!(Vec3::new(1.0, 2.0, 0.3).to_clip(), Vec4::new(1.0, 2.0, 0.3, 1.0));
    }

    #[test]
    fn tile_view_uses_screen_coordinates() {
        let color = [RgbF32::new(0.0, 0.0, 0.0), RgbF32::new(1.0, 0.0, 0.0), RgbF32::default(), RgbF32::default()];
        let depth = [0.5, 0.25, 1.0, 1.0];
        let view = TileView::new(&color, &depth, 2, ScreenRect::new(10, 20, 2, 1));
        assert_eq!(view.color(11, 20), RgbF32::new(1.0, 0.0, 0.0));
        assert_eq!(view.depth(11, 20), 0.25);
        assert!(view.get(10, 21).is_none());

        let out: L8 = ConvertTile.shade(&view, 11, 20);
        assert_eq!(out, L8::from_rgba(ColorRgba::rgb(1.0, 0.0, 0.0)));
        let depth_probe = |t: &TileView<'_, RgbF32>, x: i32, y: i32| L8((t.depth(x, y) * 100.0) as u8);
        assert_eq!(TileShader::<RgbF32, L8>::shade(&depth_probe, &view, 10, 20), L8(50));
    }

    #[test]
    fn closures_are_rect_shaders() {
        let mut calls = 0;
        let mut s = |x: i32, y: i32| {
            calls += 1;
            x + y
        };
        assert_eq!(RectShader::shade(&mut s, 2, 3), 5);
        assert_eq!(calls, 1);
    }
}
