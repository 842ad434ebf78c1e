//! Procedural assets and shaders for the demo scene.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3, Vec4};
use tessel_asset::{encode_texture, AlignedBlob};
use tessel_engine::geometry::{ClusterLimits, MeshData, Vertex};
use tessel_engine::pixel::{PixelFormat, Rgb565, RgbF32};
use tessel_engine::shader::{Interpolate, PixelShader, TileView, VertexShader};
use tessel_engine::texture::{Bilinear, Sampler, Texture, Wrap};
use tessel_engine::{ColorRgba, Pixel, Transform};

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct DemoVertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex for DemoVertex {
    const FORMAT: u32 = u32::from_le_bytes(*b"PNU1");

    fn position(&self) -> [f32; 3] {
        self.pos
    }
}

/// Torus around the z axis, split into two segments (one per half ring).
pub fn torus(major: f32, minor: f32, rings: u32, sides: u32) -> MeshData<DemoVertex> {
    let mut verts = Vec::with_capacity(((rings + 1) * (sides + 1)) as usize);
    for i in 0..=rings {
        let a = i as f32 / rings as f32 * core::f32::consts::TAU;
        for j in 0..=sides {
            let b = j as f32 / sides as f32 * core::f32::consts::TAU;
            let normal = Vec3::new(b.cos() * a.cos(), b.cos() * a.sin(), b.sin());
            let k = major + minor * b.cos();
            verts.push(DemoVertex {
                pos: [k * a.cos(), k * a.sin(), minor * b.sin()],
                normal: normal.to_array(),
                uv: [i as f32 / rings as f32 * 4.0, j as f32 / sides as f32],
            });
        }
    }

    let at = |i: u32, j: u32| i * (sides + 1) + j;
    let half = rings / 2;
    let mut first = Vec::new();
    let mut second = Vec::new();
    for i in 0..rings {
        let out = if i < half { &mut first } else { &mut second };
        for j in 0..sides {
            let (v00, v10, v11, v01) = (at(i, j), at(i + 1, j), at(i + 1, j + 1), at(i, j + 1));
            out.extend_from_slice(&[v00, v10, v11, v00, v11, v01]);
        }
    }

    MeshData::build(&verts, &[&first, &second], ClusterLimits::default())
}

/// Upward-facing 8x8 grid at height `y`, spanning `[-half, half]` in x and z.
pub fn floor(half: f32, y: f32) -> MeshData<DemoVertex> {
    const N: u32 = 8;
    let mut verts = Vec::new();
    for i in 0..=N {
        for j in 0..=N {
            let (u, v) = (i as f32 / N as f32, j as f32 / N as f32);
            verts.push(DemoVertex {
                pos: [-half + 2.0 * half * u, y, -half + 2.0 * half * v],
                normal: [0.0, 1.0, 0.0],
                uv: [u, v],
            });
        }
    }

    let at = |i: u32, j: u32| i * (N + 1) + j;
    let mut indices = Vec::new();
    for i in 0..N {
        for j in 0..N {
            let (v00, v10, v11, v01) = (at(i, j), at(i + 1, j), at(i + 1, j + 1), at(i, j + 1));
            indices.extend_from_slice(&[v00, v01, v10, v10, v01, v11]);
        }
    }

    MeshData::build(&verts, &[&indices], ClusterLimits::default())
}

/// Two-tone RGB565 checkerboard blob, `size` texels square.
pub fn checker_texture(size: u32, cells: u32) -> AlignedBlob {
    let light = Rgb565::from_rgba(ColorRgba::rgb(0.9, 0.9, 0.85));
    let dark = Rgb565::from_rgba(ColorRgba::rgb(0.2, 0.35, 0.6));
    let cell = (size / cells.max(1)).max(1);
    let texels: Vec<Rgb565> = (0..size * size)
        .map(|i| {
            let (x, y) = (i % size, i / size);
            if (x / cell + y / cell) % 2 == 0 { light } else { dark }
        })
        .collect();
    encode_texture(size, size, PixelFormat::Rgb565, bytemuck::cast_slice(&texels))
}

// ── shaders ───────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct Lit {
    pub uv: Vec2,
    pub light: f32,
}

impl Interpolate for Lit {
    fn weighted(a: &Self, b: &Self, c: &Self, w: [f32; 3]) -> Self {
        Lit {
            uv: Vec2::weighted(&a.uv, &b.uv, &c.uv, w),
            light: f32::weighted(&a.light, &b.light, &c.light, w),
        }
    }
}

/// Untextured draws keep only the light term.
impl From<Lit> for f32 {
    fn from(v: Lit) -> f32 {
        v.light
    }
}

/// Per-vertex diffuse lighting from one directional light.
#[derive(Debug, Copy, Clone)]
pub struct Lambert {
    to_light: Vec3,
}

impl Lambert {
    pub fn new(to_light: Vec3) -> Self {
        Self { to_light: to_light.normalize_or_zero() }
    }
}

impl VertexShader for Lambert {
    type Vertex = DemoVertex;
    type Position = Vec4;
    type Varyings = Lit;

    fn shade(&self, transform: &Transform, v: &DemoVertex) -> (Vec4, Lit) {
        let n = transform.model.transform_vector3(Vec3::from(v.normal)).normalize_or_zero();
        let light = 0.15 + 0.85 * n.dot(self.to_light).max(0.0);
        let clip = transform.object_to_clip * Vec3::from(v.pos).extend(1.0);
        (clip, Lit { uv: Vec2::from(v.uv), light })
    }
}

#[derive(Debug, Copy, Clone)]
pub struct Textured<'t> {
    texture: Texture<'t, Rgb565>,
    sampler: Sampler<Bilinear, Wrap>,
}

impl<'t> Textured<'t> {
    pub fn new(texture: Texture<'t, Rgb565>) -> Self {
        Self { texture, sampler: Sampler::new() }
    }
}

impl PixelShader<RgbF32> for Textured<'_> {
    type Varyings = Lit;

    fn shade(&self, v: &Lit, _primitive: u32) -> RgbF32 {
        let texel = self.sampler.sample(&self.texture, v.uv);
        RgbF32::new(texel.r * v.light, texel.g * v.light, texel.b * v.light)
    }
}

/// Flat albedo times the interpolated light.
#[derive(Debug, Copy, Clone)]
pub struct Shaded(pub ColorRgba);

impl PixelShader<RgbF32> for Shaded {
    type Varyings = f32;

    fn shade(&self, light: &f32, _primitive: u32) -> RgbF32 {
        RgbF32::new(self.0.r * light, self.0.g * light, self.0.b * light)
    }
}

// ── tile shader ───────────────────────────────────────────────────────────

const BAYER: [[f32; 4]; 4] = [
    [0.0, 8.0, 2.0, 10.0],
    [12.0, 4.0, 14.0, 6.0],
    [3.0, 11.0, 1.0, 9.0],
    [15.0, 7.0, 13.0, 5.0],
];

/// Ordered dithering from float RGB down to 5/6/5 bits.
pub fn dither(tile: &TileView<'_, RgbF32>, x: i32, y: i32) -> Rgb565 {
    let c = tile.color(x, y);
    let t = (BAYER[(y & 3) as usize][(x & 3) as usize] + 0.5) / 16.0 - 0.5;
    Rgb565::from_rgba(ColorRgba::rgb(c.r + t / 31.0, c.g + t / 63.0, c.b + t / 31.0))
}
