use glam::{Mat4, Vec3, Vec4, Vec4Swizzles};
use tessel_asset::ClusterRecord;

use crate::coords::{ScreenRect, Viewport};

/// `w` below which a projected point counts as behind the eye.
const MIN_W: f32 = 1e-5;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    #[inline]
    pub const fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Bounding sphere stored in a cluster record.
    #[inline]
    pub fn of_cluster(record: &ClusterRecord) -> Self {
        Self::new(Vec3::from(record.center), record.radius)
    }
}

/// Where the camera is, in the mesh's object space.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Eye {
    /// Perspective projection: eye position.
    Position(Vec3),
    /// Orthographic projection: normalized viewing direction.
    Direction(Vec3),
}

/// Normal cone of a cluster: every triangle normal lies within
/// `asin(cutoff)` of `axis`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Cone {
    pub axis: Vec3,
    pub cutoff: f32,
}

impl Cone {
    #[inline]
    pub const fn new(axis: Vec3, cutoff: f32) -> Self {
        Self { axis, cutoff }
    }

    /// Normal cone of a cluster record, `None` when the record opts out.
    #[inline]
    pub fn of_cluster(record: &ClusterRecord) -> Option<Self> {
        record.has_cone().then(|| Self::new(Vec3::from(record.cone_axis), record.cone_cutoff))
    }

    /// Whether every triangle bounded by `sphere` faces away from `eye`.
    #[inline]
    pub fn is_backfacing(&self, sphere: &Sphere, eye: Eye) -> bool {
        match eye {
            Eye::Position(p) => {
                let to_center = sphere.center - p;
                to_center.dot(self.axis) >= self.cutoff * to_center.length() + sphere.radius
            }
            Eye::Direction(d) => d.dot(self.axis) >= self.cutoff,
        }
    }
}

/// The six clip volume planes of a matrix, in the matrix's source space.
///
/// Planes are normalized so that `dot(plane.xyz, p) + plane.w` is a signed
/// distance, positive inside.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frustum {
    planes: [Vec4; 6],
}

impl Frustum {
    /// Extracts planes for a `[0, 1]` depth clip volume.
    pub fn from_clip(m: Mat4) -> Self {
        let (r0, r1, r2, r3) = (m.row(0), m.row(1), m.row(2), m.row(3));
        let raw = [r3 + r0, r3 - r0, r3 + r1, r3 - r1, r2, r3 - r2];
        let planes = raw.map(|p| {
            let len = p.xyz().length();
            // An infinite far plane degenerates to a zero normal; never cull against it.
            if len > f32::EPSILON { p / len } else { Vec4::new(0.0, 0.0, 0.0, 1.0) }
        });
        Self { planes }
    }

    #[inline]
    pub fn planes(&self) -> &[Vec4; 6] {
        &self.planes
    }

    /// False when the sphere lies entirely outside one of the planes.
    #[inline]
    pub fn intersects(&self, s: &Sphere) -> bool {
        self.planes.iter().all(|p| p.xyz().dot(s.center) + p.w >= -s.radius)
    }
}

/// Conservative screen footprint of a bounding volume.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ScreenBounds {
    /// Covered pixels, clipped to the viewport. May be empty.
    pub rect: ScreenRect,
    /// Depth range in `[0, 1]`.
    pub z_min: f32,
    pub z_max: f32,
}

/// Projects the corners of the sphere's bounding box.
///
/// When any corner reaches behind the eye, the footprint is the whole screen
/// with the full depth range.
pub(crate) fn screen_bounds(s: &Sphere, object_to_clip: &Mat4, viewport: Viewport) -> ScreenBounds {
    let full = ScreenBounds { rect: viewport.rect(), z_min: 0.0, z_max: 1.0 };

    let mut lo = Vec3::splat(f32::INFINITY);
    let mut hi = Vec3::splat(f32::NEG_INFINITY);
    for i in 0..8 {
        let sign = Vec3::new(
            if i & 1 == 0 { -1.0 } else { 1.0 },
            if i & 2 == 0 { -1.0 } else { 1.0 },
            if i & 4 == 0 { -1.0 } else { 1.0 },
        );
        let clip = *object_to_clip * (s.center + sign * s.radius).extend(1.0);
        if clip.w <= MIN_W {
            return full;
        }
        let ndc = clip.xyz() / clip.w;
        let screen = viewport.ndc_to_screen(ndc.truncate()).extend(ndc.z);
        lo = lo.min(screen);
        hi = hi.max(screen);
    }

    let vr = viewport.rect();
    // Clamp before the cast so huge projections cannot wrap.
    let clamp_x = |v: f32| v.clamp(vr.x as f32, vr.right() as f32) as i32;
    let clamp_y = |v: f32| v.clamp(vr.y as f32, vr.bottom() as f32) as i32;
    let rect = ScreenRect::from_bounds(
        clamp_x(lo.x.floor()),
        clamp_y(lo.y.floor()),
        clamp_x(hi.x.ceil()),
        clamp_y(hi.y.ceil()),
    );

    ScreenBounds { rect, z_min: lo.z.clamp(0.0, 1.0), z_max: hi.z.clamp(0.0, 1.0) }
}
