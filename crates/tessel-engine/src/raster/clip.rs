use glam::{Vec3, Vec4};
use smallvec::SmallVec;

/// A clip-space vertex and its barycentric position in the source triangle.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct ClipVertex {
    pub pos: Vec4,
    pub bary: Vec3,
}

pub(crate) type ClipPolygon = SmallVec<[ClipVertex; 4]>;

/// Bit set of clip volume boundaries `p` lies outside of.
#[inline]
fn outcode(p: Vec4, near: Vec4, far: Vec4) -> u8 {
    (p.x < -p.w) as u8
        | ((p.x > p.w) as u8) << 1
        | ((p.y < -p.w) as u8) << 2
        | ((p.y > p.w) as u8) << 3
        | ((near.dot(p) < 0.0) as u8) << 4
        | ((far.dot(p) < 0.0) as u8) << 5
}

/// Whether all three vertices lie outside one boundary of the clip volume.
///
/// `near` and `far` are the depth planes of the active convention.
#[inline]
pub(crate) fn outside_one_plane(tri: &[Vec4; 3], near: Vec4, far: Vec4) -> bool {
    tri.iter().fold(u8::MAX, |acc, &p| acc & outcode(p, near, far)) != 0
}

/// Clips a triangle against `plane` (kept side: `dot(plane, p) >= 0`).
///
/// Returns the source triangle untouched, a convex polygon of three or four
/// vertices, or nothing.
pub(crate) fn clip_triangle(tri: [Vec4; 3], plane: Vec4) -> ClipPolygon {
    let verts = [
        ClipVertex { pos: tri[0], bary: Vec3::X },
        ClipVertex { pos: tri[1], bary: Vec3::Y },
        ClipVertex { pos: tri[2], bary: Vec3::Z },
    ];
    let d = tri.map(|p| plane.dot(p));

    let mut out = ClipPolygon::new();
    if d.iter().all(|&x| x >= 0.0) {
        out.extend_from_slice(&verts);
        return out;
    }

    for i in 0..3 {
        let j = (i + 1) % 3;
        let (a, b) = (verts[i], verts[j]);
        if d[i] >= 0.0 {
            out.push(a);
        }
        if (d[i] >= 0.0) != (d[j] >= 0.0) {
            let t = d[i] / (d[i] - d[j]);
            out.push(ClipVertex { pos: a.pos.lerp(b.pos, t), bary: a.bary.lerp(b.bary, t) });
        }
    }
    out
}
