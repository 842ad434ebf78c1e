//! Barycentric weight corrections.

use glam::Vec3;

/// Screen-space barycentrics to perspective-correct weights.
///
/// `inv_w` holds `1 / w` of each vertex. One reciprocal per call.
#[inline]
pub(crate) fn perspective_weights(b: [f32; 3], inv_w: [f32; 3]) -> [f32; 3] {
    let p = [b[0] * inv_w[0], b[1] * inv_w[1], b[2] * inv_w[2]];
    let sum = p[0] + p[1] + p[2];
    if sum <= 0.0 {
        return b;
    }
    let r = sum.recip();
    [p[0] * r, p[1] * r, p[2] * r]
}

/// Maps weights over a clipped sub-triangle back onto the source triangle.
#[inline]
pub(crate) fn to_source(w: [f32; 3], bary: [Vec3; 3]) -> [f32; 3] {
    (bary[0] * w[0] + bary[1] * w[1] + bary[2] * w[2]).to_array()
}
