//! Greedy cluster builder.
//!
//! Splits indexed triangle lists into clusters of bounded vertex and triangle
//! count, in submission order, and computes each cluster's bounding sphere and
//! visibility cone. This is intentionally simple; it exists so procedurally
//! generated geometry can be turned into the same records the offline
//! converter emits.

use crate::format::{ClusterRecord, SegmentRecord, MAX_CLUSTER_VERTICES, NO_CONE_CUTOFF};

/// Per-cluster bounds used when splitting.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ClusterLimits {
    pub max_vertices: usize,
    pub max_triangles: usize,
}

impl ClusterLimits {
    pub const fn new(max_vertices: usize, max_triangles: usize) -> Self {
        Self { max_vertices, max_triangles }
    }
}

impl Default for ClusterLimits {
    fn default() -> Self {
        Self::new(64, 124)
    }
}

/// Output of [`build_clusters`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClusteredMesh {
    /// For each emitted vertex, the index of the source vertex it copies.
    pub vertex_remap: Vec<u32>,
    pub clusters: Vec<ClusterRecord>,
    pub segments: Vec<SegmentRecord>,
    pub triangles: Vec<[u8; 3]>,
}

impl ClusteredMesh {
    /// Reorders per-vertex source data into cluster order.
    pub fn gather<T: Copy>(&self, source: &[T]) -> Vec<T> {
        self.vertex_remap.iter().map(|&i| source[i as usize]).collect()
    }
}

/// Clusters each segment's triangle list independently.
///
/// `segments` holds one flat index list (three indices per triangle) per
/// material partition. Degenerate limits are raised to one triangle per cluster.
pub fn build_clusters(
    positions: &[[f32; 3]],
    segments: &[&[u32]],
    limits: ClusterLimits,
) -> ClusteredMesh {
    let limits = ClusterLimits {
        max_vertices: limits.max_vertices.clamp(3, MAX_CLUSTER_VERTICES),
        max_triangles: limits.max_triangles.max(1),
    };

    let mut out = ClusteredMesh::default();
    let mut open = OpenCluster::default();

    for indices in segments {
        let first_cluster = out.clusters.len() as u32;

        for tri in indices.chunks_exact(3) {
            let fresh = tri
                .iter()
                .enumerate()
                .filter(|&(k, v)| !tri[..k].contains(v) && open.local(*v).is_none())
                .count();

            if open.vertices.len() + fresh > limits.max_vertices
                || open.triangles.len() + 1 > limits.max_triangles
            {
                open.flush(positions, &mut out);
            }

            let local = [open.insert(tri[0]), open.insert(tri[1]), open.insert(tri[2])];
            open.triangles.push(local);
        }
        open.flush(positions, &mut out);

        let count = out.clusters.len() as u32 - first_cluster;
        out.segments.push(SegmentRecord::new(first_cluster, count));
    }

    out
}

#[derive(Default)]
struct OpenCluster {
    vertices: Vec<u32>,
    triangles: Vec<[u8; 3]>,
}

impl OpenCluster {
    fn local(&self, source: u32) -> Option<u8> {
        self.vertices.iter().position(|&v| v == source).map(|i| i as u8)
    }

    fn insert(&mut self, source: u32) -> u8 {
        match self.local(source) {
            Some(i) => i,
            None => {
                self.vertices.push(source);
                (self.vertices.len() - 1) as u8
            }
        }
    }

    fn flush(&mut self, positions: &[[f32; 3]], out: &mut ClusteredMesh) {
        if self.triangles.is_empty() {
            self.vertices.clear();
            return;
        }

        let points: Vec<[f32; 3]> = self.vertices.iter().map(|&i| positions[i as usize]).collect();
        let (center, radius) = bounding_sphere(&points);
        let (cone_axis, cone_cutoff) = visibility_cone(&points, &self.triangles);

        out.clusters.push(ClusterRecord {
            center,
            radius,
            cone_axis,
            cone_cutoff,
            vertex_offset: out.vertex_remap.len() as u32,
            vertex_count: self.vertices.len() as u32,
            triangle_offset: out.triangles.len() as u32,
            triangle_count: self.triangles.len() as u32,
        });
        out.vertex_remap.append(&mut self.vertices);
        out.triangles.append(&mut self.triangles);
    }
}

fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn dot(a: [f32; 3], b: [f32; 3]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn normalize(v: [f32; 3]) -> Option<[f32; 3]> {
    let len = dot(v, v).sqrt();
    (len > 1e-12).then(|| [v[0] / len, v[1] / len, v[2] / len])
}

/// Sphere centered on the AABB center, enclosing every point.
fn bounding_sphere(points: &[[f32; 3]]) -> ([f32; 3], f32) {
    let mut lo = [f32::MAX; 3];
    let mut hi = [f32::MIN; 3];
    for p in points {
        for k in 0..3 {
            lo[k] = lo[k].min(p[k]);
            hi[k] = hi[k].max(p[k]);
        }
    }
    let center = [(lo[0] + hi[0]) * 0.5, (lo[1] + hi[1]) * 0.5, (lo[2] + hi[2]) * 0.5];
    let radius = points
        .iter()
        .map(|&p| {
            let d = sub(p, center);
            dot(d, d)
        })
        .fold(0.0f32, f32::max)
        .sqrt();
    (center, radius)
}

/// Average triangle normal and the sine of the widest deviation from it.
///
/// Clusters whose normals spread past ~84 degrees get no cone.
fn visibility_cone(points: &[[f32; 3]], triangles: &[[u8; 3]]) -> ([f32; 3], f32) {
    let normals: Vec<[f32; 3]> = triangles
        .iter()
        .filter_map(|t| {
            let a = points[t[0] as usize];
            let b = points[t[1] as usize];
            let c = points[t[2] as usize];
            normalize(cross(sub(b, a), sub(c, a)))
        })
        .collect();

    let sum = normals.iter().fold([0.0f32; 3], |s, n| [s[0] + n[0], s[1] + n[1], s[2] + n[2]]);
    let Some(axis) = normalize(sum) else {
        return ([0.0, 0.0, 1.0], NO_CONE_CUTOFF);
    };

    let min_dot = normals.iter().map(|&n| dot(n, axis)).fold(1.0f32, f32::min);
    if min_dot <= 0.1 {
        return (axis, NO_CONE_CUTOFF);
    }
    (axis, (1.0 - min_dot * min_dot).max(0.0).sqrt())
}
