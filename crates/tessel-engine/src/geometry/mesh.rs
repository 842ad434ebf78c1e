use core::ops::Range;

use bytemuck::Pod;
use tessel_asset::{
    build_clusters, encode_mesh, validate_layout, AlignedBlob, ClusterLimits, ClusterRecord, MeshBlob,
    MeshParts, SegmentRecord,
};

use super::{Cone, Sphere};
use crate::error::RasterError;

/// A vertex layout stored in meshes.
///
/// `FORMAT` is an application-chosen tag written into mesh blobs; loading a
/// blob checks it together with the stride, so a blob baked for one layout
/// cannot be read as another.
pub trait Vertex: Pod {
    const FORMAT: u32;

    /// Object-space position, used for cluster bounds.
    fn position(&self) -> [f32; 3];
}

/// Borrowed view of one cluster.
#[derive(Debug, Copy, Clone)]
pub struct Cluster<'a, V> {
    pub record: &'a ClusterRecord,
    pub vertices: &'a [V],
    /// Indices relative to `vertices`.
    pub triangles: &'a [[u8; 3]],
}

impl<V> Cluster<'_, V> {
    #[inline]
    pub fn sphere(&self) -> Sphere {
        Sphere::of_cluster(self.record)
    }

    #[inline]
    pub fn cone(&self) -> Option<Cone> {
        Cone::of_cluster(self.record)
    }
}

/// Clustered mesh borrowing all of its arrays, usually straight out of a blob.
pub struct Mesh<'a, V> {
    vertices: &'a [V],
    triangles: &'a [[u8; 3]],
    clusters: &'a [ClusterRecord],
    segments: &'a [SegmentRecord],
}

impl<V> Clone for Mesh<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for Mesh<'_, V> {}

impl<V> core::fmt::Debug for Mesh<'_, V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Mesh")
            .field("vertices", &self.vertices.len())
            .field("triangles", &self.triangles.len())
            .field("clusters", &self.clusters.len())
            .field("segments", &self.segments.len())
            .finish()
    }
}

impl<'a, V: Vertex> Mesh<'a, V> {
    /// Borrows a mesh blob in place.
    ///
    /// Fails when the blob is malformed, was baked for another vertex layout,
    /// or its vertex section is not aligned for `V`.
    pub fn from_blob(blob: &'a [u8]) -> Result<Self, RasterError> {
        let mb = MeshBlob::parse(blob)?;
        let stride = size_of::<V>() as u32;
        if mb.header.vertex_format != V::FORMAT || mb.header.vertex_stride != stride {
            return Err(RasterError::VertexFormatMismatch {
                expected: V::FORMAT,
                expected_stride: stride,
                found: mb.header.vertex_format,
                found_stride: mb.header.vertex_stride,
            });
        }
        let vertices: &'a [V] =
            bytemuck::try_cast_slice(mb.vertex_bytes).map_err(|_| RasterError::Misaligned("vertex"))?;

        Ok(Self { vertices, triangles: mb.triangles, clusters: mb.clusters, segments: mb.segments })
    }

    /// Assembles a mesh from separately stored arrays, validating the layout.
    pub fn from_parts(
        vertices: &'a [V],
        triangles: &'a [[u8; 3]],
        clusters: &'a [ClusterRecord],
        segments: &'a [SegmentRecord],
    ) -> Result<Self, RasterError> {
        validate_layout(vertices.len(), triangles, clusters, segments)?;
        Ok(Self { vertices, triangles, clusters, segments })
    }
}

impl<'a, V> Mesh<'a, V> {
    #[inline]
    pub fn vertices(&self) -> &'a [V] {
        self.vertices
    }

    #[inline]
    pub fn triangles(&self) -> &'a [[u8; 3]] {
        self.triangles
    }

    #[inline]
    pub fn clusters(&self) -> &'a [ClusterRecord] {
        self.clusters
    }

    #[inline]
    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }

    /// Number of segments; a mesh without segment records has one.
    #[inline]
    pub fn segment_count(&self) -> usize {
        self.segments.len().max(1)
    }

    /// Cluster range of segment `i`.
    pub fn segment(&self, i: usize) -> Option<Range<usize>> {
        if self.segments.is_empty() {
            return (i == 0).then_some(0..self.clusters.len());
        }
        self.segments.get(i).map(SegmentRecord::cluster_range)
    }

    /// Cluster `i`. Panics when out of range.
    #[inline]
    pub fn cluster(&self, i: usize) -> Cluster<'a, V> {
        let record = &self.clusters[i];
        Cluster {
            record,
            vertices: &self.vertices[record.vertex_range()],
            triangles: &self.triangles[record.triangle_range()],
        }
    }
}

/// Owned mesh built at setup time from an indexed triangle list.
#[derive(Debug, Clone)]
pub struct MeshData<V> {
    vertices: Vec<V>,
    triangles: Vec<[u8; 3]>,
    clusters: Vec<ClusterRecord>,
    segments: Vec<SegmentRecord>,
}

impl<V: Vertex> MeshData<V> {
    /// Clusters `vertices` indexed by one index list per segment.
    ///
    /// Indices must be in range for `vertices`.
    pub fn build(vertices: &[V], segments: &[&[u32]], limits: ClusterLimits) -> Self {
        let positions: Vec<[f32; 3]> = vertices.iter().map(Vertex::position).collect();
        let built = build_clusters(&positions, segments, limits);
        log::debug!(
            "clustered {} triangles into {} clusters ({} vertices after split)",
            built.triangles.len(),
            built.clusters.len(),
            built.vertex_remap.len()
        );
        Self {
            vertices: built.gather(vertices),
            triangles: built.triangles,
            clusters: built.clusters,
            segments: built.segments,
        }
    }

    pub fn as_mesh(&self) -> Mesh<'_, V> {
        Mesh {
            vertices: &self.vertices,
            triangles: &self.triangles,
            clusters: &self.clusters,
            segments: &self.segments,
        }
    }

    /// Serializes into a mesh blob loadable with [`Mesh::from_blob`].
    pub fn to_blob(&self) -> AlignedBlob {
        encode_mesh(&MeshParts {
            vertex_format: V::FORMAT,
            vertex_stride: size_of::<V>() as u32,
            vertex_bytes: bytemuck::cast_slice(&self.vertices),
            clusters: &self.clusters,
            segments: &self.segments,
            triangles: &self.triangles,
        })
    }
}
