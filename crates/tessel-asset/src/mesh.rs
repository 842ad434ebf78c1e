//! Mesh blob: zero-copy view, validation and encoder.

use crate::error::{BlobError, BlobErrorKind};
use crate::format::{
    align_up, AlignedBlob, ClusterRecord, Cursor, MeshHeader, SegmentRecord, BLOB_VERSION,
    MAX_CLUSTER_VERTICES, MESH_MAGIC,
};

/// Borrowed view of a decoded mesh blob.
///
/// Vertex data stays untyped here; the engine casts it to its vertex type
/// after checking `header.vertex_format` and `header.vertex_stride`.
#[derive(Debug, Copy, Clone)]
pub struct MeshBlob<'a> {
    pub header: MeshHeader,
    pub clusters: &'a [ClusterRecord],
    pub segments: &'a [SegmentRecord],
    pub vertex_bytes: &'a [u8],
    pub triangles: &'a [[u8; 3]],
}

impl<'a> MeshBlob<'a> {
    /// Decodes and validates a mesh blob without copying any section.
    ///
    /// The blob must start on a 16-byte boundary for the record sections to
    /// be borrowable (see [`AlignedBlob`]).
    pub fn parse(bytes: &'a [u8]) -> Result<Self, BlobError> {
        let mut cur = Cursor::new(bytes);
        let header: MeshHeader = cur.record("mesh header")?;

        if header.magic != MESH_MAGIC {
            return Err(BlobError::new(BlobErrorKind::BadMagic, "expected TSMH", 0));
        }
        if header.version != BLOB_VERSION {
            return Err(BlobError::new(BlobErrorKind::UnsupportedVersion, "mesh version", 4));
        }
        if header.vertex_stride == 0 && header.vertex_count > 0 {
            return Err(BlobError::layout("zero vertex stride", 12));
        }

        let clusters = cur.slice::<ClusterRecord>(header.cluster_count, "cluster records")?;
        let segments = cur.slice::<SegmentRecord>(header.segment_count, "segment records")?;
        cur.align("vertex padding")?;

        let vertex_len = (header.vertex_count as usize)
            .checked_mul(header.vertex_stride as usize)
            .ok_or(BlobError::layout("vertex section size overflows", cur.offset()))?;
        let vertex_bytes = cur.take(vertex_len, "vertex data")?;
        cur.align("triangle padding")?;
        let triangles = cur.slice::<[u8; 3]>(header.triangle_count, "triangles")?;

        validate_layout(header.vertex_count as usize, triangles, clusters, segments)?;

        Ok(Self { header, clusters, segments, vertex_bytes, triangles })
    }
}

/// Checks the invariants every mesh must satisfy, wherever it came from.
///
/// - cluster vertex and triangle ranges lie inside the mesh arrays
/// - a cluster holds at most [`MAX_CLUSTER_VERTICES`] vertices
/// - every triangle index is local to its own cluster
/// - segments are ordered, non-overlapping cluster runs
pub fn validate_layout(
    vertex_count: usize,
    triangles: &[[u8; 3]],
    clusters: &[ClusterRecord],
    segments: &[SegmentRecord],
) -> Result<(), BlobError> {
    for (i, c) in clusters.iter().enumerate() {
        let verts = c.vertex_range();
        let tris = c.triangle_range();

        if verts.end > vertex_count {
            return Err(BlobError::layout("cluster vertex range out of bounds", i));
        }
        if verts.len() > MAX_CLUSTER_VERTICES {
            return Err(BlobError::layout("cluster exceeds 256 vertices", i));
        }
        if tris.end > triangles.len() {
            return Err(BlobError::layout("cluster triangle range out of bounds", i));
        }
        if !(c.radius >= 0.0 && c.radius.is_finite()) {
            return Err(BlobError::layout("cluster radius is not finite", i));
        }

        let local = verts.len();
        if triangles[tris].iter().flatten().any(|&ix| ix as usize >= local) {
            return Err(BlobError::layout("triangle index escapes its cluster", i));
        }
    }

    let mut next_free = 0usize;
    for (i, s) in segments.iter().enumerate() {
        let range = s.cluster_range();
        if range.start < next_free || range.end > clusters.len() {
            return Err(BlobError::layout("segment cluster range invalid", i));
        }
        next_free = range.end;
    }

    Ok(())
}

/// Inputs for [`encode_mesh`].
#[derive(Debug, Copy, Clone)]
pub struct MeshParts<'a> {
    pub vertex_format: u32,
    pub vertex_stride: u32,
    pub vertex_bytes: &'a [u8],
    pub clusters: &'a [ClusterRecord],
    pub segments: &'a [SegmentRecord],
    pub triangles: &'a [[u8; 3]],
}

/// Serializes a mesh into the blob layout read by [`MeshBlob::parse`].
pub fn encode_mesh(parts: &MeshParts<'_>) -> AlignedBlob {
    debug_assert!(parts.vertex_stride > 0, "vertex stride must be non-zero");
    debug_assert_eq!(parts.vertex_bytes.len() % parts.vertex_stride.max(1) as usize, 0);

    let header = MeshHeader {
        magic: MESH_MAGIC,
        version: BLOB_VERSION,
        vertex_format: parts.vertex_format,
        vertex_stride: parts.vertex_stride,
        vertex_count: (parts.vertex_bytes.len() / parts.vertex_stride.max(1) as usize) as u32,
        triangle_count: parts.triangles.len() as u32,
        cluster_count: parts.clusters.len() as u32,
        segment_count: parts.segments.len() as u32,
    };

    let mut out = Vec::new();
    out.extend_from_slice(bytemuck::bytes_of(&header));
    out.extend_from_slice(bytemuck::cast_slice(parts.clusters));
    out.extend_from_slice(bytemuck::cast_slice(parts.segments));
    out.resize(align_up(out.len()), 0);
    out.extend_from_slice(parts.vertex_bytes);
    out.resize(align_up(out.len()), 0);
    out.extend_from_slice(bytemuck::cast_slice(parts.triangles));
    out.resize(align_up(out.len()), 0);

    AlignedBlob::from_bytes(&out)
}
