//! Binary layout shared by the mesh and texture blobs.
//!
//! All integers are little-endian. Sections start on 16-byte boundaries
//! (relative to the blob start) so that records, vertices and texels can be
//! borrowed in place when the blob itself is 16-byte aligned.

use core::ops::{Deref, Range};

use bytemuck::{Pod, Zeroable};

use crate::error::BlobError;

pub const MESH_MAGIC: [u8; 4] = *b"TSMH";
pub const TEXTURE_MAGIC: [u8; 4] = *b"TSTX";
pub const BLOB_VERSION: u32 = 1;

/// Alignment of every section inside a blob.
pub const SECTION_ALIGN: usize = 16;

/// Triangle indices are `u8`, so a cluster addresses at most 256 vertices.
pub const MAX_CLUSTER_VERTICES: usize = 256;

/// Cone cutoff stored for clusters without a usable visibility cone.
pub const NO_CONE_CUTOFF: f32 = 2.0;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Pod, Zeroable)]
pub struct MeshHeader {
    pub magic: [u8; 4],
    pub version: u32,
    /// Application-defined tag identifying the vertex layout.
    pub vertex_format: u32,
    pub vertex_stride: u32,
    pub vertex_count: u32,
    pub triangle_count: u32,
    pub cluster_count: u32,
    pub segment_count: u32,
}

/// One cluster: bounds, visibility cone and its vertex/triangle ranges (48 bytes).
///
/// Triangles index vertices relative to `vertex_offset`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ClusterRecord {
    /// Bounding sphere center (object space).
    pub center: [f32; 3],
    pub radius: f32,
    /// Average facing direction of the cluster's triangles.
    pub cone_axis: [f32; 3],
    /// Sine of the widest normal deviation from `cone_axis`; above 1 means no cone.
    pub cone_cutoff: f32,
    pub vertex_offset: u32,
    pub vertex_count: u32,
    pub triangle_offset: u32,
    pub triangle_count: u32,
}

impl ClusterRecord {
    #[inline]
    pub fn has_cone(&self) -> bool {
        self.cone_cutoff <= 1.0
    }

    #[inline]
    pub fn vertex_range(&self) -> Range<usize> {
        let start = self.vertex_offset as usize;
        start..start + self.vertex_count as usize
    }

    #[inline]
    pub fn triangle_range(&self) -> Range<usize> {
        let start = self.triangle_offset as usize;
        start..start + self.triangle_count as usize
    }
}

/// A material partition: a contiguous run of clusters.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Pod, Zeroable)]
pub struct SegmentRecord {
    pub first_cluster: u32,
    pub cluster_count: u32,
}

impl SegmentRecord {
    #[inline]
    pub const fn new(first_cluster: u32, cluster_count: u32) -> Self {
        Self { first_cluster, cluster_count }
    }

    #[inline]
    pub fn cluster_range(&self) -> Range<usize> {
        let start = self.first_cluster as usize;
        start..start + self.cluster_count as usize
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Pod, Zeroable)]
pub struct TextureHeader {
    pub magic: [u8; 4],
    pub version: u32,
    pub width: u32,
    pub height: u32,
    pub format: u32,
    pub data_len: u32,
    pub reserved: [u32; 2],
}

/// Pixel layouts a texture blob can declare.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[repr(u32)]
pub enum PixelFormat {
    Rgb565 = 1,
    Rgba5551 = 2,
    Rgba8888 = 3,
    L8 = 4,
    RgbF32 = 5,
}

impl PixelFormat {
    pub const fn from_tag(tag: u32) -> Option<Self> {
        match tag {
            1 => Some(Self::Rgb565),
            2 => Some(Self::Rgba5551),
            3 => Some(Self::Rgba8888),
            4 => Some(Self::L8),
            5 => Some(Self::RgbF32),
            _ => None,
        }
    }

    #[inline]
    pub const fn tag(self) -> u32 {
        self as u32
    }

    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgb565 | Self::Rgba5551 => 2,
            Self::Rgba8888 => 4,
            Self::L8 => 1,
            Self::RgbF32 => 12,
        }
    }
}

#[inline]
pub(crate) const fn align_up(n: usize) -> usize {
    (n + SECTION_ALIGN - 1) & !(SECTION_ALIGN - 1)
}

/// Forward-only reader over a blob that remembers its byte offset.
pub(crate) struct Cursor<'a> {
    rest: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { rest: bytes, offset: 0 }
    }

    #[inline]
    pub(crate) fn offset(&self) -> usize {
        self.offset
    }

    pub(crate) fn take(&mut self, n: usize, what: &'static str) -> Result<&'a [u8], BlobError> {
        if self.rest.len() < n {
            return Err(BlobError::truncated(what, self.offset));
        }
        let (head, tail) = self.rest.split_at(n);
        self.rest = tail;
        self.offset += n;
        Ok(head)
    }

    /// Skips padding up to the next section boundary.
    pub(crate) fn align(&mut self, what: &'static str) -> Result<(), BlobError> {
        let pad = align_up(self.offset) - self.offset;
        self.take(pad, what).map(|_| ())
    }

    pub(crate) fn record<T: Pod>(&mut self, what: &'static str) -> Result<T, BlobError> {
        let bytes = self.take(size_of::<T>(), what)?;
        Ok(bytemuck::pod_read_unaligned(bytes))
    }

    /// Borrows `count` records in place.
    pub(crate) fn slice<T: Pod>(&mut self, count: u32, what: &'static str) -> Result<&'a [T], BlobError> {
        let at = self.offset;
        let len = (count as usize)
            .checked_mul(size_of::<T>())
            .ok_or(BlobError::layout(what, at))?;
        let bytes = self.take(len, what)?;
        bytemuck::try_cast_slice(bytes)
            .map_err(|_| BlobError::new(crate::BlobErrorKind::Misaligned, what, at))
    }
}

/// Owned blob bytes whose start is aligned for zero-copy section access.
#[derive(Clone, PartialEq, Eq)]
pub struct AlignedBlob {
    words: Vec<u128>,
    len: usize,
}

impl AlignedBlob {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut words = vec![0u128; bytes.len().div_ceil(size_of::<u128>())];
        bytemuck::cast_slice_mut::<u128, u8>(&mut words)[..bytes.len()].copy_from_slice(bytes);
        Self { words, len: bytes.len() }
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &bytemuck::cast_slice::<u128, u8>(&self.words)[..self.len]
    }
}

impl Deref for AlignedBlob {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl core::fmt::Debug for AlignedBlob {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AlignedBlob").field("len", &self.len).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_sizes_match_the_wire_layout() {
        assert_eq!(size_of::<MeshHeader>(), 32);
        assert_eq!(size_of::<ClusterRecord>(), 48);
        assert_eq!(size_of::<SegmentRecord>(), 8);
        assert_eq!(size_of::<TextureHeader>(), 32);
    }

    #[test]
    fn pixel_format_tags_round_trip() {
        for f in [
            PixelFormat::Rgb565,
            PixelFormat::Rgba5551,
            PixelFormat::Rgba8888,
            PixelFormat::L8,
            PixelFormat::RgbF32,
        ] {
            assert_eq!(PixelFormat::from_tag(f.tag()), Some(f));
        }
        assert_eq!(PixelFormat::from_tag(0), None);
    }

    #[test]
    fn aligned_blob_keeps_length_and_alignment() {
        let blob = AlignedBlob::from_bytes(&[1, 2, 3, 4, 5]);
        assert_eq!(blob.as_bytes(), &[1, 2, 3, 4, 5]);
        assert_eq!(blob.as_ptr() as usize % align_of::<u128>(), 0);
    }

    #[test]
    fn cursor_reports_truncation_offset() {
        let data = [0u8; 6];
        let mut c = Cursor::new(&data);
        c.take(4, "head").unwrap();
        let err = c.take(4, "tail").unwrap_err();
        assert_eq!(err.kind, crate::BlobErrorKind::Truncated);
        assert_eq!(err.at, 4);
    }
}
