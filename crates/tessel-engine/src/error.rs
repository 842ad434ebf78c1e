use core::fmt;

use tessel_asset::BlobError;

use crate::pixel::PixelFormat;

/// A statically budgeted buffer category.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum CapacityLimit {
    /// `dispatch_pso` calls between two commits.
    Dispatches,
    /// Clusters surviving culling in one frame.
    Clusters,
    /// Strip nodes linking bin entries to tiles.
    ClusterStrips,
    /// Vertices of one cluster held in the post-transform buffer.
    PtvVertices,
    /// Per-vertex varyings size in bytes.
    VaryingSize,
}

impl fmt::Display for CapacityLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CapacityLimit::Dispatches => "max_dispatches",
            CapacityLimit::Clusters => "max_clusters",
            CapacityLimit::ClusterStrips => "max_cluster_strips",
            CapacityLimit::PtvVertices => "max_cluster_vertices",
            CapacityLimit::VaryingSize => "max_varying_bytes",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    /// A configured capacity was hit while building the frame. Not
    /// recoverable for the current frame; raise the limit in `RasterConfig`.
    #[error("{limit} exceeded: needed {requested}, configured {capacity}")]
    CapacityExceeded {
        limit: CapacityLimit,
        capacity: usize,
        requested: usize,
    },

    /// Commit was called on a frame that already failed a dispatch.
    #[error("frame aborted after a failed dispatch")]
    FrameAborted,

    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    #[error(transparent)]
    Blob(#[from] BlobError),

    #[error("pixel format mismatch: expected {expected:?}, found {found:?}")]
    FormatMismatch {
        expected: PixelFormat,
        found: PixelFormat,
    },

    #[error("vertex format mismatch: expected tag {expected} ({expected_stride} bytes), found tag {found} ({found_stride} bytes)")]
    VertexFormatMismatch {
        expected: u32,
        expected_stride: u32,
        found: u32,
        found_stride: u32,
    },

    #[error("{0} data is not aligned for in-place access")]
    Misaligned(&'static str),

    #[error("texture is {width}x{height} but holds {found} texels")]
    TextureSize { width: u32, height: u32, found: usize },
}

impl RasterError {
    pub(crate) fn capacity(limit: CapacityLimit, capacity: usize, requested: usize) -> Self {
        log::error!("{limit} exceeded: needed {requested}, configured {capacity}");
        RasterError::CapacityExceeded { limit, capacity, requested }
    }
}
