//! Blob formats for the **tessel** rasterizer.
//!
//! Meshes and textures reach the engine as pre-baked, read-only byte blobs
//! embedded in program data. This crate defines those layouts, borrows them in
//! place, writes them, and clusters raw triangle lists. It depends on nothing
//! but `bytemuck`, so offline tooling can use it without the rasterizer.
//!
//! # Structure
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`format`] | wire records, `PixelFormat`, `AlignedBlob` |
//! | [`mesh`] | `MeshBlob`, `validate_layout`, `encode_mesh` |
//! | [`texture`] | `TextureBlob`, `encode_texture` |
//! | [`cluster`] | `build_clusters`, `ClusterLimits` |
//! | [`error`] | `BlobError` |
//!
//! # Quick start
//!
//! ```rust
//! use tessel_asset::{encode_texture, PixelFormat, TextureBlob};
//!
//! let blob = encode_texture(2, 1, PixelFormat::L8, &[0, 255]);
//! let tex = TextureBlob::parse(&blob).unwrap();
//! assert_eq!((tex.width, tex.height), (2, 1));
//! ```

pub mod cluster;
pub mod error;
pub mod format;
pub mod mesh;
pub mod texture;

pub use cluster::{build_clusters, ClusterLimits, ClusteredMesh};
pub use error::{BlobError, BlobErrorKind};
pub use format::{
    AlignedBlob, ClusterRecord, MeshHeader, PixelFormat, SegmentRecord, TextureHeader,
    MAX_CLUSTER_VERTICES, NO_CONE_CUTOFF,
};
pub use mesh::{encode_mesh, validate_layout, MeshBlob, MeshParts};
pub use texture::{encode_texture, TextureBlob};
