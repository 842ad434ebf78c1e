//! Per-tile triangle rasterization.
//!
//! Pipeline per triangle: trivial reject, near-plane clip, perspective
//! divide, fixed-point (1/16 px) edge setup with the top-left fill rule,
//! then a scan over the triangle's bounds within the tile.

mod clip;
mod interp;
mod traversal;
mod triangle;

pub(crate) use traversal::TileTraversal;
pub(crate) use triangle::{draw_triangle, RasterParams, TileTarget};
