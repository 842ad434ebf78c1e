//! Screen-space coordinate types.
//!
//! Canonical space:
//! - physical pixels
//! - origin top-left
//! - +X right, +Y down
//!
//! Clip space follows the `glam` D3D/wgpu convention: NDC y up, depth in `[0, 1]`.

mod rect;
mod viewport;

pub use rect::ScreenRect;
pub use viewport::Viewport;
