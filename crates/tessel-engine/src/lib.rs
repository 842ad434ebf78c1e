//! **tessel** engine: a tile-based deferred software rasterizer.
//!
//! Every buffer is sized by a [`RasterConfig`] and carved once at
//! [`Rasterizer::init`]. A frame collects dispatches (mesh + shaders +
//! state), culls and bins their clusters per screen tile, then rasterizes
//! tile by tile into a small on-chip-sized buffer and hands each finished
//! tile to a [`Device`].
//!
//! # Structure
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`pixel`] | storage formats, `ColorRgba`, blending |
//! | [`texture`] | `Texture`, compile-time `Sampler` |
//! | [`geometry`] | clustered `Mesh`, bounds and culling volumes |
//! | [`config`] | `RasterConfig`, depth conventions, footprint |
//! | [`shader`] | vertex, pixel, tile and rect shader contracts |
//! | [`state`] | culling, depth and blending state |
//! | [`pso`] | `Psc` draw description, `Transform` |
//! | [`renderer`] | `Rasterizer`, `Frame`, immediate mode |
//! | [`device`] | display contract, `MemoryDevice` |
//! | [`stats`] | per-frame counters and peak usage |
//! | [`logging`] | `env_logger` setup for hosts |

mod arena;
mod binning;
pub mod config;
pub mod coords;
pub mod device;
pub mod error;
pub mod geometry;
pub mod logging;
pub mod pixel;
pub mod pso;
mod raster;
pub mod renderer;
pub mod shader;
pub mod state;
pub mod stats;
pub mod texture;

pub use config::{DepthConvention, RasterConfig, TileOrder};
pub use coords::{ScreenRect, Viewport};
pub use device::{Device, MemoryDevice};
pub use error::{CapacityLimit, RasterError};
pub use geometry::{Mesh, MeshData, Vertex};
pub use pixel::{ColorRgba, Pixel};
pub use pso::{Psc, Transform};
pub use renderer::{Frame, Rasterizer};
pub use state::RenderState;
pub use stats::FrameStats;
