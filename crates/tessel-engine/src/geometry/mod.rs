//! Clustered geometry and the bounds used to cull it.

mod bounds;
mod mesh;

pub use bounds::{Cone, Eye, Frustum, ScreenBounds, Sphere};
pub use mesh::{Cluster, Mesh, MeshData, Vertex};
pub use tessel_asset::{ClusterLimits, ClusterRecord, SegmentRecord};

pub(crate) use bounds::screen_bounds;
