//! Fixed-function render state of a draw.

use crate::config::DepthConvention;
use crate::pixel::BlendMode;

/// Which triangle facing to discard. Front faces are counter-clockwise in
/// normalized device coordinates.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum CullMode {
    None,
    #[default]
    Back,
    Front,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum DepthCompare {
    #[default]
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Always,
}

impl DepthCompare {
    /// Whether a fragment at `z` passes against the stored depth.
    #[inline]
    pub fn passes(self, z: f32, stored: f32) -> bool {
        match self {
            DepthCompare::Less => z < stored,
            DepthCompare::LessEqual => z <= stored,
            DepthCompare::Greater => z > stored,
            DepthCompare::GreaterEqual => z >= stored,
            DepthCompare::Always => true,
        }
    }

    /// The convention under which this compare keeps nearer fragments.
    #[inline]
    pub const fn convention(self) -> Option<DepthConvention> {
        match self {
            DepthCompare::Less | DepthCompare::LessEqual => Some(DepthConvention::Standard),
            DepthCompare::Greater | DepthCompare::GreaterEqual => Some(DepthConvention::Reversed),
            DepthCompare::Always => None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct DepthTest {
    pub enabled: bool,
    pub compare: DepthCompare,
    pub write: bool,
}

impl Default for DepthTest {
    fn default() -> Self {
        Self::new(DepthCompare::Less)
    }
}

impl DepthTest {
    /// Testing and writing with `compare`.
    pub const fn new(compare: DepthCompare) -> Self {
        Self { enabled: true, compare, write: true }
    }

    /// Neither tests nor writes depth.
    pub const fn disabled() -> Self {
        Self { enabled: false, compare: DepthCompare::Always, write: false }
    }

    /// The strict nearer-wins test for `convention`.
    pub const fn for_convention(convention: DepthConvention) -> Self {
        match convention {
            DepthConvention::Standard => Self::new(DepthCompare::Less),
            DepthConvention::Reversed => Self::new(DepthCompare::Greater),
        }
    }

    pub const fn with_write(mut self, write: bool) -> Self {
        self.write = write;
        self
    }

    /// Whether Hi-Z may reject geometry drawn with this test.
    #[inline]
    pub(crate) fn occludable(&self, convention: DepthConvention) -> bool {
        self.enabled && matches!(self.compare.convention(), Some(c) if c == convention)
    }
}

/// How varyings are interpolated across a triangle.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum Interpolation {
    /// Perspective-correct.
    #[default]
    Perspective,
    /// Affine in screen space; cheaper, exact for 2D.
    Linear,
}

#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct RenderState {
    pub cull: CullMode,
    pub blend: BlendMode,
    pub depth: DepthTest,
    pub interpolation: Interpolation,
    /// Runs the pixel shader and writes color for fragments that fail the
    /// depth test. Depth is still written only for passing fragments.
    pub debug_disable_depth_gate: bool,
}

impl RenderState {
    pub const fn new() -> Self {
        Self {
            cull: CullMode::Back,
            blend: BlendMode::Replace,
            depth: DepthTest::new(DepthCompare::Less),
            interpolation: Interpolation::Perspective,
            debug_disable_depth_gate: false,
        }
    }

    pub const fn with_cull(mut self, cull: CullMode) -> Self {
        self.cull = cull;
        self
    }

    pub const fn with_blend(mut self, blend: BlendMode) -> Self {
        self.blend = blend;
        self
    }

    pub const fn with_depth(mut self, depth: DepthTest) -> Self {
        self.depth = depth;
        self
    }

    pub const fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    pub const fn with_debug_disable_depth_gate(mut self, on: bool) -> Self {
        self.debug_disable_depth_gate = on;
        self
    }
}
