use super::ColorRgba;

/// How a shaded fragment combines with the tile color already in place.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum BlendMode {
    /// Source overwrites destination.
    #[default]
    Replace,
    /// Channel-wise sum. Integer storage formats saturate when the result is
    /// stored; float tiles keep the full range.
    Additive,
    /// Straight-alpha "over": `src * a + dst * (1 - a)`.
    Alpha,
    /// Channel-wise product.
    Multiply,
}

impl BlendMode {
    #[inline]
    pub fn apply(self, src: ColorRgba, dst: ColorRgba) -> ColorRgba {
        match self {
            BlendMode::Replace => src,
            BlendMode::Additive => {
                let mut out = src.add(dst);
                out.a = out.a.min(1.0);
                out
            }
            BlendMode::Alpha => {
                let a = src.a.clamp(0.0, 1.0);
                let mut out = src.lerp(dst, 1.0 - a);
                out.a = a + dst.a * (1.0 - a);
                out
            }
            BlendMode::Multiply => src.modulate(dst),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn additive_sums_channels() {
        let out = BlendMode::Additive.apply(ColorRgba::rgb(0.5, 0.0, 0.0), ColorRgba::rgb(0.0, 0.5, 0.0));
        assert_eq!(out, ColorRgba::new(0.5, 0.5, 0.0, 1.0));
    }

    #[test]
    fn additive_keeps_values_above_one() {
        let out = BlendMode::Additive.apply(ColorRgba::rgb(0.75, 0.0, 0.0), ColorRgba::rgb(0.75, 0.0, 0.0));
        assert_eq!(out.r, 1.5);
    }

    #[test]
    fn additive_saturates_once_stored() {
        use crate::pixel::{Pixel, Rgb565, RgbF32};

        let out = BlendMode::Additive.apply(ColorRgba::rgb(0.8, 0.0, 0.0), ColorRgba::rgb(0.8, 0.0, 0.0));
        assert_eq!(Rgb565::from_rgba(out), Rgb565::from_rgba(ColorRgba::rgb(1.0, 0.0, 0.0)));
        assert!((RgbF32::from_rgba(out).r - 1.6).abs() < 1e-6);
    }

    #[test]
    fn alpha_half_mixes_evenly() {
        let src = ColorRgba::new(1.0, 0.0, 0.0, 0.5);
        let out = BlendMode::Alpha.apply(src, ColorRgba::rgb(0.0, 0.0, 1.0));
        assert!((out.r - 0.5).abs() < 1e-6 && (out.b - 0.5).abs() < 1e-6);
        assert_eq!(out.a, 1.0);
    }

    #[test]
    fn multiply_with_white_is_identity() {
        let c = ColorRgba::new(0.25, 0.5, 0.75, 1.0);
        assert_eq!(BlendMode::Multiply.apply(c, ColorRgba::white()), c);
    }
}
