/// Axis-aligned integer rectangle in screen pixels (top-left origin, +Y down).
///
/// Half-open: covers `x..x + w` by `y..y + h`. Negative sizes mean empty.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct ScreenRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl ScreenRect {
    #[inline]
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle covering `[x0, x1) x [y0, y1)`.
    #[inline]
    pub const fn from_bounds(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self::new(x0, y0, x1 - x0, y1 - y0)
    }

    #[inline]
    pub const fn right(self) -> i32 {
        self.x + self.w
    }

    #[inline]
    pub const fn bottom(self) -> i32 {
        self.y + self.h
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// Number of pixels covered (0 when empty).
    #[inline]
    pub const fn area(self) -> usize {
        if self.is_empty() { 0 } else { self.w as usize * self.h as usize }
    }

    #[inline]
    pub const fn contains(self, px: i32, py: i32) -> bool {
        px >= self.x && py >= self.y && px < self.right() && py < self.bottom()
    }

    #[inline]
    pub fn intersect(self, other: ScreenRect) -> Option<ScreenRect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());

        let r = ScreenRect::from_bounds(x0, y0, x1, y1);
        if r.is_empty() { None } else { Some(r) }
    }

    /// Whether `self` lies entirely inside `outer`.
    #[inline]
    pub fn is_within(self, outer: ScreenRect) -> bool {
        self.is_empty()
            || (self.x >= outer.x
                && self.y >= outer.y
                && self.right() <= outer.right()
                && self.bottom() <= outer.bottom())
    }
}
