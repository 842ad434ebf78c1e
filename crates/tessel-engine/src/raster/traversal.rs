use crate::config::TileOrder;

/// Yields every tile coordinate of a `tiles_x` by `tiles_y` grid exactly once.
#[derive(Debug, Clone)]
pub(crate) struct TileTraversal {
    order: TileOrder,
    tiles_x: u32,
    tiles_y: u32,
    next: u32,
    end: u32,
}

impl TileTraversal {
    pub(crate) fn new(order: TileOrder, tiles_x: u32, tiles_y: u32) -> Self {
        let end = match order {
            TileOrder::Linear => tiles_x * tiles_y,
            TileOrder::Morton => {
                let side = tiles_x.max(tiles_y).next_power_of_two();
                side * side
            }
        };
        Self { order, tiles_x, tiles_y, next: 0, end }
    }
}

/// Gathers the even bits of `v` into the low half.
#[inline]
fn compact_bits(mut v: u32) -> u32 {
    v &= 0x5555_5555;
    v = (v | (v >> 1)) & 0x3333_3333;
    v = (v | (v >> 2)) & 0x0f0f_0f0f;
    v = (v | (v >> 4)) & 0x00ff_00ff;
    v = (v | (v >> 8)) & 0x0000_ffff;
    v
}

impl Iterator for TileTraversal {
    type Item = (u32, u32);

    fn next(&mut self) -> Option<(u32, u32)> {
        while self.next < self.end {
            let i = self.next;
            self.next += 1;
            let (x, y) = match self.order {
                TileOrder::Linear => (i % self.tiles_x, i / self.tiles_x),
                TileOrder::Morton => (compact_bits(i), compact_bits(i >> 1)),
            };
            // Morton codes past a non-square grid land outside it.
            if x < self.tiles_x && y < self.tiles_y {
                return Some((x, y));
            }
        }
        None
    }
}
