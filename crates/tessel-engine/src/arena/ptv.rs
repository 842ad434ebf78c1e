use bytemuck::Pod;
use glam::Vec4;

/// Post-transform vertex buffer, split into slots keyed by (draw, cluster).
///
/// Each slot holds clip-space positions and tightly packed varyings for up
/// to `max_vertices` vertices. Slots are replaced round-robin. With caching
/// disabled there is a single scratch slot and every lookup misses.
pub(crate) struct PtvCache {
    caching: bool,
    max_vertices: usize,
    slot_bytes: usize,
    positions: Box<[Vec4]>,
    varyings: Box<[u8]>,
    keys: Box<[Option<(u16, u32)>]>,
    next: usize,
}

/// Result of [`PtvCache::lookup`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum PtvLookup {
    Hit(usize),
    /// Slot claimed for the key; its contents must be rewritten.
    Miss(usize),
}

impl PtvCache {
    pub(crate) fn new(cache_slots: usize, max_vertices: usize, max_varying_bytes: usize) -> Self {
        let slots = cache_slots.max(1);
        let slot_bytes = max_vertices * max_varying_bytes;
        Self {
            caching: cache_slots > 0,
            max_vertices,
            slot_bytes,
            positions: vec![Vec4::ZERO; slots * max_vertices].into_boxed_slice(),
            varyings: vec![0; slots * slot_bytes].into_boxed_slice(),
            keys: vec![None; slots].into_boxed_slice(),
            next: 0,
        }
    }

    pub(crate) fn lookup(&mut self, draw: u16, cluster: u32) -> PtvLookup {
        if !self.caching {
            return PtvLookup::Miss(0);
        }
        let key = Some((draw, cluster));
        if let Some(slot) = self.keys.iter().position(|k| *k == key) {
            return PtvLookup::Hit(slot);
        }
        let slot = self.next;
        self.next = (self.next + 1) % self.keys.len();
        self.keys[slot] = key;
        PtvLookup::Miss(slot)
    }

    pub(crate) fn invalidate(&mut self) {
        self.keys.fill(None);
        self.next = 0;
    }

    pub(crate) fn slot(&self, slot: usize) -> PtvSlot<'_> {
        PtvSlot {
            positions: &self.positions[slot * self.max_vertices..(slot + 1) * self.max_vertices],
            varyings: &self.varyings[slot * self.slot_bytes..(slot + 1) * self.slot_bytes],
        }
    }

    pub(crate) fn slot_mut(&mut self, slot: usize) -> PtvSlotMut<'_> {
        PtvSlotMut {
            positions: &mut self.positions[slot * self.max_vertices..(slot + 1) * self.max_vertices],
            varyings: &mut self.varyings[slot * self.slot_bytes..(slot + 1) * self.slot_bytes],
        }
    }
}

pub(crate) struct PtvSlot<'a> {
    positions: &'a [Vec4],
    varyings: &'a [u8],
}

impl PtvSlot<'_> {
    #[inline]
    pub(crate) fn position(&self, i: usize) -> Vec4 {
        self.positions[i]
    }

    #[inline]
    pub(crate) fn varyings<V: Pod>(&self, i: usize) -> V {
        let n = size_of::<V>();
        bytemuck::pod_read_unaligned(&self.varyings[i * n..(i + 1) * n])
    }
}

pub(crate) struct PtvSlotMut<'a> {
    positions: &'a mut [Vec4],
    varyings: &'a mut [u8],
}

impl PtvSlotMut<'_> {
    #[inline]
    pub(crate) fn store<V: Pod>(&mut self, i: usize, position: Vec4, varyings: &V) {
        let n = size_of::<V>();
        self.positions[i] = position;
        self.varyings[i * n..(i + 1) * n].copy_from_slice(bytemuck::bytes_of(varyings));
    }
}
