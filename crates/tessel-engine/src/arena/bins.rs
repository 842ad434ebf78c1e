use crate::error::{CapacityLimit, RasterError};

const NONE: u32 = u32::MAX;

/// One cluster of one draw, recorded for one tile.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct BinEntry {
    /// Nearest depth of the cluster's screen bounds.
    pub near: f32,
    pub cluster: u32,
    /// Dispatch index within the frame.
    pub draw: u16,
}

/// Per-tile lists of bin entries, stored as linked fixed-size strips.
///
/// Strips are handed out from one pool in allocation order; a tile's list
/// is a chain of strips from `head` to `tail`, filled front to back.
pub(crate) struct Bins {
    capacity: usize,
    entries: Box<[BinEntry]>,
    strip_len: Box<[u32]>,
    strip_next: Box<[u32]>,
    head: Box<[u32]>,
    tail: Box<[u32]>,
    strips_used: usize,
    entries_used: usize,
}

impl Bins {
    pub(crate) fn new(tiles: usize, max_strips: usize, capacity: usize) -> Self {
        Self {
            capacity,
            entries: vec![BinEntry::default(); max_strips * capacity].into_boxed_slice(),
            strip_len: vec![0; max_strips].into_boxed_slice(),
            strip_next: vec![NONE; max_strips].into_boxed_slice(),
            head: vec![NONE; tiles].into_boxed_slice(),
            tail: vec![NONE; tiles].into_boxed_slice(),
            strips_used: 0,
            entries_used: 0,
        }
    }

    #[inline]
    pub(crate) fn strips_used(&self) -> usize {
        self.strips_used
    }

    #[inline]
    pub(crate) fn entries_used(&self) -> usize {
        self.entries_used
    }

    #[inline]
    pub(crate) fn max_strips(&self) -> usize {
        self.strip_len.len()
    }

    /// Appends `entry` to `tile`'s list, linking a fresh strip when the
    /// tail strip is full.
    pub(crate) fn push(&mut self, tile: usize, entry: BinEntry) -> Result<(), RasterError> {
        let tail = self.tail[tile];
        let strip = if tail != NONE && (self.strip_len[tail as usize] as usize) < self.capacity {
            tail as usize
        } else {
            let fresh = self.alloc_strip()?;
            if tail == NONE {
                self.head[tile] = fresh as u32;
            } else {
                self.strip_next[tail as usize] = fresh as u32;
            }
            self.tail[tile] = fresh as u32;
            fresh
        };

        let len = self.strip_len[strip] as usize;
        self.entries[strip * self.capacity + len] = entry;
        self.strip_len[strip] += 1;
        self.entries_used += 1;
        Ok(())
    }

    fn alloc_strip(&mut self) -> Result<usize, RasterError> {
        let max = self.max_strips();
        if self.strips_used == max {
            return Err(RasterError::capacity(CapacityLimit::ClusterStrips, max, max + 1));
        }
        let s = self.strips_used;
        self.strips_used += 1;
        self.strip_len[s] = 0;
        self.strip_next[s] = NONE;
        Ok(s)
    }

    /// Entries of `tile` in insertion order.
    pub(crate) fn iter(&self, tile: usize) -> BinIter<'_> {
        BinIter { bins: self, strip: self.head[tile], pos: 0 }
    }

    /// Empties every list. Strip contents are left in place and overwritten
    /// on reuse.
    pub(crate) fn reset(&mut self) {
        self.head.fill(NONE);
        self.tail.fill(NONE);
        self.strips_used = 0;
        self.entries_used = 0;
    }
}

pub(crate) struct BinIter<'a> {
    bins: &'a Bins,
    strip: u32,
    pos: usize,
}

impl Iterator for BinIter<'_> {
    type Item = BinEntry;

    fn next(&mut self) -> Option<BinEntry> {
        loop {
            if self.strip == NONE {
                return None;
            }
            let s = self.strip as usize;
            if self.pos < self.bins.strip_len[s] as usize {
                let e = self.bins.entries[s * self.bins.capacity + self.pos];
                self.pos += 1;
                return Some(e);
            }
            self.strip = self.bins.strip_next[s];
            self.pos = 0;
        }
    }
}
