//! Per-frame counters and arena high-water marks.

use crate::config::RasterConfig;

/// Counters for one frame, returned by `commit`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub dispatches: u32,
    pub clusters_tested: u32,
    pub clusters_culled_frustum: u32,
    pub clusters_culled_cone: u32,
    pub clusters_culled_hiz: u32,
    pub clusters_binned: u32,
    pub strips_used: u32,
    pub bin_entries: u32,
    /// Bin entries skipped during commit because the tile already hid them.
    pub clusters_occluded_in_tile: u32,
    pub vertices_shaded: u32,
    pub vertex_cache_hits: u32,
    pub vertex_cache_misses: u32,
    pub triangles_setup: u32,
    pub triangles_culled: u32,
    pub pixels_shaded: u32,
    pub pixels_depth_rejected: u32,
    pub tiles_committed: u32,
    /// Times commit found a transfer buffer still in flight.
    pub transfer_waits: u32,
}

impl FrameStats {
    #[inline]
    pub fn clusters_culled(&self) -> u32 {
        self.clusters_culled_frustum + self.clusters_culled_cone + self.clusters_culled_hiz
    }
}

/// Largest usage of each budgeted buffer seen since init.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct PeakUsage {
    pub dispatches: usize,
    pub clusters: usize,
    pub strips: usize,
    pub bin_entries: usize,
}

impl PeakUsage {
    pub fn record(&mut self, stats: &FrameStats) {
        self.dispatches = self.dispatches.max(stats.dispatches as usize);
        self.clusters = self.clusters.max(stats.clusters_binned as usize);
        self.strips = self.strips.max(stats.strips_used as usize);
        self.bin_entries = self.bin_entries.max(stats.bin_entries as usize);
    }

    /// Logs each high-water mark against its configured capacity.
    pub fn log(&self, config: &RasterConfig) {
        let pct = |used: usize, cap: usize| if cap == 0 { 0.0 } else { used as f64 * 100.0 / cap as f64 };
        let entries_cap = config.max_cluster_strips * config.strip_capacity;

        log::info!(
            "peak dispatches {}/{} ({:.1}%)",
            self.dispatches,
            config.max_dispatches,
            pct(self.dispatches, config.max_dispatches)
        );
        log::info!(
            "peak clusters {}/{} ({:.1}%)",
            self.clusters,
            config.max_clusters,
            pct(self.clusters, config.max_clusters)
        );
        log::info!(
            "peak strips {}/{} ({:.1}%)",
            self.strips,
            config.max_cluster_strips,
            pct(self.strips, config.max_cluster_strips)
        );
        log::info!(
            "peak bin entries {}/{} ({:.1}%, strip fill {:.1}%)",
            self.bin_entries,
            entries_cap,
            pct(self.bin_entries, entries_cap),
            pct(self.bin_entries, self.strips * config.strip_capacity)
        );
    }
}
