//! Statistics - Collection Counters and Timing
//!
//! Lightweight counters for monitoring collector behavior, plus a timer for
//! measuring cycle duration. Collection is gated by `GcConfig::stats_enabled`.
//!
//! The crate is single-threaded by contract, so these are plain integers.

use std::time::Duration;

/// Counters for one completed collection cycle.
#[derive(Debug, Clone, Copy)]
pub struct CycleStats {
    /// Records marked directly from root words.
    pub roots_marked: usize,
    /// Records marked transitively through block contents.
    pub heap_marked: usize,
    /// Pointer-sized words read out of block contents.
    pub words_scanned: usize,
    /// Records that survived the sweep.
    pub survivors: usize,
    /// Records finalized and removed by the sweep.
    pub reclaimed: usize,
    /// Wall-clock duration of the cycle.
    pub duration: Duration,
}

/// Cumulative collector statistics.
#[derive(Debug, Clone, Default)]
pub struct GcStats {
    cycles: u64,
    allocations: u64,
    adoptions: u64,
    reclaimed: u64,
    bytes_allocated: u64,
    last_cycle: Option<CycleStats>,
}

impl GcStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_allocation(&mut self, size: usize) {
        self.allocations += 1;
        self.bytes_allocated += size as u64;
    }

    pub(crate) fn record_adoption(&mut self) {
        self.adoptions += 1;
    }

    pub(crate) fn record_cycle(&mut self, cycle: CycleStats) {
        self.cycles += 1;
        self.reclaimed += cycle.reclaimed as u64;
        self.last_cycle = Some(cycle);
    }

    /// Completed collection cycles.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Blocks allocated through the collector.
    pub fn allocations(&self) -> u64 {
        self.allocations
    }

    /// Blocks adopted from callers.
    pub fn adoptions(&self) -> u64 {
        self.adoptions
    }

    /// Total records reclaimed across all cycles.
    pub fn reclaimed(&self) -> u64 {
        self.reclaimed
    }

    /// Total bytes requested through `alloc`.
    pub fn bytes_allocated(&self) -> u64 {
        self.bytes_allocated
    }

    /// Counters of the most recent completed cycle, if any.
    pub fn last_cycle(&self) -> Option<&CycleStats> {
        self.last_cycle.as_ref()
    }
}

/// GcTimer - timer for measuring collector operations
pub(crate) struct GcTimer {
    start: std::time::Instant,
}

impl GcTimer {
    pub(crate) fn new() -> Self {
        Self {
            start: std::time::Instant::now(),
        }
    }

    pub(crate) fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub(crate) fn elapsed_ms(&self) -> f64 {
        self.elapsed().as_secs_f64() * 1000.0
    }
}
