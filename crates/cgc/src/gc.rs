//! GC Core Module - Collection Cycle Management
//!
//! Implements the collector context: the tracked-object registry, the
//! adaptive collection threshold, and the strictly sequenced collection
//! cycle (root scan, heap scan, sweep, threshold update). A cycle is atomic
//! with respect to the registry: callers only ever observe pre-cycle or
//! post-cycle state, never intermediate mark bits.
//!
//! The collector owns raw pointers, so it is `!Send`/`!Sync` by construction
//! and every operation takes `&mut self` - a collector context has exactly
//! one logical owner, and cross-thread use without handing the whole context
//! over does not compile.

use std::ptr::NonNull;

use crate::config::GcConfig;
use crate::error::{CgcError, Result};
use crate::marker::{self, ExplicitRoots, NativeStackRoots, RootProvider};
use crate::registry::{Finalizer, Registry};
use crate::stats::{CycleStats, GcStats, GcTimer};
use crate::sweep;

/// Collector - conservative mark-and-sweep collector context
///
/// Composes the tracked-object registry, the root provider, the sweep pass
/// and the adaptive threshold policy behind an allocate / adopt / collect
/// surface.
///
/// # Examples
///
/// ```rust
/// use cgc::{CgcConfig, Collector};
///
/// # fn main() -> cgc::Result<()> {
/// let (mut gc, roots) = Collector::with_explicit_roots(CgcConfig::default())?;
///
/// let block = gc.alloc(64)?;
/// roots.add(block.as_ptr() as usize);
///
/// gc.collect(); // rooted: the block survives
/// assert!(gc.is_tracked(block.as_ptr() as usize));
///
/// roots.remove(block.as_ptr() as usize);
/// gc.collect(); // unreachable: finalized and removed
/// assert!(!gc.is_tracked(block.as_ptr() as usize));
/// # Ok(())
/// # }
/// ```
pub struct Collector {
    /// Tracked-object registry; exclusively owned by this context.
    registry: Registry,

    /// Tracked-object count at which the next allocation runs a cycle.
    threshold: usize,

    /// Source of candidate root words, queried once per cycle.
    roots: Box<dyn RootProvider>,

    /// Collector configuration.
    config: GcConfig,

    /// Cumulative statistics (when enabled).
    stats: GcStats,
}

impl Collector {
    /// Create a collector with the given configuration and root provider.
    ///
    /// # Arguments
    /// * `config` - collector configuration parameters
    /// * `roots` - provider queried for candidate root words at each cycle
    ///
    /// # Returns
    /// The collector, or `CgcError::Configuration` if validation fails.
    pub fn new(config: GcConfig, roots: Box<dyn RootProvider>) -> Result<Self> {
        config
            .validate()
            .map_err(|e| CgcError::Configuration(format!("invalid configuration: {}", e)))?;

        Ok(Self {
            registry: Registry::new(),
            threshold: config.initial_threshold,
            roots,
            config,
            stats: GcStats::new(),
        })
    }

    /// Create a collector that conservatively scans the native stack.
    ///
    /// The region between the frame boundary at collect time and `origin`
    /// (exclusive) is scanned for root words. `origin` is captured once and
    /// never changes.
    ///
    /// # Safety
    ///
    /// `origin` must be an address at or above every stack frame that can
    /// hold references to managed blocks - conventionally the address of a
    /// local variable at the top of `main`:
    ///
    /// ```rust,no_run
    /// use cgc::{CgcConfig, Collector};
    ///
    /// # fn main() -> cgc::Result<()> {
    /// let top = 0usize; // origin marker; stays alive for the program's extent
    /// let mut gc = unsafe {
    ///     Collector::with_stack_origin(CgcConfig::default(), &top as *const _ as usize)?
    /// };
    /// let _block = gc.alloc(64)?;
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// An origin captured too low silently drops valid roots (blocks can be
    /// reclaimed while still referenced); an origin captured too high only
    /// wastes scan time.
    pub unsafe fn with_stack_origin(config: GcConfig, origin: usize) -> Result<Self> {
        Self::new(config, Box::new(NativeStackRoots::new(origin)))
    }

    /// Create a collector with an explicit root set, returning the shared
    /// handle used to edit it.
    pub fn with_explicit_roots(config: GcConfig) -> Result<(Self, ExplicitRoots)> {
        let roots = ExplicitRoots::new();
        let collector = Self::new(config, Box::new(roots.clone()))?;
        Ok((collector, roots))
    }

    /// Allocate a managed block of `size` bytes.
    ///
    /// Runs a collection cycle first when the tracked-object count has
    /// reached the threshold. The block is freed by the default finalizer
    /// when it becomes unreachable.
    ///
    /// The block contents are uninitialized.
    ///
    /// # Returns
    /// The block address, or `CgcError::OutOfMemory` if the backing
    /// allocation fails (the collector state is unchanged in that case).
    ///
    /// # Panics
    /// Panics if `size` is zero.
    pub fn alloc(&mut self, size: usize) -> Result<NonNull<u8>> {
        self.alloc_inner(size, None)
    }

    /// Allocate a managed block with a custom finalizer.
    ///
    /// The finalizer runs exactly once, when the block is reclaimed or at
    /// collector teardown, and is responsible for releasing the block.
    ///
    /// # Panics
    /// Panics if `size` is zero.
    pub fn alloc_with_finalizer<F>(&mut self, size: usize, finalizer: F) -> Result<NonNull<u8>>
    where
        F: FnOnce(*mut u8) + 'static,
    {
        self.alloc_inner(size, Some(Box::new(finalizer)))
    }

    fn alloc_inner(&mut self, size: usize, finalizer: Option<Finalizer>) -> Result<NonNull<u8>> {
        assert!(size > 0, "allocation size must be non-zero");

        self.collect_if_due();

        let data = unsafe { libc::malloc(size) } as *mut u8;
        let block = NonNull::new(data).ok_or(CgcError::OutOfMemory { requested: size })?;

        self.registry.insert(block.as_ptr(), Some(size), finalizer);
        if self.config.stats_enabled {
            self.stats.record_allocation(size);
        }

        Ok(block)
    }

    /// Hand an existing block over to the collector.
    ///
    /// `size` is the block's byte length; pass `None` when the extent is
    /// unknown, which excludes the block from heap scanning (it can still be
    /// found from roots, and other blocks' contents can still retain it).
    ///
    /// Runs a collection cycle first when the tracked-object count has
    /// reached the threshold.
    ///
    /// # Returns
    /// `CgcError::AlreadyTracked` if a record for this address exists; the
    /// registry keeps exactly one record for it.
    ///
    /// # Safety
    ///
    /// The caller must guarantee:
    /// * the block is readable for `size` bytes and stays valid until the
    ///   collector reclaims it or is dropped;
    /// * the block was obtained from `malloc` (or a compatible allocator),
    ///   since the default finalizer releases it with `free`. Blocks from
    ///   any other allocator must use [`Collector::adopt_with_finalizer`].
    pub unsafe fn adopt(&mut self, block: NonNull<u8>, size: Option<usize>) -> Result<()> {
        self.adopt_inner(block, size, None)
    }

    /// Hand an existing block over with a custom finalizer.
    ///
    /// # Safety
    ///
    /// As for [`Collector::adopt`], except the finalizer (not `free`) is
    /// responsible for releasing the block, so any allocator may back it.
    pub unsafe fn adopt_with_finalizer<F>(
        &mut self,
        block: NonNull<u8>,
        size: Option<usize>,
        finalizer: F,
    ) -> Result<()>
    where
        F: FnOnce(*mut u8) + 'static,
    {
        self.adopt_inner(block, size, Some(Box::new(finalizer)))
    }

    fn adopt_inner(
        &mut self,
        block: NonNull<u8>,
        size: Option<usize>,
        finalizer: Option<Finalizer>,
    ) -> Result<()> {
        let address = block.as_ptr() as usize;
        if self.registry.contains(address) {
            return Err(CgcError::AlreadyTracked { address });
        }

        self.collect_if_due();

        self.registry.insert(block.as_ptr(), size, finalizer);
        if self.config.stats_enabled {
            self.stats.record_adoption();
        }

        Ok(())
    }

    /// Force one collection cycle.
    ///
    /// Cannot corrupt state: if heap-scan scratch storage cannot be
    /// reserved, the cycle is abandoned (marks cleared, nothing swept,
    /// threshold unchanged) and a warning is logged.
    pub fn collect(&mut self) {
        if let Err(err) = self.try_collect() {
            log::warn!("collection cycle abandoned: {}", err);
        }
    }

    /// Force one collection cycle, surfacing the outcome.
    ///
    /// # Returns
    /// Per-cycle counters on success; `CgcError::ScratchExhausted` if the
    /// heap-scan worklist could not be reserved. On error nothing has been
    /// reclaimed and every record is back in its unmarked state.
    pub fn try_collect(&mut self) -> Result<CycleStats> {
        let timer = GcTimer::new();
        if self.config.verbose {
            println!(
                "[CGC] cycle start: {} tracked, threshold {}",
                self.registry.len(),
                self.threshold
            );
        }

        // Mark phase: root scan, then transitive heap scan.
        let marks = match marker::mark_all(&mut self.registry, self.roots.as_ref()) {
            Ok(marks) => marks,
            Err(err) => {
                // Abandon the cycle: restore the all-unmarked invariant and
                // skip the sweep. Reclaiming nothing is always safe.
                self.registry.clear_marks();
                if self.config.verbose {
                    println!("[CGC] cycle abandoned: {}", err);
                }
                return Err(err);
            }
        };

        // Sweep phase, then the threshold update.
        let swept = sweep::sweep(&mut self.registry);
        self.threshold = 2 * self.registry.len();

        let cycle = CycleStats {
            roots_marked: marks.roots_marked,
            heap_marked: marks.heap_marked,
            words_scanned: marks.words_scanned,
            survivors: swept.survivors,
            reclaimed: swept.reclaimed,
            duration: timer.elapsed(),
        };
        if self.config.stats_enabled {
            self.stats.record_cycle(cycle);
        }

        if self.config.verbose {
            println!(
                "[CGC] cycle complete in {:.3}ms: {} reclaimed, {} survivors, next threshold {}",
                timer.elapsed_ms(),
                swept.reclaimed,
                swept.survivors,
                self.threshold
            );
        }

        debug_assert_eq!(self.registry.len(), swept.survivors);
        Ok(cycle)
    }

    fn collect_if_due(&mut self) {
        if self.registry.len() >= self.threshold {
            self.collect();
        }
    }

    /// Number of currently tracked blocks.
    pub fn live_count(&self) -> usize {
        self.registry.len()
    }

    /// Tracked-object count at which the next allocation runs a cycle.
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Whether a block with this address is currently tracked.
    pub fn is_tracked(&self, address: usize) -> bool {
        self.registry.contains(address)
    }

    /// Cumulative statistics.
    pub fn stats(&self) -> &GcStats {
        &self.stats
    }

    /// The active configuration.
    pub fn config(&self) -> &GcConfig {
        &self.config
    }
}

impl Drop for Collector {
    /// Teardown finalizes every tracked block exactly once: one final
    /// collection cycle reclaims the unreachable, then every remaining
    /// record is finalized regardless of reachability.
    fn drop(&mut self) {
        self.collect();
        let finalized = sweep::finalize_all(&mut self.registry);
        if self.config.verbose {
            println!("[CGC] teardown: {} residual records finalized", finalized);
        }
    }
}
