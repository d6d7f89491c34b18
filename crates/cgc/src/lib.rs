//! # CGC - Conservative Mark-and-Sweep Garbage Collector
//!
//! CGC is a conservative, stop-the-world mark-and-sweep collector for raw
//! memory blocks. Callers allocate blocks through the collector (or hand
//! existing blocks over to it); the collector periodically reclaims blocks
//! that are unreachable from the program's live state, invoking a per-block
//! finalizer exactly once before freeing.
//!
//! ## Overview
//!
//! "Conservative" means no type or layout information is used: reachability
//! is decided by scanning raw memory for values that compare equal,
//! byte-for-byte, to known block addresses. This can retain garbage (an
//! integer that happens to look like an address) but never reclaims a truly
//! reachable block, assuming complete root coverage.
//!
//! A collection cycle is a strict sequence:
//!
//! 1. **Root scan** - the configured [`RootProvider`] yields raw words
//!    (typically a snapshot of the native stack); every tracked block whose
//!    address appears among them is marked.
//! 2. **Heap scan** - marked blocks of known, at-least-word size are read as
//!    pointer-sized words and scanned for further block addresses,
//!    transitively, via an explicit worklist (pointer cycles terminate; deep
//!    chains cannot overflow the machine stack).
//! 3. **Sweep** - unmarked records are finalized and removed; survivors get
//!    their mark bit cleared.
//! 4. **Threshold update** - the next automatic collection triggers when the
//!    tracked-object count reaches twice the survivor count.
//!
//! ## Quick Start
//!
//! ```rust
//! use cgc::{CgcConfig, Collector};
//!
//! fn main() -> cgc::Result<()> {
//!     // Deterministic root management through an explicit root set.
//!     let (mut gc, roots) = Collector::with_explicit_roots(CgcConfig::default())?;
//!
//!     let block = gc.alloc(64)?;
//!     roots.add(block.as_ptr() as usize);
//!
//!     gc.collect(); // rooted: survives
//!     assert!(gc.is_tracked(block.as_ptr() as usize));
//!
//!     roots.remove(block.as_ptr() as usize);
//!     gc.collect(); // unreachable: finalized and removed
//!     assert!(!gc.is_tracked(block.as_ptr() as usize));
//!     Ok(())
//! }
//! ```
//!
//! For real programs, [`Collector::with_stack_origin`] installs the native
//! provider, which conservatively scans the machine stack between the frame
//! boundary at collect time and an origin captured at creation (the address
//! of a local at the top of `main`, by convention).
//!
//! ## Safety
//!
//! The collector manages raw blocks and reads raw memory; users must follow
//! these rules:
//!
//! 1. **One logical owner**: a collector context is single-threaded. The
//!    type is `!Send`/`!Sync` and every operation takes `&mut self`, so this
//!    is compiler-enforced.
//! 2. **Truthful extents**: an adopted block must really be readable for the
//!    size it was adopted with (the `unsafe` contract of [`Collector::adopt`]).
//! 3. **No stale addresses**: once a block is reclaimed its address must not
//!    be used; keep a block reachable (from the scanned stack region or the
//!    explicit root set) for as long as it is in use.
//! 4. **Finalizers release**: a custom finalizer both finalizes and frees
//!    its block; the default finalizer is a plain `free`.
//!
//! ## Limitations
//!
//! - **No static/global segment scanning**: only the configured root region
//!   is scanned. References held solely in `static` data are not seen as
//!   roots; pin such blocks through an explicit root set instead.
//! - **Stop-the-world, non-moving**: no generational, incremental,
//!   compacting or multi-threaded collection.
//! - **Frame-pointer read**: the native provider reads `rbp`/`x29` and is
//!   only available on x86_64 and aarch64; other targets must supply their
//!   own [`RootProvider`].
//!
//! ## Modules
//!
//! - [`config`]: collector configuration parameters and validation
//! - [`error`]: error types for all collector operations
//! - [`gc`]: the collector context and collection cycle management
//! - [`marker`]: root providers and the mark phase
//! - [`stats`]: collection statistics

// Core modules
pub mod config;
pub mod error;
pub mod gc;

// GC algorithm components
pub mod marker;

// Monitoring
pub mod stats;

// Internals
mod align;
mod registry;
mod sweep;

// Re-export main types for convenience
pub use config::GcConfig;

/// Crate-prefixed alias for [`GcConfig`].
pub type CgcConfig = GcConfig;
pub use error::{CgcError, Result};
pub use gc::Collector;
pub use marker::{ExplicitRoots, NativeStackRoots, RegionRoots, RootProvider};
pub use stats::{CycleStats, GcStats};

/// CGC version string from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        let config = GcConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_collector_creation() {
        let result = Collector::with_explicit_roots(GcConfig::default());
        assert!(result.is_ok());
    }

    #[test]
    fn test_version_not_empty() {
        assert!(!VERSION.is_empty());
    }
}
