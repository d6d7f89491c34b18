//! Root Providers - Sources of Candidate Root Words
//!
//! Roots are the starting points for marking: every tracked block whose
//! address appears among the root words survives the cycle, as does anything
//! reachable from it through the heap scan.
//!
//! The collector does not read the machine stack directly; it asks a
//! [`RootProvider`] for a snapshot of raw words to treat as candidate
//! addresses. Shipping providers:
//!
//! 1. [`NativeStackRoots`] - reads the real stack between the current frame
//!    boundary and an origin captured by the caller at creation time
//! 2. [`ExplicitRoots`] - a plain, shared list of addresses; deterministic,
//!    used by the test suite and by callers who track their roots precisely
//! 3. [`RegionRoots`] - an explicit `[start, end)` descriptor over
//!    caller-owned memory

use std::cell::RefCell;
use std::rc::Rc;

use crate::marker::stack_scan;

/// Source of the raw words scanned for candidate block addresses.
///
/// A provider is queried once per collection cycle, at the start of the mark
/// phase. The returned words are compared byte-for-byte against every tracked
/// block address; there is no interpretation beyond equality.
pub trait RootProvider {
    /// Snapshot of the words to treat as potential root values.
    fn root_words(&self) -> Vec<usize>;
}

/// Root provider backed by the native call stack.
///
/// At each cycle the provider reads the frame-pointer register for the active
/// frame boundary and walks upward, word by word, to the origin supplied at
/// construction. The origin never changes after creation.
///
/// If the origin was captured below the program's outermost live frame, the
/// scan range misses valid roots and reachable blocks can be reclaimed early;
/// capturing it too high merely wastes scan time. This is an accepted
/// soundness gap of conservative stack scanning.
pub struct NativeStackRoots {
    origin: usize,
}

impl NativeStackRoots {
    /// Create a provider scanning up to `origin` (exclusive).
    ///
    /// # Safety
    ///
    /// `origin` must be an address at or above every stack frame that can
    /// hold references to managed blocks - conventionally the address of a
    /// local variable at the top of `main`. Every address between the
    /// frame boundary at collect time and `origin` will be read.
    pub unsafe fn new(origin: usize) -> Self {
        Self { origin }
    }

    /// The captured scan origin.
    pub fn origin(&self) -> usize {
        self.origin
    }
}

impl RootProvider for NativeStackRoots {
    fn root_words(&self) -> Vec<usize> {
        let boundary = stack_scan::frame_boundary();
        if boundary == 0 {
            log::warn!("frame-pointer read unsupported on this target; no native roots");
            return Vec::new();
        }

        // The stack grows downward on supported targets, so the active
        // boundary must sit below the origin.
        if boundary >= self.origin {
            log::warn!(
                "frame boundary {:#x} not below stack origin {:#x}; no native roots",
                boundary,
                self.origin
            );
            return Vec::new();
        }

        unsafe { stack_scan::read_words(boundary, self.origin) }
    }
}

/// Explicit, shared root list.
///
/// Cloning yields another handle to the same list, so a caller can keep a
/// handle while the collector owns the provider, and edit the root set
/// between cycles:
///
/// ```rust
/// use cgc::{CgcConfig, Collector};
///
/// # fn main() -> cgc::Result<()> {
/// let (mut gc, roots) = Collector::with_explicit_roots(CgcConfig::default())?;
/// let block = gc.alloc(32)?;
/// roots.add(block.as_ptr() as usize);
/// gc.collect(); // block survives
/// assert!(gc.is_tracked(block.as_ptr() as usize));
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Default)]
pub struct ExplicitRoots {
    words: Rc<RefCell<Vec<usize>>>,
}

impl ExplicitRoots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an address to the root set.
    pub fn add(&self, address: usize) {
        self.words.borrow_mut().push(address);
    }

    /// Remove every occurrence of an address from the root set.
    pub fn remove(&self, address: usize) {
        self.words.borrow_mut().retain(|&w| w != address);
    }

    /// Drop all roots.
    pub fn clear(&self) {
        self.words.borrow_mut().clear();
    }

    pub fn contains(&self, address: usize) -> bool {
        self.words.borrow().contains(&address)
    }

    pub fn len(&self) -> usize {
        self.words.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.borrow().is_empty()
    }
}

impl RootProvider for ExplicitRoots {
    fn root_words(&self) -> Vec<usize> {
        self.words.borrow().clone()
    }
}

/// Root provider over an explicit memory region.
///
/// Scans every aligned word in `[start, end)` at each cycle. Useful for a
/// caller-managed root area (a pinned buffer of handles, a foreign stack)
/// where the extent is known exactly.
pub struct RegionRoots {
    start: usize,
    end: usize,
}

impl RegionRoots {
    /// Create a provider over `[start, end)`.
    ///
    /// # Safety
    ///
    /// The region must stay mapped and readable for its entire extent for as
    /// long as the provider is queried.
    pub unsafe fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

impl RootProvider for RegionRoots {
    fn root_words(&self) -> Vec<usize> {
        unsafe { stack_scan::read_words(self.start, self.end) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_roots_shared_handle() {
        let roots = ExplicitRoots::new();
        let handle = roots.clone();

        roots.add(0x1000);
        handle.add(0x2000);

        assert_eq!(roots.root_words(), vec![0x1000, 0x2000]);

        handle.remove(0x1000);
        assert_eq!(roots.root_words(), vec![0x2000]);
        assert!(!roots.contains(0x1000));

        roots.clear();
        assert!(handle.is_empty());
    }

    #[test]
    fn test_region_roots_reads_backing_memory() {
        let backing = [0xAAAAusize, 0xBBBBusize];
        let start = backing.as_ptr() as usize;
        let end = start + std::mem::size_of_val(&backing);

        let provider = unsafe { RegionRoots::new(start, end) };
        assert_eq!(provider.root_words(), vec![0xAAAA, 0xBBBB]);
    }
}
