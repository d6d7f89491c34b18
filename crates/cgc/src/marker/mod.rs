//! Marker Module - Reachability Analysis
//!
//! Implements the mark phase of the collection cycle: decide which tracked
//! blocks are still reachable, with no type or layout information, using only
//! byte-for-byte value comparison against known block addresses.
//!
//! Marking runs in two steps, in strict order:
//!
//! 1. **Root scan** - every word yielded by the [`RootProvider`] is compared
//!    against every tracked block address; matches get their mark bit set.
//! 2. **Heap scan** - every marked block with a known, at-least-word-sized
//!    extent is reinterpreted as a sequence of pointer-sized words and
//!    scanned for further block addresses; newly found blocks are marked and
//!    queued for scanning in turn, computing the transitive closure of the
//!    points-to relation.
//!
//! Cycle safety: the mark bit is always set *before* a record enters the
//! worklist, so no record is scanned twice in one cycle and pointer cycles
//! terminate.

pub mod roots;
pub(crate) mod stack_scan;
pub(crate) mod worklist;

pub use roots::{ExplicitRoots, NativeStackRoots, RegionRoots, RootProvider};

use crate::align::WORD;
use crate::error::Result;
use crate::registry::Registry;
use worklist::MarkWorklist;

/// Counters produced by one mark phase.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MarkOutcome {
    /// Records marked directly from root words.
    pub(crate) roots_marked: usize,
    /// Records marked transitively through block contents.
    pub(crate) heap_marked: usize,
    /// Pointer-sized words read out of block contents.
    pub(crate) words_scanned: usize,
}

/// Run the full mark phase: root scan, then transitive heap scan.
///
/// On scratch exhaustion the error is returned with mark bits in an
/// unspecified state; the caller clears them and abandons the cycle.
pub(crate) fn mark_all(
    registry: &mut Registry,
    provider: &dyn RootProvider,
) -> Result<MarkOutcome> {
    let roots_marked = mark_roots(registry, provider);
    let (heap_marked, words_scanned) = mark_heap(registry)?;

    Ok(MarkOutcome {
        roots_marked,
        heap_marked,
        words_scanned,
    })
}

/// Mark every record whose block address appears among the root words.
///
/// First match suffices per record; no side effects beyond mark bits.
fn mark_roots(registry: &mut Registry, provider: &dyn RootProvider) -> usize {
    let words = provider.root_words();
    if words.is_empty() {
        return 0;
    }

    let mut marked = 0;
    let mut cursor = registry.head;
    while let Some(idx) = cursor {
        let (address, next) = {
            let obj = registry.get(idx);
            (obj.address(), obj.next)
        };
        cursor = next;

        if words.iter().any(|&w| w == address) {
            registry.get_mut(idx).marked = true;
            marked += 1;
        }
    }

    log::debug!("root scan: {} of {} records marked", marked, registry.len());
    marked
}

/// Transitively mark records reachable through the contents of already
/// marked records.
///
/// A record is scanned iff it is marked, its size is known, and the size
/// holds at least one pointer-sized word. Contents are read as unaligned
/// word loads (adopted blocks carry no alignment guarantee); any trailing
/// partial word is ignored.
fn mark_heap(registry: &mut Registry) -> Result<(usize, usize)> {
    // One slot per live record bounds the worklist: a record enters at most
    // once because its mark bit is set before it is pushed.
    let mut worklist = MarkWorklist::with_capacity(registry.len())?;

    // Seed with the scannable records the root scan marked.
    let mut cursor = registry.head;
    while let Some(idx) = cursor {
        let (marked, scannable, next) = {
            let obj = registry.get(idx);
            (obj.marked, obj.is_scannable(), obj.next)
        };
        cursor = next;

        if marked && scannable {
            worklist.push(idx);
        }
    }

    let mut heap_marked = 0;
    let mut words_scanned = 0;

    while let Some(idx) = worklist.pop() {
        let (base, nwords) = {
            let obj = registry.get(idx);
            debug_assert!(obj.marked, "only marked records are scanned");
            debug_assert!(
                registry.contains(obj.address()),
                "scanned record must be tracked"
            );
            (obj.data as *const u8, obj.word_count())
        };

        for i in 0..nwords {
            // The block stays mapped for as long as its record is live, and
            // `word_count` keeps the read inside the declared extent.
            let word = unsafe { base.add(i * WORD).cast::<usize>().read_unaligned() };
            words_scanned += 1;

            if word == 0 {
                continue;
            }

            // Addresses are unique in the registry, so the first match is
            // the only possible one.
            let mut cur = registry.head;
            while let Some(j) = cur {
                let (address, marked, scannable, next) = {
                    let obj = registry.get(j);
                    (obj.address(), obj.marked, obj.is_scannable(), obj.next)
                };
                cur = next;

                if address != word {
                    continue;
                }
                if !marked {
                    registry.get_mut(j).marked = true;
                    heap_marked += 1;
                    if scannable {
                        worklist.push(j);
                    }
                }
                break;
            }
        }
    }

    log::debug!(
        "heap scan: {} records marked, {} words read, {} scans",
        heap_marked,
        words_scanned,
        worklist.processed()
    );
    Ok((heap_marked, words_scanned))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(registry: &mut Registry, address: usize, size: Option<usize>) -> usize {
        registry.insert(address as *mut u8, size, None)
    }

    #[test]
    fn test_root_scan_marks_exact_matches_only() {
        let mut registry = Registry::new();
        let hit = record(&mut registry, 0x1000, None);
        let miss = record(&mut registry, 0x2000, None);
        let interior = record(&mut registry, 0x3000, None);

        let roots = ExplicitRoots::new();
        roots.add(0x1000);
        roots.add(0x3000 + WORD); // interior pointer, must not retain

        let marked = mark_roots(&mut registry, &roots);

        assert_eq!(marked, 1);
        assert!(registry.get(hit).marked);
        assert!(!registry.get(miss).marked);
        assert!(!registry.get(interior).marked);
    }

    #[test]
    fn test_heap_scan_follows_block_contents() {
        // Two real blocks: `a` holds the address of `b` in its first word.
        let a = unsafe { libc::malloc(WORD * 2) } as *mut u8;
        let b = unsafe { libc::malloc(WORD) } as *mut u8;
        unsafe {
            std::ptr::write_bytes(a, 0, WORD * 2);
            std::ptr::write_bytes(b, 0, WORD);
            (a as *mut usize).write(b as usize);
        }

        let mut registry = Registry::new();
        let ia = registry.insert(a, Some(WORD * 2), None);
        let ib = registry.insert(b, Some(WORD), None);

        registry.get_mut(ia).marked = true;
        let (heap_marked, words_scanned) = mark_heap(&mut registry).unwrap();

        assert_eq!(heap_marked, 1);
        assert!(words_scanned >= 2);
        assert!(registry.get(ib).marked);

        unsafe {
            libc::free(a.cast());
            libc::free(b.cast());
        }
    }

    #[test]
    fn test_heap_scan_skips_unmarked_and_unknown_size() {
        let a = unsafe { libc::malloc(WORD) } as *mut u8;
        let b = unsafe { libc::malloc(WORD) } as *mut u8;
        unsafe {
            (a as *mut usize).write(b as usize);
            std::ptr::write_bytes(b, 0, WORD);
        }

        let mut registry = Registry::new();
        // Unknown size: the record is marked but must not be scanned.
        let ia = registry.insert(a, None, None);
        let ib = registry.insert(b, Some(WORD), None);

        registry.get_mut(ia).marked = true;
        let (heap_marked, _) = mark_heap(&mut registry).unwrap();

        assert_eq!(heap_marked, 0);
        assert!(!registry.get(ib).marked);

        unsafe {
            libc::free(a.cast());
            libc::free(b.cast());
        }
    }
}
