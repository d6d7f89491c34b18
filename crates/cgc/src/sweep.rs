//! Sweeper - Reclaim Pass
//!
//! Traverses the registry chain once. Unmarked records are unlinked,
//! finalized and vacated; marked records get their bit cleared and stay.
//! Removal is coupled to finalization here and nowhere else, so a finalizer
//! never runs on a record the registry still advertises as live, and each
//! record's finalizer runs exactly once (the record is consumed by value).
//!
//! Also hosts the teardown path: `finalize_all` drains every remaining
//! record through the same consume-and-finalize step, regardless of
//! reachability.

use crate::registry::{Registry, TrackedObject};

/// Counters produced by one sweep pass.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SweepOutcome {
    /// Records finalized and removed.
    pub(crate) reclaimed: usize,
    /// Records kept, with their mark bit cleared.
    pub(crate) survivors: usize,
}

/// Reclaim every unmarked record; clear marks on the rest.
pub(crate) fn sweep(registry: &mut Registry) -> SweepOutcome {
    let mut reclaimed = 0;
    let mut survivors = 0;

    let mut prev: Option<usize> = None;
    let mut cursor = registry.head;
    while let Some(idx) = cursor {
        let (marked, next) = {
            let obj = registry.get(idx);
            (obj.marked, obj.next)
        };

        if marked {
            registry.get_mut(idx).marked = false;
            prev = Some(idx);
            survivors += 1;
        } else {
            // Unlink before vacating, so the chain never points at a
            // vacated slot.
            match prev {
                None => registry.head = next,
                Some(p) => registry.get_mut(p).next = next,
            }
            let record = registry.take(idx);
            finalize(record);
            reclaimed += 1;
        }

        cursor = next;
    }

    #[cfg(debug_assertions)]
    {
        debug_assert_eq!(registry.len(), registry.chain_len());
        debug_assert!(registry.iter().all(|(_, obj)| !obj.marked));
    }

    log::debug!("sweep: {} reclaimed, {} survivors", reclaimed, survivors);
    SweepOutcome {
        reclaimed,
        survivors,
    }
}

/// Consume a record: run its finalizer on the block, or free the block when
/// no finalizer was supplied.
pub(crate) fn finalize(record: TrackedObject) {
    let TrackedObject {
        data, finalizer, ..
    } = record;

    match finalizer {
        Some(f) => f(data),
        None => unsafe { libc::free(data.cast()) },
    }
}

/// Teardown: finalize every remaining record, reachable or not.
pub(crate) fn finalize_all(registry: &mut Registry) -> usize {
    let mut finalized = 0;

    while let Some(idx) = registry.head {
        registry.head = registry.get(idx).next;
        let record = registry.take(idx);
        finalize(record);
        finalized += 1;
    }

    debug_assert!(registry.is_empty());
    finalized
}
