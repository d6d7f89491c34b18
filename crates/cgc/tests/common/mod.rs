//! Test Utilities for the Collector Test Suite
//!
//! Provides a fixture bundling a collector with the explicit root set that
//! drives it, plus finalizer counters for verifying exactly-once semantics.

#![allow(dead_code)]

use std::cell::Cell;
use std::ptr::NonNull;
use std::rc::Rc;

use cgc::{Collector, ExplicitRoots, GcConfig};

/// Threshold high enough that no test triggers an implicit cycle by
/// accident; tests exercising the trigger pass their own value.
pub const HIGH_THRESHOLD: usize = 1024;

/// Shared finalizer-invocation counter.
pub type Counter = Rc<Cell<usize>>;

pub fn new_counter() -> Counter {
    Rc::new(Cell::new(0))
}

/// Test fixture: a collector driven by an explicit root set.
pub struct GcFixture {
    pub gc: Collector,
    pub roots: ExplicitRoots,
}

impl GcFixture {
    /// Fixture that never collects implicitly.
    pub fn with_defaults() -> Self {
        Self::with_threshold(HIGH_THRESHOLD)
    }

    /// Fixture with a chosen initial collection threshold.
    pub fn with_threshold(initial_threshold: usize) -> Self {
        let config = GcConfig {
            initial_threshold,
            ..Default::default()
        };
        let (gc, roots) =
            Collector::with_explicit_roots(config).expect("collector creation should succeed");
        Self { gc, roots }
    }

    /// Allocate a zeroed block, so heap scans see deterministic contents.
    pub fn alloc_zeroed(&mut self, size: usize) -> NonNull<u8> {
        let block = self.gc.alloc(size).expect("allocation should succeed");
        unsafe { std::ptr::write_bytes(block.as_ptr(), 0, size) };
        block
    }

    /// Allocate a zeroed block whose finalizer bumps `counter`, then frees.
    pub fn alloc_counted(&mut self, size: usize, counter: &Counter) -> NonNull<u8> {
        let counter = Rc::clone(counter);
        let block = self
            .gc
            .alloc_with_finalizer(size, move |data| {
                counter.set(counter.get() + 1);
                unsafe { libc::free(data.cast()) };
            })
            .expect("allocation should succeed");
        unsafe { std::ptr::write_bytes(block.as_ptr(), 0, size) };
        block
    }

    /// Add the block's address to the root set.
    pub fn root(&self, block: NonNull<u8>) {
        self.roots.add(block.as_ptr() as usize);
    }

    /// Remove the block's address from the root set.
    pub fn unroot(&self, block: NonNull<u8>) {
        self.roots.remove(block.as_ptr() as usize);
    }

    pub fn tracked(&self, block: NonNull<u8>) -> bool {
        self.gc.is_tracked(block.as_ptr() as usize)
    }
}

/// Store a raw word into the block at the given word index.
pub fn write_word(block: NonNull<u8>, index: usize, value: usize) {
    unsafe { (block.as_ptr() as *mut usize).add(index).write(value) };
}

/// Store `target`'s address into the block at the given word index.
pub fn write_ref(block: NonNull<u8>, index: usize, target: NonNull<u8>) {
    write_word(block, index, target.as_ptr() as usize);
}

/// A malloc'd block for adoption tests.
pub fn malloc_block(size: usize) -> NonNull<u8> {
    let data = unsafe { libc::malloc(size) } as *mut u8;
    let block = NonNull::new(data).expect("malloc should succeed");
    unsafe { std::ptr::write_bytes(block.as_ptr(), 0, size) };
    block
}
