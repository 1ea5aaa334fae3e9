//! Allocation accounting for aligned frame regions.
//!
//! Wraps the system allocator to count allocations matching the frame
//! layout, proving every region is allocated once and released exactly
//! once. Kept to a single test function: the counters are process-global.

use aligned_memory::AlignedBuf;
use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicUsize, Ordering};

const FRAME_SIZE: usize = 320 * 240;
const FRAME_ALIGN: usize = 64;

static FRAME_ALLOCS: AtomicUsize = AtomicUsize::new(0);
static FRAME_FREES: AtomicUsize = AtomicUsize::new(0);

struct CountingAlloc;

fn is_frame_layout(layout: &Layout) -> bool {
    layout.size() == FRAME_SIZE && layout.align() == FRAME_ALIGN
}

// GlobalAlloc's default alloc_zeroed routes through alloc, so counting in
// alloc/dealloc covers AlignedBuf::zeroed.
unsafe impl GlobalAlloc for CountingAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if is_frame_layout(&layout) {
            FRAME_ALLOCS.fetch_add(1, Ordering::SeqCst);
        }
        System.alloc(layout)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        if is_frame_layout(&layout) {
            FRAME_FREES.fetch_add(1, Ordering::SeqCst);
        }
        System.dealloc(ptr, layout)
    }
}

#[global_allocator]
static ALLOC: CountingAlloc = CountingAlloc;

#[test]
fn regions_are_released_exactly_once() {
    let pool: Vec<AlignedBuf> = (0..4)
        .map(|_| AlignedBuf::zeroed(FRAME_SIZE, FRAME_ALIGN).unwrap())
        .collect();

    assert_eq!(FRAME_ALLOCS.load(Ordering::SeqCst), 4);
    assert_eq!(FRAME_FREES.load(Ordering::SeqCst), 0);

    drop(pool);

    assert_eq!(FRAME_ALLOCS.load(Ordering::SeqCst), 4);
    assert_eq!(FRAME_FREES.load(Ordering::SeqCst), 4);
}
