use std::cell::UnsafeCell;
use std::hint;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_utils::CachePadded;

/// Bounded lock-free SPSC ring buffer.
///
/// Exactly one thread may call the producer operations (`try_push`, `push`,
/// `try_push_batch`) and exactly one other thread the consumer operations
/// (`try_pop`, `pop`, `peek`, `try_pop_batch`). The occupancy snapshots
/// (`len`, `is_empty`, `is_full`, `available`) may be called from either
/// side but can be stale the instant they return.
///
/// The buffer is shared behind an `Arc` and is never moved once both sides
/// hold a reference; it is intentionally neither `Clone` nor mutable
/// through `&mut` after construction.
pub struct RingBuffer<T> {
    /// Producer write index. Only the producer stores it.
    head: CachePadded<AtomicUsize>,
    /// Consumer read index. Only the consumer stores it.
    tail: CachePadded<AtomicUsize>,
    /// `capacity - 1`; capacity is a power of two.
    mask: usize,
    /// Slot storage, on its own allocation so neither index shares a cache
    /// line with payload bytes.
    storage: Box<[UnsafeCell<MaybeUninit<T>>]>,
}

// SAFETY: the SPSC contract above is what makes `&self` access sound. The
// producer is the only writer of `head` and of the slot at `head`; the
// consumer is the only writer of `tail` and only reads a slot after the
// producer's release store of `head` made it visible. `T: Copy` keeps slot
// reads free of destruction concerns.
unsafe impl<T: Copy + Send> Send for RingBuffer<T> {}
unsafe impl<T: Copy + Send> Sync for RingBuffer<T> {}

impl<T: Copy> RingBuffer<T> {
    /// Create a ring with `capacity` slots. `capacity` must be a power of
    /// two and at least 2; one slot stays empty as the full/empty sentinel,
    /// so the ring holds at most `capacity - 1` elements.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 2, "capacity must be at least 2");
        assert!(
            capacity.is_power_of_two(),
            "capacity must be a power of two"
        );

        let storage: Box<[UnsafeCell<MaybeUninit<T>>]> = (0..capacity)
            .map(|_| UnsafeCell::new(MaybeUninit::uninit()))
            .collect();

        RingBuffer {
            head: CachePadded::new(AtomicUsize::new(0)),
            tail: CachePadded::new(AtomicUsize::new(0)),
            mask: capacity - 1,
            storage,
        }
    }

    #[inline(always)]
    fn advance(&self, index: usize) -> usize {
        (index + 1) & self.mask
    }

    /// Push one element. Producer only. Wait-free; returns `false` if the
    /// ring is full.
    #[inline]
    pub fn try_push(&self, item: T) -> bool {
        let head = self.head.load(Ordering::Relaxed);
        let next = self.advance(head);

        // Acquire pairs with the consumer's release store of `tail`,
        // guaranteeing the slot we are about to overwrite was fully read.
        if next == self.tail.load(Ordering::Acquire) {
            return false;
        }

        // SAFETY: `head` is owned by this (the only) producer thread and
        // the slot at `head` is outside the consumer's visible range.
        unsafe {
            (*self.storage[head].get()).write(item);
        }

        // Release publishes the slot write before the new head.
        self.head.store(next, Ordering::Release);
        true
    }

    /// Push, spinning until space is available. Producer only. Burns CPU by
    /// design; the pause hint keeps the spin from starving the consumer's
    /// cache line.
    #[inline]
    pub fn push(&self, item: T) {
        while !self.try_push(item) {
            hint::spin_loop();
        }
    }

    /// Pop one element. Consumer only. Wait-free; returns `None` if the
    /// ring is empty.
    #[inline]
    pub fn try_pop(&self) -> Option<T> {
        let tail = self.tail.load(Ordering::Relaxed);

        // Acquire pairs with the producer's release store of `head`,
        // guaranteeing the slot contents are visible before we read them.
        if tail == self.head.load(Ordering::Acquire) {
            return None;
        }

        // SAFETY: `tail != head`, so the producer has initialized this slot
        // and will not touch it again until we advance `tail`.
        let item = unsafe { (*self.storage[tail].get()).assume_init() };

        // Release orders the slot read before handing it back for reuse.
        self.tail.store(self.advance(tail), Ordering::Release);
        Some(item)
    }

    /// Pop, spinning until data is available. Consumer only.
    #[inline]
    pub fn pop(&self) -> T {
        loop {
            if let Some(item) = self.try_pop() {
                return item;
            }
            hint::spin_loop();
        }
    }

    /// Read the oldest element without removing it. Consumer only.
    #[inline]
    pub fn peek(&self) -> Option<T> {
        let tail = self.tail.load(Ordering::Relaxed);
        if tail == self.head.load(Ordering::Acquire) {
            return None;
        }
        // SAFETY: same argument as `try_pop`; `tail` does not advance here.
        Some(unsafe { (*self.storage[tail].get()).assume_init() })
    }

    /// Push from a slice until the ring fills. Returns the number of
    /// elements fully transferred. Producer only.
    pub fn try_push_batch(&self, items: &[T]) -> usize {
        let mut pushed = 0;
        for &item in items {
            if !self.try_push(item) {
                break;
            }
            pushed += 1;
        }
        pushed
    }

    /// Pop up to `out.len()` elements into `out`. Returns the number of
    /// elements transferred. Consumer only.
    pub fn try_pop_batch(&self, out: &mut [T]) -> usize {
        let mut popped = 0;
        for slot in out.iter_mut() {
            match self.try_pop() {
                Some(item) => {
                    *slot = item;
                    popped += 1;
                }
                None => break,
            }
        }
        popped
    }

    /// Approximate occupancy snapshot.
    pub fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        if head >= tail {
            head - tail
        } else {
            self.capacity() - tail + head
        }
    }

    /// Snapshot: no elements buffered.
    pub fn is_empty(&self) -> bool {
        self.head.load(Ordering::Acquire) == self.tail.load(Ordering::Acquire)
    }

    /// Snapshot: a push would fail right now.
    pub fn is_full(&self) -> bool {
        let head = self.head.load(Ordering::Acquire);
        self.advance(head) == self.tail.load(Ordering::Acquire)
    }

    /// Total slot count, including the sentinel slot.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.mask + 1
    }

    /// Snapshot: slots still pushable before the ring reports full.
    pub fn available(&self) -> usize {
        self.capacity() - self.len() - 1
    }
}
