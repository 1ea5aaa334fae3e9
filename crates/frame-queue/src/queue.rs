//! Ring Queue Implementation

use crate::QueueError;
use std::sync::{Condvar, Mutex, MutexGuard};

/// Bounded FIFO of opaque values with overflow recycling.
///
/// All operations take the queue mutex for their full duration. `read` is
/// non-blocking and returns `None` on empty; `write` against a full queue
/// hands the oldest value back to the caller instead of failing.
pub struct RingQueue<T> {
    /// Capacity, fixed at construction
    capacity: usize,
    /// Slot storage and cursors
    ring: Mutex<Ring<T>>,
    /// Signaled on write; a blocking read variant would wait here
    not_empty: Condvar,
    /// Signaled on read/extract; a blocking write variant would wait here
    not_full: Condvar,
}

struct Ring<T> {
    slots: Box<[Option<T>]>,
    /// Next slot to read
    head: usize,
    /// Next slot to write
    tail: usize,
    /// Occupied slots
    count: usize,
}

impl<T> RingQueue<T> {
    /// Create a queue with the given capacity (must be at least 1)
    pub fn new(capacity: usize) -> Result<Self, QueueError> {
        if capacity == 0 {
            return Err(QueueError::InvalidCapacity);
        }
        let slots: Vec<Option<T>> = (0..capacity).map(|_| None).collect();
        Ok(Self {
            capacity,
            ring: Mutex::new(Ring {
                slots: slots.into_boxed_slice(),
                head: 0,
                tail: 0,
                count: 0,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Ring<T>>, QueueError> {
        self.ring
            .lock()
            .map_err(|e| QueueError::Poisoned(e.to_string()))
    }

    /// Enqueue `value` at the tail.
    ///
    /// When the queue is full the oldest value is ejected and returned; the
    /// caller owns it from then on. `count` is unchanged in the full case
    /// and grows by one otherwise.
    pub fn write(&self, value: T) -> Result<Option<T>, QueueError> {
        let mut ring = self.lock()?;

        let mut ejected = None;
        if ring.count == self.capacity {
            // Full: erase the oldest slot and hand it back to the caller.
            let head = ring.head;
            ejected = ring.slots[head].take();
            ring.head = (head + 1) % self.capacity;
            ring.count -= 1;
        }

        let tail = ring.tail;
        ring.slots[tail] = Some(value);
        ring.tail = (tail + 1) % self.capacity;
        ring.count += 1;

        self.not_empty.notify_one();
        Ok(ejected)
    }

    /// Dequeue the value at the head, or `None` when the queue is empty.
    pub fn read(&self) -> Result<Option<T>, QueueError> {
        let mut ring = self.lock()?;

        if ring.count == 0 {
            // Non-blocking by design: a starved consumer polls.
            return Ok(None);
        }

        let head = ring.head;
        let value = ring.slots[head].take();
        ring.head = (head + 1) % self.capacity;
        ring.count -= 1;

        self.not_full.notify_one();
        Ok(value)
    }

    /// Remove and return the first occupied slot (head forward) whose value
    /// satisfies `is_stale`, keeping the relative order of the rest.
    ///
    /// Newer occupied slots shift back one position to close the gap and the
    /// tail cursor moves back by one. Returns `None` when nothing matches.
    pub fn extract_stale<F>(&self, is_stale: F) -> Result<Option<T>, QueueError>
    where
        F: Fn(&T) -> bool,
    {
        let mut ring = self.lock()?;
        let count = ring.count;

        for i in 0..count {
            let idx = (ring.head + i) % self.capacity;
            let matched = match &ring.slots[idx] {
                Some(value) => is_stale(value),
                None => false,
            };
            if !matched {
                continue;
            }

            let value = ring.slots[idx].take();

            // Close the gap: shift every newer occupied slot back one.
            let mut cur = idx;
            for _ in i + 1..count {
                let next = (cur + 1) % self.capacity;
                let moved = ring.slots[next].take();
                ring.slots[cur] = moved;
                cur = next;
            }

            ring.tail = if ring.tail == 0 {
                self.capacity - 1
            } else {
                ring.tail - 1
            };
            ring.count -= 1;

            self.not_full.notify_one();
            return Ok(value);
        }

        Ok(None)
    }

    /// Number of occupied slots
    pub fn len(&self) -> Result<usize, QueueError> {
        Ok(self.lock()?.count)
    }

    /// True when no slot is occupied
    pub fn is_empty(&self) -> Result<bool, QueueError> {
        Ok(self.lock()?.count == 0)
    }

    /// True when every slot is occupied
    pub fn is_full(&self) -> Result<bool, QueueError> {
        Ok(self.lock()?.count == self.capacity)
    }

    /// Capacity the queue was created with
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::VecDeque;

    #[test]
    fn test_rejects_zero_capacity() {
        assert!(matches!(
            RingQueue::<u32>::new(0),
            Err(QueueError::InvalidCapacity)
        ));
    }

    #[test]
    fn test_fifo_order() {
        let queue = RingQueue::new(4).unwrap();
        for v in 0..4u32 {
            assert_eq!(queue.write(v).unwrap(), None);
        }
        for v in 0..4u32 {
            assert_eq!(queue.read().unwrap(), Some(v));
        }
        assert_eq!(queue.read().unwrap(), None);
    }

    #[test]
    fn test_read_empty_is_none() {
        let queue: RingQueue<u32> = RingQueue::new(2).unwrap();
        assert_eq!(queue.read().unwrap(), None);
        assert!(queue.is_empty().unwrap());
    }

    #[test]
    fn test_write_full_ejects_oldest() {
        let queue = RingQueue::new(3).unwrap();
        for v in 0..3u32 {
            assert_eq!(queue.write(v).unwrap(), None);
        }
        assert!(queue.is_full().unwrap());

        // Overflow hands back the head value and leaves the queue full.
        assert_eq!(queue.write(3).unwrap(), Some(0));
        assert_eq!(queue.len().unwrap(), 3);

        // The survivors drain in their original order, new value last.
        assert_eq!(queue.read().unwrap(), Some(1));
        assert_eq!(queue.read().unwrap(), Some(2));
        assert_eq!(queue.read().unwrap(), Some(3));
        assert_eq!(queue.read().unwrap(), None);
    }

    #[test]
    fn test_wraparound_keeps_order() {
        let queue = RingQueue::new(3).unwrap();
        queue.write(0u32).unwrap();
        queue.write(1).unwrap();
        assert_eq!(queue.read().unwrap(), Some(0));
        queue.write(2).unwrap();
        queue.write(3).unwrap();
        assert_eq!(queue.len().unwrap(), 3);
        assert_eq!(queue.read().unwrap(), Some(1));
        assert_eq!(queue.read().unwrap(), Some(2));
        assert_eq!(queue.read().unwrap(), Some(3));
    }

    #[test]
    fn test_extract_stale_middle_slot() {
        let queue = RingQueue::new(4).unwrap();
        for v in [10u32, 11, 12, 13] {
            queue.write(v).unwrap();
        }

        let taken = queue.extract_stale(|v| *v == 12).unwrap();
        assert_eq!(taken, Some(12));
        assert_eq!(queue.len().unwrap(), 3);

        // Remaining slots keep their relative order.
        assert_eq!(queue.read().unwrap(), Some(10));
        assert_eq!(queue.read().unwrap(), Some(11));
        assert_eq!(queue.read().unwrap(), Some(13));
        assert_eq!(queue.read().unwrap(), None);
    }

    #[test]
    fn test_extract_stale_takes_first_match() {
        let queue = RingQueue::new(4).unwrap();
        for v in [1u32, 2, 4, 6] {
            queue.write(v).unwrap();
        }
        assert_eq!(queue.extract_stale(|v| v % 2 == 0).unwrap(), Some(2));
        assert_eq!(queue.read().unwrap(), Some(1));
        assert_eq!(queue.read().unwrap(), Some(4));
        assert_eq!(queue.read().unwrap(), Some(6));
    }

    #[test]
    fn test_extract_stale_no_match() {
        let queue = RingQueue::new(2).unwrap();
        queue.write(1u32).unwrap();
        assert_eq!(queue.extract_stale(|v| *v == 9).unwrap(), None);
        assert_eq!(queue.len().unwrap(), 1);
    }

    #[test]
    fn test_extract_then_write_reuses_slot() {
        let queue = RingQueue::new(2).unwrap();
        queue.write(1u32).unwrap();
        queue.write(2).unwrap();
        assert_eq!(queue.extract_stale(|v| *v == 1).unwrap(), Some(1));

        // Tail stepped back, so a write lands without ejecting.
        assert_eq!(queue.write(3).unwrap(), None);
        assert_eq!(queue.read().unwrap(), Some(2));
        assert_eq!(queue.read().unwrap(), Some(3));
    }

    #[derive(Debug, Clone)]
    enum Op {
        Write(u8),
        Read,
        ExtractEven,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            any::<u8>().prop_map(Op::Write),
            Just(Op::Read),
            Just(Op::ExtractEven),
        ]
    }

    proptest! {
        /// Model check against a plain VecDeque with the same eject and
        /// extract semantics.
        #[test]
        fn prop_matches_model(capacity in 1usize..8, ops in prop::collection::vec(op_strategy(), 0..64)) {
            let queue = RingQueue::new(capacity).unwrap();
            let mut model: VecDeque<u8> = VecDeque::new();

            for op in ops {
                match op {
                    Op::Write(v) => {
                        let expected = if model.len() == capacity {
                            model.pop_front()
                        } else {
                            None
                        };
                        model.push_back(v);
                        prop_assert_eq!(queue.write(v).unwrap(), expected);
                    }
                    Op::Read => {
                        prop_assert_eq!(queue.read().unwrap(), model.pop_front());
                    }
                    Op::ExtractEven => {
                        let pos = model.iter().position(|v| v % 2 == 0);
                        let expected = pos.and_then(|p| model.remove(p));
                        prop_assert_eq!(queue.extract_stale(|v| v % 2 == 0).unwrap(), expected);
                    }
                }
                let len = queue.len().unwrap();
                prop_assert_eq!(len, model.len());
                prop_assert!(len <= capacity);
            }

            // Drain: everything comes out in model order.
            while let Some(expected) = model.pop_front() {
                prop_assert_eq!(queue.read().unwrap(), Some(expected));
            }
            prop_assert_eq!(queue.read().unwrap(), None);
        }
    }
}
