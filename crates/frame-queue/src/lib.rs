//! Bounded Ring Queue
//!
//! A lock-based FIFO for passing frame references between a producer and a
//! consumer. Reads are non-blocking; a write against a full queue ejects
//! the oldest slot back to the caller, which is the backpressure-recycle
//! contract the capture pipeline is built on.

mod queue;

pub use queue::RingQueue;

use thiserror::Error;

/// Errors that can occur on queue operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    /// Capacity zero is not a queue
    #[error("queue capacity must be at least 1")]
    InvalidCapacity,

    /// A thread panicked while holding the queue lock
    #[error("queue lock poisoned: {0}")]
    Poisoned(String),
}
