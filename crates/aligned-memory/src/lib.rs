//! Cache-Line-Aligned Buffer Allocation
//!
//! Provides `AlignedBuf`, an owned byte region whose address is a multiple
//! of a caller-chosen power-of-two alignment. Frame pools allocate these
//! once at startup and hand out references; the region is freed exactly
//! once when the buffer is dropped.

mod buf;

pub use buf::{is_aligned, AlignedBuf};

use thiserror::Error;

/// Errors that can occur during aligned allocation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AllocError {
    /// Alignment was zero or not a power of two
    #[error("alignment {0} is not a nonzero power of two")]
    BadAlignment(usize),

    /// Zero-sized regions are not representable
    #[error("allocation size must be nonzero")]
    ZeroSize,

    /// The system allocator returned null
    #[error("allocation of {size} bytes (alignment {align}) failed")]
    OutOfMemory { size: usize, align: usize },
}
