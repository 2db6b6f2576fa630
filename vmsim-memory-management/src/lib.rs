//! VMSIM Memory Management
//!
//! This crate provides the two simulation engines of VMSIM: demand paging with
//! FIFO/LRU/LFU page replacement, and base/limit segment translation.
//! The engines are plain values with no shared state; callers that need
//! concurrent access wrap them in a lock (see `vmsim-services`).
//!
//! # Example
//!
//! ```rust
//! use vmsim_memory_management::{PagingConfig, PagingEngine, ReplacementPolicy};
//!
//! let config = PagingConfig::new(3, ReplacementPolicy::Lru);
//! let mut engine = PagingEngine::new(vec![1, 2, 3, 1, 2, 4], config).unwrap();
//! engine.run_to_completion();
//! assert_eq!(engine.stats().faults, 4);
//! assert_eq!(engine.snapshot().frames, vec![Some(1), Some(2), Some(4)]);
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(clippy::all)]

extern crate alloc;

// Re-export API types
pub use vmsim_api::*;

// Memory management modules
pub mod page_table;
pub mod paging;
pub mod replacement;
pub mod segmentation;

// Re-export commonly used types
pub use page_table::{PageTable, PageTableEntry};
pub use paging::{EngineState, FINISHED_EVENT, PagingConfig, PagingEngine, PagingSnapshot, PagingStats, StepOutcome};
pub use replacement::{ReplacementPolicy, Replacer, Victim};
pub use segmentation::{
    SegmentDescriptor, SegmentEngine, SegmentSnapshot, SegmentStats, SegmentTableEntry, Translation,
    TranslationFault,
};
