//! Primitive identifiers used by the paging and segmentation models

/// A virtual page number as it appears in a reference string
pub type PageNumber = u64;

/// Index of a physical frame slot
pub type FrameIndex = usize;

/// Identifier of a segment in a segment table
pub type SegmentId = u64;

/// Logical simulation time
pub type Tick = u64;

/// A translated physical address
pub type PhysAddr = u64;
