//! Base/limit segmentation
//!
//! A segment table is fixed for the lifetime of a [`SegmentEngine`]. Translation
//! only records the outcome of the last request; faults are ordinary return
//! values, not errors.

use core::fmt;
use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::String;
use hashbrown::HashMap;
use hashbrown::hash_map::Entry;
use serde::{Deserialize, Serialize};
use vmsim_api::{PhysAddr, Result, SegmentId, error};

/// A segment as supplied at initialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentDescriptor {
    /// Segment id
    pub id: SegmentId,
    /// Physical base address
    pub base: u64,
    /// Largest legal offset (inclusive)
    pub limit: u64,
}

impl SegmentDescriptor {
    /// Create a descriptor
    pub fn new(id: SegmentId, base: u64, limit: u64) -> Self {
        Self { id, base, limit }
    }
}

/// Base and limit of a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentTableEntry {
    /// Physical base address
    pub base: u64,
    /// Largest legal offset (inclusive)
    pub limit: u64,
}

/// Why a translation was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationFault {
    /// No such segment
    InvalidSegment(SegmentId),
    /// Offset past the segment limit
    OffsetOutOfRange {
        /// Requested offset
        offset: u64,
        /// Segment limit
        limit: u64,
    },
}

impl fmt::Display for TranslationFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranslationFault::InvalidSegment(id) => write!(f, "invalid segment {}", id),
            TranslationFault::OffsetOutOfRange { offset, limit } => {
                write!(f, "offset {} > limit {}", offset, limit)
            }
        }
    }
}

/// Outcome of a translation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Translation {
    /// The translated address
    Physical(PhysAddr),
    /// The request faulted
    Fault(TranslationFault),
}

impl Translation {
    /// The physical address, if translation succeeded
    pub fn physical(&self) -> Option<PhysAddr> {
        match self {
            Translation::Physical(addr) => Some(*addr),
            Translation::Fault(_) => None,
        }
    }

    /// True if the request faulted
    pub fn is_fault(&self) -> bool {
        matches!(self, Translation::Fault(_))
    }
}

/// Translation counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentStats {
    /// Successful translations
    pub translations: u64,
    /// Faulted translations
    pub faults: u64,
}

/// Point-in-time view of the segmentation state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentSnapshot {
    /// Segment table in ascending id order
    pub segments: BTreeMap<SegmentId, SegmentTableEntry>,
    /// Most recent event, if any translation has run
    pub event: Option<String>,
}

/// Segment translation checker
#[derive(Debug, Clone)]
pub struct SegmentEngine {
    segments: HashMap<SegmentId, SegmentTableEntry>,
    last_event: Option<String>,
    stats: SegmentStats,
}

impl SegmentEngine {
    /// Build an engine from segment descriptors
    pub fn new(descriptors: impl IntoIterator<Item = SegmentDescriptor>) -> Result<Self> {
        let mut segments: HashMap<SegmentId, SegmentTableEntry> = HashMap::new();
        for SegmentDescriptor { id, base, limit } in descriptors {
            if base.checked_add(limit).is_none() {
                return Err(error::invalid_configuration(&format!(
                    "segment {} overflows the address space (base {}, limit {})",
                    id, base, limit
                )));
            }
            match segments.entry(id) {
                Entry::Occupied(_) => {
                    return Err(error::invalid_configuration(&format!("duplicate segment id {}", id)));
                }
                Entry::Vacant(slot) => {
                    slot.insert(SegmentTableEntry { base, limit });
                }
            }
        }
        log::info!("segment engine: {} segments", segments.len());

        Ok(Self {
            segments,
            last_event: None,
            stats: SegmentStats::default(),
        })
    }

    /// Translate `(segment, offset)` to a physical address
    pub fn translate(&mut self, segment: SegmentId, offset: u64) -> Translation {
        let translation = match self.segments.get(&segment) {
            None => Translation::Fault(TranslationFault::InvalidSegment(segment)),
            Some(entry) if offset > entry.limit => Translation::Fault(TranslationFault::OffsetOutOfRange {
                offset,
                limit: entry.limit,
            }),
            Some(entry) => Translation::Physical(entry.base + offset),
        };

        let event = match translation {
            Translation::Physical(physical) => {
                self.stats.translations += 1;
                format!("translated (seg={}, off={}) → physical={}", segment, offset, physical)
            }
            Translation::Fault(fault) => {
                self.stats.faults += 1;
                format!("fault → {}", fault)
            }
        };
        log::trace!("{}", event);
        self.last_event = Some(event);
        translation
    }

    /// Current state; never mutates the engine
    pub fn snapshot(&self) -> SegmentSnapshot {
        SegmentSnapshot {
            segments: self.segments.iter().map(|(&id, &entry)| (id, entry)).collect(),
            event: self.last_event.clone(),
        }
    }

    /// Most recent event
    pub fn last_event(&self) -> Option<&str> {
        self.last_event.as_deref()
    }

    /// Translation counters
    pub fn stats(&self) -> SegmentStats {
        self.stats
    }
}
