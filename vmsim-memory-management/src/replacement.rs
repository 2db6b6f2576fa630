//! Page replacement policies
//!
//! A policy is chosen once per paging engine and consulted only when every
//! frame is occupied.

use core::fmt;
use core::str::FromStr;
use alloc::format;
use serde::{Deserialize, Serialize};
use vmsim_api::{Error, FrameIndex, PageNumber, Result, error};

use crate::page_table::{PageTable, PageTableEntry};

/// Victim selection strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReplacementPolicy {
    /// First In First Out over frame slots
    Fifo,
    /// Least Recently Used
    Lru,
    /// Least Frequently Used
    Lfu,
}

impl ReplacementPolicy {
    /// All supported policies
    pub const ALL: [ReplacementPolicy; 3] = [Self::Fifo, Self::Lru, Self::Lfu];

    /// Canonical upper-case name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Fifo => "FIFO",
            Self::Lru => "LRU",
            Self::Lfu => "LFU",
        }
    }
}

impl fmt::Display for ReplacementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ReplacementPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|policy| policy.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| error::invalid_configuration(&format!("unknown replacement policy '{}'", name)))
    }
}

/// A page chosen for eviction and the frame it frees
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Victim {
    /// Evicted page
    pub page: PageNumber,
    /// Frame that becomes available
    pub frame: FrameIndex,
}

/// Policy plus the per-engine state some policies need
#[derive(Debug, Clone)]
pub struct Replacer {
    policy: ReplacementPolicy,
    frame_count: usize,
    fifo_pointer: FrameIndex,
}

impl Replacer {
    /// Create a replacer for `frame_count` frames
    pub fn new(policy: ReplacementPolicy, frame_count: usize) -> Self {
        Self {
            policy,
            frame_count,
            fifo_pointer: 0,
        }
    }

    /// Active policy
    pub fn policy(&self) -> ReplacementPolicy {
        self.policy
    }

    /// Next frame slot FIFO will evict from
    pub fn fifo_pointer(&self) -> FrameIndex {
        self.fifo_pointer
    }

    /// Choose a victim. Must only be called while every frame is occupied.
    pub fn select_victim(&mut self, frames: &[Option<PageNumber>], table: &PageTable) -> Victim {
        match self.policy {
            ReplacementPolicy::Fifo => {
                let frame = self.fifo_pointer;
                let page = match frames.get(frame).copied().flatten() {
                    Some(page) => page,
                    None => unreachable!("FIFO pointer {} references an empty frame", frame),
                };
                self.fifo_pointer = (self.fifo_pointer + 1) % self.frame_count;
                Victim { page, frame }
            }
            ReplacementPolicy::Lru => least_by(table, |entry| entry.last_access_time),
            ReplacementPolicy::Lfu => least_by(table, |entry| entry.access_count),
        }
    }
}

/// Resident page minimizing `key`; ties go to the smallest page number
fn least_by<K: Ord>(table: &PageTable, key: impl Fn(&PageTableEntry) -> K) -> Victim {
    // min_by_key keeps the first minimum, and resident() is in ascending page order
    let victim = table.resident().min_by_key(|(_, entry)| key(*entry));
    match victim {
        Some((page, PageTableEntry { frame: Some(frame), .. })) => Victim { page, frame: *frame },
        _ => unreachable!("victim requested with no resident pages"),
    }
}
