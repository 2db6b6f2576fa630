//! Simulation sessions
//!
//! A session owns at most one paging engine and one segmentation engine. Each
//! engine sits behind its own lock and every operation, reads included, runs
//! with that lock held. Re-initialization builds the new engine first and only
//! then swaps it in, so a rejected configuration leaves the old engine intact.

use alloc::format;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};
use vmsim_api::sync::Mutex;
use vmsim_api::{PageNumber, PhysAddr, Result, SegmentId, error};
use vmsim_memory_management::{
    PagingConfig, PagingEngine, PagingSnapshot, PagingStats, SegmentDescriptor, SegmentEngine, SegmentSnapshot,
    SegmentStats, StepOutcome,
};

/// Upper bounds applied when a session (re)initializes an engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLimits {
    /// Longest accepted reference string
    pub max_references: usize,
    /// Largest accepted frame count
    pub max_frames: usize,
    /// Largest accepted segment table
    pub max_segments: usize,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            max_references: 65_536,
            max_frames: 1_024,
            max_segments: 1_024,
        }
    }
}

/// Result of a translation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslateOutcome {
    /// Translated address; `None` when the request faulted
    pub physical: Option<PhysAddr>,
    /// State after the translation
    #[serde(rename = "state")]
    pub snapshot: SegmentSnapshot,
}

/// Counters of whichever engines exist
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Paging counters
    pub paging: Option<PagingStats>,
    /// Segmentation counters
    pub segmentation: Option<SegmentStats>,
}

/// One paging and one segmentation simulation
#[derive(Debug, Default)]
pub struct SimulationSession {
    limits: SessionLimits,
    paging: Mutex<Option<PagingEngine>>,
    segmentation: Mutex<Option<SegmentEngine>>,
}

static_assertions::assert_impl_all!(SimulationSession: Send, Sync);

impl SimulationSession {
    /// Create an empty session with default limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty session with custom limits
    pub fn with_limits(limits: SessionLimits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    /// Limits in force
    pub fn limits(&self) -> SessionLimits {
        self.limits
    }

    /// Replace the paging engine and return its initial snapshot
    pub fn init_paging(&self, references: Vec<PageNumber>, config: PagingConfig) -> Result<PagingSnapshot> {
        if references.len() > self.limits.max_references {
            return Err(error::invalid_configuration(&format!(
                "{} references exceed the limit of {}",
                references.len(),
                self.limits.max_references
            )));
        }
        if config.frame_count > self.limits.max_frames {
            return Err(error::invalid_configuration(&format!(
                "{} frames exceed the limit of {}",
                config.frame_count, self.limits.max_frames
            )));
        }

        let engine = PagingEngine::new(references, config)?;
        let snapshot = engine.snapshot();
        log::debug!(
            "session paging replaced: {} references under {}",
            engine.references().len(),
            engine.policy()
        );
        *self.paging.lock() = Some(engine);
        Ok(snapshot)
    }

    /// Process one reference
    pub fn step(&self) -> Result<StepOutcome> {
        self.with_paging(|engine| engine.step())
    }

    /// Run the paging engine to its terminal state, holding the lock throughout
    pub fn run(&self) -> Result<PagingSnapshot> {
        self.with_paging(|engine| {
            engine.run_to_completion();
            engine.snapshot()
        })
    }

    /// Current paging state; a finished engine always reports the terminal event
    pub fn paging_snapshot(&self) -> Result<PagingSnapshot> {
        self.with_paging(|engine| {
            engine.settle_terminal_event();
            engine.snapshot()
        })
    }

    /// Paging counters
    pub fn paging_stats(&self) -> Result<PagingStats> {
        self.with_paging(|engine| engine.stats())
    }

    /// Replace the segment table and return its initial snapshot
    pub fn init_segmentation(&self, segments: Vec<SegmentDescriptor>) -> Result<SegmentSnapshot> {
        if segments.len() > self.limits.max_segments {
            return Err(error::invalid_configuration(&format!(
                "{} segments exceed the limit of {}",
                segments.len(),
                self.limits.max_segments
            )));
        }

        let engine = SegmentEngine::new(segments)?;
        let snapshot = engine.snapshot();
        *self.segmentation.lock() = Some(engine);
        Ok(snapshot)
    }

    /// Translate a logical address; faults are returned as data
    pub fn translate(&self, segment: SegmentId, offset: u64) -> Result<TranslateOutcome> {
        self.with_segmentation(|engine| {
            let physical = engine.translate(segment, offset).physical();
            TranslateOutcome {
                physical,
                snapshot: engine.snapshot(),
            }
        })
    }

    /// Current segmentation state
    pub fn segmentation_snapshot(&self) -> Result<SegmentSnapshot> {
        self.with_segmentation(|engine| engine.snapshot())
    }

    /// Segmentation counters
    pub fn segmentation_stats(&self) -> Result<SegmentStats> {
        self.with_segmentation(|engine| engine.stats())
    }

    /// Counters of both engines, `None` where an engine does not exist
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            paging: self.paging_stats().ok(),
            segmentation: self.segmentation_stats().ok(),
        }
    }

    fn with_paging<R>(&self, f: impl FnOnce(&mut PagingEngine) -> R) -> Result<R> {
        let mut guard = self.paging.lock();
        let engine = guard.as_mut().ok_or_else(|| error::not_initialized("paging"))?;
        Ok(f(engine))
    }

    fn with_segmentation<R>(&self, f: impl FnOnce(&mut SegmentEngine) -> R) -> Result<R> {
        let mut guard = self.segmentation.lock();
        let engine = guard.as_mut().ok_or_else(|| error::not_initialized("segmentation"))?;
        Ok(f(engine))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use vmsim_memory_management::ReplacementPolicy;

    #[test]
    fn test_operations_require_init() {
        let session = SimulationSession::new();
        assert!(session.step().unwrap_err().is_not_initialized());
        assert!(session.run().unwrap_err().is_not_initialized());
        assert!(session.translate(0, 0).unwrap_err().is_not_initialized());
        assert_eq!(session.stats(), SessionStats::default());
    }

    #[test]
    fn test_limits_are_enforced() {
        let session = SimulationSession::with_limits(SessionLimits {
            max_references: 2,
            max_frames: 2,
            max_segments: 1,
        });
        let config = PagingConfig::new(2, ReplacementPolicy::Fifo);
        assert!(session.init_paging(vec![1, 2, 3], config).is_err());
        assert!(session.init_paging(vec![1, 2], PagingConfig::new(3, ReplacementPolicy::Fifo)).is_err());
        assert!(session.init_paging(vec![1, 2], config).is_ok());
        let segments = vec![SegmentDescriptor::new(0, 0, 1), SegmentDescriptor::new(1, 2, 1)];
        assert!(session.init_segmentation(segments).is_err());
    }
}
