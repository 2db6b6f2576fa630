//! Demand paging engine
//!
//! The engine walks a page reference string one reference per [`PagingEngine::step`],
//! detecting hits and faults, loading pages into free frames and asking its
//! [`Replacer`] for a victim once memory is full.
//!
//! Termination is lazy: the call that consumes the last reference still reports
//! `done == false`, and only the following call moves the engine into the
//! finished state and records [`FINISHED_EVENT`].

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};
use vmsim_api::{FrameIndex, PageNumber, Result, Tick, error};

use crate::page_table::{PageTable, PageTableEntry};
use crate::replacement::{ReplacementPolicy, Replacer, Victim};

/// Event recorded when the engine reaches its terminal state
pub const FINISHED_EVENT: &str = "simulation finished";

/// Paging engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingConfig {
    /// Number of physical frames
    pub frame_count: usize,
    /// Replacement policy used once all frames are occupied
    pub policy: ReplacementPolicy,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            frame_count: 3,
            policy: ReplacementPolicy::Fifo,
        }
    }
}

impl PagingConfig {
    /// Create a configuration
    pub fn new(frame_count: usize, policy: ReplacementPolicy) -> Self {
        Self { frame_count, policy }
    }

    /// Create a configuration from a policy name (case-insensitive)
    pub fn parse(frame_count: usize, policy: &str) -> Result<Self> {
        let config = Self::new(frame_count, policy.parse()?);
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the engine cannot run
    pub fn validate(&self) -> Result<()> {
        if self.frame_count == 0 {
            return Err(error::invalid_configuration("frame count must be positive"));
        }
        Ok(())
    }
}

/// Lifecycle of a paging engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Constructed, no reference processed yet
    Ready,
    /// At least one step taken, terminal event not yet recorded
    Running,
    /// Terminal; only re-initialization leaves this state
    Finished,
}

/// Hit and fault counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagingStats {
    /// References that found their page resident
    pub hits: u64,
    /// References that had to load their page
    pub faults: u64,
    /// Faults that evicted another page
    pub evictions: u64,
}

impl PagingStats {
    /// References processed so far
    pub fn references(&self) -> u64 {
        self.hits + self.faults
    }
}

/// Point-in-time view of the paging state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagingSnapshot {
    /// Page held by each frame slot
    pub frames: Vec<Option<PageNumber>>,
    /// Every page of the reference string
    pub page_table: BTreeMap<PageNumber, PageTableEntry>,
    /// Logical clock
    pub clock: Tick,
    /// Most recent event, if any step has run
    pub event: Option<String>,
}

/// Result of a single step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOutcome {
    /// The engine is finished
    pub done: bool,
    /// State after the step
    #[serde(rename = "state")]
    pub snapshot: PagingSnapshot,
}

/// Demand paging simulator over a fixed reference string
#[derive(Debug, Clone)]
pub struct PagingEngine {
    references: Vec<PageNumber>,
    config: PagingConfig,
    page_table: PageTable,
    frames: Vec<Option<PageNumber>>,
    replacer: Replacer,
    clock: Tick,
    cursor: usize,
    finished: bool,
    last_event: Option<String>,
    stats: PagingStats,
}

impl PagingEngine {
    /// Build an engine in the ready state
    pub fn new(references: Vec<PageNumber>, config: PagingConfig) -> Result<Self> {
        config.validate()?;
        log::info!(
            "paging engine: {} references, {} frames, policy {}",
            references.len(),
            config.frame_count,
            config.policy
        );

        let mut frames = Vec::new();
        frames.try_reserve_exact(config.frame_count).map_err(|_| {
            error::invalid_configuration(&format!("cannot allocate {} frames", config.frame_count))
        })?;
        frames.resize(config.frame_count, None);

        Ok(Self {
            page_table: PageTable::from_references(&references),
            frames,
            replacer: Replacer::new(config.policy, config.frame_count),
            references,
            config,
            clock: 0,
            cursor: 0,
            finished: false,
            last_event: None,
            stats: PagingStats::default(),
        })
    }

    /// Process the next reference and return the resulting state
    pub fn step(&mut self) -> StepOutcome {
        let done = self.advance();
        StepOutcome {
            done,
            snapshot: self.snapshot(),
        }
    }

    /// Step until finished, returning how many references this call processed
    pub fn run_to_completion(&mut self) -> usize {
        let start = self.cursor;
        while !self.advance() {}
        log::debug!("paging run complete after {} references", self.cursor - start);
        self.cursor - start
    }

    /// Current state; never mutates the engine
    pub fn snapshot(&self) -> PagingSnapshot {
        PagingSnapshot {
            frames: self.frames.clone(),
            page_table: self.page_table.to_map(),
            clock: self.clock,
            event: self.last_event.clone(),
        }
    }

    /// Make sure a finished engine reports the terminal event.
    ///
    /// Returns true if the event had to be rewritten.
    pub fn settle_terminal_event(&mut self) -> bool {
        if self.finished && self.last_event.as_deref() != Some(FINISHED_EVENT) {
            self.last_event = Some(String::from(FINISHED_EVENT));
            return true;
        }
        false
    }

    /// Lifecycle state
    pub fn state(&self) -> EngineState {
        if self.finished {
            EngineState::Finished
        } else if self.cursor == 0 && self.last_event.is_none() {
            EngineState::Ready
        } else {
            EngineState::Running
        }
    }

    /// True once the terminal event has been recorded
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Active replacement policy
    pub fn policy(&self) -> ReplacementPolicy {
        self.config.policy
    }

    /// Number of frames
    pub fn frame_count(&self) -> usize {
        self.config.frame_count
    }

    /// The reference string
    pub fn references(&self) -> &[PageNumber] {
        &self.references
    }

    /// Index of the next unprocessed reference
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Logical clock
    pub fn clock(&self) -> Tick {
        self.clock
    }

    /// Most recent event
    pub fn last_event(&self) -> Option<&str> {
        self.last_event.as_deref()
    }

    /// Frame slots
    pub fn frames(&self) -> &[Option<PageNumber>] {
        &self.frames
    }

    /// Page table
    pub fn page_table(&self) -> &PageTable {
        &self.page_table
    }

    /// Hit and fault counters
    pub fn stats(&self) -> PagingStats {
        self.stats
    }

    /// One state transition; returns true when the engine is finished
    fn advance(&mut self) -> bool {
        if self.finished {
            return true;
        }
        let Some(&page) = self.references.get(self.cursor) else {
            self.finished = true;
            self.last_event = Some(String::from(FINISHED_EVENT));
            log::debug!("paging finished at clock {}", self.clock);
            return true;
        };

        self.clock += 1;
        let event = if self.page_table.is_resident(page) {
            self.page_table.touch(page, self.clock);
            self.stats.hits += 1;
            log::trace!("t={} hit on page {}", self.clock, page);
            format!("page {} already in memory (hit)", page)
        } else {
            self.load(page)
        };
        self.last_event = Some(event);
        self.cursor += 1;
        false
    }

    /// Handle a fault on `page`, returning the event text
    fn load(&mut self, page: PageNumber) -> String {
        self.stats.faults += 1;
        let (frame, victim) = match self.first_free_frame() {
            Some(frame) => (frame, None),
            None => {
                let Victim { page: victim, frame } =
                    self.replacer.select_victim(&self.frames, &self.page_table);
                let freed = self.page_table.invalidate(victim);
                debug_assert_eq!(freed, frame);
                self.stats.evictions += 1;
                (frame, Some(victim))
            }
        };

        self.frames[frame] = Some(page);
        self.page_table.install(page, frame, self.clock);
        log::trace!("t={} fault on page {} -> frame {} (victim {:?})", self.clock, page, frame, victim);

        match victim {
            Some(victim) => format!("page fault → loaded {} into frame {} (replaced {})", page, frame, victim),
            None => format!("page fault → loaded {} into frame {}", page, frame),
        }
    }

    fn first_free_frame(&self) -> Option<FrameIndex> {
        self.frames.iter().position(Option::is_none)
    }
}
