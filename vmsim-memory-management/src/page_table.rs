//! Page table management module
//!
//! One entry exists for every distinct page of a reference string. Entries are
//! kept in ascending page order, which is also the order replacement policies
//! scan them in.

use alloc::collections::BTreeMap;
use alloc::collections::btree_map;
use serde::{Deserialize, Serialize};
use vmsim_api::{FrameIndex, PageNumber, Tick};

/// Residency and usage bookkeeping for a single page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageTableEntry {
    /// Page is resident in a frame
    pub valid: bool,
    /// Frame holding the page while it is valid
    pub frame: Option<FrameIndex>,
    /// Clock value of the most recent access
    pub last_access_time: Option<Tick>,
    /// Accesses since the page was last loaded
    pub access_count: u64,
}

/// Page table keyed by page number
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageTable {
    entries: BTreeMap<PageNumber, PageTableEntry>,
}

impl PageTable {
    /// Build a table with an invalid entry for every distinct page in `references`
    pub fn from_references(references: &[PageNumber]) -> Self {
        let entries = references
            .iter()
            .map(|&page| (page, PageTableEntry::default()))
            .collect();
        Self { entries }
    }

    /// Number of distinct pages
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the reference string was empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a page
    pub fn get(&self, page: PageNumber) -> Option<&PageTableEntry> {
        self.entries.get(&page)
    }

    /// True if the page is currently resident
    pub fn is_resident(&self, page: PageNumber) -> bool {
        self.entries.get(&page).is_some_and(|entry| entry.valid)
    }

    /// Iterate over all entries in ascending page order
    pub fn iter(&self) -> btree_map::Iter<'_, PageNumber, PageTableEntry> {
        self.entries.iter()
    }

    /// Iterate over resident pages in ascending page order
    pub fn resident(&self) -> impl Iterator<Item = (PageNumber, &PageTableEntry)> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.valid)
            .map(|(&page, entry)| (page, entry))
    }

    /// Record a hit on a resident page
    pub(crate) fn touch(&mut self, page: PageNumber, now: Tick) {
        let entry = self.entry_mut(page);
        entry.last_access_time = Some(now);
        entry.access_count += 1;
    }

    /// Mark a page resident in `frame`, resetting its usage history
    pub(crate) fn install(&mut self, page: PageNumber, frame: FrameIndex, now: Tick) {
        let entry = self.entry_mut(page);
        entry.valid = true;
        entry.frame = Some(frame);
        entry.last_access_time = Some(now);
        entry.access_count = 1;
    }

    /// Drop a page from memory, returning the frame it occupied
    pub(crate) fn invalidate(&mut self, page: PageNumber) -> FrameIndex {
        let entry = self.entry_mut(page);
        let frame = match entry.frame.take() {
            Some(frame) if entry.valid => frame,
            _ => unreachable!("page {} evicted while not resident", page),
        };
        entry.valid = false;
        frame
    }

    /// Clone the table contents for a snapshot
    pub(crate) fn to_map(&self) -> BTreeMap<PageNumber, PageTableEntry> {
        self.entries.clone()
    }

    fn entry_mut(&mut self, page: PageNumber) -> &mut PageTableEntry {
        match self.entries.get_mut(&page) {
            Some(entry) => entry,
            None => unreachable!("page {} missing from page table", page),
        }
    }
}
