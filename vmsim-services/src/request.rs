//! Request parameter parsing
//!
//! Front ends send simulation parameters loosely typed: a reference string
//! may arrive as the raw text of a form field or as a JSON array, and a frame
//! count as an integer, a whole-valued float such as `3.0`, or a numeric
//! string. Everything is normalized here before
//! an engine sees it.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use serde::Deserialize;
use vmsim_api::{ErrorContext, PageNumber, Result, error};
use vmsim_memory_management::PagingConfig;

/// Parse a whitespace-separated reference string such as `"7 0 1 2 0 3"`
pub fn parse_references(text: &str) -> Result<Vec<PageNumber>> {
    text.split_whitespace()
        .map(|token| {
            token
                .parse::<PageNumber>()
                .map_err(|_| error::invalid_configuration(&format!("malformed page reference '{}'", token)))
        })
        .collect()
}

/// A reference string in either accepted form
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ReferenceList {
    /// Pages listed individually
    Pages(Vec<PageNumber>),
    /// Whitespace-separated text
    Text(String),
}

impl ReferenceList {
    /// Normalize into page numbers
    pub fn into_pages(self) -> Result<Vec<PageNumber>> {
        match self {
            ReferenceList::Pages(pages) => Ok(pages),
            ReferenceList::Text(text) => parse_references(&text),
        }
    }
}

/// A frame count in any accepted form
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FrameCount {
    /// JSON integer
    Number(i64),
    /// JSON float; only whole values are accepted
    Float(f64),
    /// Numeric string
    Text(String),
}

impl FrameCount {
    /// Normalize into a positive frame count
    pub fn into_count(self) -> Result<usize> {
        let count = match self {
            FrameCount::Number(count) => count,
            FrameCount::Float(value) => {
                let count = value as i64;
                if count as f64 != value {
                    return Err(error::invalid_configuration(&format!(
                        "frame count {} is not a whole number",
                        value
                    )));
                }
                count
            }
            FrameCount::Text(text) => text
                .trim()
                .parse::<i64>()
                .map_err(|_| error::invalid_configuration(&format!("malformed frame count '{}'", text)))?,
        };
        if count <= 0 {
            return Err(error::invalid_configuration(&format!(
                "frame count must be positive, got {}",
                count
            )));
        }
        usize::try_from(count).map_err(|_| error::invalid_configuration(&format!("frame count {} too large", count)))
    }
}

/// Parameters for (re)initializing the paging engine
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PagingRequest {
    /// Reference string
    pub refs: ReferenceList,
    /// Number of frames
    pub frames: FrameCount,
    /// Replacement policy name
    pub algo: String,
}

impl PagingRequest {
    /// Validate and split into engine inputs
    pub fn into_parts(self) -> Result<(Vec<PageNumber>, PagingConfig)> {
        let references = self.refs.into_pages().context("refs")?;
        let frame_count = self.frames.into_count().context("frames")?;
        let config = PagingConfig::parse(frame_count, &self.algo).context("algo")?;
        Ok((references, config))
    }
}
