//! VMSIM API - Core types shared across the virtual memory simulator
//!
//! This crate provides the error type, the primitive identifiers and the
//! synchronization primitives used by every other VMSIM crate. It has no
//! knowledge of paging or segmentation itself.
//!
//! # Modules
//!
//! - **Error**: the crate-wide [`Error`] enum and [`Result`] alias
//! - **Types**: page, frame, segment and clock identifiers
//! - **Sync**: lock re-exports used to guard simulation state
//!
//! # Usage
//!
//! ```rust
//! use vmsim_api::{Error, Result};
//!
//! fn frames(count: usize) -> Result<usize> {
//!     if count == 0 {
//!         return Err(vmsim_api::error::invalid_configuration("frame count must be positive"));
//!     }
//!     Ok(count)
//! }
//!
//! assert!(matches!(frames(0), Err(Error::InvalidConfiguration(_))));
//! ```

#![no_std]
#![warn(missing_docs)]

extern crate alloc;

pub mod error;
pub mod sync;
pub mod types;

// Re-export commonly used types
pub use crate::error::{Error, ErrorContext, Result};
pub use crate::types::*;
