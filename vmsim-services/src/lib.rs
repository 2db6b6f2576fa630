//! VMSIM Services
//!
//! This crate sits between the simulation engines and whatever transport
//! drives them. It provides:
//!
//! - **Session**: a [`SimulationSession`] owning one paging and one segmentation
//!   engine behind locks
//! - **Request**: normalization of loosely typed front-end parameters
//! - **Dispatch**: a JSON request/response layer over a session
//!
//! # Usage
//!
//! ```rust
//! use vmsim_services::{SimulationSession, dispatch};
//!
//! let session = SimulationSession::new();
//! dispatch::handle(&session, r#"{"op":"init","refs":"1 2 1","frames":2,"algo":"LRU"}"#);
//! let reply = dispatch::handle(&session, r#"{"op":"step"}"#);
//! assert!(reply.starts_with(r#"{"done":false"#));
//! ```

#![no_std]
#![warn(missing_docs)]

extern crate alloc;

pub mod dispatch;
pub mod request;
pub mod session;

// Re-export commonly used items
pub use dispatch::{Request, Response, handle};
pub use request::{FrameCount, PagingRequest, ReferenceList, parse_references};
pub use session::{SessionLimits, SessionStats, SimulationSession, TranslateOutcome};
