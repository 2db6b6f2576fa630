//! Synchronization primitives for VMSIM
//!
//! Simulation state is guarded by spin locks so the library crates stay
//! usable without the standard library.

pub use spin::{Mutex, MutexGuard};
