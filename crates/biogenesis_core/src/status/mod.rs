//! Leveled status log and error reporting.
//!
//! # Responsibility
//! - Keep a bounded, newest-first in-memory log of leveled messages.
//! - Queue structured error reports and count critical failures.
//! - Mirror entries at or above a threshold to the `log` facade.
//!
//! # Invariants
//! - The log never exceeds its capacity; the oldest entry is evicted first.
//! - The error queue is smaller than the log and also evicts oldest first.

pub mod bounded;
pub mod level;
pub mod reporter;
