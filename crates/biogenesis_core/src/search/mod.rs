//! Local filter/sort pipeline.
//!
//! # Responsibility
//! - Derive the displayed list from a working set, query text and sort choice.
//! - Keep match predicates shared with the query service in one place.
//!
//! # Invariants
//! - Sorting is stable: equal keys keep their input order.
//! - Output never exceeds the configured result cap.

pub mod pipeline;
