//! Plant domain model.
//!
//! # Responsibility
//! - Define the immutable plant record shown by every view.
//! - Own the IUCN risk ordering used for sorting.
//!
//! # Invariants
//! - `PlantRecord::id` is unique within a working set (enforced by the repo).
//! - A non-empty distribution polygon has at least three points.

pub mod plant;
