//! Synthetic dataset generation.
//!
//! # Responsibility
//! - Build the fixed-size working set of plant records at startup.
//! - Append the sentinel record that forces the critical failure path.
//!
//! # Invariants
//! - Generated ids are `T-001..T-nnn` and unique; the sentinel id is `T-404S`.
//! - Content is random per run, shape is fixed.

pub mod generator;
mod lexicon;
