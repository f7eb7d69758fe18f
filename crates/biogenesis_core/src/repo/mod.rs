//! Repository layer for the working dataset.
//!
//! # Responsibility
//! - Own the process-wide dataset as an explicit, passed-around value.
//! - Offer read/replace operations instead of ambient global state.
//!
//! # Invariants
//! - `replace_all` validates every record and rejects duplicate ids before
//!   swapping; a failed replace leaves the previous snapshot in place.

pub mod plant_repo;
