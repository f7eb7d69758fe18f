//! Input-to-display orchestration.
//!
//! # Responsibility
//! - Coalesce keystrokes into debounced searches.
//! - Derive display state from query outcomes and sort changes (`session`).
//! - Run the single-task event loop that feeds the external surfaces
//!   (`driver`).
//!
//! # Invariants
//! - All display mutation happens synchronously inside the event loop.
//! - A result older than the latest issued search never reaches the display.

pub mod debounce;
pub mod driver;
pub mod session;
