//! Core use-case services.
//!
//! # Responsibility
//! - Simulate the remote genetics query endpoint on top of the repository.
//! - Keep adapters decoupled from repository and random-source details.

pub mod query_service;
