//! Domain model for patient-transport scheduling.
//!
//! # Responsibility
//! - Define the scheduling record and the read models derived from it.
//! - Keep month bucketing rules next to the data they bucket.
//!
//! # Invariants
//! - Every persisted scheduling record is identified by a `SchedulingId`.
//! - Relationships are plain ids; joins happen in the repository layer.

pub mod collaborator;
pub mod report;
pub mod scheduling;
