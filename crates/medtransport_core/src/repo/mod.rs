//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from the permission-gated service.
//!
//! # Invariants
//! - Repository writes must enforce `SchedulingRecord::validate()` before persistence.
//! - Repositories only accept connections whose schema is bootstrapped.

pub mod collaborator_repo;
pub mod scheduling_repo;
