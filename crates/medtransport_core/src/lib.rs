//! Core storage and reporting for patient-transport scheduling.
//! This crate owns the scheduling record, its SQLite storage and the
//! permission-gated reports built on top of it.

pub mod access;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use access::permission::{
    parse_permission, supported_permission_names, Permission, PermissionError,
};
pub use access::{GrantTable, PermissionChecker, UserId};
pub use config::{ConfigError, StoreConfig};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::collaborator::{HospitalRecord, PatientRecord};
pub use model::report::{MonthlyCounts, RecordSummary, YearWindow};
pub use model::scheduling::{
    RecordValidationError, ReferenceId, SchedulingId, SchedulingRecord, MAX_TEXT_CHARS,
};
pub use repo::collaborator_repo::{CollaboratorRepository, SqliteCollaboratorRepository};
pub use repo::scheduling_repo::{
    RepoError, RepoResult, SchedulingRepository, SqliteSchedulingRepository,
};
pub use service::scheduling_service::{SchedulingService, DEFAULT_RECENT_LIMIT};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
