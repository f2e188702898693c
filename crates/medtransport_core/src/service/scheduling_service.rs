//! Permission-gated scheduling reports.
//!
//! # Responsibility
//! - Run the three scheduling reports behind the hospital-view permission.
//! - Turn grouped month rows into a fixed twelve-slot series.
//! - Pass record CRUD through to the repository unchanged.
//!
//! # Invariants
//! - Every report checks [`REPORT_PERMISSION`] before touching storage.
//! - Denial is silent: `0`, an empty list or `None`, never an error.
//! - Storage errors propagate unchanged to the caller.

use crate::access::permission::Permission;
use crate::access::{PermissionChecker, UserId};
use crate::model::report::{zero_fill_months, MonthlyCounts, RecordSummary, YearWindow};
use crate::model::scheduling::{SchedulingId, SchedulingRecord};
use crate::repo::scheduling_repo::{RepoError, RepoResult, SchedulingRepository};
use chrono::{Datelike, Local};
use log::{debug, info};
use std::time::Instant;

/// Row cap of the "most recent bookings" listing.
pub const DEFAULT_RECENT_LIMIT: u32 = 10;

/// Permission every report requires.
pub const REPORT_PERMISSION: Permission = Permission::ViewHospitals;

/// Use-case service over a scheduling repository and a permission checker.
pub struct SchedulingService<R: SchedulingRepository, P: PermissionChecker> {
    repo: R,
    permissions: P,
}

impl<R: SchedulingRepository, P: PermissionChecker> SchedulingService<R, P> {
    pub fn new(repo: R, permissions: P) -> Self {
        Self { repo, permissions }
    }

    /// Total number of scheduling records, or `0` when `user_id` is denied.
    pub fn count_all(&self, user_id: UserId) -> RepoResult<u64> {
        if !self.is_allowed(user_id, "count_all") {
            return Ok(0);
        }

        let started_at = Instant::now();
        let total = self.repo.count_records()?;
        log_report("count_all", started_at, total);
        Ok(total)
    }

    /// Newest `limit` bookings with patient and hospital names.
    ///
    /// Returns an empty list when `user_id` is denied.
    pub fn list_recent(&self, user_id: UserId, limit: u32) -> RepoResult<Vec<RecordSummary>> {
        if !self.is_allowed(user_id, "list_recent") {
            return Ok(Vec::new());
        }

        let started_at = Instant::now();
        let summaries = self.repo.list_recent_summaries(limit)?;
        log_report("list_recent", started_at, summaries.len() as u64);
        Ok(summaries)
    }

    /// [`Self::list_recent`] with [`DEFAULT_RECENT_LIMIT`].
    pub fn list_recent_default(&self, user_id: UserId) -> RepoResult<Vec<RecordSummary>> {
        self.list_recent(user_id, DEFAULT_RECENT_LIMIT)
    }

    /// Bookings per month of the current local calendar year.
    pub fn monthly_counts_current_year(
        &self,
        user_id: UserId,
    ) -> RepoResult<Option<MonthlyCounts>> {
        self.monthly_counts_for_year(user_id, Local::now().year())
    }

    /// Bookings per month of `year`, January first.
    ///
    /// Only removals inside [`YearWindow::for_year`] are counted, so a removal
    /// at exactly midnight on January 1st is left out.
    /// Returns `None` when `user_id` is denied.
    pub fn monthly_counts_for_year(
        &self,
        user_id: UserId,
        year: i32,
    ) -> RepoResult<Option<MonthlyCounts>> {
        if !self.is_allowed(user_id, "monthly_counts") {
            return Ok(None);
        }

        let window = YearWindow::for_year(year)
            .ok_or_else(|| RepoError::InvalidData(format!("year {year} is out of range")))?;

        let started_at = Instant::now();
        let groups = self.repo.count_by_month(&window)?;
        let counts = zero_fill_months(groups.iter().map(|(key, total)| (key.as_str(), *total)));
        log_report("monthly_counts", started_at, groups.len() as u64);
        Ok(Some(counts))
    }

    pub fn create_record(&self, record: &SchedulingRecord) -> RepoResult<SchedulingId> {
        self.repo.create_record(record)
    }

    pub fn update_record(&self, record: &SchedulingRecord) -> RepoResult<()> {
        self.repo.update_record(record)
    }

    pub fn get_record(&self, id: SchedulingId) -> RepoResult<Option<SchedulingRecord>> {
        self.repo.get_record(id)
    }

    pub fn delete_record(&self, id: SchedulingId) -> RepoResult<()> {
        self.repo.delete_record(id)
    }

    fn is_allowed(&self, user_id: UserId, op: &str) -> bool {
        let allowed = self.permissions.check_permission(user_id, REPORT_PERMISSION);
        if !allowed {
            info!(
                "event=permission_denied module=service op={} user_id={} permission={}",
                op, user_id, REPORT_PERMISSION
            );
        }
        allowed
    }
}

fn log_report(op: &str, started_at: Instant, rows: u64) {
    debug!(
        "event=report_query module=service status=ok op={} rows={} duration_ms={}",
        op,
        rows,
        started_at.elapsed().as_millis()
    );
}
