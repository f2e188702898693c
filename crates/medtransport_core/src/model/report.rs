//! Read models and month bucketing for scheduling reports.
//!
//! # Invariants
//! - Month keys are exactly two characters, `"01"` through `"12"`.
//! - [`MonthlyCounts`] always holds twelve entries, January first.
//! - A [`YearWindow`] starts at `00:00:01` on January 1st, not at midnight.

use super::scheduling::SchedulingId;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// Per-month totals, index 0 = January.
pub type MonthlyCounts = [u64; 12];

pub(crate) const ISO_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
pub(crate) const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// One line of the "most recent bookings" listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordSummary {
    #[serde(rename = "agendamento_id")]
    pub record_id: SchedulingId,
    #[serde(rename = "nome")]
    pub patient_name: String,
    /// ISO-8601 date.
    #[serde(rename = "data_nascimento")]
    pub patient_birth_date: String,
    /// ISO-8601 date-time.
    #[serde(rename = "data_remocao")]
    pub removal_at: String,
    #[serde(rename = "hospital")]
    pub hospital_name: String,
}

impl RecordSummary {
    pub fn new(
        record_id: SchedulingId,
        patient_name: String,
        patient_birth_date: NaiveDate,
        removal_at: NaiveDateTime,
        hospital_name: String,
    ) -> Self {
        Self {
            record_id,
            patient_name,
            patient_birth_date: patient_birth_date.format(ISO_DATE_FORMAT).to_string(),
            removal_at: removal_at.format(ISO_DATETIME_FORMAT).to_string(),
            hospital_name,
        }
    }
}

/// Inclusive removal-timestamp range covered by a yearly report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl YearWindow {
    /// Returns `[Jan 1 00:00:01, Dec 31 23:59:59]` of `year`.
    ///
    /// Returns `None` when `year` is outside the supported calendar range.
    pub fn for_year(year: i32) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(year, 1, 1)?.and_hms_opt(0, 0, 1)?;
        let end = NaiveDate::from_ymd_opt(year, 12, 31)?.and_hms_opt(23, 59, 59)?;
        Some(Self { start, end })
    }
}

/// Two-digit key for a 1-based month number.
pub fn month_key(month: u32) -> String {
    format!("{month:02}")
}

/// Spreads grouped `(month key, count)` rows over twelve slots.
///
/// Keys are matched by exact string, so `"9"` never lands in September.
/// Months without a row stay at zero; a repeated key keeps its last count.
pub fn zero_fill_months<'a, I>(groups: I) -> MonthlyCounts
where
    I: IntoIterator<Item = (&'a str, u64)> + Clone,
{
    let mut counts: MonthlyCounts = [0; 12];
    for (slot, month) in counts.iter_mut().zip(1u32..=12) {
        let key = month_key(month);
        for (group_key, count) in groups.clone() {
            if group_key == key {
                *slot = count;
            }
        }
    }
    counts
}
