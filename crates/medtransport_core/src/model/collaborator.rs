//! Patient and hospital rows joined by the scheduling reports.
//!
//! Only the columns the reports read are modeled here.

use super::scheduling::ReferenceId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRecord {
    #[serde(rename = "paciente_id")]
    pub id: ReferenceId,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "data_nasc")]
    pub birth_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HospitalRecord {
    #[serde(rename = "hospital_id")]
    pub id: ReferenceId,
    #[serde(rename = "nome")]
    pub name: String,
}
