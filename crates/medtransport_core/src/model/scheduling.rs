//! Scheduling record domain model.
//!
//! # Responsibility
//! - Define the canonical shape of one scheduled patient transport.
//! - Provide the transport mapping consumed by the request layer.
//!
//! # Invariants
//! - `id` is assigned once by storage (or by an importing caller) and never
//!   changes afterwards.
//! - `responsible_party` and `note` hold at most [`MAX_TEXT_CHARS`] characters.
//! - Reference ids are not checked against their collections.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-assigned identifier of a scheduling record.
pub type SchedulingId = i64;

/// Identifier of a row owned by another collection (patient, vehicle, ...).
pub type ReferenceId = i64;

/// Column width of the two free-text columns.
pub const MAX_TEXT_CHARS: usize = 250;

/// Rendering used by the transport mapping for date-time values.
pub(crate) const PLAIN_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// One patient-transport booking.
///
/// Serialized field names follow the `AGENDAMENTO` column names.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SchedulingRecord {
    /// `None` until storage assigns an id.
    #[serde(rename = "agendamento_id")]
    pub id: Option<SchedulingId>,
    #[serde(rename = "paciente_id")]
    pub patient_id: ReferenceId,
    #[serde(rename = "tipo_encaminhamento_id")]
    pub referral_type_id: ReferenceId,
    #[serde(rename = "tipo_doenca_id")]
    pub illness_type_id: ReferenceId,
    #[serde(rename = "tipo_remocao_id")]
    pub removal_type_id: ReferenceId,
    #[serde(rename = "hospital_id")]
    pub hospital_id: ReferenceId,
    #[serde(rename = "veiculo_id")]
    pub vehicle_id: ReferenceId,
    /// User who created the booking.
    #[serde(rename = "usuario_id")]
    pub created_by_user_id: ReferenceId,
    #[serde(rename = "motorista_id")]
    pub driver_id: ReferenceId,
    #[serde(rename = "responsavel_pac")]
    pub responsible_party: String,
    /// When the transport happens.
    #[serde(rename = "data_remocao")]
    pub removal_at: NaiveDateTime,
    #[serde(rename = "saida_prevista")]
    pub expected_departure_at: NaiveDateTime,
    #[serde(rename = "observacao")]
    pub note: String,
    #[serde(rename = "custo_ifd")]
    pub transport_cost: f64,
    #[serde(rename = "custo_estadia")]
    pub lodging_cost: f64,
}

impl SchedulingRecord {
    /// Validates column-width constraints before persistence.
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        check_text_width("responsavel_pac", &self.responsible_party)?;
        check_text_width("observacao", &self.note)?;
        Ok(())
    }

    /// Builds the legacy key/value payload served to existing clients.
    ///
    /// The payload reproduces the historical shape exactly: `data_remocao` is
    /// written twice so it ends up holding the expected-departure value, and
    /// `usuario_id` is not part of it. Use the `Serialize` impl for the full
    /// column-for-column shape.
    pub fn to_legacy_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("agendamento_id".into(), Value::from(self.id));
        map.insert("paciente_id".into(), Value::from(self.patient_id));
        map.insert(
            "tipo_encaminhamento_id".into(),
            Value::from(self.referral_type_id),
        );
        map.insert("tipo_doenca_id".into(), Value::from(self.illness_type_id));
        map.insert("tipo_remocao_id".into(), Value::from(self.removal_type_id));
        map.insert("hospital_id".into(), Value::from(self.hospital_id));
        map.insert("veiculo_id".into(), Value::from(self.vehicle_id));
        map.insert("motorista_id".into(), Value::from(self.driver_id));
        map.insert(
            "responsavel_pac".into(),
            Value::from(self.responsible_party.as_str()),
        );
        map.insert(
            "data_remocao".into(),
            Value::from(self.removal_at.format(PLAIN_DATETIME_FORMAT).to_string()),
        );
        map.insert(
            "data_remocao".into(),
            Value::from(
                self.expected_departure_at
                    .format(PLAIN_DATETIME_FORMAT)
                    .to_string(),
            ),
        );
        map.insert("observacao".into(), Value::from(self.note.as_str()));
        map.insert("custo_ifd".into(), float_value(self.transport_cost));
        map.insert("custo_estadia".into(), float_value(self.lodging_cost));
        map
    }
}

// NaN and infinities have no JSON form.
fn float_value(value: f64) -> Value {
    serde_json::Number::from_f64(value).map_or(Value::Null, Value::Number)
}

fn check_text_width(field: &'static str, value: &str) -> Result<(), RecordValidationError> {
    let actual_chars = value.chars().count();
    if actual_chars > MAX_TEXT_CHARS {
        return Err(RecordValidationError::TextTooLong {
            field,
            max_chars: MAX_TEXT_CHARS,
            actual_chars,
        });
    }
    Ok(())
}

/// Write-time validation failures for [`SchedulingRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordValidationError {
    TextTooLong {
        field: &'static str,
        max_chars: usize,
        actual_chars: usize,
    },
}

impl Display for RecordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TextTooLong {
                field,
                max_chars,
                actual_chars,
            } => write!(
                f,
                "{field} has {actual_chars} characters; at most {max_chars} allowed"
            ),
        }
    }
}

impl Error for RecordValidationError {}

#[cfg(test)]
mod tests {
    use super::{RecordValidationError, SchedulingRecord, MAX_TEXT_CHARS};
    use chrono::NaiveDate;
    use serde_json::Value;

    fn sample() -> SchedulingRecord {
        let day = NaiveDate::from_ymd_opt(2024, 5, 10).expect("valid date");
        SchedulingRecord {
            id: Some(7),
            patient_id: 1,
            referral_type_id: 2,
            illness_type_id: 3,
            removal_type_id: 4,
            hospital_id: 5,
            vehicle_id: 6,
            created_by_user_id: 8,
            driver_id: 9,
            responsible_party: "Maria".to_string(),
            removal_at: day.and_hms_opt(8, 30, 0).expect("valid time"),
            expected_departure_at: day.and_hms_opt(6, 0, 0).expect("valid time"),
            note: "wheelchair".to_string(),
            transport_cost: 120.5,
            lodging_cost: 0.0,
        }
    }

    #[test]
    fn legacy_map_keeps_duplicate_removal_key_behavior() {
        let map = sample().to_legacy_map();

        assert_eq!(
            map.get("data_remocao"),
            Some(&Value::from("2024-05-10 06:00:00"))
        );
        assert!(!map.contains_key("saida_prevista"));
        assert!(!map.contains_key("usuario_id"));
        assert_eq!(map.get("agendamento_id"), Some(&Value::from(7)));
        assert_eq!(map.get("custo_ifd"), Some(&Value::from(120.5)));
        assert_eq!(map.len(), 13);
    }

    #[test]
    fn legacy_map_uses_null_for_unassigned_id() {
        let mut record = sample();
        record.id = None;
        assert_eq!(record.to_legacy_map().get("agendamento_id"), Some(&Value::Null));
    }

    #[test]
    fn serde_shape_carries_every_column() {
        let json = serde_json::to_value(sample()).expect("record should serialize");
        let object = json.as_object().expect("record serializes to an object");

        assert_eq!(object.len(), 15);
        assert_eq!(object.get("usuario_id"), Some(&Value::from(8)));
        assert!(object.contains_key("saida_prevista"));
        assert!(object.contains_key("data_remocao"));
    }

    #[test]
    fn validate_rejects_overlong_text_columns() {
        let mut record = sample();
        record.note = "x".repeat(MAX_TEXT_CHARS);
        record.validate().expect("exactly max chars is allowed");

        record.note.push('y');
        let err = record.validate().expect_err("note over limit must fail");
        assert_eq!(
            err,
            RecordValidationError::TextTooLong {
                field: "observacao",
                max_chars: MAX_TEXT_CHARS,
                actual_chars: MAX_TEXT_CHARS + 1,
            }
        );
    }

    #[test]
    fn validate_counts_characters_not_bytes() {
        let mut record = sample();
        record.responsible_party = "ã".repeat(MAX_TEXT_CHARS);
        record
            .validate()
            .expect("multi-byte characters count once each");
    }
}
