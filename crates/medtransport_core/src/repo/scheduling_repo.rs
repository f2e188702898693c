//! Scheduling repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the `AGENDAMENTO` table.
//! - Own the report queries (row count, recent listing, month grouping).
//!
//! # Invariants
//! - Write paths call `SchedulingRecord::validate()` before SQL mutations.
//! - The recent listing inner-joins patients and hospitals; unresolved
//!   references drop the row.
//! - Month grouping keys come from `strftime('%m', ...)` and are two characters.

use crate::db::schema::{current_user_version, latest_version, table_exists, REQUIRED_TABLES};
use crate::db::DbError;
use crate::model::report::{RecordSummary, YearWindow};
use crate::model::scheduling::{RecordValidationError, SchedulingId, SchedulingRecord};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const RECORD_SELECT_SQL: &str = "SELECT
    agendamento_id,
    paciente_id,
    tipo_encaminhamento_id,
    tipo_doenca_id,
    tipo_remocao_id,
    hospital_id,
    veiculo_id,
    usuario_id,
    motorista_id,
    responsavel_pac,
    data_remocao,
    saida_prevista,
    observacao,
    custo_ifd,
    custo_estadia
FROM AGENDAMENTO";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for scheduling persistence and report queries.
#[derive(Debug)]
pub enum RepoError {
    Validation(RecordValidationError),
    Db(DbError),
    NotFound(SchedulingId),
    /// Update was attempted on a record that was never persisted.
    MissingId,
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "scheduling record not found: {id}"),
            Self::MissingId => write!(f, "scheduling record has no id yet"),
            Self::InvalidData(message) => {
                write!(f, "invalid persisted scheduling data: {message}")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version is {actual_version}, expected {expected_version}; open it through db::open_*"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_)
            | Self::MissingId
            | Self::InvalidData(_)
            | Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<RecordValidationError> for RepoError {
    fn from(value: RecordValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for scheduling records and their reports.
pub trait SchedulingRepository {
    /// Inserts a record. Storage assigns the id unless the record carries one.
    fn create_record(&self, record: &SchedulingRecord) -> RepoResult<SchedulingId>;
    fn update_record(&self, record: &SchedulingRecord) -> RepoResult<()>;
    fn get_record(&self, id: SchedulingId) -> RepoResult<Option<SchedulingRecord>>;
    fn delete_record(&self, id: SchedulingId) -> RepoResult<()>;
    /// Total number of rows, without filtering.
    fn count_records(&self) -> RepoResult<u64>;
    /// Newest records first (by id), joined to patient and hospital names.
    fn list_recent_summaries(&self, limit: u32) -> RepoResult<Vec<RecordSummary>>;
    /// `(month key, count)` groups for removals inside `window`.
    fn count_by_month(&self, window: &YearWindow) -> RepoResult<Vec<(String, u64)>>;
}

/// SQLite-backed scheduling repository.
pub struct SqliteSchedulingRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSchedulingRepository<'conn> {
    /// Wraps a connection returned by `db::open_db*`.
    ///
    /// # Errors
    /// - [`RepoError::UninitializedConnection`] when the schema was not bootstrapped.
    /// - [`RepoError::MissingRequiredTable`] when a report table is absent.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

pub(crate) fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in REQUIRED_TABLES {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(*table));
        }
    }

    Ok(())
}

impl SchedulingRepository for SqliteSchedulingRepository<'_> {
    fn create_record(&self, record: &SchedulingRecord) -> RepoResult<SchedulingId> {
        record.validate()?;

        self.conn.execute(
            "INSERT INTO AGENDAMENTO (
                agendamento_id,
                paciente_id,
                tipo_encaminhamento_id,
                tipo_doenca_id,
                tipo_remocao_id,
                hospital_id,
                veiculo_id,
                usuario_id,
                motorista_id,
                responsavel_pac,
                data_remocao,
                saida_prevista,
                observacao,
                custo_ifd,
                custo_estadia
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15);",
            params![
                record.id,
                record.patient_id,
                record.referral_type_id,
                record.illness_type_id,
                record.removal_type_id,
                record.hospital_id,
                record.vehicle_id,
                record.created_by_user_id,
                record.driver_id,
                record.responsible_party.as_str(),
                record.removal_at,
                record.expected_departure_at,
                record.note.as_str(),
                record.transport_cost,
                record.lodging_cost,
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_record(&self, record: &SchedulingRecord) -> RepoResult<()> {
        let id = record.id.ok_or(RepoError::MissingId)?;
        record.validate()?;

        let changed = self.conn.execute(
            "UPDATE AGENDAMENTO
             SET
                paciente_id = ?2,
                tipo_encaminhamento_id = ?3,
                tipo_doenca_id = ?4,
                tipo_remocao_id = ?5,
                hospital_id = ?6,
                veiculo_id = ?7,
                usuario_id = ?8,
                motorista_id = ?9,
                responsavel_pac = ?10,
                data_remocao = ?11,
                saida_prevista = ?12,
                observacao = ?13,
                custo_ifd = ?14,
                custo_estadia = ?15
             WHERE agendamento_id = ?1;",
            params![
                id,
                record.patient_id,
                record.referral_type_id,
                record.illness_type_id,
                record.removal_type_id,
                record.hospital_id,
                record.vehicle_id,
                record.created_by_user_id,
                record.driver_id,
                record.responsible_party.as_str(),
                record.removal_at,
                record.expected_departure_at,
                record.note.as_str(),
                record.transport_cost,
                record.lodging_cost,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn get_record(&self, id: SchedulingId) -> RepoResult<Option<SchedulingRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{RECORD_SELECT_SQL} WHERE agendamento_id = ?1;"))?;

        let mut rows = stmt.query(params![id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_record_row(row)?));
        }

        Ok(None)
    }

    fn delete_record(&self, id: SchedulingId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM AGENDAMENTO WHERE agendamento_id = ?1;", [id])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn count_records(&self) -> RepoResult<u64> {
        let total: i64 = self.conn.query_row(
            "SELECT COUNT(agendamento_id) FROM AGENDAMENTO;",
            [],
            |row| row.get(0),
        )?;
        non_negative(total, "COUNT(agendamento_id)")
    }

    fn list_recent_summaries(&self, limit: u32) -> RepoResult<Vec<RecordSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                a.agendamento_id AS agendamento_id,
                p.nome AS paciente_nome,
                p.data_nasc AS data_nasc,
                a.data_remocao AS data_remocao,
                h.nome AS hospital_nome
             FROM AGENDAMENTO a
             INNER JOIN PACIENTE p ON a.paciente_id = p.paciente_id
             INNER JOIN HOSPITAL h ON a.hospital_id = h.hospital_id
             ORDER BY a.agendamento_id DESC
             LIMIT ?1;",
        )?;

        let mut rows = stmt.query(params![i64::from(limit)])?;
        let mut summaries = Vec::new();
        while let Some(row) = rows.next()? {
            summaries.push(parse_summary_row(row)?);
        }

        Ok(summaries)
    }

    fn count_by_month(&self, window: &YearWindow) -> RepoResult<Vec<(String, u64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                strftime('%m', data_remocao) AS month_key,
                COUNT(strftime('%m', data_remocao)) AS total
             FROM AGENDAMENTO
             WHERE data_remocao BETWEEN ?1 AND ?2
             GROUP BY month_key
             ORDER BY month_key;",
        )?;

        let mut rows = stmt.query(params![window.start, window.end])?;
        let mut groups = Vec::new();
        while let Some(row) = rows.next()? {
            // Unparseable timestamps yield a NULL key; they belong to no month.
            let Some(key) = row.get::<_, Option<String>>("month_key")? else {
                continue;
            };
            let total = non_negative(row.get("total")?, "month total")?;
            groups.push((key, total));
        }

        Ok(groups)
    }
}

fn parse_record_row(row: &Row<'_>) -> RepoResult<SchedulingRecord> {
    let removal_at: NaiveDateTime = row.get("data_remocao")?;
    let expected_departure_at: NaiveDateTime = row.get("saida_prevista")?;

    Ok(SchedulingRecord {
        id: Some(row.get("agendamento_id")?),
        patient_id: row.get("paciente_id")?,
        referral_type_id: row.get("tipo_encaminhamento_id")?,
        illness_type_id: row.get("tipo_doenca_id")?,
        removal_type_id: row.get("tipo_remocao_id")?,
        hospital_id: row.get("hospital_id")?,
        vehicle_id: row.get("veiculo_id")?,
        created_by_user_id: row.get("usuario_id")?,
        driver_id: row.get("motorista_id")?,
        responsible_party: row
            .get::<_, Option<String>>("responsavel_pac")?
            .unwrap_or_default(),
        removal_at,
        expected_departure_at,
        note: row
            .get::<_, Option<String>>("observacao")?
            .unwrap_or_default(),
        transport_cost: row.get::<_, Option<f64>>("custo_ifd")?.unwrap_or_default(),
        lodging_cost: row
            .get::<_, Option<f64>>("custo_estadia")?
            .unwrap_or_default(),
    })
}

fn parse_summary_row(row: &Row<'_>) -> RepoResult<RecordSummary> {
    let birth_date: NaiveDate = row.get("data_nasc")?;
    let removal_at: NaiveDateTime = row.get("data_remocao")?;

    Ok(RecordSummary::new(
        row.get("agendamento_id")?,
        row.get("paciente_nome")?,
        birth_date,
        removal_at,
        row.get("hospital_nome")?,
    ))
}

fn non_negative(value: i64, what: &str) -> RepoResult<u64> {
    u64::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("negative {what} value `{value}`")))
}
