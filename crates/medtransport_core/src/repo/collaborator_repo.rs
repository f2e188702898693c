//! Patient and hospital rows read by the scheduling reports.
//!
//! # Responsibility
//! - Seed and read the `PACIENTE` / `HOSPITAL` columns the joins depend on.
//!
//! # Invariants
//! - Upserts replace every modeled column of an existing row.

use crate::model::collaborator::{HospitalRecord, PatientRecord};
use crate::model::scheduling::ReferenceId;
use crate::repo::scheduling_repo::{ensure_connection_ready, RepoResult};
use rusqlite::{params, Connection, OptionalExtension};

/// Repository interface for the joined collaborator tables.
pub trait CollaboratorRepository {
    fn upsert_patient(&self, patient: &PatientRecord) -> RepoResult<()>;
    fn get_patient(&self, id: ReferenceId) -> RepoResult<Option<PatientRecord>>;
    fn upsert_hospital(&self, hospital: &HospitalRecord) -> RepoResult<()>;
    fn get_hospital(&self, id: ReferenceId) -> RepoResult<Option<HospitalRecord>>;
}

/// SQLite-backed collaborator repository.
pub struct SqliteCollaboratorRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCollaboratorRepository<'conn> {
    /// Wraps a connection returned by `db::open_db*`.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl CollaboratorRepository for SqliteCollaboratorRepository<'_> {
    fn upsert_patient(&self, patient: &PatientRecord) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO PACIENTE (paciente_id, nome, data_nasc)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(paciente_id) DO UPDATE SET
                nome = excluded.nome,
                data_nasc = excluded.data_nasc;",
            params![patient.id, patient.name.as_str(), patient.birth_date],
        )?;
        Ok(())
    }

    fn get_patient(&self, id: ReferenceId) -> RepoResult<Option<PatientRecord>> {
        let patient = self
            .conn
            .query_row(
                "SELECT paciente_id, nome, data_nasc FROM PACIENTE WHERE paciente_id = ?1;",
                [id],
                |row| {
                    Ok(PatientRecord {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        birth_date: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(patient)
    }

    fn upsert_hospital(&self, hospital: &HospitalRecord) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO HOSPITAL (hospital_id, nome)
             VALUES (?1, ?2)
             ON CONFLICT(hospital_id) DO UPDATE SET nome = excluded.nome;",
            params![hospital.id, hospital.name.as_str()],
        )?;
        Ok(())
    }

    fn get_hospital(&self, id: ReferenceId) -> RepoResult<Option<HospitalRecord>> {
        let hospital = self
            .conn
            .query_row(
                "SELECT hospital_id, nome FROM HOSPITAL WHERE hospital_id = ?1;",
                [id],
                |row| {
                    Ok(HospitalRecord {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(hospital)
    }
}
