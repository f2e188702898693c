use chrono::{NaiveDate, NaiveDateTime};
use medtransport_core::db::open_db_in_memory;
use medtransport_core::db::schema::latest_version;
use medtransport_core::{
    CollaboratorRepository, HospitalRecord, PatientRecord, RepoError, SchedulingRecord,
    SchedulingRepository, SqliteCollaboratorRepository, SqliteSchedulingRepository,
    MAX_TEXT_CHARS,
};
use rusqlite::Connection;

fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, minute, second)
        .unwrap()
}

fn booking(patient_id: i64, hospital_id: i64, removal_at: NaiveDateTime) -> SchedulingRecord {
    SchedulingRecord {
        patient_id,
        referral_type_id: 1,
        illness_type_id: 2,
        removal_type_id: 3,
        hospital_id,
        vehicle_id: 4,
        created_by_user_id: 5,
        driver_id: 6,
        responsible_party: "Joana Silva".to_string(),
        removal_at,
        expected_departure_at: removal_at - chrono::Duration::hours(2),
        note: "oxygen required".to_string(),
        transport_cost: 350.75,
        lodging_cost: 80.0,
        ..SchedulingRecord::default()
    }
}

#[test]
fn create_assigns_increasing_ids_and_get_roundtrips() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSchedulingRepository::try_new(&conn).unwrap();

    let first = booking(1, 1, at(2024, 2, 10, 8, 0, 0));
    let second = booking(2, 1, at(2024, 2, 11, 9, 30, 15));
    let first_id = repo.create_record(&first).unwrap();
    let second_id = repo.create_record(&second).unwrap();
    assert!(second_id > first_id);

    let loaded = repo.get_record(second_id).unwrap().unwrap();
    assert_eq!(loaded.id, Some(second_id));
    assert_eq!(
        loaded,
        SchedulingRecord {
            id: Some(second_id),
            ..second
        }
    );
}

#[test]
fn create_keeps_caller_supplied_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSchedulingRepository::try_new(&conn).unwrap();

    let mut imported = booking(1, 1, at(2024, 6, 1, 12, 0, 0));
    imported.id = Some(500);
    assert_eq!(repo.create_record(&imported).unwrap(), 500);

    let next = repo.create_record(&booking(1, 1, at(2024, 6, 2, 12, 0, 0))).unwrap();
    assert_eq!(next, 501);
}

#[test]
fn update_existing_record() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSchedulingRepository::try_new(&conn).unwrap();

    let mut record = booking(1, 1, at(2024, 3, 3, 7, 0, 0));
    record.id = Some(repo.create_record(&record).unwrap());

    record.driver_id = 42;
    record.note = "return trip added".to_string();
    record.lodging_cost = 0.0;
    repo.update_record(&record).unwrap();

    let loaded = repo.get_record(record.id.unwrap()).unwrap().unwrap();
    assert_eq!(loaded.driver_id, 42);
    assert_eq!(loaded.note, "return trip added");
    assert_eq!(loaded.lodging_cost, 0.0);
}

#[test]
fn update_requires_id_and_existing_row() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSchedulingRepository::try_new(&conn).unwrap();

    let unsaved = booking(1, 1, at(2024, 3, 3, 7, 0, 0));
    assert!(matches!(
        repo.update_record(&unsaved).unwrap_err(),
        RepoError::MissingId
    ));

    let mut missing = unsaved;
    missing.id = Some(77);
    assert!(matches!(
        repo.update_record(&missing).unwrap_err(),
        RepoError::NotFound(77)
    ));
}

#[test]
fn delete_removes_row_and_reports_missing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSchedulingRepository::try_new(&conn).unwrap();

    let id = repo
        .create_record(&booking(1, 1, at(2024, 4, 4, 4, 4, 4)))
        .unwrap();
    repo.delete_record(id).unwrap();

    assert!(repo.get_record(id).unwrap().is_none());
    assert!(matches!(
        repo.delete_record(id).unwrap_err(),
        RepoError::NotFound(missing) if missing == id
    ));
}

#[test]
fn validation_failure_blocks_create_and_update() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSchedulingRepository::try_new(&conn).unwrap();

    let mut invalid = booking(1, 1, at(2024, 5, 5, 5, 5, 5));
    invalid.responsible_party = "a".repeat(MAX_TEXT_CHARS + 1);
    assert!(matches!(
        repo.create_record(&invalid).unwrap_err(),
        RepoError::Validation(_)
    ));
    assert_eq!(repo.count_records().unwrap(), 0);

    let mut valid = booking(1, 1, at(2024, 5, 5, 5, 5, 5));
    valid.id = Some(repo.create_record(&valid).unwrap());
    valid.note = "b".repeat(MAX_TEXT_CHARS + 1);
    assert!(matches!(
        repo.update_record(&valid).unwrap_err(),
        RepoError::Validation(_)
    ));
}

#[test]
fn collaborator_upserts_replace_columns() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCollaboratorRepository::try_new(&conn).unwrap();

    let mut patient = PatientRecord {
        id: 10,
        name: "Carlos".to_string(),
        birth_date: NaiveDate::from_ymd_opt(1960, 7, 1).unwrap(),
    };
    repo.upsert_patient(&patient).unwrap();
    patient.name = "Carlos Souza".to_string();
    repo.upsert_patient(&patient).unwrap();
    assert_eq!(repo.get_patient(10).unwrap(), Some(patient));
    assert_eq!(repo.get_patient(11).unwrap(), None);

    let hospital = HospitalRecord {
        id: 3,
        name: "Hospital das Clinicas".to_string(),
    };
    repo.upsert_hospital(&hospital).unwrap();
    assert_eq!(repo.get_hospital(3).unwrap(), Some(hospital));
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let result = SqliteSchedulingRepository::try_new(&conn);
    match result {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_required_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteCollaboratorRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredTable("PACIENTE"))
    ));
}
