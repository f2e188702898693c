use medtransport_core::db::schema::latest_version;
use medtransport_core::db::{open_db, open_db_in_memory, open_from_uri, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_bootstraps_schema() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "AGENDAMENTO");
    assert_table_exists(&conn, "PACIENTE");
    assert_table_exists(&conn, "HOSPITAL");
}

#[test]
fn agendamento_has_all_fifteen_columns() {
    let conn = open_db_in_memory().unwrap();
    let mut stmt = conn.prepare("PRAGMA table_info(AGENDAMENTO);").unwrap();
    let columns: Vec<String> = stmt
        .query_map([], |row| row.get::<_, String>("name"))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(
        columns,
        [
            "agendamento_id",
            "paciente_id",
            "tipo_encaminhamento_id",
            "tipo_doenca_id",
            "tipo_remocao_id",
            "hospital_id",
            "veiculo_id",
            "usuario_id",
            "motorista_id",
            "responsavel_pac",
            "data_remocao",
            "saida_prevista",
            "observacao",
            "custo_ifd",
            "custo_estadia",
        ]
    );
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("medtransport.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "AGENDAMENTO");
}

#[test]
fn open_from_uri_resolves_sqlalchemy_style_paths() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("from_uri.db");
    let uri = format!("sqlite:///{}", path.display());

    let conn = open_from_uri(&uri).unwrap();
    assert_table_exists(&conn, "AGENDAMENTO");
    drop(conn);
    assert!(path.exists());

    let err = open_from_uri("mysql://localhost/transport").unwrap_err();
    assert!(matches!(err, DbError::InvalidUri(_)));
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
