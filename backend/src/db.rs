//! SQLite persistence handle, schema, and column codecs.
//!
//! Store operations are plain synchronous functions over `&mut Connection`;
//! `Database::run` moves them onto the blocking pool so the async workers never
//! wait on disk I/O. Each multi-row write opens its own `Transaction` and
//! commits it as the last step, so a failure anywhere rolls the whole
//! operation back.

use crate::error::AppError;
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, Row};
use serde_json::Value;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

const SCHEMA: &str = r#"
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    id            TEXT PRIMARY KEY,
    first_name    TEXT NOT NULL,
    last_name     TEXT NOT NULL,
    email         TEXT NOT NULL UNIQUE,
    phone         TEXT UNIQUE,
    password      TEXT NOT NULL,
    profile_image TEXT,
    is_active     INTEGER NOT NULL DEFAULT 1,
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS document_types (
    id            TEXT PRIMARY KEY,
    name          TEXT NOT NULL UNIQUE,
    slug          TEXT NOT NULL UNIQUE,
    description   TEXT,
    template_path TEXT,
    is_active     INTEGER NOT NULL DEFAULT 1,
    category      TEXT,
    icon          TEXT,
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS document_fields (
    id               TEXT PRIMARY KEY,
    document_type_id TEXT NOT NULL REFERENCES document_types(id),
    field_name       TEXT NOT NULL,
    label            TEXT NOT NULL,
    field_type       TEXT NOT NULL,
    is_required      INTEGER NOT NULL DEFAULT 1,
    sort_order       INTEGER NOT NULL DEFAULT 0,
    placeholder      TEXT,
    default_value    TEXT,
    validation       TEXT,
    options          TEXT,
    help_text        TEXT,
    section          TEXT,
    min_length       INTEGER,
    max_length       INTEGER,
    depends_on       TEXT,
    depends_value    TEXT,
    created_at       TEXT NOT NULL,
    updated_at       TEXT NOT NULL,
    UNIQUE (document_type_id, field_name)
);

CREATE TABLE IF NOT EXISTS user_documents (
    id                  TEXT PRIMARY KEY,
    user_id             TEXT NOT NULL REFERENCES users(id),
    document_type_id    TEXT NOT NULL REFERENCES document_types(id),
    title               TEXT NOT NULL,
    status              TEXT NOT NULL,
    version             INTEGER NOT NULL DEFAULT 1,
    created_at          TEXT NOT NULL,
    updated_at          TEXT NOT NULL,
    last_generated_at   TEXT,
    generated_pdf_path  TEXT,
    generated_docx_path TEXT
);

CREATE TABLE IF NOT EXISTS document_field_data (
    id               TEXT PRIMARY KEY,
    user_document_id TEXT NOT NULL REFERENCES user_documents(id),
    field_id         TEXT NOT NULL REFERENCES document_fields(id),
    value            TEXT,
    version_number   INTEGER NOT NULL DEFAULT 1,
    created_at       TEXT NOT NULL,
    updated_at       TEXT NOT NULL,
    UNIQUE (user_document_id, field_id)
);

CREATE INDEX IF NOT EXISTS idx_document_fields_type ON document_fields (document_type_id);
CREATE INDEX IF NOT EXISTS idx_user_documents_owner ON user_documents (user_id, updated_at);
CREATE INDEX IF NOT EXISTS idx_field_data_document ON document_field_data (user_document_id);
"#;

/// Creates the tables if needed and turns on foreign-key enforcement.
pub fn migrate(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA)
}

/// Shared handle to the single SQLite connection of the process.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AppError> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, AppError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, AppError> {
        migrate(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Runs `op` against the connection on the blocking thread pool.
    pub async fn run<T, F>(&self, op: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut Connection) -> Result<T, AppError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| AppError::Internal("database connection lock poisoned".to_string()))?;
            op(&mut guard)
        })
        .await
        .map_err(|e| AppError::Internal(format!("database task failed: {}", e)))?
    }
}

/// Current time truncated to the precision that survives a round trip
/// through the text encoding.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Fixed-width RFC 3339 so that text ordering equals chronological ordering.
pub fn encode_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, false)
}

pub fn ts_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    parse_ts(&raw, idx)
}

pub fn opt_ts_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|raw| parse_ts(&raw, idx)).transpose()
}

fn parse_ts(raw: &str, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Storage form of an enum, the inverse of `enum_column`.
pub fn enum_text<T: AsRef<str>>(value: &T) -> &str {
    value.as_ref()
}

/// Reads a text column holding the string form of an enum.
pub fn enum_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    T::from_str(&raw).map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub fn opt_enum_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: Option<String> = row.get(idx)?;
    raw.map(|raw| {
        T::from_str(&raw).map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}

/// `NULL` stays `None`; anything else must be JSON text.
pub fn json_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Value>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|raw| {
        serde_json::from_str(&raw).map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}

pub fn encode_json(value: Option<&Value>) -> Option<String> {
    value.map(Value::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_round_trip_and_sort_as_text() {
        let earlier = now();
        let later = earlier + chrono::Duration::milliseconds(1500);
        let (a, b) = (encode_ts(&earlier), encode_ts(&later));
        assert_eq!(a.len(), b.len());
        assert!(a < b);
        assert_eq!(DateTime::parse_from_rfc3339(&a).unwrap().with_timezone(&Utc), earlier);
    }

    #[test]
    fn migration_is_idempotent_and_enforces_foreign_keys() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        migrate(&conn).unwrap();
        let enabled: i64 = conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0)).unwrap();
        assert_eq!(enabled, 1);
    }

    #[actix_web::test]
    async fn run_executes_on_the_shared_connection() {
        let db = Database::open_in_memory().unwrap();
        db.run(|conn| {
            conn.execute("CREATE TABLE scratch (v INTEGER)", [])?;
            conn.execute("INSERT INTO scratch (v) VALUES (41)", [])?;
            Ok(())
        })
        .await
        .unwrap();
        let value: i64 = db
            .run(|conn| Ok(conn.query_row("SELECT v + 1 FROM scratch", [], |row| row.get(0))?))
            .await
            .unwrap();
        assert_eq!(value, 42);
    }
}
