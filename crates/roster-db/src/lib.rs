// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! SQLite-backed document collection for person records.
//!
//! Each record is one row holding an opaque id and a JSON document. Updates
//! merge the new fields into the stored document with `json_patch`, so keys
//! written by other tools survive an edit.

use anyhow::{Context, Result, anyhow, bail};
use roster_app::{PersonFields, PersonRecord, RecordId, RecordStore, StoreError, StoreResult};
use rusqlite::{Connection, params};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const APP_NAME: &str = "roster";
pub const DEFAULT_COLLECTION: &str = "people";

const REQUIRED_COLUMNS: [&str; 4] = ["id", "document", "created_at", "updated_at"];

pub struct Store {
    conn: Connection,
    collection: String,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let printable = path.to_string_lossy().to_string();
        validate_db_path(&printable)?;
        let conn = Connection::open(path)
            .with_context(|| format!("open database at {}", path.display()))?;
        configure_connection(&conn)?;
        if printable != ":memory:" {
            set_private_permissions(path)?;
        }
        debug!(path = %path.display(), "database opened");
        Ok(Self {
            conn,
            collection: DEFAULT_COLLECTION.to_owned(),
        })
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory database")?;
        configure_connection(&conn)?;
        Ok(Self {
            conn,
            collection: DEFAULT_COLLECTION.to_owned(),
        })
    }

    /// Points the store at another collection. Call before [`Store::bootstrap`].
    pub fn with_collection(mut self, collection: &str) -> Result<Self> {
        validate_collection_name(collection)?;
        collection.clone_into(&mut self.collection);
        Ok(self)
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn raw_connection(&self) -> &Connection {
        &self.conn
    }

    /// Creates the collection table, or checks an existing one has the
    /// columns this store reads and writes.
    pub fn bootstrap(&self) -> Result<()> {
        if table_exists(&self.conn, &self.collection)? {
            validate_collection(&self.conn, &self.collection)?;
        } else {
            let ddl = include_str!("sql/collection.sql").replace("{collection}", &self.collection);
            self.conn
                .execute_batch(&ddl)
                .with_context(|| format!("create collection `{}`", self.collection))?;
            info!(collection = %self.collection, "collection created");
        }
        Ok(())
    }

    pub fn insert_person(&self, fields: &PersonFields) -> Result<RecordId> {
        let id = RecordId::new(Uuid::new_v4().simple().to_string());
        let document = serde_json::to_string(fields).context("encode person document")?;
        let now = now_rfc3339()?;
        self.conn
            .execute(
                &format!(
                    "INSERT INTO {} (id, document, created_at, updated_at) VALUES (?, ?, ?, ?)",
                    self.collection
                ),
                params![id.as_str(), document, now, now],
            )
            .context("insert person")?;
        Ok(id)
    }

    /// Every stored person, in insertion order.
    pub fn list_people(&self) -> Result<Vec<PersonRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT id, document FROM {} ORDER BY rowid ASC",
                self.collection
            ))
            .context("prepare people query")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .context("query people")?;

        let mut people = Vec::new();
        for row in rows {
            let (id, document) = row.context("read person row")?;
            people.push(decode_person(RecordId::new(id), &document)?);
        }
        Ok(people)
    }

    /// Returns `false` when no record has `id`.
    pub fn update_person(&self, id: &RecordId, fields: &PersonFields) -> Result<bool> {
        let patch = serde_json::to_string(fields).context("encode person document")?;
        let rows_affected = self
            .conn
            .execute(
                &format!(
                    "UPDATE {} SET document = json_patch(document, ?), updated_at = ? WHERE id = ?",
                    self.collection
                ),
                params![patch, now_rfc3339()?, id.as_str()],
            )
            .with_context(|| format!("update person {id}"))?;
        Ok(rows_affected > 0)
    }

    /// Returns `false` when no record has `id`.
    pub fn delete_person(&self, id: &RecordId) -> Result<bool> {
        let rows_affected = self
            .conn
            .execute(
                &format!("DELETE FROM {} WHERE id = ?", self.collection),
                params![id.as_str()],
            )
            .with_context(|| format!("delete person {id}"))?;
        Ok(rows_affected > 0)
    }

    pub fn count_people(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row(
                &format!("SELECT COUNT(*) FROM {}", self.collection),
                [],
                |row| row.get(0),
            )
            .context("count people")?;
        usize::try_from(count).context("people count out of range")
    }
}

impl RecordStore for Store {
    fn insert(&mut self, fields: &PersonFields) -> StoreResult<RecordId> {
        Ok(self.insert_person(fields)?)
    }

    fn list_all(&mut self) -> StoreResult<Vec<PersonRecord>> {
        Ok(self.list_people()?)
    }

    fn update_by_id(&mut self, id: &RecordId, fields: &PersonFields) -> StoreResult<()> {
        if self.update_person(id, fields)? {
            Ok(())
        } else {
            Err(StoreError::NotFound(id.clone()))
        }
    }

    fn delete_by_id(&mut self, id: &RecordId) -> StoreResult<()> {
        if self.delete_person(id)? {
            Ok(())
        } else {
            Err(StoreError::NotFound(id.clone()))
        }
    }
}

/// Stored shape of a person. Every key is optional so documents written by
/// older versions or other tools still load; unknown keys are ignored.
/// `name` and `age` must carry their stored types. The other keys are read
/// leniently and fall back to absent when they hold something unusable.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredDocument {
    name: Option<String>,
    age: Option<i64>,
    national_code: Option<Value>,
    sex: Option<Value>,
    height: Option<Value>,
    weight: Option<Value>,
    birthplace: Option<Value>,
}

fn decode_person(id: RecordId, document: &str) -> Result<PersonRecord> {
    let stored: StoredDocument = serde_json::from_str(document)
        .with_context(|| format!("decode document for record {id}"))?;
    let name = stored
        .name
        .ok_or_else(|| anyhow!("record {id} has no name -- fix or remove the document"))?;
    let age = stored
        .age
        .ok_or_else(|| anyhow!("record {id} has no age -- fix or remove the document"))?;
    Ok(PersonRecord {
        national_code: lenient_text(&id, "nationalCode", stored.national_code),
        sex: lenient_text(&id, "sex", stored.sex),
        height: lenient_measure(&id, "height", stored.height),
        weight: lenient_measure(&id, "weight", stored.weight),
        birthplace: lenient_text(&id, "birthplace", stored.birthplace),
        id,
        name,
        age,
    })
}

fn lenient_text(id: &RecordId, key: &str, value: Option<Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        other => {
            warn!(record = %id, key, value = %other, "ignoring unreadable field");
            None
        }
    }
}

fn lenient_measure(id: &RecordId, key: &str, value: Option<Value>) -> Option<f64> {
    let measure = match value? {
        Value::Null => return None,
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    };
    if measure.is_none() {
        warn!(record = %id, key, "ignoring unreadable measure");
    }
    measure
}

pub fn default_db_path() -> Result<PathBuf> {
    if let Some(override_path) = env::var_os("ROSTER_DB_PATH") {
        return Ok(PathBuf::from(override_path));
    }

    let data_root = dirs::data_local_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set ROSTER_DB_PATH to a writable database path")
    })?;

    let app_dir = data_root.join(APP_NAME);
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("create data directory {}", app_dir.display()))?;
    Ok(app_dir.join("roster.db"))
}

pub fn validate_db_path(path: &str) -> Result<()> {
    if path.is_empty() {
        bail!("database path must not be empty");
    }
    if path == ":memory:" {
        return Ok(());
    }

    if let Some(index) = path.find("://")
        && index > 0
    {
        let scheme = &path[..index];
        if scheme.chars().all(char::is_alphabetic) {
            bail!(
                "database path {path:?} looks like a URI ({scheme}://); pass a filesystem path instead"
            );
        }
    }

    if path.starts_with("file:") {
        bail!("database path {path:?} uses file: URI syntax; pass a plain filesystem path");
    }

    if path.contains('?') {
        bail!(
            "database path {path:?} contains '?'; remove query parameters and use a plain file path"
        );
    }

    Ok(())
}

/// Collection names end up in SQL text, so only plain identifiers pass.
pub fn validate_collection_name(name: &str) -> Result<()> {
    if !is_safe_identifier(name) {
        bail!(
            "collection name {name:?} is invalid -- use only ASCII letters, digits and underscores"
        );
    }
    if name.starts_with("sqlite_") {
        bail!("collection name {name:?} is reserved by SQLite -- pick another name");
    }
    Ok(())
}

fn is_safe_identifier(identifier: &str) -> bool {
    !identifier.is_empty()
        && !identifier.starts_with(|c: char| c.is_ascii_digit())
        && identifier
            .bytes()
            .all(|byte| byte.is_ascii_alphanumeric() || byte == b'_')
}

fn validate_collection(conn: &Connection, collection: &str) -> Result<()> {
    let columns = table_columns(conn, collection)?;
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|column| !columns.contains(*column))
        .collect();

    if !missing.is_empty() {
        bail!(
            "table `{collection}` is missing required columns: {}; point `collection` at a roster table",
            missing.join(", ")
        );
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let exists = conn
        .query_row(
            "
            SELECT EXISTS(
              SELECT 1
              FROM sqlite_master
              WHERE type = 'table' AND name = ?
            )
            ",
            params![table],
            |row| row.get::<_, i64>(0),
        )
        .with_context(|| format!("check table existence for {table}"))?;
    Ok(exists == 1)
}

fn table_columns(conn: &Connection, table: &str) -> Result<BTreeSet<String>> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table})"))
        .with_context(|| format!("inspect columns for {table}"))?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .with_context(|| format!("query column info for {table}"))?;

    rows.collect::<rusqlite::Result<BTreeSet<_>>>()
        .with_context(|| format!("collect columns for {table}"))
}

fn configure_connection(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        ",
    )
    .context("configure sqlite pragmas")
}

fn now_rfc3339() -> Result<String> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .context("format current timestamp")
}

fn set_private_permissions(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let mut permissions = fs::metadata(path)
            .with_context(|| format!("stat {}", path.display()))?
            .permissions();
        permissions.set_mode(0o600);
        fs::set_permissions(path, permissions)
            .with_context(|| format!("set permissions on {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Store, decode_person, is_safe_identifier, validate_collection_name};
    use anyhow::Result;
    use roster_app::RecordId;

    #[test]
    fn safe_identifiers() {
        assert!(is_safe_identifier("people"));
        assert!(is_safe_identifier("staff_2026"));
        assert!(!is_safe_identifier(""));
        assert!(!is_safe_identifier("2people"));
        assert!(!is_safe_identifier("people; DROP TABLE x"));
        assert!(!is_safe_identifier("pe-ople"));
    }

    #[test]
    fn reserved_collection_names_are_rejected() {
        let error = validate_collection_name("sqlite_master").expect_err("reserved");
        assert!(error.to_string().contains("reserved"));
    }

    #[test]
    fn bootstrap_is_idempotent() -> Result<()> {
        let store = Store::open_memory()?;
        store.bootstrap()?;
        store.bootstrap()?;
        assert_eq!(store.count_people()?, 0);
        Ok(())
    }

    #[test]
    fn decode_tolerates_unknown_and_missing_keys() -> Result<()> {
        let record = decode_person(
            RecordId::new("r1"),
            r#"{"name":"Old Entry","age":41,"nickname":"oe"}"#,
        )?;
        assert_eq!(record.name, "Old Entry");
        assert_eq!(record.age, 41);
        assert!(record.national_code.is_none());
        assert!(record.height.is_none());
        Ok(())
    }

    #[test]
    fn decode_accepts_integer_measures() -> Result<()> {
        let record = decode_person(
            RecordId::new("r2"),
            r#"{"name":"Ana","age":30,"height":2,"weight":70}"#,
        )?;
        assert_eq!(record.height, Some(2.0));
        assert_eq!(record.weight, Some(70.0));
        Ok(())
    }

    #[test]
    fn decode_requires_name_and_age() {
        let error = decode_person(RecordId::new("r3"), r#"{"age":30}"#).expect_err("no name");
        assert!(error.to_string().contains("has no name"));

        let error = decode_person(RecordId::new("r4"), r#"{"name":"Ana"}"#).expect_err("no age");
        assert!(error.to_string().contains("has no age"));
    }

    #[test]
    fn decode_reads_mistyped_optional_fields_leniently() -> Result<()> {
        let record = decode_person(
            RecordId::new("r5"),
            r#"{"name":"Ana","age":30,"height":"1.7","weight":"heavy","nationalCode":12,"sex":["F"]}"#,
        )?;
        assert_eq!(record.height, Some(1.7));
        assert_eq!(record.weight, None);
        assert_eq!(record.national_code.as_deref(), Some("12"));
        assert_eq!(record.sex, None);
        Ok(())
    }

    #[test]
    fn decode_reports_mistyped_required_fields_with_record_id() {
        let error = decode_person(RecordId::new("r6"), r#"{"name":42,"age":30}"#)
            .expect_err("numeric name");
        assert!(format!("{error:#}").contains("decode document for record r6"));

        let error = decode_person(RecordId::new("r7"), r#"{"name":"Ana","age":"thirty"}"#)
            .expect_err("text age");
        assert!(format!("{error:#}").contains("decode document for record r7"));
    }
}
