// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use roster_app::{RecordStore, StudentRecord};
use rusqlite::{Connection, OptionalExtension, params};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, warn};

pub const APP_NAME: &str = "roster";
pub const DEFAULT_SLOT_KEY: &str = "students";

const DEMO_SEED: u64 = 2026;
const DEMO_RECORD_COUNT: usize = 24;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS slots (
      key TEXT PRIMARY KEY,
      value TEXT NOT NULL,
      updated_at TEXT NOT NULL
    );
";

/// A single named durable location holding the whole serialized record list.
pub trait SnapshotSlot {
    fn read(&self) -> Result<Option<String>>;
    fn write(&mut self, snapshot: &str) -> Result<()>;
}

/// Snapshot slot backed by one row of a SQLite key/value table.
pub struct SqliteSlot {
    conn: Connection,
    key: String,
}

impl SqliteSlot {
    pub fn open(path: &Path, key: &str) -> Result<Self> {
        let printable = path.to_string_lossy().to_string();
        validate_db_path(&printable)?;
        validate_slot_key(key)?;
        let conn = Connection::open(path)
            .with_context(|| format!("open database at {}", path.display()))?;
        Self::bootstrap(conn, key)
    }

    pub fn open_memory(key: &str) -> Result<Self> {
        validate_slot_key(key)?;
        let conn = Connection::open_in_memory().context("open in-memory database")?;
        Self::bootstrap(conn, key)
    }

    fn bootstrap(conn: Connection, key: &str) -> Result<Self> {
        configure_connection(&conn)?;
        conn.execute_batch(SCHEMA).context("create slots table")?;
        Ok(Self {
            conn,
            key: key.to_owned(),
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn raw_connection(&self) -> &Connection {
        &self.conn
    }

    pub fn updated_at(&self) -> Result<Option<OffsetDateTime>> {
        let raw = self
            .conn
            .query_row(
                "SELECT updated_at FROM slots WHERE key = ?",
                params![self.key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .with_context(|| format!("read timestamp for slot {}", self.key))?;
        raw.map(|value| {
            OffsetDateTime::parse(&value, &Rfc3339)
                .with_context(|| format!("parse slot timestamp {value:?}"))
        })
        .transpose()
    }
}

impl SnapshotSlot for SqliteSlot {
    fn read(&self) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM slots WHERE key = ?",
                params![self.key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .with_context(|| format!("read slot {}", self.key))
    }

    fn write(&mut self, snapshot: &str) -> Result<()> {
        let now = now_rfc3339()?;
        self.conn
            .execute(
                "
                INSERT INTO slots (key, value, updated_at)
                VALUES (?, ?, ?)
                ON CONFLICT(key) DO UPDATE SET
                  value = excluded.value,
                  updated_at = excluded.updated_at
                ",
                params![self.key, snapshot, now],
            )
            .with_context(|| format!("write slot {}", self.key))?;
        Ok(())
    }
}

/// Process-local slot that remembers how many times it was written.
#[derive(Debug, Clone, Default)]
pub struct MemorySlot {
    pub value: Option<String>,
    pub writes: usize,
    pub fail_writes: bool,
}

impl MemorySlot {
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::default()
        }
    }
}

impl SnapshotSlot for MemorySlot {
    fn read(&self) -> Result<Option<String>> {
        Ok(self.value.clone())
    }

    fn write(&mut self, snapshot: &str) -> Result<()> {
        if self.fail_writes {
            bail!("memory slot is read-only");
        }
        self.value = Some(snapshot.to_owned());
        self.writes += 1;
        Ok(())
    }
}

/// Sole owner of the in-memory record list and its persisted snapshot.
pub struct Store<S = SqliteSlot> {
    slot: S,
    records: Vec<StudentRecord>,
}

impl Store<SqliteSlot> {
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_key(path, DEFAULT_SLOT_KEY)
    }

    pub fn open_with_key(path: &Path, key: &str) -> Result<Self> {
        Self::with_slot(SqliteSlot::open(path, key)?)
    }

    pub fn open_memory() -> Result<Self> {
        Self::with_slot(SqliteSlot::open_memory(DEFAULT_SLOT_KEY)?)
    }
}

impl<S: SnapshotSlot> Store<S> {
    pub fn with_slot(slot: S) -> Result<Self> {
        let mut store = Self {
            slot,
            records: Vec::new(),
        };
        store.load()?;
        Ok(store)
    }

    pub fn slot(&self) -> &S {
        &self.slot
    }

    pub fn slot_mut(&mut self) -> &mut S {
        &mut self.slot
    }

    /// Replaces the in-memory list with the persisted snapshot. A missing or
    /// unreadable snapshot yields an empty list; only slot I/O errors surface.
    pub fn load(&mut self) -> Result<()> {
        let raw = self.slot.read()?;
        self.records = match raw.as_deref() {
            None | Some("") => Vec::new(),
            Some(raw) => match decode_snapshot(raw) {
                Some(records) => records,
                None => {
                    warn!(bytes = raw.len(), "discarding malformed record snapshot");
                    Vec::new()
                }
            },
        };
        debug!(count = self.records.len(), "record snapshot loaded");
        Ok(())
    }

    pub fn persist(&mut self) -> Result<()> {
        let snapshot = encode_snapshot(&self.records)?;
        self.slot.write(&snapshot)?;
        debug!(count = self.records.len(), "record snapshot persisted");
        Ok(())
    }

    pub fn seed_demo_data(&mut self) -> Result<()> {
        let mut faker = roster_testkit::StudentFaker::new(DEMO_SEED);
        self.records = faker.students(DEMO_RECORD_COUNT);
        self.persist()
    }
}

impl<S: SnapshotSlot> RecordStore for Store<S> {
    fn records(&self) -> &[StudentRecord] {
        &self.records
    }

    fn insert(&mut self, record: StudentRecord) -> Result<()> {
        self.records.push(record);
        if let Err(error) = self.persist() {
            self.records.pop();
            return Err(error);
        }
        Ok(())
    }

    fn update(&mut self, index: usize, record: StudentRecord) -> Result<()> {
        let len = self.records.len();
        let Some(existing) = self.records.get_mut(index) else {
            bail!("cannot update record {index}: only {len} records exist");
        };
        let previous = std::mem::replace(existing, record);
        if let Err(error) = self.persist() {
            self.records[index] = previous;
            return Err(error);
        }
        Ok(())
    }

    fn delete(&mut self, index: usize) -> Result<StudentRecord> {
        if index >= self.records.len() {
            bail!(
                "cannot delete record {index}: only {} records exist",
                self.records.len()
            );
        }
        let removed = self.records.remove(index);
        if let Err(error) = self.persist() {
            self.records.insert(index, removed);
            return Err(error);
        }
        Ok(removed)
    }
}

pub fn encode_snapshot(records: &[StudentRecord]) -> Result<String> {
    serde_json::to_string(records).context("serialize record snapshot")
}

pub fn decode_snapshot(raw: &str) -> Option<Vec<StudentRecord>> {
    serde_json::from_str(raw).ok()
}

pub fn default_db_path() -> Result<PathBuf> {
    if let Some(override_path) = env::var_os("ROSTER_DB_PATH") {
        return Ok(PathBuf::from(override_path));
    }

    Ok(data_dir()?.join("roster.db"))
}

pub fn data_dir() -> Result<PathBuf> {
    let data_root = dirs::data_local_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set ROSTER_DB_PATH to a writable database path")
    })?;

    let app_dir = data_root.join(APP_NAME);
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("create data directory {}", app_dir.display()))?;
    Ok(app_dir)
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

pub fn validate_slot_key(key: &str) -> Result<()> {
    if key.is_empty() {
        bail!("slot key must not be empty");
    }
    if let Some(bad) = key
        .chars()
        .find(|ch| !(ch.is_ascii_alphanumeric() || *ch == '_' || *ch == '-'))
    {
        bail!("slot key {key:?} contains {bad:?}; use letters, digits, '_' or '-'");
    }
    Ok(())
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
