//! Append-only snapshot store over SQLite.
//!
//! One logical collection per entity kind; each document is keyed by
//! (key, timestamp) and carries a JSON payload. History is never rewritten:
//! every ingestion appends, and "latest" resolves by insertion order
//! (`seq`), so a regressing wall clock cannot reorder history.

use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;

use crate::catalog::CardCatalog;
use crate::error::TrackerError;

const DB_SCHEMA_VERSION: i64 = 1;

/// Timestamp used for the seeded reference collection, below any real
/// ingestion time so dedup keeps reseeding a no-op.
const CATALOG_SEED_TIMESTAMP: i64 = 0;

/// The four logical collections the pipeline writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    CardsStatic,
    CardStats,
    CollectionEntries,
    Currencies,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::CardsStatic => "cards-static",
            EntityKind::CardStats => "card-stats",
            EntityKind::CollectionEntries => "collection-entries",
            EntityKind::Currencies => "currencies",
        }
    }
}

/// Outcome counters for a batched write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PutOutcome {
    pub written: usize,
    pub deduplicated: usize,
}

/// Snapshot persistence. Writers serialize through the connection mutex, so
/// concurrent ingestion cycles cannot interleave a key's history; readers
/// see either the pre- or post-write state, never a torn payload.
pub struct SnapshotStore {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for SnapshotStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotStore").finish_non_exhaustive()
    }
}

impl SnapshotStore {
    pub fn open(path: &Path) -> Result<Self, TrackerError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory store, used by tests and ad-hoc runs.
    pub fn open_in_memory() -> Result<Self, TrackerError> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        // A panicked writer cannot leave a half-applied transaction behind
        // (rusqlite rolls back on drop), so the poisoned guard is usable.
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append one snapshot unless the key's latest payload is already
    /// identical (content dedup, which subsumes the identical-tuple case).
    /// Returns whether a row was written.
    pub fn put(
        &self,
        kind: EntityKind,
        key: &str,
        timestamp: i64,
        payload: &Value,
    ) -> Result<bool, TrackerError> {
        let conn = self.conn();
        let tx = conn.unchecked_transaction()?;
        let written = put_in_tx(&tx, kind, key, timestamp, payload)?;
        tx.commit()?;
        Ok(written)
    }

    /// Append a full ingestion cycle in a single transaction: either every
    /// document lands or none does, so an abandoned cycle leaves no partial
    /// history behind.
    pub fn put_batch(
        &self,
        timestamp: i64,
        docs: &[(EntityKind, String, Value)],
    ) -> Result<PutOutcome, TrackerError> {
        let conn = self.conn();
        let tx = conn.unchecked_transaction()?;

        let mut outcome = PutOutcome::default();
        for (kind, key, payload) in docs {
            if put_in_tx(&tx, *kind, key, timestamp, payload)? {
                outcome.written += 1;
            } else {
                outcome.deduplicated += 1;
            }
        }

        tx.commit()?;
        Ok(outcome)
    }

    /// Most recent payload for a key, or `None` if the key has no history.
    pub fn latest(&self, kind: EntityKind, key: &str) -> Result<Option<Value>, TrackerError> {
        let conn = self.conn();
        let raw: Option<String> = conn
            .query_row(
                "SELECT payload FROM snapshots
                 WHERE kind = ?1 AND key = ?2
                 ORDER BY seq DESC LIMIT 1",
                params![kind.as_str(), key],
                |row| row.get(0),
            )
            .optional()?;

        raw.map(|s| serde_json::from_str(&s)).transpose().map_err(Into::into)
    }

    /// Most recent payload for every key of a kind, sorted by key.
    pub fn all_latest(&self, kind: EntityKind) -> Result<Vec<(String, Value)>, TrackerError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            // SQLite resolves bare columns in a MAX() group to the row the
            // maximum came from, which is exactly the latest snapshot.
            "SELECT key, payload, MAX(seq) FROM snapshots
             WHERE kind = ?1 GROUP BY key ORDER BY key",
        )?;

        let rows = stmt.query_map(params![kind.as_str()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut result = Vec::new();
        for row in rows {
            let (key, raw) = row?;
            result.push((key, serde_json::from_str(&raw)?));
        }
        Ok(result)
    }

    /// Full history for a key, oldest first, as (timestamp, payload) pairs.
    pub fn history(
        &self,
        kind: EntityKind,
        key: &str,
    ) -> Result<Vec<(i64, Value)>, TrackerError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT ingested_at, payload FROM snapshots
             WHERE kind = ?1 AND key = ?2 ORDER BY seq ASC",
        )?;

        let rows = stmt.query_map(params![kind.as_str(), key], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut result = Vec::new();
        for row in rows {
            let (ts, raw) = row?;
            result.push((ts, serde_json::from_str(&raw)?));
        }
        Ok(result)
    }

    /// True once at least one ingestion cycle has produced snapshots.
    pub fn has_ingested_data(&self) -> Result<bool, TrackerError> {
        let conn = self.conn();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM snapshots WHERE kind = ?1",
            params![EntityKind::Currencies.as_str()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Seed the `cards-static` collection from the builtin catalog. Content
    /// dedup makes reopening an existing store a no-op.
    pub fn seed_catalog(&self, catalog: &CardCatalog) -> Result<PutOutcome, TrackerError> {
        let mut docs = Vec::with_capacity(catalog.len());
        for card in catalog.iter() {
            docs.push((
                EntityKind::CardsStatic,
                card.code.clone(),
                serde_json::to_value(card)?,
            ));
        }
        docs.sort_by(|a, b| a.1.cmp(&b.1));
        self.put_batch(CATALOG_SEED_TIMESTAMP, &docs)
    }
}

fn put_in_tx(
    conn: &Connection,
    kind: EntityKind,
    key: &str,
    timestamp: i64,
    payload: &Value,
) -> Result<bool, TrackerError> {
    let encoded = serde_json::to_string(payload)?;

    let current: Option<String> = conn
        .query_row(
            "SELECT payload FROM snapshots
             WHERE kind = ?1 AND key = ?2
             ORDER BY seq DESC LIMIT 1",
            params![kind.as_str(), key],
            |row| row.get(0),
        )
        .optional()?;

    if current.as_deref() == Some(encoded.as_str()) {
        return Ok(false);
    }

    conn.execute(
        "INSERT INTO snapshots (kind, key, ingested_at, payload) VALUES (?1, ?2, ?3, ?4)",
        params![kind.as_str(), key, timestamp, encoded],
    )?;
    Ok(true)
}

fn initialize_schema(conn: &Connection) -> Result<(), TrackerError> {
    conn.execute_batch(
        "PRAGMA foreign_keys = ON;
         PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;",
    )?;

    let mut version: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    if version < 1 {
        apply_migration_1(conn)?;
        version = 1;
        conn.pragma_update(None, "user_version", version)?;
    }

    if version > DB_SCHEMA_VERSION {
        // Future schema; do not fail reads/writes for forward-compatible changes.
        conn.pragma_update(None, "user_version", version)?;
    }

    Ok(())
}

fn apply_migration_1(conn: &Connection) -> Result<(), TrackerError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS snapshots (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            kind TEXT NOT NULL,
            key TEXT NOT NULL,
            ingested_at INTEGER NOT NULL,
            payload TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_snapshots_kind_key_seq
            ON snapshots(kind, key, seq);
        ",
    )?;
    Ok(())
}
