//! Board collection persistence contracts and implementations.
//!
//! # Responsibility
//! - Serialize the board collection to JSON under two storage keys.
//! - Load stored collections through the canonical normalization step.
//! - Provide SQLite-backed and in-memory key/value backends.
//!
//! # Invariants
//! - `save_collection` followed by `load_collection` yields an equal value.
//! - Stored shapes lacking newer task fields still load, with defaults.
//! - A failed save never alters the collection passed in.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::board::{Board, BoardCollection};
use log::{debug, warn};
use rusqlite::{params, Connection, ErrorCode};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage key holding the JSON array of boards.
pub const BOARDS_KEY: &str = "kanban-multi-boards";
/// Storage key holding the active board ID as plain text.
pub const ACTIVE_BOARD_KEY: &str = "kanban-active-board";

pub type StoreResult<T> = Result<T, StorageError>;

/// Persistence failure. Never fatal: the in-memory collection stays
/// authoritative and the engine reports this as a warning.
#[derive(Debug)]
pub enum StorageError {
    /// Durable storage is not usable in this environment.
    Unavailable(String),
    /// Writing would exceed the storage quota. Sizes are `None` when the
    /// backend itself ran out of space (SQLite `SQLITE_FULL`).
    QuotaExceeded {
        needed: Option<usize>,
        quota: Option<usize>,
    },
    Db(DbError),
    /// Stored payload is not valid JSON for the board shape.
    Serialization(serde_json::Error),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(reason) => write!(f, "storage unavailable: {reason}"),
            Self::QuotaExceeded {
                needed: Some(needed),
                quota: Some(quota),
            } => write!(
                f,
                "storage quota exceeded: {needed} bytes needed, {quota} bytes allowed"
            ),
            Self::QuotaExceeded { .. } => write!(f, "storage full: backend has no free space"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "invalid stored board data: {err}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::Unavailable(_) | Self::QuotaExceeded { .. } => None,
        }
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        match value {
            DbError::Sqlite(err) => Self::from(err),
            other => Self::Db(other),
        }
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        match value.sqlite_error_code() {
            Some(ErrorCode::ReadOnly | ErrorCode::CannotOpen | ErrorCode::PermissionDenied) => {
                Self::Unavailable(value.to_string())
            }
            Some(ErrorCode::DiskFull) => Self::QuotaExceeded {
                needed: None,
                quota: None,
            },
            _ => Self::Db(DbError::Sqlite(value)),
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Storage key names. The defaults match the layout older builds wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreKeys {
    pub boards: String,
    pub active_board: String,
}

impl Default for StoreKeys {
    fn default() -> Self {
        Self {
            boards: BOARDS_KEY.to_string(),
            active_board: ACTIVE_BOARD_KEY.to_string(),
        }
    }
}

/// Durable sink for the board collection.
pub trait BoardStore {
    /// Reads the stored collection; `Ok(None)` when nothing was ever saved.
    fn load_collection(&self) -> StoreResult<Option<BoardCollection>>;
    /// Replaces the stored collection.
    fn save_collection(&self, collection: &BoardCollection) -> StoreResult<()>;
}

impl<S: BoardStore + ?Sized> BoardStore for &S {
    fn load_collection(&self) -> StoreResult<Option<BoardCollection>> {
        (**self).load_collection()
    }

    fn save_collection(&self, collection: &BoardCollection) -> StoreResult<()> {
        (**self).save_collection(collection)
    }
}

/// Loads the stored collection, or the first-run seed when nothing is stored.
pub fn load_or_seed<S: BoardStore + ?Sized>(store: &S) -> StoreResult<BoardCollection> {
    match store.load_collection()? {
        Some(collection) => Ok(collection),
        None => {
            debug!("event=store_load module=repo status=seed");
            Ok(BoardCollection::seed_default())
        }
    }
}

/// Encodes a collection into `(boards_json, active_board_id)`.
fn encode_collection(collection: &BoardCollection) -> StoreResult<(String, Option<String>)> {
    let boards_json = serde_json::to_string(collection.boards())?;
    Ok((
        boards_json,
        collection.active_board_id().map(str::to_string),
    ))
}

/// Decodes stored payloads and applies [`Board::normalize`] to every board.
fn decode_collection(boards_json: &str, active: Option<String>) -> StoreResult<BoardCollection> {
    let stored: Vec<Board> = serde_json::from_str(boards_json)?;

    let mut seen = HashSet::new();
    let mut boards = Vec::with_capacity(stored.len());
    for mut board in stored {
        if !seen.insert(board.id.clone()) {
            warn!(
                "event=store_load module=repo status=warn reason=duplicate_board board_id={}",
                board.id
            );
            continue;
        }
        let repairs = board.normalize();
        if repairs > 0 {
            warn!(
                "event=store_load module=repo status=warn reason=normalized board_id={} repairs={}",
                board.id, repairs
            );
        }
        boards.push(board);
    }

    Ok(BoardCollection::with_active(boards, active))
}

/// SQLite-backed key/value board store.
pub struct SqliteBoardStore<'conn> {
    conn: &'conn Connection,
    keys: StoreKeys,
    quota: Option<usize>,
}

impl<'conn> SqliteBoardStore<'conn> {
    /// Constructs a store from a connection opened through [`crate::db::open_db`].
    ///
    /// # Errors
    /// - `StorageError::Db` when the schema version does not match this build.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        let version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        let latest = latest_version();
        if version != latest {
            return Err(StorageError::Db(DbError::UnsupportedSchemaVersion {
                db_version: version,
                latest_supported: latest,
            }));
        }
        Ok(Self {
            conn,
            keys: StoreKeys::default(),
            quota: None,
        })
    }

    pub fn with_keys(mut self, keys: StoreKeys) -> Self {
        self.keys = keys;
        self
    }

    /// Caps the total stored bytes across all keys.
    pub fn with_quota(mut self, quota_bytes: usize) -> Self {
        self.quota = Some(quota_bytes);
        self
    }

    fn read_key(&self, key: &str) -> StoreResult<Option<String>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT value FROM kv_store WHERE key = ?1;")?;
        let mut rows = stmt.query([key])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }
}

impl BoardStore for SqliteBoardStore<'_> {
    fn load_collection(&self) -> StoreResult<Option<BoardCollection>> {
        let Some(boards_json) = self.read_key(&self.keys.boards)? else {
            return Ok(None);
        };
        let active = self.read_key(&self.keys.active_board)?;
        decode_collection(&boards_json, active).map(Some)
    }

    fn save_collection(&self, collection: &BoardCollection) -> StoreResult<()> {
        let (boards_json, active) = encode_collection(collection)?;

        if let Some(quota) = self.quota {
            let other_bytes: i64 = self.conn.query_row(
                "SELECT COALESCE(SUM(byte_len), 0) FROM kv_store WHERE key NOT IN (?1, ?2);",
                params![self.keys.boards, self.keys.active_board],
                |row| row.get(0),
            )?;
            let needed = usize::try_from(other_bytes).unwrap_or(0)
                + boards_json.len()
                + active.as_ref().map_or(0, String::len);
            if needed > quota {
                return Err(StorageError::QuotaExceeded {
                    needed: Some(needed),
                    quota: Some(quota),
                });
            }
        }

        let tx = self.conn.unchecked_transaction()?;
        upsert_key(&tx, &self.keys.boards, &boards_json)?;
        match &active {
            Some(board_id) => upsert_key(&tx, &self.keys.active_board, board_id)?,
            None => {
                tx.execute(
                    "DELETE FROM kv_store WHERE key = ?1;",
                    [self.keys.active_board.as_str()],
                )?;
            }
        }
        tx.commit()?;

        debug!(
            "event=store_save module=repo status=ok backend=sqlite boards={} bytes={}",
            collection.len(),
            boards_json.len()
        );
        Ok(())
    }
}

fn upsert_key(conn: &Connection, key: &str, value: &str) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO kv_store (key, value, byte_len, updated_at)
         VALUES (?1, ?2, ?3, (strftime('%s', 'now') * 1000))
         ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            byte_len = excluded.byte_len,
            updated_at = excluded.updated_at;",
        params![key, value, value.len() as i64],
    )?;
    Ok(())
}

/// In-process key/value board store.
///
/// Backs memory-only sessions and tests. Can simulate an unavailable backend
/// and a byte quota.
#[derive(Debug, Default)]
pub struct MemoryBoardStore {
    entries: RefCell<HashMap<String, String>>,
    keys: StoreKeys,
    quota: Option<usize>,
    unavailable: bool,
}

impl MemoryBoardStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects every read and write as `Unavailable`.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn with_quota(mut self, quota_bytes: usize) -> Self {
        self.quota = Some(quota_bytes);
        self
    }

    pub fn with_keys(mut self, keys: StoreKeys) -> Self {
        self.keys = keys;
        self
    }

    /// Seeds a raw value, e.g. a payload written by an older build.
    pub fn with_raw(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.borrow_mut().insert(key.into(), value.into());
        self
    }

    /// Returns the raw stored value for `key`.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn ensure_available(&self) -> StoreResult<()> {
        if self.unavailable {
            return Err(StorageError::Unavailable(
                "no durable storage in this environment".to_string(),
            ));
        }
        Ok(())
    }
}

impl BoardStore for MemoryBoardStore {
    fn load_collection(&self) -> StoreResult<Option<BoardCollection>> {
        self.ensure_available()?;
        let entries = self.entries.borrow();
        let Some(boards_json) = entries.get(&self.keys.boards) else {
            return Ok(None);
        };
        let active = entries.get(&self.keys.active_board).cloned();
        decode_collection(boards_json, active).map(Some)
    }

    fn save_collection(&self, collection: &BoardCollection) -> StoreResult<()> {
        self.ensure_available()?;
        let (boards_json, active) = encode_collection(collection)?;

        let mut entries = self.entries.borrow_mut();
        if let Some(quota) = self.quota {
            let other_bytes: usize = entries
                .iter()
                .filter(|(key, _)| **key != self.keys.boards && **key != self.keys.active_board)
                .map(|(_, value)| value.len())
                .sum();
            let needed = other_bytes + boards_json.len() + active.as_ref().map_or(0, String::len);
            if needed > quota {
                return Err(StorageError::QuotaExceeded {
                    needed: Some(needed),
                    quota: Some(quota),
                });
            }
        }

        let bytes = boards_json.len();
        entries.insert(self.keys.boards.clone(), boards_json);
        match active {
            Some(board_id) => {
                entries.insert(self.keys.active_board.clone(), board_id);
            }
            None => {
                entries.remove(&self.keys.active_board);
            }
        }

        debug!(
            "event=store_save module=repo status=ok backend=memory boards={} bytes={}",
            collection.len(),
            bytes
        );
        Ok(())
    }
}
