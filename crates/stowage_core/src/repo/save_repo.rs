//! Save-slot repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Keep named save slots, one JSON-encoded `SaveGame` document each.
//! - Keep SQL details inside this persistence boundary.
//!
//! # Invariants
//! - Slot names are non-blank after trim and stored trimmed.
//! - Writing an existing slot replaces its payload.
//! - Read paths reject undecodable persisted payloads instead of masking
//!   them.

use crate::db::DbError;
use crate::snapshot::SaveGame;
use log::info;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type SaveRepoResult<T> = Result<T, SaveRepoError>;

/// Save-store persistence errors.
#[derive(Debug)]
pub enum SaveRepoError {
    Db(DbError),
    /// Slot name is blank after trim.
    InvalidSlot,
    /// Slot does not exist.
    NotFound(String),
    /// Payload (de)serialization failed.
    Payload(serde_json::Error),
}

impl Display for SaveRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidSlot => write!(f, "save slot name must not be blank"),
            Self::NotFound(slot) => write!(f, "save slot not found: {slot}"),
            Self::Payload(err) => write!(f, "invalid save payload: {err}"),
        }
    }
}

impl Error for SaveRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Payload(err) => Some(err),
            Self::InvalidSlot | Self::NotFound(_) => None,
        }
    }
}

impl From<DbError> for SaveRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for SaveRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for SaveRepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Payload(value)
    }
}

/// Repository interface for save slots.
pub trait SaveRepository {
    /// Writes `save` under `slot`, replacing any previous payload.
    fn put_save(&self, slot: &str, save: &SaveGame) -> SaveRepoResult<()>;
    /// Reads one slot; `None` when it was never written.
    fn get_save(&self, slot: &str) -> SaveRepoResult<Option<SaveGame>>;
    /// All written slot names, sorted.
    fn list_slots(&self) -> SaveRepoResult<Vec<String>>;
    /// Deletes one slot; `NotFound` when it does not exist.
    fn delete_save(&self, slot: &str) -> SaveRepoResult<()>;
}

/// SQLite-backed save repository.
pub struct SqliteSaveRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSaveRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SaveRepository for SqliteSaveRepository<'_> {
    fn put_save(&self, slot: &str, save: &SaveGame) -> SaveRepoResult<()> {
        let slot = normalize_slot(slot)?;
        let payload = serde_json::to_string(save)?;

        self.conn.execute(
            "INSERT INTO saves (slot, payload) VALUES (?1, ?2)
             ON CONFLICT(slot) DO UPDATE SET
                payload = excluded.payload,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![slot, payload],
        )?;

        info!(
            "event=save_written module=repo slot={slot} containers={} frames={}",
            save.containers.len(),
            save.frames.len()
        );
        Ok(())
    }

    fn get_save(&self, slot: &str) -> SaveRepoResult<Option<SaveGame>> {
        let slot = normalize_slot(slot)?;
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM saves WHERE slot = ?1;",
                params![slot],
                |row| row.get(0),
            )
            .optional()?;

        match payload {
            Some(payload) => Ok(Some(serde_json::from_str(payload.as_str())?)),
            None => Ok(None),
        }
    }

    fn list_slots(&self) -> SaveRepoResult<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT slot FROM saves ORDER BY slot;")?;
        let mut rows = stmt.query([])?;
        let mut slots = Vec::new();
        while let Some(row) = rows.next()? {
            slots.push(row.get(0)?);
        }
        Ok(slots)
    }

    fn delete_save(&self, slot: &str) -> SaveRepoResult<()> {
        let slot = normalize_slot(slot)?;
        let changed = self
            .conn
            .execute("DELETE FROM saves WHERE slot = ?1;", params![slot])?;
        if changed == 0 {
            return Err(SaveRepoError::NotFound(slot.to_string()));
        }
        Ok(())
    }
}

fn normalize_slot(slot: &str) -> SaveRepoResult<&str> {
    let trimmed = slot.trim();
    if trimmed.is_empty() {
        return Err(SaveRepoError::InvalidSlot);
    }
    Ok(trimmed)
}
