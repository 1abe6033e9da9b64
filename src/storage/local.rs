use rusqlite::{OptionalExtension, params};

use crate::{
    config,
    storage::{
        db::{self, SecondsSinceUnix},
        error::StorageError,
        schema::{columns::*, tables::*},
    },
};

/// String key/value storage that survives restarts
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// SQLite backed key/value storage
pub struct LocalStorage {
    pub(crate) db: rusqlite::Connection,
}

impl LocalStorage {
    /// when called, opens a data base connection
    pub fn new(config: &config::Database) -> Result<Self, StorageError> {
        Ok(Self::from_existing_conn(db::open(config)?))
    }

    pub fn from_existing_conn(db: rusqlite::Connection) -> Self {
        Self { db }
    }

    /// when the key was last written
    pub fn updated_at(&self, key: &str) -> Result<Option<SecondsSinceUnix>, StorageError> {
        Ok(self
            .db
            .query_row(
                &format!("SELECT {UPDATED_AT} FROM {LOCAL_STORAGE} WHERE {KEY} = ?1"),
                params![key],
                |row| row.get(0),
            )
            .optional()?)
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self
            .db
            .query_row(
                &format!("SELECT {VALUE} FROM {LOCAL_STORAGE} WHERE {KEY} = ?1"),
                params![key],
                |row| row.get(0),
            )
            .optional()?)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.db.execute(
            &format!(
                "INSERT INTO {LOCAL_STORAGE} ({KEY}, {VALUE}, {UPDATED_AT}) VALUES (?1, ?2, ?3)
                 ON CONFLICT({KEY}) DO UPDATE SET {VALUE} = excluded.{VALUE}, {UPDATED_AT} = excluded.{UPDATED_AT}"
            ),
            params![key, value, db::now_seconds()],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Database;
    use tempfile::tempdir;

    #[test]
    fn test_get_missing_key() -> anyhow::Result<()> {
        let storage = LocalStorage::new(&Database::InMemory)?;
        assert_eq!(storage.get("player.playbackRate")?, None);
        assert_eq!(storage.updated_at("player.playbackRate")?, None);
        Ok(())
    }

    #[test]
    fn test_set_then_get() -> anyhow::Result<()> {
        let mut storage = LocalStorage::new(&Database::InMemory)?;

        storage.set("player.playbackRate", "1.5")?;

        assert_eq!(storage.get("player.playbackRate")?.as_deref(), Some("1.5"));
        assert!(storage.updated_at("player.playbackRate")?.is_some());
        Ok(())
    }

    #[test]
    fn test_set_overwrites() -> anyhow::Result<()> {
        let mut storage = LocalStorage::new(&Database::InMemory)?;

        storage.set("k", "1")?;
        storage.set("k", "2")?;

        assert_eq!(storage.get("k")?.as_deref(), Some("2"));

        let rows: i64 = storage.db.query_row(
            &format!("SELECT COUNT(*) FROM {LOCAL_STORAGE}"),
            [],
            |row| row.get(0),
        )?;
        assert_eq!(rows, 1);
        Ok(())
    }

    #[test]
    fn test_on_disk_survives_reopen() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let config = Database::OnDisk {
            path: dir.path().join("player.db"),
        };

        {
            let mut storage = LocalStorage::new(&config)?;
            storage.set("player.playbackRate", "1.25")?;
        }

        let storage = LocalStorage::new(&config)?;
        assert_eq!(storage.get("player.playbackRate")?.as_deref(), Some("1.25"));
        Ok(())
    }
}
