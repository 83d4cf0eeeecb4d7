use eyre::Result;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;

use crate::config::get_app_data_prefix;

/// String key/value store with the shape of browser local storage.
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
    fn remove_item(&self, key: &str) -> Result<()>;
}

pub struct LocalStorage {
    conn: Connection,
}

impl LocalStorage {
    pub fn new() -> Result<Self> {
        let prefix = get_app_data_prefix()?;
        Self::open(&prefix.join("storage.db"))
    }

    pub fn open(filepath: &Path) -> Result<Self> {
        if let Some(parent) = filepath.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(filepath)?;
        Self::init_db(&conn)?;
        Ok(Self { conn })
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_db(&conn)?;
        Ok(Self { conn })
    }

    fn init_db(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS local_storage (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at DATETIME DEFAULT (datetime('now'))
            );
            ",
        )?;
        Ok(())
    }
}

impl KeyValueStore for LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM local_storage WHERE key=?",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO local_storage (key, value, updated_at) VALUES (?, ?, datetime('now'))",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM local_storage WHERE key=?", params![key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_get_missing_key_returns_none() -> Result<()> {
        let storage = LocalStorage::in_memory()?;
        assert_eq!(storage.get_item("quranSettings")?, None);
        Ok(())
    }

    #[test]
    fn test_set_overwrites_previous_value() -> Result<()> {
        let storage = LocalStorage::in_memory()?;
        storage.set_item("quranSettings", "{\"theme\":\"dark\"}")?;
        storage.set_item("quranSettings", "{\"theme\":\"desert\"}")?;
        assert_eq!(
            storage.get_item("quranSettings")?,
            Some("{\"theme\":\"desert\"}".to_string())
        );
        Ok(())
    }

    #[test]
    fn test_remove_item() -> Result<()> {
        let storage = LocalStorage::in_memory()?;
        storage.set_item("a", "1")?;
        storage.remove_item("a")?;
        assert_eq!(storage.get_item("a")?, None);
        // Removing an absent key is not an error
        storage.remove_item("a")?;
        Ok(())
    }

    #[test]
    fn test_values_survive_reopen() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("nested").join("storage.db");
        {
            let storage = LocalStorage::open(&path)?;
            storage.set_item("quranSettings", "{}")?;
        }
        let storage = LocalStorage::open(&path)?;
        assert_eq!(storage.get_item("quranSettings")?, Some("{}".to_string()));
        Ok(())
    }
}
