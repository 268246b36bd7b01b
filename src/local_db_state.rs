//! LMDB binding of the [`KeyValueStore`] capability.
//!
//! Each [`AppDbState`] owns one LMDB environment living in the directory
//! `<name>.lmdb` and one named database inside it. Values are UTF-8 strings.

use std::path::{Path, PathBuf};

use lmdb::{Database, DatabaseFlags, Environment, Transaction, WriteFlags};
use log::{info, warn};

use crate::app_response::AppResponse;
use crate::key_value_store::KeyValueStore;

const DB_NAME: &str = "biodata_store";

/// Opening parameters for an LMDB-backed store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LmdbConfig {
    /// Path stem; the environment directory is `<name>.lmdb`.
    pub name: String,
    /// Upper bound of the memory map in bytes.
    pub map_size: usize,
    pub max_dbs: u32,
}

impl LmdbConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_map_size(mut self, map_size: usize) -> Self {
        self.map_size = map_size;
        self
    }

    pub fn directory(&self) -> PathBuf {
        PathBuf::from(format!("{}.lmdb", self.name))
    }
}

impl Default for LmdbConfig {
    fn default() -> Self {
        Self {
            name: "biodata".to_string(),
            // 16 MiB is plenty for a list of previews
            map_size: 16 * 1024 * 1024,
            max_dbs: 4,
        }
    }
}

pub struct AppDbState {
    env: Option<Environment>,
    db: Database,
    config: LmdbConfig,
}

impl AppDbState {
    /// Opens (creating if needed) the store `<name>.lmdb` with default limits.
    pub fn init(name: String) -> Result<Self, AppResponse> {
        Self::init_with(LmdbConfig::new(name))
    }

    pub fn init_with(config: LmdbConfig) -> Result<Self, AppResponse> {
        let (env, db) = Self::open(&config)?;
        Ok(Self {
            env: Some(env),
            db,
            config,
        })
    }

    fn open(config: &LmdbConfig) -> Result<(Environment, Database), AppResponse> {
        let dir = config.directory();
        std::fs::create_dir_all(&dir)?;

        info!("Opening LMDB environment at {}", dir.display());

        let env = Environment::new()
            .set_max_dbs(config.max_dbs)
            .set_map_size(config.map_size)
            .open(&dir)?;
        let db = env.create_db(Some(DB_NAME), DatabaseFlags::empty())?;

        Ok((env, db))
    }

    pub fn config(&self) -> &LmdbConfig {
        &self.config
    }

    pub fn is_open(&self) -> bool {
        self.env.is_some()
    }

    fn env(&self) -> Result<&Environment, AppResponse> {
        self.env
            .as_ref()
            .ok_or_else(|| AppResponse::DatabaseError("Database is closed".to_string()))
    }

    /// Flushes and releases the environment. Later calls answer `DatabaseError`
    /// until [`AppDbState::reset_database`] reopens it.
    pub fn close_database(&mut self) -> Result<(), AppResponse> {
        if let Some(env) = self.env.take() {
            env.sync(true)?;
            info!("LMDB environment {} closed", self.config.directory().display());
        }
        Ok(())
    }

    /// Closes the environment, deletes its directory, and opens a fresh one
    /// under `name`.
    pub fn reset_database(&mut self, name: &str) -> Result<(), AppResponse> {
        self.close_database()?;

        let old_dir = self.config.directory();
        remove_dir_if_present(&old_dir)?;

        let mut config = self.config.clone();
        config.name = name.to_string();
        remove_dir_if_present(&config.directory())?;

        let (env, db) = Self::open(&config)?;
        self.env = Some(env);
        self.db = db;
        self.config = config;
        Ok(())
    }
}

fn remove_dir_if_present(dir: &Path) -> Result<(), AppResponse> {
    if dir.exists() {
        warn!("Removing LMDB directory {}", dir.display());
        std::fs::remove_dir_all(dir)?;
    }
    Ok(())
}

impl KeyValueStore for AppDbState {
    fn get_item(&self, key: &str) -> Result<Option<String>, AppResponse> {
        let txn = self.env()?.begin_ro_txn()?;
        let value = match txn.get(self.db, &key) {
            Ok(bytes) => Some(String::from_utf8(bytes.to_vec()).map_err(|e| {
                AppResponse::SerializationError(format!("Stored value is not UTF-8: {e}"))
            })?),
            Err(lmdb::Error::NotFound) => None,
            Err(e) => return Err(e.into()),
        };
        txn.abort();
        Ok(value)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), AppResponse> {
        let mut txn = self.env()?.begin_rw_txn()?;
        txn.put(self.db, &key, &value, WriteFlags::empty())?;
        txn.commit()?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<bool, AppResponse> {
        let mut txn = self.env()?.begin_rw_txn()?;
        match txn.del(self.db, &key, None) {
            Ok(()) => {
                txn.commit()?;
                Ok(true)
            }
            Err(lmdb::Error::NotFound) => {
                txn.abort();
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir, name: &str) -> LmdbConfig {
        LmdbConfig::new(dir.path().join(name).to_string_lossy().into_owned())
    }

    #[test]
    fn init_creates_lmdb_directory() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir, "fresh");
        let state = AppDbState::init_with(config.clone()).unwrap();

        assert!(state.is_open());
        assert!(config.directory().is_dir());
    }

    #[test]
    fn values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir, "reopen");

        {
            let mut state = AppDbState::init_with(config.clone()).unwrap();
            state.set_item("biodata_entries", "[]").unwrap();
            state.close_database().unwrap();
        }

        let state = AppDbState::init_with(config).unwrap();
        assert_eq!(
            state.get_item("biodata_entries").unwrap().as_deref(),
            Some("[]")
        );
    }

    #[test]
    fn remove_reports_whether_key_existed() {
        let dir = TempDir::new().unwrap();
        let state = AppDbState::init_with(config_in(&dir, "remove")).unwrap();

        assert!(!state.remove_item("missing").unwrap());
        state.set_item("k", "v").unwrap();
        assert!(state.remove_item("k").unwrap());
        assert_eq!(state.get_item("k").unwrap(), None);
    }

    #[test]
    fn closed_database_rejects_calls() {
        let dir = TempDir::new().unwrap();
        let mut state = AppDbState::init_with(config_in(&dir, "closed")).unwrap();
        state.close_database().unwrap();
        // closing twice is fine
        state.close_database().unwrap();

        assert!(!state.is_open());
        assert!(matches!(
            state.get_item("k"),
            Err(AppResponse::DatabaseError(_))
        ));
        assert!(matches!(
            state.set_item("k", "v"),
            Err(AppResponse::DatabaseError(_))
        ));
    }

    #[test]
    fn reset_wipes_data_and_reopens() {
        let dir = TempDir::new().unwrap();
        let mut state = AppDbState::init_with(config_in(&dir, "before_reset")).unwrap();
        state.set_item("k", "v").unwrap();

        let new_name = dir.path().join("after_reset").to_string_lossy().into_owned();
        state.reset_database(&new_name).unwrap();

        assert!(state.is_open());
        assert_eq!(state.config().name, new_name);
        assert_eq!(state.get_item("k").unwrap(), None);
        assert!(!dir.path().join("before_reset.lmdb").exists());
    }
}
