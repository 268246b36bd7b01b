//! The storage capability the biodata service is built on.
//!
//! Anything that can get, set and remove a string under a string key can back
//! the service. [`AppDbState`](crate::local_db_state::AppDbState) is the LMDB
//! binding used on device; [`MemoryStore`] keeps everything in process.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::app_response::AppResponse;

pub trait KeyValueStore {
    /// Returns the value stored under `key`, or `None` when the key is absent.
    fn get_item(&self, key: &str) -> Result<Option<String>, AppResponse>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> Result<(), AppResponse>;

    /// Removes `key`. Returns `false` when nothing was stored under it.
    fn remove_item(&self, key: &str) -> Result<bool, AppResponse>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get_item(&self, key: &str) -> Result<Option<String>, AppResponse> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), AppResponse> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<bool, AppResponse> {
        (**self).remove_item(key)
    }
}

/// In-process store. Nothing survives the value being dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> AppResponse {
        AppResponse::DatabaseError("Memory store lock poisoned".to_string())
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, AppResponse> {
        let items = self.items.read().map_err(|_| Self::poisoned())?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), AppResponse> {
        let mut items = self.items.write().map_err(|_| Self::poisoned())?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<bool, AppResponse> {
        let mut items = self.items.write().map_err(|_| Self::poisoned())?;
        Ok(items.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_get_set_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.get_item("k").unwrap(), None);

        store.set_item("k", "v1").unwrap();
        store.set_item("k", "v2").unwrap();
        assert_eq!(store.get_item("k").unwrap().as_deref(), Some("v2"));

        assert!(store.remove_item("k").unwrap());
        assert!(!store.remove_item("k").unwrap());
        assert_eq!(store.get_item("k").unwrap(), None);
    }

    #[test]
    fn borrowed_store_is_a_store() {
        fn write_through<S: KeyValueStore>(store: S) {
            store.set_item("shared", "yes").unwrap();
        }

        let store = MemoryStore::new();
        write_through(&store);
        assert_eq!(store.get_item("shared").unwrap().as_deref(), Some("yes"));
    }
}
