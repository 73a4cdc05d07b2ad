use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde::Serialize;
use web_sys::{window, Storage};

use crate::error::StorageError;

/// String key/value storage that survives page reloads.
pub trait KeyValueStorage {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

fn get_local_storage() -> Option<Storage> {
    window()?.local_storage().ok()?
}

/// `window.localStorage`. Resolved on every call so a storage disabled by the
/// browser mid-session surfaces as `StorageError::Unavailable`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalStorage;

impl KeyValueStorage for LocalStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        get_local_storage()?.get_item(key).ok()?
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let storage = get_local_storage().ok_or(StorageError::Unavailable)?;
        storage
            .set_item(key, value)
            .map_err(|_| StorageError::WriteFailed(key.to_string()))
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let storage = get_local_storage().ok_or(StorageError::Unavailable)?;
        storage
            .remove_item(key)
            .map_err(|_| StorageError::RemoveFailed(key.to_string()))
    }
}

/// In-memory storage. Clones share the same map.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    items: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items<'a>(items: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let storage = Self::new();
        storage.items.borrow_mut().extend(
            items
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string())),
        );
        storage
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.items.borrow().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

pub fn save_to_storage<T: Serialize>(
    storage: &dyn KeyValueStorage,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let json = serde_json::to_string(value).map_err(|_| StorageError::WriteFailed(key.to_string()))?;
    storage.set_item(key, &json)
}

/// Removes every key, continuing past failures; returns the first failure.
pub fn remove_all(storage: &dyn KeyValueStorage, keys: &[&str]) -> Result<(), StorageError> {
    let mut first_error = None;
    for key in keys {
        if let Err(e) = storage.remove_item(key) {
            first_error.get_or_insert(e);
        }
    }
    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_storage_clones_share_items() {
        let storage = MemoryStorage::new();
        let other = storage.clone();
        storage.set_item("token", "abc").unwrap();
        assert_eq!(other.get_item("token").as_deref(), Some("abc"));
        other.remove_item("token").unwrap();
        assert!(storage.is_empty());
    }

    #[test]
    fn save_to_storage_writes_json() {
        let storage = MemoryStorage::new();
        save_to_storage(&storage, "user", &serde_json::json!({ "fullName": "X" })).unwrap();
        assert_eq!(storage.get_item("user").as_deref(), Some(r#"{"fullName":"X"}"#));
    }

    #[test]
    fn remove_all_clears_each_key() {
        let storage = MemoryStorage::with_items([("token", "t"), ("user", "{}"), ("theme", "dark")]);
        remove_all(&storage, &["token", "user"]).unwrap();
        assert!(!storage.contains_key("token"));
        assert!(!storage.contains_key("user"));
        assert_eq!(storage.len(), 1);
    }
}
