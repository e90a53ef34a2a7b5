//! Typed key-value persistence.
//!
//! Records are stored as JSON text under string keys, the same layout the web
//! intake app keeps in browser local storage. Reads degrade to a caller-supplied
//! fallback; writes report medium failures.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Key holding the JSON array of cases.
pub const CASES_KEY: &str = "cases";
/// Key holding the JSON array of partners.
pub const PARTNERS_KEY: &str = "partners";
/// Key holding the JSON string of the selected partner, absent when none.
pub const CURRENT_PARTNER_KEY: &str = "currentPartnerId";

/// Storage medium errors.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// A string-keyed storage medium.
pub trait KeyValueStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>>;

    fn set_item(&mut self, key: &str, value: &str) -> StorageResult<()>;

    fn remove_item(&mut self, key: &str) -> StorageResult<()>;

    /// Remove every key.
    fn clear(&mut self) -> StorageResult<()>;
}

/// Outcome of a typed read.
#[derive(Debug, Clone, PartialEq)]
pub enum Loaded<T> {
    /// Key present and decoded.
    Value(T),
    /// Key missing or empty.
    Absent,
    /// Key present but not JSON of the requested shape.
    Undecodable(String),
    /// The medium failed to read.
    Unreadable(String),
}

impl<T> Loaded<T> {
    pub fn unwrap_or(self, fallback: T) -> T {
        match self {
            Loaded::Value(value) => value,
            _ => fallback,
        }
    }

    pub fn is_value(&self) -> bool {
        matches!(self, Loaded::Value(_))
    }
}

/// Read and decode the value at `key`, reporting why nothing usable was found.
pub fn try_load<T, S>(storage: &S, key: &str) -> Loaded<T>
where
    T: DeserializeOwned,
    S: KeyValueStorage + ?Sized,
{
    let raw = match storage.get_item(key) {
        Ok(Some(raw)) if !raw.is_empty() => raw,
        Ok(_) => return Loaded::Absent,
        Err(e) => return Loaded::Unreadable(e.to_string()),
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Loaded::Value(value),
        Err(e) => Loaded::Undecodable(e.to_string()),
    }
}

/// Read `key`, returning `fallback` when it is missing, unreadable or undecodable.
pub fn load<T, S>(storage: &S, key: &str, fallback: T) -> T
where
    T: DeserializeOwned,
    S: KeyValueStorage + ?Sized,
{
    match try_load(storage, key) {
        Loaded::Value(value) => value,
        Loaded::Absent => fallback,
        Loaded::Undecodable(reason) => {
            tracing::warn!(key, %reason, "Stored value is not decodable; using fallback");
            fallback
        }
        Loaded::Unreadable(reason) => {
            tracing::warn!(key, %reason, "Storage read failed; using fallback");
            fallback
        }
    }
}

/// Serialize `value` as JSON and overwrite `key`.
pub fn save<T, S>(storage: &mut S, key: &str, value: &T) -> StorageResult<()>
where
    T: Serialize + ?Sized,
    S: KeyValueStorage + ?Sized,
{
    let json = serde_json::to_string(value)?;
    storage.set_item(key, &json)
}

/// In-process storage, ordered by key.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: BTreeMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> StorageResult<()> {
        self.items.remove(key);
        Ok(())
    }

    fn clear(&mut self) -> StorageResult<()> {
        self.items.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CaseStatus, Partner};
    use proptest::prelude::*;

    /// Medium whose reads and writes always fail.
    struct BrokenStorage;

    impl KeyValueStorage for BrokenStorage {
        fn get_item(&self, _key: &str) -> StorageResult<Option<String>> {
            Err(StorageError::Unavailable("disk detached".into()))
        }

        fn set_item(&mut self, _key: &str, _value: &str) -> StorageResult<()> {
            Err(StorageError::Unavailable("quota exceeded".into()))
        }

        fn remove_item(&mut self, _key: &str) -> StorageResult<()> {
            Err(StorageError::Unavailable("disk detached".into()))
        }

        fn clear(&mut self) -> StorageResult<()> {
            Err(StorageError::Unavailable("disk detached".into()))
        }
    }

    #[test]
    fn test_missing_key_returns_fallback() {
        let storage = MemoryStorage::new();
        let loaded: Vec<Partner> = load(&storage, PARTNERS_KEY, Vec::new());
        assert!(loaded.is_empty());
        assert_eq!(try_load::<Vec<Partner>, _>(&storage, PARTNERS_KEY), Loaded::Absent);
    }

    #[test]
    fn test_empty_value_is_absent() {
        let mut storage = MemoryStorage::new();
        storage.set_item(CASES_KEY, "").unwrap();
        assert_eq!(try_load::<Vec<String>, _>(&storage, CASES_KEY), Loaded::Absent);
    }

    #[test]
    fn test_invalid_json_returns_fallback() {
        let mut storage = MemoryStorage::new();
        storage.set_item(CASES_KEY, "{not json").unwrap();

        let fallback = vec!["sentinel".to_string()];
        assert_eq!(load(&storage, CASES_KEY, fallback.clone()), fallback);
        assert!(matches!(
            try_load::<Vec<String>, _>(&storage, CASES_KEY),
            Loaded::Undecodable(_)
        ));
    }

    #[test]
    fn test_wrong_shape_returns_fallback() {
        let mut storage = MemoryStorage::new();
        storage.set_item(PARTNERS_KEY, r#"{"id":"partner-1"}"#).unwrap();

        let loaded: Vec<Partner> = load(&storage, PARTNERS_KEY, Vec::new());
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let mut storage = MemoryStorage::new();
        let partner = Partner::new("partner-1".into(), "Auto Experts LLC".into(), "auto@example.com".into());
        save(&mut storage, PARTNERS_KEY, &vec![partner.clone()]).unwrap();

        let loaded: Vec<Partner> = load(&storage, PARTNERS_KEY, Vec::new());
        assert_eq!(loaded, vec![partner]);
    }

    #[test]
    fn test_save_overwrites() {
        let mut storage = MemoryStorage::new();
        save(&mut storage, CURRENT_PARTNER_KEY, "partner-1").unwrap();
        save(&mut storage, CURRENT_PARTNER_KEY, "partner-2").unwrap();

        assert_eq!(storage.get_item(CURRENT_PARTNER_KEY).unwrap().as_deref(), Some("\"partner-2\""));
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn test_unreadable_medium_returns_fallback() {
        let storage = BrokenStorage;
        let status = load(&storage, "status", CaseStatus::New);
        assert_eq!(status, CaseStatus::New);
        assert!(matches!(
            try_load::<CaseStatus, _>(&storage, "status"),
            Loaded::Unreadable(_)
        ));
    }

    #[test]
    fn test_write_failure_is_reported() {
        let mut storage = BrokenStorage;
        let result = save(&mut storage, CASES_KEY, &Vec::<String>::new());
        assert!(matches!(result, Err(StorageError::Unavailable(_))));
    }

    #[test]
    fn test_clear_removes_everything() {
        let mut storage = MemoryStorage::new();
        storage.set_item("a", "1").unwrap();
        storage.set_item("b", "2").unwrap();
        storage.clear().unwrap();
        assert!(storage.is_empty());
    }

    proptest! {
        #[test]
        fn prop_round_trip(values in proptest::collection::vec(any::<(String, i64, bool)>(), 0..8)) {
            let mut storage = MemoryStorage::new();
            save(&mut storage, "values", &values).unwrap();
            let loaded: Vec<(String, i64, bool)> = load(&storage, "values", Vec::new());
            prop_assert_eq!(loaded, values);
        }
    }
}
