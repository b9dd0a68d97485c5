use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::StoreResult;

/// Keys of the persisted "local storage" layout.
pub mod keys {
    pub const WALLET: &str = "wallet";
    pub const BOOKINGS: &str = "bookings";
    pub const TRANSACTIONS: &str = "transactions";
}

/// String-to-string storage with browser local-storage semantics: no
/// transactions, last write wins.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    fn remove(&self, key: &str) -> StoreResult<()>;
}

/// Read a JSON array. A missing or unparseable value reads as empty, and
/// elements that do not deserialize as `T` are skipped.
pub fn read_json_list<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> StoreResult<Vec<T>> {
    let Some(raw) = store.get(key)? else {
        return Ok(Vec::new());
    };

    let entries = match serde_json::from_str::<Vec<Value>>(&raw) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Ignoring unreadable value under '{}': {}", key, e);
            return Ok(Vec::new());
        }
    };

    let mut items = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value(entry) {
            Ok(item) => items.push(item),
            Err(e) => tracing::warn!("Skipping unreadable entry {} under '{}': {}", index, key, e),
        }
    }
    Ok(items)
}

/// Append one element to the JSON array under `key`.
///
/// Existing elements are written back untouched, including ones that
/// [`read_json_list`] skips. A value that is not a JSON array at all is
/// moved to `<key>.unreadable` before the list starts over.
pub fn append_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    item: &T,
) -> StoreResult<()> {
    let mut entries = match store.get(key)? {
        None => Vec::new(),
        Some(raw) => match serde_json::from_str::<Vec<Value>>(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                let backup = format!("{}.unreadable", key);
                tracing::warn!("Value under '{}' is not a list, moving it to '{}': {}", key, backup, e);
                store.set(&backup, &raw)?;
                Vec::new()
            }
        },
    };

    entries.push(serde_json::to_value(item)?);
    write_json(store, key, &entries)
}

pub fn write_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> StoreResult<()> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}
