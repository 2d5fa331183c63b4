//! Browser LocalStorage access
//!
//! Settings and the leaderboard both live here on the web. Off the web every
//! read misses and every write succeeds without doing anything.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::PersistError;

/// Read and decode `key`. Missing keys, missing storage and undecodable
/// values all come back as `None`.
pub fn load<T: DeserializeOwned>(key: &str) -> Option<T> {
    let raw = read(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Discarding unreadable {key}: {e}");
            None
        }
    }
}

/// Encode and write `value` under `key`
pub fn store<T: Serialize>(key: &str, value: &T) -> Result<(), PersistError> {
    let json = serde_json::to_string(value)?;
    write(key, &json)
}

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

#[cfg(target_arch = "wasm32")]
fn read(key: &str) -> Option<String> {
    local_storage()?.get_item(key).ok().flatten()
}

#[cfg(target_arch = "wasm32")]
fn write(key: &str, json: &str) -> Result<(), PersistError> {
    let storage =
        local_storage().ok_or_else(|| PersistError::Storage("LocalStorage unavailable".into()))?;
    storage
        .set_item(key, json)
        .map_err(|e| PersistError::Storage(format!("{:?}", e)))
}

#[cfg(not(target_arch = "wasm32"))]
fn read(_key: &str) -> Option<String> {
    None
}

#[cfg(not(target_arch = "wasm32"))]
fn write(_key: &str, _json: &str) -> Result<(), PersistError> {
    Ok(())
}
