//! crates/task_manager_core/src/schema.rs
//!
//! The storage wire format: which keys exist and how each value is encoded.
//!
//! | key           | value                                             |
//! |---------------|---------------------------------------------------|
//! | `token`       | raw token string, not JSON-quoted                 |
//! | `user`        | JSON object `{"id","name","email"}`               |
//! | `tasks`       | JSON array of `Task` (camelCase fields)           |
//! | `theme`       | JSON bool, i.e. the string `true` or `false`      |
//! | `systemTheme` | JSON bool, i.e. the string `true` or `false`      |
//!
//! These layouts are shared with data written by earlier versions of the app
//! and must not change.

use crate::ports::{PortError, PortResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;

/// The fixed set of keys the stores read and write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    Token,
    User,
    Tasks,
    Theme,
    SystemTheme,
}

impl StorageKey {
    pub const ALL: [StorageKey; 5] = [
        StorageKey::Token,
        StorageKey::User,
        StorageKey::Tasks,
        StorageKey::Theme,
        StorageKey::SystemTheme,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::Token => "token",
            StorageKey::User => "user",
            StorageKey::Tasks => "tasks",
            StorageKey::Theme => "theme",
            StorageKey::SystemTheme => "systemTheme",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serializes `value` as the JSON stored under `key`.
pub fn encode<T: Serialize + ?Sized>(key: StorageKey, value: &T) -> PortResult<String> {
    serde_json::to_string(value).map_err(|e| PortError::Serialization {
        key: key.to_string(),
        message: e.to_string(),
    })
}

/// Parses the raw JSON stored under `key`.
pub fn decode<T: DeserializeOwned>(key: StorageKey, raw: &str) -> PortResult<T> {
    serde_json::from_str(raw).map_err(|e| PortError::Serialization {
        key: key.to_string(),
        message: e.to_string(),
    })
}

/// Encodes a theme flag. Infallible, unlike `encode`.
pub fn encode_flag(flag: bool) -> String {
    serde_json::Value::Bool(flag).to_string()
}
