//! crates/task_manager_core/src/theme_store.rs
//!
//! Dark-mode and follow-system flags. Each flag has its own storage key and
//! is written independently, except `toggle_theme` which writes both.

use crate::domain::ThemePreference;
use crate::ports::{PersistenceGateway, PortResult};
use crate::schema::{self, StorageKey};
use crate::write_through::WriteThrough;
use std::str::FromStr;
use tracing::{debug, error};

/// How `initialize_theme` decides whether the stored dark-mode flag applies.
///
/// The stored flag is only honoured when the user had turned off system
/// following. `RawString` checks this by comparing the stored `systemTheme`
/// text against the literal `false`, which is what previously shipped builds
/// do. `ParsedBool` checks the decoded value instead, so `" false"` or other
/// JSON spellings of false also count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeRestorePolicy {
    #[default]
    RawString,
    ParsedBool,
}

impl FromStr for ThemeRestorePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "raw-string" => Ok(Self::RawString),
            "parsed-bool" => Ok(Self::ParsedBool),
            other => Err(format!("'{}' is not one of raw-string, parsed-bool", other)),
        }
    }
}

pub struct ThemePreferenceStore {
    state: ThemePreference,
    writer: WriteThrough,
}

impl ThemePreferenceStore {
    pub fn new(writer: WriteThrough) -> Self {
        Self {
            state: ThemePreference::default(),
            writer,
        }
    }

    pub fn state(&self) -> ThemePreference {
        self.state
    }

    /// Flips dark mode. An explicit choice always stops following the system.
    pub fn toggle_theme(&mut self) -> ThemePreference {
        self.state.is_dark_mode = !self.state.is_dark_mode;
        self.state.is_system_theme = false;
        self.writer.multi_set(vec![
            (StorageKey::Theme, schema::encode_flag(self.state.is_dark_mode)),
            (StorageKey::SystemTheme, schema::encode_flag(false)),
        ]);
        self.state
    }

    pub fn set_theme(&mut self, is_dark_mode: bool) -> ThemePreference {
        self.state.is_dark_mode = is_dark_mode;
        self.writer
            .set(StorageKey::Theme, schema::encode_flag(is_dark_mode));
        self.state
    }

    pub fn set_system_theme(&mut self, is_system_theme: bool) -> ThemePreference {
        self.state.is_system_theme = is_system_theme;
        self.writer
            .set(StorageKey::SystemTheme, schema::encode_flag(is_system_theme));
        self.state
    }

    pub fn toggle_system_theme(&mut self) -> ThemePreference {
        self.set_system_theme(!self.state.is_system_theme)
    }

    /// Restores both flags from storage in one batched read.
    ///
    /// Restored values go through `set_system_theme` / `set_theme`, so they are
    /// written back. Read or parse errors are logged and whatever was applied
    /// before the error is kept.
    pub async fn initialize_theme(
        &mut self,
        gateway: &dyn PersistenceGateway,
        policy: ThemeRestorePolicy,
    ) -> ThemePreference {
        if let Err(e) = self.restore(gateway, policy).await {
            error!(error = %e, "Failed to load theme preferences");
        }
        self.state
    }

    async fn restore(&mut self, gateway: &dyn PersistenceGateway, policy: ThemeRestorePolicy) -> PortResult<()> {
        let entries = gateway
            .multi_get(&[StorageKey::Theme.as_str(), StorageKey::SystemTheme.as_str()])
            .await?;
        let lookup = |key: StorageKey| {
            entries
                .iter()
                .find(|(k, _)| k == key.as_str())
                .and_then(|(_, v)| v.clone())
        };
        let theme_raw = lookup(StorageKey::Theme);
        let system_raw = lookup(StorageKey::SystemTheme);

        let system_flag = match system_raw.as_deref() {
            Some(raw) => {
                let flag: bool = schema::decode(StorageKey::SystemTheme, raw)?;
                self.set_system_theme(flag);
                Some(flag)
            }
            None => None,
        };

        let explicit_choice = match policy {
            ThemeRestorePolicy::RawString => system_raw.as_deref() == Some("false"),
            ThemeRestorePolicy::ParsedBool => system_flag == Some(false),
        };
        if let Some(raw) = theme_raw {
            if explicit_choice {
                let flag: bool = schema::decode(StorageKey::Theme, &raw)?;
                self.set_theme(flag);
            } else {
                debug!("Ignoring stored theme while following system theme");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStorage;
    use crate::ports::PortError;
    use async_trait::async_trait;
    use std::sync::Arc;

    fn store_over(storage: Arc<MemoryStorage>) -> (ThemePreferenceStore, WriteThrough) {
        let writer = WriteThrough::spawn(storage);
        (ThemePreferenceStore::new(writer.clone()), writer)
    }

    #[tokio::test]
    async fn toggle_from_default_turns_dark_and_stops_following_system() {
        let storage = Arc::new(MemoryStorage::new());
        let (mut theme, writer) = store_over(storage.clone());

        let state = theme.toggle_theme();
        writer.flush().await;

        assert_eq!(
            state,
            ThemePreference {
                is_dark_mode: true,
                is_system_theme: false
            }
        );
        let stored = storage.snapshot().await;
        assert_eq!(stored.get("theme").map(String::as_str), Some("true"));
        assert_eq!(stored.get("systemTheme").map(String::as_str), Some("false"));
    }

    #[tokio::test]
    async fn toggling_twice_restores_dark_mode_but_not_system_following() {
        let (mut theme, _writer) = store_over(Arc::new(MemoryStorage::new()));

        let first = theme.toggle_theme();
        let second = theme.toggle_theme();

        assert!(!first.is_system_theme);
        assert!(!second.is_system_theme);
        assert!(!second.is_dark_mode);
    }

    #[tokio::test]
    async fn set_theme_only_writes_its_own_key() {
        let storage = Arc::new(MemoryStorage::new());
        let (mut theme, writer) = store_over(storage.clone());

        theme.set_theme(true);
        writer.flush().await;

        let stored = storage.snapshot().await;
        assert_eq!(stored.get("theme").map(String::as_str), Some("true"));
        assert!(!stored.contains_key("systemTheme"));
    }

    #[tokio::test]
    async fn toggle_system_theme_flips_and_persists() {
        let storage = Arc::new(MemoryStorage::new());
        let (mut theme, writer) = store_over(storage.clone());

        assert!(!theme.toggle_system_theme().is_system_theme);
        writer.flush().await;

        assert_eq!(
            storage.snapshot().await.get("systemTheme").map(String::as_str),
            Some("false")
        );
    }

    #[tokio::test]
    async fn initialize_applies_stored_dark_mode_when_not_following_system() {
        let storage = Arc::new(MemoryStorage::with_entries([("theme", "true"), ("systemTheme", "false")]));
        let (mut theme, _writer) = store_over(storage.clone());

        let state = theme
            .initialize_theme(storage.as_ref(), ThemeRestorePolicy::RawString)
            .await;

        assert_eq!(
            state,
            ThemePreference {
                is_dark_mode: true,
                is_system_theme: false
            }
        );
    }

    #[tokio::test]
    async fn initialize_ignores_stored_dark_mode_while_following_system() {
        let storage = Arc::new(MemoryStorage::with_entries([("theme", "true"), ("systemTheme", "true")]));
        let (mut theme, _writer) = store_over(storage.clone());

        let state = theme
            .initialize_theme(storage.as_ref(), ThemeRestorePolicy::RawString)
            .await;

        assert_eq!(state, ThemePreference::default());
    }

    #[tokio::test]
    async fn raw_string_policy_requires_the_exact_literal() {
        let entries = [("theme", "true"), ("systemTheme", " false")];

        let storage = Arc::new(MemoryStorage::with_entries(entries));
        let (mut raw, _w1) = store_over(storage.clone());
        let raw_state = raw
            .initialize_theme(storage.as_ref(), ThemeRestorePolicy::RawString)
            .await;
        assert!(!raw_state.is_dark_mode);
        assert!(!raw_state.is_system_theme);

        let storage = Arc::new(MemoryStorage::with_entries(entries));
        let (mut parsed, _w2) = store_over(storage.clone());
        let parsed_state = parsed
            .initialize_theme(storage.as_ref(), ThemeRestorePolicy::ParsedBool)
            .await;
        assert!(parsed_state.is_dark_mode);
    }

    #[tokio::test]
    async fn corrupt_system_flag_keeps_defaults() {
        let storage = Arc::new(MemoryStorage::with_entries([("theme", "true"), ("systemTheme", "maybe")]));
        let (mut theme, _writer) = store_over(storage.clone());

        let state = theme
            .initialize_theme(storage.as_ref(), ThemeRestorePolicy::RawString)
            .await;

        assert_eq!(state, ThemePreference::default());
    }

    struct UnreadableStorage;

    #[async_trait]
    impl PersistenceGateway for UnreadableStorage {
        async fn get(&self, _key: &str) -> PortResult<Option<String>> {
            Err(PortError::Unexpected("storage locked".to_string()))
        }
        async fn set(&self, _key: &str, _value: &str) -> PortResult<()> {
            Ok(())
        }
        async fn remove(&self, _key: &str) -> PortResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn read_failure_falls_back_to_defaults() {
        let (mut theme, _writer) = store_over(Arc::new(MemoryStorage::new()));

        let state = theme
            .initialize_theme(&UnreadableStorage, ThemeRestorePolicy::RawString)
            .await;

        assert_eq!(state, ThemePreference::default());
    }

    #[test]
    fn policy_parses_from_config_values() {
        assert_eq!("raw-string".parse::<ThemeRestorePolicy>(), Ok(ThemeRestorePolicy::RawString));
        assert_eq!("Parsed-Bool".parse::<ThemeRestorePolicy>(), Ok(ThemeRestorePolicy::ParsedBool));
        assert!("strict".parse::<ThemeRestorePolicy>().is_err());
    }
}
