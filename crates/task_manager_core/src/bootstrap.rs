//! crates/task_manager_core/src/bootstrap.rs
//!
//! Startup hydration: reads the persisted slices back into a fresh `AppStore`.
//!
//! Each slice is restored on its own. A read error or corrupt value in one of
//! them is logged and leaves only that slice at its default.

use crate::app_store::AppStore;
use crate::domain::{Task, User};
use crate::ports::{PersistenceGateway, PortResult};
use crate::schema::{self, StorageKey};
use crate::session_store::SessionStore;
use crate::task_store::TaskStore;
use crate::theme_store::ThemeRestorePolicy;
use crate::write_through::WriteThrough;
use std::sync::Arc;
use tracing::{error, info};

/// Builds an `AppStore` over `gateway` and restores session, tasks and theme,
/// in that order.
pub async fn hydrate(gateway: Arc<dyn PersistenceGateway>, policy: ThemeRestorePolicy) -> AppStore {
    let mut store = AppStore::new(WriteThrough::spawn(gateway.clone()));

    let restored_session = restore_session(gateway.as_ref(), &mut store.session).await;
    let restored_tasks = restore_tasks(gateway.as_ref(), &mut store.tasks).await;
    let theme = store.theme.initialize_theme(gateway.as_ref(), policy).await;

    info!(
        authenticated = restored_session,
        tasks = restored_tasks,
        dark_mode = theme.is_dark_mode,
        system_theme = theme.is_system_theme,
        "State restored from storage"
    );
    store
}

/// Restores the session when both `token` and a valid `user` are stored.
/// Returns whether the session ended up authenticated.
pub async fn restore_session(gateway: &dyn PersistenceGateway, sessions: &mut SessionStore) -> bool {
    match read_session(gateway).await {
        Ok(Some((user, token))) => match sessions.restore_auth(user, token) {
            Ok(_) => true,
            Err(e) => {
                error!(error = %e, "Ignoring stored session");
                false
            }
        },
        Ok(None) => false,
        Err(e) => {
            error!(error = %e, "Failed to restore session");
            false
        }
    }
}

async fn read_session(gateway: &dyn PersistenceGateway) -> PortResult<Option<(User, String)>> {
    let token = gateway.get(StorageKey::Token.as_str()).await?;
    let user = gateway.get(StorageKey::User.as_str()).await?;
    match (token, user) {
        (Some(token), Some(raw_user)) => {
            let user: User = schema::decode(StorageKey::User, &raw_user)?;
            Ok(Some((user, token)))
        }
        _ => Ok(None),
    }
}

/// Loads the stored task list into `tasks` without writing it back.
/// Returns the number of tasks restored.
pub async fn restore_tasks(gateway: &dyn PersistenceGateway, tasks: &mut TaskStore) -> usize {
    match read_tasks(gateway).await {
        Ok(Some(stored)) => tasks.set_tasks(stored).len(),
        Ok(None) => 0,
        Err(e) => {
            error!(error = %e, "Failed to load tasks");
            0
        }
    }
}

async fn read_tasks(gateway: &dyn PersistenceGateway) -> PortResult<Option<Vec<Task>>> {
    match gateway.get(StorageKey::Tasks.as_str()).await? {
        Some(raw) if !raw.is_empty() => Ok(Some(schema::decode(StorageKey::Tasks, &raw)?)),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ThemePreference;
    use crate::memory::MemoryStorage;

    const USER_JSON: &str = r#"{"id":"1","name":"ada","email":"ada@example.com"}"#;
    const TASKS_JSON: &str = r#"[{"id":"1","title":"Ship it","dueDate":"2026-10-20T09:00:00.000Z","completed":false}]"#;

    #[tokio::test]
    async fn hydrates_every_slice() {
        let storage = Arc::new(MemoryStorage::with_entries([
            ("token", "mock-jwt-token"),
            ("user", USER_JSON),
            ("tasks", TASKS_JSON),
            ("theme", "true"),
            ("systemTheme", "false"),
        ]));

        let store = hydrate(storage.clone(), ThemeRestorePolicy::RawString).await;

        let session = store.session.state();
        assert!(session.is_authenticated);
        assert_eq!(session.user.as_ref().map(|u| u.name.as_str()), Some("ada"));
        assert_eq!(session.token.as_deref(), Some("mock-jwt-token"));
        assert_eq!(store.tasks.tasks().len(), 1);
        assert_eq!(
            store.theme.state(),
            ThemePreference {
                is_dark_mode: true,
                is_system_theme: false
            }
        );
    }

    #[tokio::test]
    async fn empty_storage_yields_defaults() {
        let store = hydrate(Arc::new(MemoryStorage::new()), ThemeRestorePolicy::RawString).await;

        assert!(!store.session.state().is_authenticated);
        assert!(store.tasks.tasks().is_empty());
        assert_eq!(store.theme.state(), ThemePreference::default());
    }

    #[tokio::test]
    async fn corrupt_tasks_do_not_block_session_restore() {
        let storage = Arc::new(MemoryStorage::with_entries([
            ("token", "mock-jwt-token"),
            ("user", USER_JSON),
            ("tasks", "[{broken"),
        ]));

        let store = hydrate(storage, ThemeRestorePolicy::RawString).await;

        assert!(store.session.state().is_authenticated);
        assert!(store.tasks.tasks().is_empty());
    }

    #[tokio::test]
    async fn corrupt_user_leaves_session_signed_out_but_restores_tasks() {
        let storage = Arc::new(MemoryStorage::with_entries([
            ("token", "mock-jwt-token"),
            ("user", "not json"),
            ("tasks", TASKS_JSON),
        ]));

        let store = hydrate(storage, ThemeRestorePolicy::RawString).await;

        assert!(!store.session.state().is_authenticated);
        assert_eq!(store.tasks.tasks().len(), 1);
    }

    #[tokio::test]
    async fn token_without_user_is_not_a_session() {
        let storage = Arc::new(MemoryStorage::with_entries([("token", "mock-jwt-token")]));
        let writer = WriteThrough::spawn(storage.clone());
        let mut sessions = SessionStore::new(writer);

        assert!(!restore_session(storage.as_ref(), &mut sessions).await);
    }

    #[tokio::test]
    async fn hydration_does_not_rewrite_session_or_tasks() {
        let storage = Arc::new(MemoryStorage::with_entries([
            ("token", "mock-jwt-token"),
            ("user", USER_JSON),
            ("tasks", TASKS_JSON),
        ]));

        let store = hydrate(storage.clone(), ThemeRestorePolicy::RawString).await;
        store.flush().await;

        assert_eq!(storage.write_count(), 0);
    }
}
