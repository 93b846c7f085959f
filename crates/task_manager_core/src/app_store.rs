//! crates/task_manager_core/src/app_store.rs
//!
//! The three state slices bundled into one service object. The shell owns an
//! `AppStore` and passes it to whatever needs to read or mutate state.

use crate::session_store::SessionStore;
use crate::task_store::TaskStore;
use crate::theme_store::ThemePreferenceStore;
use crate::write_through::WriteThrough;

pub struct AppStore {
    pub session: SessionStore,
    pub tasks: TaskStore,
    pub theme: ThemePreferenceStore,
    writer: WriteThrough,
}

impl AppStore {
    /// Creates empty slices that all persist through `writer`.
    pub fn new(writer: WriteThrough) -> Self {
        Self {
            session: SessionStore::new(writer.clone()),
            tasks: TaskStore::new(writer.clone()),
            theme: ThemePreferenceStore::new(writer.clone()),
            writer,
        }
    }

    /// Waits for every write issued so far by any slice.
    pub async fn flush(&self) {
        self.writer.flush().await;
    }
}
