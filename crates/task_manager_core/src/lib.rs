pub mod app_store;
pub mod auth;
pub mod bootstrap;
pub mod domain;
pub mod memory;
pub mod ports;
pub mod schema;
pub mod session_store;
pub mod task_store;
pub mod theme_store;
pub mod validation;
pub mod write_through;

pub use app_store::AppStore;
pub use domain::{Session, Task, ThemePreference, User};
pub use memory::MemoryStorage;
pub use ports::{PersistenceGateway, PortError, PortResult};
pub use schema::StorageKey;
pub use session_store::{SessionError, SessionStore};
pub use task_store::TaskStore;
pub use theme_store::{ThemePreferenceStore, ThemeRestorePolicy};
pub use validation::{TaskDraft, ValidationError};
pub use write_through::WriteThrough;
