pub mod file;
pub mod sqlite;

pub use file::FileStorage;
pub use sqlite::SqliteStorage;
pub use task_manager_core::MemoryStorage;
