//! crates/task_manager_core/src/task_store.rs
//!
//! The task collection. Every mutation except `set_tasks` rewrites the whole
//! `tasks` entry in storage.

use crate::domain::{sort_by_due_date_desc, Task};
use crate::schema::{self, StorageKey};
use crate::write_through::WriteThrough;
use tracing::{debug, warn};

pub struct TaskStore {
    tasks: Vec<Task>,
    writer: WriteThrough,
}

impl TaskStore {
    pub fn new(writer: WriteThrough) -> Self {
        Self {
            tasks: Vec::new(),
            writer,
        }
    }

    /// The collection in insertion order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn find(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// The display order: latest due date first.
    pub fn sorted_by_due_date(&self) -> Vec<Task> {
        sort_by_due_date_desc(&self.tasks)
    }

    /// Appends `task`. The caller guarantees its id is not already in use.
    pub fn add_task(&mut self, task: Task) -> &[Task] {
        debug!(task_id = %task.id, "Adding task");
        self.tasks.push(task);
        self.persist();
        &self.tasks
    }

    /// Replaces the task with the same id, keeping its position. Unknown ids
    /// leave the collection untouched; the collection is persisted either way.
    pub fn update_task(&mut self, task: Task) -> &[Task] {
        match self.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(slot) => *slot = task,
            None => debug!(task_id = %task.id, "No task to update"),
        }
        self.persist();
        &self.tasks
    }

    pub fn delete_task(&mut self, id: &str) -> &[Task] {
        self.tasks.retain(|t| t.id != id);
        self.persist();
        &self.tasks
    }

    /// Replaces the collection with data loaded from storage. Not persisted.
    pub fn set_tasks(&mut self, tasks: Vec<Task>) -> &[Task] {
        self.tasks = tasks;
        &self.tasks
    }

    fn persist(&self) {
        match schema::encode(StorageKey::Tasks, &self.tasks) {
            Ok(json) => self.writer.set(StorageKey::Tasks, json),
            Err(e) => warn!(error = %e, "Not persisting tasks"),
        }
    }
}
