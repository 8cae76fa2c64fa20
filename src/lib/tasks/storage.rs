use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use tracing::trace;

use super::types::Task;

/// In-memory index of tasks keyed by task id.
///
/// A single lock guards the whole map, so every operation is one critical
/// section. Tasks are cloned in and out; call [`TaskStorage::get`] again for a
/// fresh view instead of holding on to a returned value.
#[derive(Debug, Default)]
pub struct TaskStorage {
    tasks: RwLock<HashMap<String, Task>>,
}

impl TaskStorage {
    pub fn new() -> Self {
        TaskStorage {
            tasks: RwLock::new(HashMap::new()),
        }
    }

    // Critical sections never leave the map half-written, so a poisoned lock
    // still guards consistent data.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Task>> {
        self.tasks.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Task>> {
        self.tasks.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, id: &str) -> Option<Task> {
        self.read().get(id).cloned()
    }

    /// Inserts `task` unless its id is already taken. Returns `false` and
    /// leaves the stored task untouched on conflict.
    pub fn add(&self, task: Task) -> bool {
        let mut tasks = self.write();
        if tasks.contains_key(&task.id) {
            trace!(task_id = %task.id, "task already exists");
            return false;
        }
        tasks.insert(task.id.clone(), task);
        true
    }

    /// Replaces the whole stored record for `task.id`. Never creates an entry.
    pub fn update(&self, task: Task) -> bool {
        let mut tasks = self.write();
        match tasks.get_mut(&task.id) {
            Some(stored) => {
                *stored = task;
                true
            }
            None => {
                trace!(task_id = %task.id, "task does not exist");
                false
            }
        }
    }

    /// Applies `f` to the stored task for `id` inside one critical section and
    /// returns the result. Returns `None` without calling `f` if absent.
    pub fn modify(&self, id: &str, f: impl FnOnce(&mut Task)) -> Option<Task> {
        let mut tasks = self.write();
        let stored = tasks.get_mut(id)?;
        f(stored);
        Some(stored.clone())
    }

    pub fn delete(&self, id: &str) {
        self.write().remove(id);
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Ids of all stored tasks, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.read().keys().cloned().collect();
        ids.sort();
        ids
    }
}
