//! crates/task_manager_core/src/domain.rs
//!
//! Defines the core data structures for the application.
//! The serde attributes on `User` and `Task` are the storage wire format; the
//! key layout around them lives in `schema.rs`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The signed-in user, as produced by the (mock) authenticator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// A single task in the user's list. `id` is supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// ISO-8601 timestamp, e.g. `2026-10-20T09:00:00.000Z`.
    pub due_date: String,
    pub completed: bool,
}

impl Task {
    /// The parsed due date, or `None` if `due_date` is not a valid RFC 3339 timestamp.
    pub fn due_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.due_date)
            .ok()
            .map(|d| d.with_timezone(&Utc))
    }
}

/// Returns a copy of `tasks` ordered by due date, latest first.
///
/// This is a read-side view; stores keep insertion order. Tasks whose due date
/// does not parse go last, and ties keep their relative order.
pub fn sort_by_due_date_desc(tasks: &[Task]) -> Vec<Task> {
    let mut sorted = tasks.to_vec();
    sorted.sort_by(|a, b| b.due_at().cmp(&a.due_at()));
    sorted
}

/// Authentication state. Authenticated only when both `user` and `token` are set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub is_authenticated: bool,
    pub user: Option<User>,
    pub token: Option<String>,
}

/// Theme preference. When `is_system_theme` is set the UI should follow the
/// device appearance and ignore `is_dark_mode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemePreference {
    pub is_dark_mode: bool,
    pub is_system_theme: bool,
}

impl Default for ThemePreference {
    fn default() -> Self {
        Self {
            is_dark_mode: false,
            is_system_theme: true,
        }
    }
}

impl ThemePreference {
    /// Resolves the theme to render given the current device appearance.
    pub fn resolve_dark_mode(&self, system_is_dark: bool) -> bool {
        if self.is_system_theme {
            system_is_dark
        } else {
            self.is_dark_mode
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, due_date: &str) -> Task {
        Task {
            id: id.to_string(),
            title: format!("Task {}", id),
            description: None,
            due_date: due_date.to_string(),
            completed: false,
        }
    }

    #[test]
    fn sorts_latest_due_date_first_without_touching_input() {
        let tasks = vec![
            task("a", "2026-01-01T00:00:00.000Z"),
            task("b", "2026-03-01T00:00:00.000Z"),
            task("c", "2026-02-01T00:00:00+02:00"),
        ];

        let sorted = sort_by_due_date_desc(&tasks);

        let ids: Vec<&str> = sorted.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
        assert_eq!(tasks[0].id, "a");
    }

    #[test]
    fn unparseable_due_dates_sort_last() {
        let tasks = vec![task("bad", "next tuesday"), task("ok", "2020-01-01T00:00:00Z")];
        let sorted = sort_by_due_date_desc(&tasks);
        assert_eq!(sorted[0].id, "ok");
        assert_eq!(sorted[1].id, "bad");
    }

    #[test]
    fn task_wire_format_uses_camel_case_and_omits_missing_description() {
        let json = serde_json::to_string(&task("1", "2026-01-01T00:00:00.000Z")).unwrap();
        assert_eq!(
            json,
            r#"{"id":"1","title":"Task 1","dueDate":"2026-01-01T00:00:00.000Z","completed":false}"#
        );
    }

    #[test]
    fn system_theme_takes_precedence_over_dark_mode_flag() {
        let pref = ThemePreference {
            is_dark_mode: false,
            is_system_theme: true,
        };
        assert!(pref.resolve_dark_mode(true));

        let explicit = ThemePreference {
            is_dark_mode: true,
            is_system_theme: false,
        };
        assert!(explicit.resolve_dark_mode(false));
    }
}
