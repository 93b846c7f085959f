//! crates/task_manager_core/src/validation.rs
//!
//! Form validation for the login, sign-up and task screens.

use crate::domain::Task;
use chrono::{DateTime, NaiveDate, SecondsFormat, TimeZone, Utc};
use regex::Regex;
use std::sync::OnceLock;

pub const LOGIN_PASSWORD_MIN: usize = 6;
pub const SIGN_UP_PASSWORD_MIN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("Invalid email")]
    InvalidEmail,
    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },
    #[error("Passwords must match")]
    PasswordMismatch,
    #[error("Invalid due date '{0}'")]
    InvalidDate(String),
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"))
}

fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() {
        return Err(ValidationError::Required("Email"));
    }
    if !email_pattern().is_match(email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

fn validate_password(password: &str, min: usize) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::Required("Password"));
    }
    if password.chars().count() < min {
        return Err(ValidationError::TooShort {
            field: "Password",
            min,
        });
    }
    Ok(())
}

pub fn validate_login(email: &str, password: &str) -> Result<(), ValidationError> {
    validate_email(email)?;
    validate_password(password, LOGIN_PASSWORD_MIN)
}

pub fn validate_sign_up(email: &str, password: &str, confirm: &str) -> Result<(), ValidationError> {
    validate_email(email)?;
    validate_password(password, SIGN_UP_PASSWORD_MIN)?;
    if confirm.is_empty() {
        return Err(ValidationError::Required("Confirm Password"));
    }
    if confirm != password {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

/// Parses a due date as entered in the task form.
///
/// Accepts a full RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC)
/// and returns it in the `2026-10-20T09:00:00.000Z` form tasks are stored with.
pub fn normalize_due_date(input: &str) -> Result<String, ValidationError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ValidationError::Required("Due date"));
    }
    let parsed = match DateTime::parse_from_rfc3339(input) {
        Ok(dt) => dt.with_timezone(&Utc),
        Err(_) => NaiveDate::parse_from_str(input, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| Utc.from_utc_datetime(&dt))
            .ok_or_else(|| ValidationError::InvalidDate(input.to_string()))?,
    };
    Ok(parsed.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// The editable fields of a task, as submitted by the add/edit form.
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub due_date: String,
}

impl TaskDraft {
    /// Validates the draft and builds a task with the given id and completion state.
    /// A blank description is stored as `None`.
    pub fn into_task(self, id: String, completed: bool) -> Result<Task, ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::Required("Title"));
        }
        let due_date = normalize_due_date(&self.due_date)?;
        let description = Some(self.description.trim())
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        Ok(Task {
            id,
            title: title.to_string(),
            description,
            due_date,
            completed,
        })
    }
}
