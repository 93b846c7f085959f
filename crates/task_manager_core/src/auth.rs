//! crates/task_manager_core/src/auth.rs
//!
//! Local mock authentication. Validates the form input and fabricates a user
//! and token; no credentials are checked against anything.

use crate::domain::User;
use crate::validation::{validate_login, validate_sign_up, ValidationError};
use uuid::Uuid;

pub const MOCK_TOKEN: &str = "mock-jwt-token";

/// What a successful login or sign-up hands to `SessionStore::login`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: User,
    pub token: String,
}

fn display_name(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}

pub fn login(email: &str, password: &str) -> Result<Credentials, ValidationError> {
    validate_login(email, password)?;
    Ok(Credentials {
        user: User {
            id: "1".to_string(),
            name: display_name(email),
            email: email.to_string(),
        },
        token: MOCK_TOKEN.to_string(),
    })
}

/// Like `login`, but every sign-up gets a fresh user id.
pub fn sign_up(email: &str, password: &str, confirm: &str) -> Result<Credentials, ValidationError> {
    validate_sign_up(email, password, confirm)?;
    Ok(Credentials {
        user: User {
            id: Uuid::new_v4().to_string(),
            name: display_name(email),
            email: email.to_string(),
        },
        token: MOCK_TOKEN.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_derives_name_from_email() {
        let creds = login("grace@navy.mil", "cobol1").unwrap();
        assert_eq!(creds.user.id, "1");
        assert_eq!(creds.user.name, "grace");
        assert_eq!(creds.token, MOCK_TOKEN);
    }

    #[test]
    fn sign_up_ids_are_unique() {
        let a = sign_up("a@b.co", "password1", "password1").unwrap();
        let b = sign_up("a@b.co", "password1", "password1").unwrap();
        assert_ne!(a.user.id, b.user.id);
    }

    #[test]
    fn invalid_input_is_rejected() {
        assert_eq!(login("a@b.co", "short"), Err(ValidationError::TooShort { field: "Password", min: 6 }));
    }
}
