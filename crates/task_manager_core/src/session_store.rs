//! crates/task_manager_core/src/session_store.rs
//!
//! Authentication state and its persisted `token` / `user` entries.

use crate::domain::{Session, User};
use crate::schema::{self, StorageKey};
use crate::write_through::WriteThrough;
use tracing::{info, warn};

/// Rejected attempts to authenticate with an incomplete identity.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Cannot sign in without a user id")]
    MissingUserId,
    #[error("Cannot sign in without a token")]
    MissingToken,
}

pub struct SessionStore {
    state: Session,
    writer: WriteThrough,
}

impl SessionStore {
    pub fn new(writer: WriteThrough) -> Self {
        Self {
            state: Session::default(),
            writer,
        }
    }

    pub fn state(&self) -> &Session {
        &self.state
    }

    /// Signs the user in and persists `token` and `user` in the background.
    pub fn login(&mut self, user: User, token: String) -> Result<&Session, SessionError> {
        let encoded_user = schema::encode(StorageKey::User, &user);
        let user_id = user.id.clone();
        self.state = authenticated(user, token.clone())?;
        match encoded_user {
            Ok(json) => {
                self.writer.set(StorageKey::Token, token);
                self.writer.set(StorageKey::User, json);
            }
            Err(e) => warn!(error = %e, "Not persisting session"),
        }
        info!(user_id = %user_id, "User logged in");
        Ok(&self.state)
    }

    /// Returns to the signed-out state and erases the persisted entries.
    pub fn logout(&mut self) -> &Session {
        self.state = Session::default();
        self.writer.remove(&[StorageKey::Token, StorageKey::User]);
        info!("User logged out");
        &self.state
    }

    /// Same in-memory effect as `login`, without writing back values that were
    /// just read from storage.
    pub fn restore_auth(&mut self, user: User, token: String) -> Result<&Session, SessionError> {
        self.state = authenticated(user, token)?;
        Ok(&self.state)
    }
}

fn authenticated(user: User, token: String) -> Result<Session, SessionError> {
    if user.id.is_empty() {
        return Err(SessionError::MissingUserId);
    }
    if token.is_empty() {
        return Err(SessionError::MissingToken);
    }
    Ok(Session {
        is_authenticated: true,
        user: Some(user),
        token: Some(token),
    })
}
