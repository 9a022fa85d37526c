//! Who is signed in, and the broadcast every store listens to.

mod credentials;
mod manager;

use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use crate::error::Result;
use crate::users::{User, UserRole};

pub use credentials::{CookiePolicy, CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use manager::SessionManager;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthStatus {
    Authenticated,
    #[default]
    Unauthenticated,
}

/// Broadcast value. `resets` increases on every sign-out so listeners can
/// tell that cached data belongs to a finished session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSignal {
    pub status: AuthStatus,
    pub resets: u64,
}

impl SessionSignal {
    pub fn sign_in(&mut self) {
        self.status = AuthStatus::Authenticated;
    }

    pub fn sign_out(&mut self) {
        self.status = AuthStatus::Unauthenticated;
        self.resets += 1;
    }
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    pub status: AuthStatus,
    pub current_user: Option<User>,
}

impl Session {
    pub fn role(&self) -> Option<UserRole> {
        self.current_user.as_ref().map(|u| u.role)
    }
}

/// Shared session state: the persisted token, the current user and the
/// status broadcast.
pub struct SessionCell {
    credentials: Arc<dyn CredentialStore>,
    current_user: RwLock<Option<User>>,
    signal: watch::Sender<SessionSignal>,
}

impl SessionCell {
    pub fn new(credentials: Arc<dyn CredentialStore>) -> Self {
        let (signal, _) = watch::channel(SessionSignal::default());
        Self {
            credentials,
            current_user: RwLock::new(None),
            signal,
        }
    }

    /// The stored token, if one is still usable. A token that expired or went
    /// blank in storage ends the session here, so the broadcast never claims
    /// authentication without a token behind it.
    pub fn token(&self) -> Option<String> {
        let token = self.credentials.get().filter(|t| !t.trim().is_empty());
        if token.is_none() {
            let ended = self.signal.send_if_modified(|s| {
                if s.status == AuthStatus::Authenticated {
                    s.sign_out();
                    true
                } else {
                    false
                }
            });
            if ended {
                tracing::info!("stored token gone, session ended");
            }
        }
        token
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSignal> {
        self.signal.subscribe()
    }

    pub async fn current_user(&self) -> Option<User> {
        if !self.is_authenticated() {
            return None;
        }
        self.current_user.read().await.clone()
    }

    pub async fn snapshot(&self) -> Session {
        if !self.is_authenticated() {
            return Session::default();
        }
        Session {
            status: AuthStatus::Authenticated,
            current_user: self.current_user.read().await.clone(),
        }
    }

    /// Persists a freshly issued token and marks the session authenticated.
    pub fn establish(&self, token: &str) -> Result<()> {
        self.credentials.set(token)?;
        self.resume();
        Ok(())
    }

    /// Marks a token restored from storage as live, without rewriting it.
    /// Does nothing when no usable token is stored.
    pub fn resume(&self) {
        if self.token().is_none() {
            return;
        }
        self.signal.send_if_modified(|s| {
            let changed = s.status != AuthStatus::Authenticated;
            s.sign_in();
            changed
        });
    }

    pub async fn set_current_user(&self, user: User) {
        *self.current_user.write().await = Some(user);
    }

    /// Forgets the token and the user and tells every listener.
    pub async fn sign_out(&self, reason: &str) {
        if let Err(e) = self.credentials.delete() {
            tracing::error!("failed to delete stored token: {}", e);
        }
        *self.current_user.write().await = None;
        self.signal.send_modify(SessionSignal::sign_out);
        tracing::info!(reason, "session ended");
    }
}
