use std::sync::Arc;

use crate::api::{AuthApi, Credentials};
use crate::error::Result;
use crate::users::{User, UserRole};

use super::{Session, SessionCell};

/// Drives the login lifecycle on top of a [`SessionCell`].
pub struct SessionManager {
    cell: Arc<SessionCell>,
    auth: Arc<dyn AuthApi>,
}

impl SessionManager {
    pub fn new(cell: Arc<SessionCell>, auth: Arc<dyn AuthApi>) -> Self {
        Self { cell, auth }
    }

    pub fn cell(&self) -> &Arc<SessionCell> {
        &self.cell
    }

    /// Picks up a stored token at start-up. A blank or expired token counts
    /// as none, and a token the backend no longer accepts is discarded.
    pub async fn restore(&self) -> Session {
        if self.cell.token().is_none() {
            tracing::debug!("no stored token");
            return self.cell.snapshot().await;
        }

        self.cell.resume();
        match self.auth.me().await {
            Ok(user) => {
                tracing::info!(user = %user.mail, "session restored");
                self.cell.set_current_user(user).await;
            }
            Err(e) => {
                tracing::warn!("stored token rejected, signing out: {}", e);
                self.end("stored token rejected").await;
            }
        }
        self.cell.snapshot().await
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<User> {
        credentials.validate()?;
        let token = self.auth.login(credentials).await.inspect_err(|e| {
            tracing::warn!(mail = %credentials.mail, "login failed: {}", e);
        })?;
        self.cell.establish(&token)?;

        match self.auth.me().await {
            Ok(user) => {
                tracing::info!(user = %user.mail, role = user.role.as_str(), "logged in");
                self.cell.set_current_user(user.clone()).await;
                Ok(user)
            }
            Err(e) => {
                tracing::error!("logged in but could not load the current user: {}", e);
                self.end("current user unavailable").await;
                Err(e)
            }
        }
    }

    /// Tells the backend when a user is known, then ends the local session
    /// whatever the backend answered.
    pub async fn logout(&self) -> Result<()> {
        let result = match self.cell.current_user().await {
            Some(user) => self.auth.logout(&user.id).await,
            None => Ok(()),
        };
        if let Err(e) = &result {
            tracing::warn!("logout call failed, clearing local session anyway: {}", e);
        }
        self.end("logout").await;
        result
    }

    pub async fn snapshot(&self) -> Session {
        self.cell.snapshot().await
    }

    pub fn is_authenticated(&self) -> bool {
        self.cell.is_authenticated()
    }

    pub async fn current_user(&self) -> Option<User> {
        self.cell.current_user().await
    }

    pub async fn current_user_role(&self) -> Option<UserRole> {
        self.cell.current_user().await.map(|u| u.role)
    }

    // the transport may already have ended the session on a 401
    async fn end(&self, reason: &str) {
        if self.cell.is_authenticated() || self.cell.token().is_some() {
            self.cell.sign_out(reason).await;
        }
    }
}
