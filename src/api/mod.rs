//! Backend seams. The stores and the session only talk to these traits;
//! [`ApiClient`] is the HTTP implementation.

mod auth;
pub(crate) mod client;
mod subscriptions;
mod users;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::{ConsoleError, Result};
use crate::pricing::RenewalRequest;
use crate::store::Entity;
use crate::subscription::SubscriptionWithDetails;
use crate::users::User;

pub use client::ApiClient;

/// Login form body.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub mail: String,
    pub password: String,
}

impl Credentials {
    pub fn new(mail: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            mail: mail.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let mail = self.mail.trim();
        if mail.is_empty() {
            return Err(ConsoleError::Validation("Email is required.".into()));
        }
        let valid_mail = mail
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
        if !valid_mail {
            return Err(ConsoleError::Validation(
                "Please enter a valid email address.".into(),
            ));
        }
        if self.password.is_empty() {
            return Err(ConsoleError::Validation("Password is required.".into()));
        }
        Ok(())
    }
}

#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchanges credentials for a bearer token.
    async fn login(&self, credentials: &Credentials) -> Result<String>;
    /// The user the current token belongs to.
    async fn me(&self) -> Result<User>;
    async fn logout(&self, user_id: &str) -> Result<()>;
}

/// CRUD endpoints of one backend collection.
#[async_trait]
pub trait EntityApi<E: Entity>: Send + Sync {
    async fn list(&self) -> Result<Vec<E>>;
    async fn add(&self, draft: &E::Draft) -> Result<E>;
    async fn update(&self, id: &str, changes: &E::Changes) -> Result<E>;
    async fn delete(&self, id: &str) -> Result<()>;
}

#[async_trait]
pub trait SubscriptionApi: EntityApi<SubscriptionWithDetails> {
    async fn renew(&self, id: &str, request: &RenewalRequest) -> Result<SubscriptionWithDetails>;
}
