use async_trait::async_trait;
use reqwest::Method;

use super::{ApiClient, EntityApi};
use crate::error::Result;
use crate::users::{CreateUserPayload, UpdateUserPayload, User};

#[async_trait]
impl EntityApi<User> for ApiClient {
    async fn list(&self) -> Result<Vec<User>> {
        self.get_json("/users/lists").await
    }

    async fn add(&self, draft: &CreateUserPayload) -> Result<User> {
        self.send_json(Method::POST, "/auth/create", draft).await
    }

    async fn update(&self, id: &str, changes: &UpdateUserPayload) -> Result<User> {
        self.send_json(Method::PATCH, &format!("/users/update/{}", id), changes)
            .await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.send_empty(Method::DELETE, &format!("/users/delete/{}", id))
            .await
    }
}
