use crate::api::EntityApi;
use crate::users::{Presence, User, UserQuery};

use super::EntityStore;

pub type UserStore = EntityStore<User, dyn EntityApi<User>>;

impl UserStore {
    pub async fn online_users(&self) -> Vec<User> {
        self.filter(|u| u.online).await
    }

    pub async fn offline_users(&self) -> Vec<User> {
        self.filter(|u| !u.online).await
    }

    pub async fn count_by_presence(&self, presence: Presence) -> usize {
        self.filter(|u| u.presence() == presence).await.len()
    }

    pub async fn query(&self, query: &UserQuery) -> Vec<User> {
        self.filter(|u| query.matches(u)).await
    }
}
