use std::sync::Arc;

use crate::api::{ApiClient, AuthApi, EntityApi, SubscriptionApi};
use crate::config::Settings;
use crate::dashboard::DashboardSummary;
use crate::error::Result;
use crate::notify::Notifier;
use crate::session::{FileCredentialStore, SessionCell, SessionManager};
use crate::store::{SubscriptionStore, UserStore};
use crate::users::User;

/// Everything an admin screen needs: the session and one store per
/// collection, all tied to the same session broadcast.
pub struct Console {
    session: SessionManager,
    users: UserStore,
    subscriptions: SubscriptionStore,
}

impl Console {
    pub fn new(settings: &Settings, notifier: Arc<dyn Notifier>) -> Result<Self> {
        let credentials = Arc::new(FileCredentialStore::new(
            settings.session.credential_path.clone(),
            settings.session.cookie_policy(),
        ));
        let cell = Arc::new(SessionCell::new(credentials));
        let client = Arc::new(ApiClient::from_config(&settings.api, cell.clone())?);
        tracing::info!(base_url = client.base_url(), "console backend configured");

        Ok(Self::from_parts(
            cell,
            client.clone(),
            client.clone(),
            client,
            notifier,
        ))
    }

    pub fn from_parts(
        cell: Arc<SessionCell>,
        auth: Arc<dyn AuthApi>,
        users: Arc<dyn EntityApi<User>>,
        subscriptions: Arc<dyn SubscriptionApi>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            users: UserStore::new(users, cell.subscribe(), notifier.clone()),
            subscriptions: SubscriptionStore::new(subscriptions, cell.subscribe(), notifier),
            session: SessionManager::new(cell, auth),
        }
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn users(&self) -> &UserStore {
        &self.users
    }

    pub fn subscriptions(&self) -> &SubscriptionStore {
        &self.subscriptions
    }

    /// Reloads both lists concurrently. Both requests run to completion;
    /// the first error is returned.
    pub async fn refresh(&self) -> Result<()> {
        let (users, subscriptions) = tokio::join!(self.users.load(), self.subscriptions.load());
        users?;
        subscriptions?;
        Ok(())
    }

    pub async fn dashboard(&self) -> DashboardSummary {
        DashboardSummary::from_stores(&self.users, &self.subscriptions).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::json;

    use super::*;
    use crate::api::Credentials;
    use crate::api::client::testing::serve;
    use crate::error::ConsoleError;
    use crate::notify::NoticeLog;
    use crate::session::MemoryCredentialStore;

    async fn subscriptions(State(calls): State<Arc<AtomicUsize>>) -> Response {
        if calls.fetch_add(1, Ordering::SeqCst) > 0 {
            return (StatusCode::UNAUTHORIZED, Json(json!({"message": "Token expired"})))
                .into_response();
        }
        Json(json!([
            {
                "status": {"remainingDays": 20, "progressPercentage": 66.0, "expired": false},
                "details": {"id": "s1", "fullname": "Dean Ritchie", "price": 30000.0}
            },
            {
                "status": {"remainingDays": 0, "progressPercentage": 0.0, "expired": true},
                "details": {"id": "s2", "fullname": "Marie Curie", "price": 50012.004}
            }
        ]))
        .into_response()
    }

    fn backend() -> Router {
        Router::new()
            .route(
                "/auth/login",
                post(|| async { Json(json!({"token": "jwt-0123456789"})) }),
            )
            .route(
                "/auth/me",
                get(|| async {
                    Json(json!({"id": "u1", "name": "Lovelace", "firstName": "Ada",
                        "mail": "ada@example.com", "online": true, "active": true, "role": "ADMIN"}))
                }),
            )
            .route(
                "/users/lists",
                get(|| async {
                    Json(json!([
                        {"id": "u1", "mail": "ada@example.com", "online": true},
                        {"id": "u2", "mail": "grace@example.com", "online": false}
                    ]))
                }),
            )
            .route("/subscriptions/getAll/withDetails", get(subscriptions))
            .with_state(Arc::new(AtomicUsize::new(0)))
    }

    async fn console() -> (Console, Arc<NoticeLog>) {
        let base = serve(backend()).await;
        let cell = Arc::new(SessionCell::new(Arc::new(MemoryCredentialStore::default())));
        let client = Arc::new(ApiClient::new(reqwest::Client::new(), base, cell.clone()));
        let notices = Arc::new(NoticeLog::default());
        let console = Console::from_parts(
            cell,
            client.clone(),
            client.clone(),
            client,
            notices.clone(),
        );
        (console, notices)
    }

    #[tokio::test]
    async fn login_refresh_and_dashboard() {
        let (console, _) = console().await;
        console
            .session()
            .login(&Credentials::new("ada@example.com", "secret"))
            .await
            .unwrap();
        console.refresh().await.unwrap();

        let summary = console.dashboard().await;
        assert_eq!(summary.total_users, 2);
        assert_eq!(summary.online_users, 1);
        assert_eq!(summary.total_subscriptions, 2);
        assert_eq!(summary.active_subscriptions, 1);
        assert_eq!(summary.expired_subscriptions, 1);
        assert!((summary.revenue - 80012.0).abs() < 1e-9);
        assert_eq!(summary.average_revenue, 40006.0);
    }

    #[tokio::test]
    async fn empty_dashboard_averages_to_zero() {
        let (console, _) = console().await;
        let summary = console.dashboard().await;
        assert_eq!(summary.total_subscriptions, 0);
        assert_eq!(summary.revenue, 0.0);
        assert_eq!(summary.average_revenue, 0.0);
    }

    #[tokio::test]
    async fn unauthorized_from_one_store_signs_out_every_store() {
        let (console, notices) = console().await;
        console
            .session()
            .login(&Credentials::new("ada@example.com", "secret"))
            .await
            .unwrap();
        console.refresh().await.unwrap();
        assert_eq!(console.users().count().await, 2);

        let err = console.subscriptions().load().await.unwrap_err();
        assert!(matches!(err, ConsoleError::AuthExpired));

        assert!(!console.session().is_authenticated());
        assert_eq!(console.session().current_user().await, None);
        assert_eq!(console.session().cell().token(), None);
        assert_eq!(console.users().count().await, 0);
        assert_eq!(console.subscriptions().count().await, 0);
        assert!(notices.is_empty());
    }
}
