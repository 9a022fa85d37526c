use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::Deserialize;

use super::client::{Auth, decode};
use super::{ApiClient, AuthApi, Credentials};
use crate::error::{ConsoleError, Result};
use crate::users::User;

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    token: Option<String>,
}

#[async_trait]
impl AuthApi for ApiClient {
    async fn login(&self, credentials: &Credentials) -> Result<String> {
        let builder = self.request(Method::POST, "/auth/login").json(credentials);
        let text = match self.execute(builder, Auth::Anonymous).await {
            Ok(text) => text,
            Err(ConsoleError::Backend { status, .. })
                if status == StatusCode::UNAUTHORIZED.as_u16()
                    || status == StatusCode::FORBIDDEN.as_u16() =>
            {
                return Err(ConsoleError::InvalidCredentials);
            }
            Err(e) => return Err(e),
        };
        let resp: LoginResponse = decode("/auth/login", &text)?;
        match resp.token.filter(|t| !t.trim().is_empty()) {
            Some(token) => Ok(token),
            None => {
                tracing::warn!("login response carried no token");
                Err(ConsoleError::InvalidCredentials)
            }
        }
    }

    async fn me(&self) -> Result<User> {
        self.get_json("/auth/me").await
    }

    async fn logout(&self, user_id: &str) -> Result<()> {
        self.send_empty(Method::POST, &format!("/auth/logout/{}", user_id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use axum::extract::Path;
    use axum::http::StatusCode as AxumStatus;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{Value, json};

    use super::*;
    use crate::api::client::testing::client_for;

    fn backend() -> Router {
        Router::new()
            .route(
                "/auth/login",
                post(|Json(body): Json<Value>| async move {
                    match (body["mail"].as_str(), body["password"].as_str()) {
                        (Some("ada@example.com"), Some("secret")) => {
                            (AxumStatus::OK, Json(json!({"token": "jwt-abcdef123456"})))
                        }
                        (Some("empty@example.com"), _) => (AxumStatus::OK, Json(json!({}))),
                        _ => (
                            AxumStatus::UNAUTHORIZED,
                            Json(json!({"message": "Bad credentials"})),
                        ),
                    }
                }),
            )
            .route(
                "/auth/me",
                get(|| async {
                    Json(json!({
                        "id": "u1", "name": "Lovelace", "firstName": "Ada",
                        "mail": "ada@example.com", "online": true, "active": true, "role": "ADMIN"
                    }))
                }),
            )
            .route(
                "/auth/logout/{id}",
                post(|Path(id): Path<String>| async move {
                    if id == "u1" {
                        AxumStatus::OK
                    } else {
                        AxumStatus::NOT_FOUND
                    }
                }),
            )
    }

    #[tokio::test]
    async fn login_returns_token() {
        let client = client_for(backend(), None).await;
        let token = client
            .login(&Credentials::new("ada@example.com", "secret"))
            .await
            .unwrap();
        assert_eq!(token, "jwt-abcdef123456");
    }

    #[tokio::test]
    async fn rejected_login_is_invalid_credentials_and_keeps_signal() {
        let client = client_for(backend(), None).await;
        let signal = client.session().subscribe();
        let err = client
            .login(&Credentials::new("ada@example.com", "wrong"))
            .await
            .unwrap_err();
        assert!(matches!(err, ConsoleError::InvalidCredentials));
        assert_eq!(signal.borrow().resets, 0);
    }

    #[tokio::test]
    async fn login_without_token_is_invalid_credentials() {
        let client = client_for(backend(), None).await;
        let err = client
            .login(&Credentials::new("empty@example.com", "x"))
            .await
            .unwrap_err();
        assert!(matches!(err, ConsoleError::InvalidCredentials));
    }

    #[tokio::test]
    async fn me_and_logout() {
        let client = client_for(backend(), Some("jwt-abcdef123456")).await;
        let me = client.me().await.unwrap();
        assert_eq!(me.id, "u1");
        assert!(me.is_admin());

        client.logout("u1").await.unwrap();
        let err = client.logout("u2").await.unwrap_err();
        assert_eq!(err.status(), Some(404));
    }
}
