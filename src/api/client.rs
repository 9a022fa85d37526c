use std::sync::Arc;

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::ApiConfig;
use crate::error::{ConsoleError, Result, status_message};
use crate::http_client::{api_url, build_client, mask_token};
use crate::session::SessionCell;

/// Error body the backend sends with non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Auth {
    Bearer,
    Anonymous,
}

/// HTTP implementation of the backend traits.
///
/// Every authenticated request carries the stored token as a bearer header.
/// A 401 on such a request ends the session here, so callers only ever see
/// [`ConsoleError::AuthExpired`].
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionCell>,
}

impl ApiClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, session: Arc<SessionCell>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            session,
        }
    }

    pub fn from_config(config: &ApiConfig, session: Arc<SessionCell>) -> Result<Self> {
        let http = build_client(config)?;
        Ok(Self::new(http, config.base_url.clone(), session))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionCell> {
        &self.session
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, api_url(&self.base_url, path))
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let text = self.execute(self.request(Method::GET, path), Auth::Bearer).await?;
        decode(path, &text)
    }

    pub(crate) async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let text = self
            .execute(self.request(method, path).json(body), Auth::Bearer)
            .await?;
        decode(path, &text)
    }

    pub(crate) async fn send_empty(&self, method: Method, path: &str) -> Result<()> {
        self.execute(self.request(method, path), Auth::Bearer).await?;
        Ok(())
    }

    /// Sends the request and returns the response body of a 2xx answer.
    pub(crate) async fn execute(&self, builder: RequestBuilder, auth: Auth) -> Result<String> {
        let builder = match (auth, self.session.token()) {
            (Auth::Bearer, Some(token)) => {
                tracing::debug!(token = %mask_token(&token), "attaching bearer token");
                builder.bearer_auth(token)
            }
            _ => builder,
        };

        let resp = builder.send().await?;
        let status = resp.status();
        let url = resp.url().path().to_string();
        let text = resp.text().await?;

        if status == StatusCode::UNAUTHORIZED && auth == Auth::Bearer {
            tracing::warn!(path = %url, "backend rejected the session token");
            self.session.sign_out("token rejected by backend").await;
            return Err(ConsoleError::AuthExpired);
        }
        if !status.is_success() {
            tracing::debug!(path = %url, status = status.as_u16(), "request failed");
            return Err(extract_error(status, &text));
        }
        Ok(text)
    }
}

pub(crate) fn decode<T: DeserializeOwned>(path: &str, text: &str) -> Result<T> {
    serde_json::from_str(text).map_err(|e| {
        tracing::warn!(path, "failed to decode response: {}; body={}", e, text);
        ConsoleError::Json(e)
    })
}

/// Backend message when the body carries one, else the canned text for the
/// status, else the raw body.
pub(crate) fn extract_error(status: StatusCode, text: &str) -> ConsoleError {
    let code = status.as_u16();
    if let Ok(body) = serde_json::from_str::<ErrorBody>(text) {
        if let Some(message) = body.message.filter(|m| !m.trim().is_empty()) {
            return ConsoleError::Backend {
                status: code,
                message,
            };
        }
    }
    let message = match status_message(code) {
        Some(canned) => canned.to_string(),
        None if text.trim().is_empty() => format!("HTTP {}", code),
        None => format!("HTTP {}: {}", code, text.trim()),
    };
    ConsoleError::Backend {
        status: code,
        message,
    }
}
