//! REST backend (PostgREST + GoTrue)
//!
//! Tables live under `/rest/v1/{table}`, remote procedures under
//! `/rest/v1/rpc/{name}` and auth under `/auth/v1`. Every request carries the
//! anon key as `apikey`; the bearer token is the session's access token when
//! signed in, otherwise the anon key itself.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value};
use shared::{Session, SessionUser};
use tokio::sync::RwLock;

use super::{Backend, Query, Row};
use crate::{BridgeConfig, ClientError, ClientResult};

/// PostgREST error body
#[derive(Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    code: Option<String>,
    message: String,
    #[serde(default)]
    details: Option<String>,
    #[serde(default)]
    hint: Option<String>,
}

/// GoTrue error body (field names vary across versions)
#[derive(Deserialize)]
struct AuthErrorResponse {
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl AuthErrorResponse {
    fn into_message(self) -> Option<String> {
        self.error_description
            .or(self.msg)
            .or(self.message)
            .or(self.error)
    }
}

/// GoTrue token response
#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_at: Option<i64>,
    #[serde(default)]
    expires_in: Option<i64>,
    user: SessionUser,
}

/// HTTP backend for a PostgREST/GoTrue deployment
#[derive(Debug)]
pub struct RestBackend {
    client: Client,
    base_url: String,
    anon_key: String,
    session: RwLock<Option<Session>>,
}

impl RestBackend {
    pub fn new(base_url: &str, anon_key: &str, timeout_secs: u64) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            session: RwLock::new(None),
        })
    }

    /// Build from configuration. Fails if URL or key is missing.
    pub fn from_config(config: &BridgeConfig) -> ClientResult<Self> {
        match (&config.backend_url, &config.anon_key) {
            (Some(url), Some(key)) => Self::new(url, key, config.timeout),
            _ => Err(ClientError::Config(
                "backend URL and anon key are required".into(),
            )),
        }
    }

    /// Replace the held session (e.g. restored from the cache).
    pub async fn set_session(&self, session: Option<Session>) {
        *self.session.write().await = session;
    }

    /// Sign in with email and password; the session is kept for later calls.
    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> ClientResult<Session> {
        let url = format!("{}/auth/v1/token", self.base_url);
        let body = serde_json::json!({ "email": email, "password": password });
        let response = self
            .client
            .post(&url)
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            let message = serde_json::from_str::<AuthErrorResponse>(&text)
                .ok()
                .and_then(AuthErrorResponse::into_message)
                .unwrap_or_else(|| format!("sign-in failed ({status})"));
            return Err(ClientError::Auth(message));
        }

        let token: TokenResponse = serde_json::from_str(&text)?;
        let expires_at = token.expires_at.or_else(|| {
            token
                .expires_in
                .map(|secs| chrono::Utc::now().timestamp() + secs)
        });
        let session = Session {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at,
            user: token.user,
        };
        tracing::info!(user_id = %session.user.id, "Signed in");
        self.set_session(Some(session.clone())).await;
        Ok(session)
    }

    /// Revoke the current session. The local session is cleared even if the
    /// server call fails.
    pub async fn sign_out(&self) -> ClientResult<()> {
        let Some(session) = self.session.write().await.take() else {
            return Ok(());
        };
        let url = format!("{}/auth/v1/logout", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() && status != StatusCode::UNAUTHORIZED {
            let text = response.text().await?;
            return Err(ClientError::Auth(text));
        }
        tracing::info!(user_id = %session.user.id, "Signed out");
        Ok(())
    }

    async fn bearer(&self) -> String {
        match self.session.read().await.as_ref() {
            Some(session) => session.access_token.clone(),
            None => self.anon_key.clone(),
        }
    }

    async fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/rest/v1/{}", self.base_url, path);
        self.client
            .request(method, &url)
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer().await)
    }

    /// Send and return the body text of a successful response.
    async fn send(&self, request: RequestBuilder) -> ClientResult<String> {
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        if status.is_success() {
            return Ok(text);
        }

        // 尝试解析为 API 错误响应
        if let Ok(api_err) = serde_json::from_str::<ApiErrorResponse>(&text) {
            return Err(ClientError::Backend {
                code: api_err.code.unwrap_or_else(|| status.as_u16().to_string()),
                message: api_err.message,
                details: api_err.details,
                hint: api_err.hint,
            });
        }
        match status {
            StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized),
            StatusCode::NOT_FOUND => Err(ClientError::NotFound(text)),
            _ => Err(ClientError::backend(status.as_u16().to_string(), text)),
        }
    }

    fn parse_rows(text: &str) -> ClientResult<Vec<Row>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        match serde_json::from_str::<Value>(text)? {
            Value::Array(rows) => Ok(rows),
            other => Err(ClientError::InvalidResponse(format!(
                "expected a row list, got {other}"
            ))),
        }
    }
}

#[async_trait]
impl Backend for RestBackend {
    async fn select(&self, query: &Query) -> ClientResult<Vec<Row>> {
        tracing::debug!(table = %query.table, "select");
        let request = self
            .request(Method::GET, &query.table)
            .await
            .query(&query.to_params());
        let text = self.send(request).await?;
        Self::parse_rows(&text)
    }

    async fn insert(
        &self,
        table: &str,
        rows: Vec<Map<String, Value>>,
        returning: bool,
    ) -> ClientResult<Vec<Row>> {
        tracing::debug!(table = %table, count = rows.len(), returning, "insert");
        let prefer = if returning {
            "return=representation"
        } else {
            "return=minimal"
        };
        let request = self
            .request(Method::POST, table)
            .await
            .header("Prefer", prefer)
            .json(&rows);
        let text = self.send(request).await?;
        if returning {
            Self::parse_rows(&text)
        } else {
            Ok(Vec::new())
        }
    }

    async fn update(&self, query: &Query, patch: Map<String, Value>) -> ClientResult<Vec<Row>> {
        tracing::debug!(table = %query.table, fields = patch.len(), "update");
        let mut params = query.filter_params();
        params.push(("select".to_string(), query.columns.clone()));
        let request = self
            .request(Method::PATCH, &query.table)
            .await
            .header("Prefer", "return=representation")
            .query(&params)
            .json(&patch);
        let text = self.send(request).await?;
        Self::parse_rows(&text)
    }

    async fn delete(&self, query: &Query) -> ClientResult<()> {
        tracing::debug!(table = %query.table, "delete");
        let request = self
            .request(Method::DELETE, &query.table)
            .await
            .header("Prefer", "return=minimal")
            .query(&query.filter_params());
        self.send(request).await?;
        Ok(())
    }

    async fn session(&self) -> ClientResult<Option<Session>> {
        let now = chrono::Utc::now().timestamp();
        Ok(self
            .session
            .read()
            .await
            .clone()
            .filter(|s| !s.is_expired(now)))
    }

    async fn rpc(&self, function: &str, args: Value) -> ClientResult<Value> {
        tracing::debug!(function = %function, "rpc");
        let request = self
            .request(Method::POST, &format!("rpc/{function}"))
            .await
            .json(&args);
        let text = self.send(request).await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}
