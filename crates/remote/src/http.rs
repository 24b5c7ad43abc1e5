//! HTTP client for the swgoh.help data API.
//!
//! `ureq` is blocking, so every request runs inside
//! [`spawn_blocking`](tokio::task::spawn_blocking) and the async side only
//! ever awaits the join handle.

use crate::error::{ErrorKind, Result};
use crate::{Query, RemoteDataClient, Row, VersionDescriptor};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
// Refresh the token a little before the service says it expires.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(30);

/// Password-grant credentials for the data API.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub client_id: String,
    pub client_secret: String,
}

struct Token {
    value: String,
    expires_at: Instant,
}

#[derive(Deserialize)]
struct SignInResponse {
    access_token: String,
    expires_in: u64,
}

/// [`RemoteDataClient`] backed by the swgoh.help HTTP API.
pub struct SwgohHelpClient {
    base_url: String,
    language: String,
    credentials: Credentials,
    agent: ureq::Agent,
    token: Mutex<Option<Token>>,
}
impl SwgohHelpClient {
    pub fn new(base_url: impl Into<String>, language: impl Into<String>, credentials: Credentials) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build();
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            language: language.into(),
            credentials,
            agent,
            token: Mutex::new(None),
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    /// Returns a valid bearer token, signing in again if the cached one is
    /// missing or about to expire.
    async fn token(&self) -> Result<String> {
        let mut guard = self.token.lock().await;
        if let Some(token) = guard.as_ref()
            && token.expires_at > Instant::now()
        {
            return Ok(token.value.clone());
        }
        let agent = self.agent.clone();
        let url = self.url("auth/signin");
        let credentials = self.credentials.clone();
        let response = blocking(move || {
            let response = agent
                .post(&url)
                .send_form(&[
                    ("username", credentials.username.as_str()),
                    ("password", credentials.password.as_str()),
                    ("grant_type", "password"),
                    ("client_id", credentials.client_id.as_str()),
                    ("client_secret", credentials.client_secret.as_str()),
                ])
                .map_err(map_sign_in_error)?;
            Ok(response.into_json::<SignInResponse>().map_err(|e| ErrorKind::Malformed(e.to_string()))?)
        })
        .await?;
        tracing::debug!(expires_in = response.expires_in, "Signed in to data API");
        let lifetime = Duration::from_secs(response.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
        let value = response.access_token.clone();
        *guard = Some(Token { value: response.access_token, expires_at: Instant::now() + lifetime });
        Ok(value)
    }
}

#[async_trait]
impl RemoteDataClient for SwgohHelpClient {
    async fn version(&self) -> Result<VersionDescriptor> {
        let agent = self.agent.clone();
        let url = self.url("version");
        let version = blocking(move || {
            let response = agent.get(&url).call().map_err(|e| ErrorKind::Unavailable(e.to_string()))?;
            Ok(response.into_json::<VersionDescriptor>().map_err(|e| ErrorKind::Malformed(e.to_string()))?)
        })
        .await?;
        tracing::debug!(%version, "Fetched remote version");
        Ok(version)
    }

    async fn fetch(&self, query: &Query) -> Result<Vec<Row>> {
        let token = self.token().await?;
        let agent = self.agent.clone();
        let url = self.url("swgoh/data");
        let collection = query.collection.clone();
        let mut body = serde_json::to_value(query).map_err(|e| ErrorKind::Malformed(e.to_string()))?;
        if let Value::Object(fields) = &mut body {
            fields.insert("language".to_string(), json!(self.language));
            fields.insert("enums".to_string(), json!(false));
        }
        let started = Instant::now();
        let response = blocking(move || {
            let response = agent
                .post(&url)
                .set("Authorization", &format!("Bearer {token}"))
                .send_json(body)
                .map_err(|e| map_query_error(e, &collection))?;
            let value = response.into_json::<Value>().map_err(|e| ErrorKind::Malformed(e.to_string()))?;
            Ok(rows_from_response(value, &collection)?)
        })
        .await?;
        tracing::debug!(
            collection = %query.collection,
            rows = response.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Fetched collection"
        );
        Ok(response)
    }
}

async fn blocking<T: Send + 'static>(task: impl FnOnce() -> Result<T> + Send + 'static) -> Result<T> {
    tokio::task::spawn_blocking(task).await.map_err(|e| ErrorKind::Unavailable(e.to_string()))?
}

fn map_sign_in_error(err: ureq::Error) -> ErrorKind {
    match err {
        ureq::Error::Status(code, response) => {
            let body = response.into_string().unwrap_or_default();
            ErrorKind::Authentication(format!("HTTP {code}: {body}"))
        },
        ureq::Error::Transport(transport) => ErrorKind::Unavailable(transport.to_string()),
    }
}

fn map_query_error(err: ureq::Error, collection: &str) -> ErrorKind {
    match err {
        ureq::Error::Status(code @ (401 | 403), _) => ErrorKind::Authentication(format!("HTTP {code}")),
        ureq::Error::Status(code, response) => ErrorKind::Rejected {
            collection: collection.to_string(),
            reason: format!("HTTP {code}: {}", response.into_string().unwrap_or_default()),
        },
        ureq::Error::Transport(transport) => ErrorKind::Unavailable(transport.to_string()),
    }
}

/// The service answers a query with either an array of rows or an object
/// describing what went wrong.
fn rows_from_response(value: Value, collection: &str) -> Result<Vec<Row>> {
    match value {
        Value::Array(rows) => Ok(rows),
        Value::Object(fields) if fields.contains_key("error") => exn::bail!(ErrorKind::Rejected {
            collection: collection.to_string(),
            reason: fields.get("error").map(Value::to_string).unwrap_or_default(),
        }),
        other => exn::bail!(ErrorKind::Malformed(format!("expected array of rows, found {other}"))),
    }
}
