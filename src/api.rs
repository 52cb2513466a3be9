// API client module: talks to the content management API of a single
// deployment. Every call takes the base URL explicitly so one client can
// serve every stored connection profile; the underlying reqwest client
// (and its connection pool) is shared across calls.

use std::fmt;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response, Url};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Path of the OAuth token endpoint, relative to the base URL.
pub const TOKEN_PATH: &str = "/api/episerver/connect/token";

/// Path of the content creation endpoint, relative to the base URL.
pub const CONTENT_PATH: &str = "/api/episerver/v3.0/contentmanagement";

const MISSING_TOKEN: &str = "Failed to retrieve access token.";
const EMPTY_TOKEN: &str = "Received an empty access token.";

/// Errors produced by [`ContentClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The base URL is not an absolute http(s) URL. Raised before any
    /// request is sent.
    #[error("invalid base URL `{0}`: expected an absolute http or https URL")]
    InvalidBaseUrl(String),

    /// Network, DNS or TLS failure, passed through from reqwest.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("{status} {reason}\n{body}")]
    Api {
        status: u16,
        reason: String,
        body: String,
    },

    /// The token endpoint answered successfully but without a usable token.
    #[error("{0}")]
    Protocol(String),
}

/// Bearer token returned by the token endpoint.
///
/// Only ever held in memory; `Debug` does not print the value.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Shape of the token endpoint response. Only `access_token` is read.
#[derive(Deserialize, Debug)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
}

/// Client for the token and content management endpoints.
#[derive(Clone, Debug)]
pub struct ContentClient {
    client: Client,
}

impl ContentClient {
    /// Build a client with reqwest's default transport settings.
    pub fn new() -> Result<Self, ClientError> {
        let client = Client::builder().build()?;
        Ok(Self { client })
    }

    /// Wrap an existing reqwest client, e.g. one configured with a proxy.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Exchange client credentials for a bearer token.
    ///
    /// Sends a single form-encoded POST to [`TOKEN_PATH`]; the returned
    /// token is trimmed of surrounding whitespace.
    pub async fn get_access_token(
        &self,
        base_url: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Result<AccessToken, ClientError> {
        let url = endpoint(base_url, TOKEN_PATH)?;
        debug!(%url, client_id, "requesting access token");

        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", client_id),
            ("client_secret", client_secret),
        ];
        let res = self.client.post(&url).form(&form).send().await?;
        let body = ensure_success(res).await?.text().await?;

        parse_token(&body)
    }

    /// Submit `json_body` to [`CONTENT_PATH`] and return the response body
    /// verbatim. The payload is not validated locally.
    pub async fn create_content(
        &self,
        base_url: &str,
        access_token: &AccessToken,
        json_body: &str,
    ) -> Result<String, ClientError> {
        let url = endpoint(base_url, CONTENT_PATH)?;
        debug!(%url, bytes = json_body.len(), "creating content");

        let res = self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", access_token.as_str()))
            .header(CONTENT_TYPE, "application/json; charset=utf-8")
            .body(json_body.to_owned())
            .send()
            .await?;

        Ok(ensure_success(res).await?.text().await?)
    }
}

/// Join `path` onto `base_url`, ignoring trailing slashes on the base.
fn endpoint(base_url: &str, path: &str) -> Result<String, ClientError> {
    let base = base_url.trim().trim_end_matches('/');
    match Url::parse(base) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {
            Ok(format!("{base}{path}"))
        }
        _ => Err(ClientError::InvalidBaseUrl(base_url.to_string())),
    }
}

/// Turn a non-success response into [`ClientError::Api`], keeping the body.
async fn ensure_success(res: Response) -> Result<Response, ClientError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let reason = status.canonical_reason().unwrap_or_default().to_string();
    let body = res.text().await.unwrap_or_default();
    warn!(status = status.as_u16(), %reason, "request rejected by server");
    Err(ClientError::Api {
        status: status.as_u16(),
        reason,
        body,
    })
}

fn parse_token(body: &str) -> Result<AccessToken, ClientError> {
    let token = serde_json::from_str::<TokenResponse>(body)
        .ok()
        .and_then(|r| r.access_token)
        .ok_or_else(|| ClientError::Protocol(MISSING_TOKEN.into()))?;

    let token = token.trim();
    if token.is_empty() {
        return Err(ClientError::Protocol(EMPTY_TOKEN.into()));
    }
    Ok(AccessToken(token.to_string()))
}
