//! OAuth2 authorization-code flow against `logincert.anaf.ro`.
//!
//! ANAF authenticates the user with a qualified certificate in the browser,
//! then redirects back with a `code`. Tokens are requested as JWT.
//!
//! ```no_run
//! use anaf::oauth::OAuthClient;
//! use anaf::AnafConfig;
//!
//! # async fn run() -> Result<(), anaf::AnafError> {
//! let oauth = OAuthClient::from_config(&AnafConfig::from_env())?;
//! let url = oauth.authorization_url("csrf-state")?;
//! // ... user signs in, ANAF redirects with ?code=...
//! let token = oauth.exchange_code("code-from-redirect").await?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use reqwest::{Request, Url};
use serde::{Deserialize, Serialize};

use crate::core::{AnafConfig, AnafError, OAuthCredentials};
use crate::http::{self, lenient_u64};

/// Base of the ANAF OAuth2 endpoints.
pub const BASE_URL: &str = "https://logincert.anaf.ro/anaf-oauth2/v1";

const TOKEN_CONTENT_TYPE: &str = "jwt";

/// Token pair returned by `/token`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Lifetime in seconds.
    #[serde(default, deserialize_with = "lenient_u64")]
    pub expires_in: u64,
    #[serde(default)]
    pub token_type: String,
}

impl AccessToken {
    /// Expiry instant for a token obtained at `issued_at`.
    pub fn expires_at(&self, issued_at: DateTime<Utc>) -> DateTime<Utc> {
        let secs = i64::try_from(self.expires_in).unwrap_or(i64::MAX);
        TimeDelta::try_seconds(secs)
            .and_then(|delta| issued_at.checked_add_signed(delta))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// Parse a `/token` body.
pub fn parse_token(body: &str) -> Result<AccessToken, AnafError> {
    let token: AccessToken = serde_json::from_str(body)
        .map_err(|e| AnafError::InvalidResponse(format!("token: {e}")))?;
    if token.access_token.is_empty() {
        return Err(AnafError::InvalidResponse("token: empty access_token".into()));
    }
    Ok(token)
}

#[derive(Debug, Clone)]
pub struct OAuthClient {
    http: reqwest::Client,
    credentials: OAuthCredentials,
    base_url: String,
    timeout: Duration,
}

impl OAuthClient {
    /// # Errors
    ///
    /// [`AnafError::Config`] when the client ID, secret or redirect URI is blank.
    pub fn new(credentials: OAuthCredentials) -> Result<Self, AnafError> {
        for (name, value) in [
            ("client_id", &credentials.client_id),
            ("client_secret", &credentials.client_secret),
            ("redirect_uri", &credentials.redirect_uri),
        ] {
            if value.trim().is_empty() {
                return Err(AnafError::Config(format!("OAuth {name} is not set")));
            }
        }
        Ok(Self {
            http: http::build_client()?,
            credentials,
            base_url: BASE_URL.to_string(),
            timeout: Duration::from_secs(crate::core::DEFAULT_REQUEST_TIMEOUT_SECS),
        })
    }

    /// Build from [`AnafConfig::oauth`], using its request timeout.
    pub fn from_config(config: &AnafConfig) -> Result<Self, AnafError> {
        let credentials = config
            .oauth
            .clone()
            .ok_or_else(|| AnafError::Config("OAuth credentials are not configured".into()))?;
        let mut client = Self::new(credentials)?;
        client.timeout = config.request_timeout();
        Ok(client)
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Where to send the user's browser to start the flow.
    pub fn authorization_url(&self, state: &str) -> Result<Url, AnafError> {
        Url::parse_with_params(
            &format!("{}/authorize", self.base_url),
            &[
                ("response_type", "code"),
                ("client_id", self.credentials.client_id.as_str()),
                ("redirect_uri", self.credentials.redirect_uri.as_str()),
                ("state", state),
                ("token_content_type", TOKEN_CONTENT_TYPE),
            ],
        )
        .map_err(|e| AnafError::Config(format!("invalid OAuth base URL: {e}")))
    }

    /// Trade the `code` from the redirect for a token pair.
    pub async fn exchange_code(&self, code: &str) -> Result<AccessToken, AnafError> {
        let request = self.token_request(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.credentials.redirect_uri.as_str()),
        ])?;
        self.send_token(request).await
    }

    /// Obtain a fresh access token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AccessToken, AnafError> {
        let request = self.token_request(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])?;
        self.send_token(request).await
    }

    async fn send_token(&self, request: Request) -> Result<AccessToken, AnafError> {
        let resp = http::execute(&self.http, request, "token").await?;
        let token = parse_token(&http::read_text(resp, "token").await?)?;
        tracing::debug!(expires_in = token.expires_in, "obtained ANAF access token");
        Ok(token)
    }

    fn token_request(&self, grant: &[(&str, &str)]) -> Result<Request, AnafError> {
        let mut form: Vec<(&str, &str)> = grant.to_vec();
        form.extend([
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("token_content_type", TOKEN_CONTENT_TYPE),
        ]);
        self.http
            .post(format!("{}/token", self.base_url))
            .timeout(self.timeout)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&form)
            .build()
            .map_err(|e| AnafError::Config(format!("invalid request: {e}")))
    }
}
