//! Client configuration.
//!
//! Passed explicitly into each client constructor; nothing here reads
//! process-wide state except [`AnafConfig::from_env`].

use serde::Deserialize;
use std::time::Duration;

/// Default per-request timeout, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

/// Redirect URI used when none is configured.
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost/auth/anaf/callback";

/// Settings shared by the e-Factura, taxpayer and OAuth clients.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AnafConfig {
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Use the e-Factura sandbox (`/test/FCTEL/rest`) instead of production.
    pub efactura_test_mode: bool,
    /// OAuth2 application credentials, if registered.
    pub oauth: Option<OAuthCredentials>,
}

impl Default for AnafConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            efactura_test_mode: false,
            oauth: None,
        }
    }
}

/// Credentials of an application registered in the ANAF portal.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OAuthCredentials {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
}

fn default_redirect_uri() -> String {
    DEFAULT_REDIRECT_URI.to_string()
}

impl AnafConfig {
    /// Read the configuration from `ANAF_*` environment variables.
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `ANAF_REQUEST_TIMEOUT` | `request_timeout_secs` |
    /// | `ANAF_EFACTURA_TEST_MODE` | `efactura_test_mode` |
    /// | `ANAF_CLIENT_ID` / `ANAF_CLIENT_SECRET` | `oauth` |
    /// | `ANAF_REDIRECT_URI` | `oauth.redirect_uri` |
    ///
    /// Unparsable values fall back to the defaults. `oauth` is only set when
    /// both the client ID and the secret are present.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let request_timeout_secs = lookup("ANAF_REQUEST_TIMEOUT")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(defaults.request_timeout_secs);

        let efactura_test_mode = lookup("ANAF_EFACTURA_TEST_MODE")
            .and_then(|v| parse_flag(&v))
            .unwrap_or(defaults.efactura_test_mode);

        let oauth = match (lookup("ANAF_CLIENT_ID"), lookup("ANAF_CLIENT_SECRET")) {
            (Some(client_id), Some(client_secret)) => Some(OAuthCredentials {
                client_id,
                client_secret,
                redirect_uri: lookup("ANAF_REDIRECT_URI").unwrap_or_else(default_redirect_uri),
            }),
            _ => None,
        };

        Self {
            request_timeout_secs,
            efactura_test_mode,
            oauth,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
