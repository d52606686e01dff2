//! Request dispatch shared by the ANAF service clients.
//!
//! Retries are not built in; callers own retry policy.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::core::AnafError;

pub(crate) fn build_client() -> Result<reqwest::Client, AnafError> {
    reqwest::Client::builder()
        .build()
        .map_err(|e| AnafError::Network(format!("failed to build HTTP client: {e}")))
}

/// Send `request` and map transport failures and non-2xx statuses.
pub(crate) async fn execute(
    client: &reqwest::Client,
    request: reqwest::Request,
    operation: &str,
) -> Result<reqwest::Response, AnafError> {
    tracing::debug!(
        operation,
        method = %request.method(),
        path = request.url().path(),
        "sending ANAF request"
    );

    let resp = client.execute(request).await.map_err(|e| {
        if e.is_timeout() {
            AnafError::Network(format!("{operation}: request timed out"))
        } else {
            AnafError::Network(format!("{operation}: {e}"))
        }
    })?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        tracing::debug!(operation, status = status.as_u16(), "ANAF request failed");
        return Err(api_error(status.as_u16(), &body));
    }

    Ok(resp)
}

/// Build [`AnafError::Api`] from an error body: `message`, else `error`,
/// else `"Unknown error"`.
pub(crate) fn api_error(status: u16, body: &str) -> AnafError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| {
            ["message", "error"]
                .iter()
                .find_map(|key| json.get(key).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| "Unknown error".to_string());
    AnafError::Api { status, message }
}

/// The `eroare` field the JSON services use for domain errors.
pub(crate) fn rejection(json: &Value) -> Option<String> {
    json.get("eroare")
        .and_then(Value::as_str)
        .filter(|msg| !msg.is_empty())
        .map(str::to_string)
}

#[cfg(feature = "efactura")]
pub(crate) fn is_json(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| ct.trim_start().starts_with("application/json"))
}

#[cfg(feature = "efactura")]
pub(crate) fn content_type(resp: &reqwest::Response) -> Option<String> {
    resp.headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

pub(crate) async fn read_text(resp: reqwest::Response, operation: &str) -> Result<String, AnafError> {
    resp.text()
        .await
        .map_err(|e| AnafError::Network(format!("{operation}: {e}")))
}

#[cfg(feature = "efactura")]
pub(crate) async fn read_bytes(resp: reqwest::Response, operation: &str) -> Result<Vec<u8>, AnafError> {
    resp.bytes()
        .await
        .map(|b| b.to_vec())
        .map_err(|e| AnafError::Network(format!("{operation}: {e}")))
}

/// Accept a number or a numeric string; anything else reads as 0.
pub(crate) fn lenient_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_u64().unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}
