//! MyMemory translation API client.
//!
//! A single `GET /get?q=<text>&langpair=<source>|<target>` per translation.
//! See: <https://mymemory.translated.net/doc/spec.php>

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use super::traits::TranslationProvider;
use crate::types::Language;
use crate::{Result, TolkError};

/// Default base URL for the MyMemory API
pub const DEFAULT_BASE_URL: &str = "https://api.mymemory.translated.net";

/// Client for the MyMemory translation API.
#[derive(Clone)]
pub struct MyMemoryClient {
    http: Client,
    base_url: String,
    email: Option<String>,
}

impl MyMemoryClient {
    /// Create a client for the public endpoint.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client with a custom base URL (for testing with wiremock).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            email: None,
        }
    }

    /// Contact email sent as `de=`; MyMemory grants a larger daily quota to
    /// identified callers.
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Default for MyMemoryClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranslationProvider for MyMemoryClient {
    fn name(&self) -> &str {
        "mymemory"
    }

    async fn translate(
        &self,
        text: &str,
        source: &Language,
        target: &Language,
    ) -> Result<String> {
        let url = format!("{}/get", self.base_url);
        let langpair = format!("{source}|{target}");

        let mut query = vec![("q", text), ("langpair", langpair.as_str())];
        if let Some(email) = self.email.as_deref() {
            query.push(("de", email));
        }

        let response = self
            .http
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TolkError::Timeout
                } else {
                    TolkError::Http(e.to_string())
                }
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(TolkError::RateLimited {
                retry_after: parse_retry_after(response.headers()),
            });
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TolkError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| TolkError::Http(e.to_string()))?;
        parse_body(&body)
    }
}

/// Response envelope. Only the fields we act on are modelled.
#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(rename = "responseData")]
    response_data: Option<ResponseData>,
    /// MyMemory repeats the status in the body, sometimes as a string, and
    /// reports quota exhaustion here with an HTTP 200.
    #[serde(rename = "responseStatus")]
    response_status: Option<serde_json::Value>,
    #[serde(rename = "responseDetails")]
    response_details: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ResponseData {
    #[serde(rename = "translatedText")]
    translated_text: Option<serde_json::Value>,
}

/// Extract the translation from a response body.
fn parse_body(body: &str) -> Result<String> {
    let parsed: TranslateResponse = serde_json::from_str(body)?;

    if let Some(status) = parsed.response_status.as_ref().and_then(status_code) {
        if status == 429 {
            return Err(TolkError::RateLimited { retry_after: None });
        }
        if status != 200 {
            let message = parsed
                .response_details
                .as_ref()
                .and_then(|d| d.as_str())
                .unwrap_or_default()
                .to_string();
            return Err(TolkError::Api { status, message });
        }
    }

    match parsed.response_data.and_then(|d| d.translated_text) {
        Some(serde_json::Value::String(text)) => Ok(text),
        _ => Err(TolkError::EmptyResponse),
    }
}

fn status_code(value: &serde_json::Value) -> Option<u16> {
    match value {
        serde_json::Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// `Retry-After` in delta-seconds form. HTTP-date values are ignored.
fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
