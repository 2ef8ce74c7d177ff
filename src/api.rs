//! HTTP transport to the question-answering service.
//!
//! The [`Backend`] trait is the seam between the controller and the network.
//! [`HttpBackend`] implements it with `reqwest`; tests substitute in-process
//! fakes.
//!
//! Responses are returned for every HTTP status. Only a request that never
//! completes is an error ([`TransportError`]); a non-2xx status is an
//! ordinary [`ApiResponse`] whose body the caller decides how to show.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use crate::config::ServerConfig;

pub const GET_STATE: &str = "/getState";
pub const MODELS: &str = "/models";
pub const SELECTED_MODEL: &str = "/selectedModel";
pub const INGEST: &str = "/ingest";
pub const ANSWER: &str = "/answer";
pub const SITES: &str = "/sites";
pub const CLEAR: &str = "/clear";
pub const HEALTH: &str = "/health";

/// A request that did not produce an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("invalid request URL: {0}")]
    InvalidUrl(String),
    #[error("failed to encode request body: {0}")]
    Encode(String),
    #[error("{0}")]
    Network(String),
}

/// Decoded response body.
///
/// The `content-type` header picks the variant: anything mentioning
/// `application/json` is parsed as JSON, everything else is kept as text.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

impl ResponseBody {
    pub fn decode(content_type: Option<&str>, raw: String) -> Self {
        let is_json = content_type
            .map(|ct| ct.to_ascii_lowercase().contains("application/json"))
            .unwrap_or(false);
        if is_json {
            // A body that lies about its type is still worth showing.
            match serde_json::from_str(&raw) {
                Ok(value) => ResponseBody::Json(value),
                Err(_) => ResponseBody::Text(raw),
            }
        } else {
            ResponseBody::Text(raw)
        }
    }

    /// Pretty-printed JSON, or the text unchanged.
    pub fn pretty(&self) -> String {
        match self {
            ResponseBody::Json(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
            ResponseBody::Text(text) => text.clone(),
        }
    }

    /// Strings as-is, any other JSON value stringified on one line.
    pub fn message(&self) -> String {
        match self {
            ResponseBody::Json(Value::String(s)) => s.clone(),
            ResponseBody::Json(value) => value.to_string(),
            ResponseBody::Text(text) => text.clone(),
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Text(_) => None,
        }
    }
}

/// An HTTP response with its status and decoded body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: ResponseBody,
}

impl ApiResponse {
    pub fn json(status: u16, value: Value) -> Self {
        Self {
            status,
            body: ResponseBody::Json(value),
        }
    }

    pub fn text(status: u16, text: impl Into<String>) -> Self {
        Self {
            status,
            body: ResponseBody::Text(text.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Deserializes a JSON body into `T`. `None` for text bodies or shape mismatches.
    pub fn parse<T: serde::de::DeserializeOwned>(&self) -> Option<T> {
        self.body
            .as_json()
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }
}

/// Transport used by the controller.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn get(&self, path: &str) -> Result<ApiResponse, TransportError>;

    /// POSTs `body` as JSON, or an empty body when `None`.
    async fn post(&self, path: &str, body: Option<&Value>) -> Result<ApiResponse, TransportError>;
}

/// [`Backend`] over HTTP with `reqwest`.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: reqwest::Url,
}

impl HttpBackend {
    pub fn new(config: &ServerConfig) -> anyhow::Result<Self> {
        let base_url = reqwest::Url::parse(&config.base_url)?;
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            client: builder.build()?,
            base_url,
        })
    }

    fn url(&self, path: &str) -> Result<reqwest::Url, TransportError> {
        // Keep any path prefix on the base URL (e.g. `https://host/rag/`).
        let mut joined = self.base_url.as_str().trim_end_matches('/').to_string();
        joined.push_str(path);
        reqwest::Url::parse(&joined).map_err(|e| TransportError::InvalidUrl(e.to_string()))
    }

    async fn read(response: reqwest::Response) -> Result<ApiResponse, TransportError> {
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let raw = response
            .text()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(ApiResponse {
            status,
            body: ResponseBody::decode(content_type.as_deref(), raw),
        })
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn get(&self, path: &str) -> Result<ApiResponse, TransportError> {
        let url = self.url(path)?;
        tracing::debug!(%url, "GET");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Self::read(response).await
    }

    async fn post(&self, path: &str, body: Option<&Value>) -> Result<ApiResponse, TransportError> {
        let url = self.url(path)?;
        tracing::debug!(%url, "POST");
        let mut request = self.client.post(url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Self::read(response).await
    }
}
