// ============================================================================
// API CLIENT - HTTP transport only (stateless)
// ============================================================================
// Attaches the bearer token when one is held and turns HTTP 429 into
// ApiError::RateLimited. No business logic lives here.
// ============================================================================

use gloo_net::http::{Request, RequestBuilder};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::CONFIG;
use crate::error::{ApiError, RATE_LIMIT_FALLBACK_MESSAGE};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiClient {
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn from_config() -> Self {
        Self::new(CONFIG.api_url())
    }

    /// Copy of this client that authenticates with `token`.
    pub fn with_token(&self, token: Option<String>) -> Self {
        Self {
            base_url: self.base_url.clone(),
            token: token.filter(|t| !t.is_empty()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn authorization_header(&self) -> Option<String> {
        self.token.as_ref().map(|token| format!("Bearer {}", token))
    }

    fn prepare(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder.header("Content-Type", "application/json");
        match self.authorization_header() {
            Some(auth) => builder.header("Authorization", &auth),
            None => builder,
        }
    }

    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Map<String, Value>, ApiError> {
        let url = self.url(path);
        log::debug!("📡 [API] POST {}", url);

        let request = self
            .prepare(Request::post(&url))
            .json(body)
            .map_err(|e| ApiError::Serialization(e.to_string()))?;
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        interpret_response(status, &text)
    }

    pub async fn get_json(&self, path: &str) -> Result<Map<String, Value>, ApiError> {
        let url = self.url(path);
        log::debug!("📡 [API] GET {}", url);

        let response = self
            .prepare(Request::get(&url))
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        interpret_response(status, &text)
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::from_config()
    }
}

/// Parses a request body handed over by the view layer as a JSON string.
pub(crate) fn parse_request_body(json: &str) -> Result<Value, ApiError> {
    serde_json::from_str(json).map_err(|e| ApiError::Serialization(e.to_string()))
}

/// Text a caller outside the crate sees for a failed call.
pub(crate) fn failure_text(err: &ApiError) -> String {
    err.server_message()
        .map(str::to_string)
        .unwrap_or_else(|| err.to_string())
}

/// Maps a status code and raw body onto the client's result type.
pub(crate) fn interpret_response(status: u16, body: &str) -> Result<Map<String, Value>, ApiError> {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let message = parsed
        .as_ref()
        .and_then(|v| v.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string);

    match status {
        200..=299 => {
            if body.trim().is_empty() {
                return Ok(Map::new());
            }
            match parsed {
                Some(Value::Object(map)) => Ok(map),
                Some(other) => Err(ApiError::Parse(format!("expected a JSON object, got {}", other))),
                None => Err(ApiError::Parse("response body is not JSON".to_string())),
            }
        }
        429 => {
            let message = message.unwrap_or_else(|| RATE_LIMIT_FALLBACK_MESSAGE.to_string());
            log::warn!("⏳ [API] AI rate limit exceeded: {}", message);
            Err(ApiError::RateLimited { message })
        }
        _ => Err(ApiError::Http { status, message }),
    }
}
