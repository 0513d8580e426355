use super::config::ApiConfig;
use super::token::TokenStore;
use crate::core::{AdminError, Result};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::{Instrument, Level, event, info_span};
use uuid::Uuid;

/// Header carrying a per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// JSON-over-HTTP client for the admin backend.
///
/// The bearer token is looked up in the token store for every request and
/// omitted when absent. Non-2xx responses become [`AdminError::Api`] with the
/// backend's `detail` message.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ApiConfig,
    tokens: Arc<dyn TokenStore>,
}

impl ApiClient {
    pub fn new(config: ApiConfig, tokens: Arc<dyn TokenStore>) -> Result<Self> {
        config.validate().map_err(AdminError::Config)?;

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            http,
            config,
            tokens,
        })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    pub fn set_token(&self, token: &str) -> Result<()> {
        self.tokens.set(&self.config.token_key, token)
    }

    pub fn clear_token(&self) -> Result<()> {
        self.tokens.remove(&self.config.token_key)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let request = self.request(Method::GET, path)?;
        self.send(Method::GET, path, request).await
    }

    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let request = self.request(Method::GET, path)?.query(query);
        self.send(Method::GET, path, request).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self.request(Method::POST, path)?.json(body);
        self.send(Method::POST, path, request).await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self.request(Method::PUT, path)?.json(body);
        self.send(Method::PUT, path, request).await
    }

    pub async fn patch<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self.request(Method::PATCH, path)?.json(body);
        self.send(Method::PATCH, path, request).await
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        let request = self.request(Method::DELETE, path)?;
        self.send::<JsonValue>(Method::DELETE, path, request)
            .await
            .map(|_| ())
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let mut request = self
            .http
            .request(method, self.config.endpoint(path))
            .header(REQUEST_ID_HEADER, Uuid::new_v4().to_string());

        if let Some(token) = self.tokens.get(&self.config.token_key)? {
            request = request.bearer_auth(token);
        }

        Ok(request)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        request: RequestBuilder,
    ) -> Result<T> {
        let span = info_span!("api_request", method = %method, path = %path);

        async move {
            let response = request.send().await.map_err(|err| {
                event!(Level::WARN, error = %err, "request failed");
                AdminError::from(err)
            })?;
            let status = response.status();
            let body = response.bytes().await?;

            if !status.is_success() {
                let detail = extract_detail(&body).unwrap_or_else(|| fallback_detail(status));
                event!(Level::WARN, status = status.as_u16(), detail = %detail, "backend rejected request");
                return Err(AdminError::Api {
                    status: status.as_u16(),
                    detail,
                });
            }

            event!(Level::DEBUG, status = status.as_u16(), "request completed");
            if body.iter().all(u8::is_ascii_whitespace) {
                return Ok(serde_json::from_value(JsonValue::Null)?);
            }
            Ok(serde_json::from_slice(&body)?)
        }
        .instrument(span)
        .await
    }
}

/// Pulls a readable message out of an error body.
///
/// Understands `{"detail": "..."}`, validation lists of the form
/// `{"detail": [{"msg": "..."}]}`, `{"message": "..."}` and short plain-text
/// bodies.
pub fn extract_detail(body: &[u8]) -> Option<String> {
    match serde_json::from_slice::<JsonValue>(body) {
        Ok(JsonValue::Object(fields)) => {
            let detail = fields.get("detail").or_else(|| fields.get("message"))?;
            match detail {
                JsonValue::String(text) => non_blank(text),
                JsonValue::Array(entries) => {
                    let messages: Vec<String> = entries
                        .iter()
                        .filter_map(|entry| match entry {
                            JsonValue::String(text) => non_blank(text),
                            JsonValue::Object(item) => item
                                .get("msg")
                                .and_then(JsonValue::as_str)
                                .and_then(non_blank),
                            _ => None,
                        })
                        .collect();
                    (!messages.is_empty()).then(|| messages.join("; "))
                }
                JsonValue::Null => None,
                other => Some(other.to_string()),
            }
        }
        Ok(JsonValue::String(text)) => non_blank(&text),
        Ok(_) => None,
        Err(_) => {
            let text = String::from_utf8_lossy(body);
            let text = text.trim();
            (!text.is_empty() && text.len() <= 200 && !text.starts_with('<'))
                .then(|| text.to_string())
        }
    }
}

fn non_blank(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn fallback_detail(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}
