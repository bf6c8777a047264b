//! Outbound provider transport
//!
//! The [`Transport`] trait is the seam between the dispatcher and the
//! network. [`HttpTransport`] talks to the real vendor APIs over `reqwest`;
//! tests substitute scripted implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use switchboard_config::Config;
use switchboard_routing::{Provider, ProviderFamily};
use url::Url;

use crate::convert::ProviderCall;
use crate::error::LlmError;

/// Anthropic API version header value
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Longest provider error body kept in an error message
const MAX_ERROR_BODY: usize = 256;

/// Sends one provider call and returns the provider-native JSON response
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, call: &ProviderCall) -> Result<Value, LlmError>;
}

/// Default API base URL for each known provider
pub const fn default_base_url(provider: &Provider) -> Option<&'static str> {
    match provider {
        Provider::OpenAi => Some("https://api.openai.com/v1"),
        Provider::Anthropic => Some("https://api.anthropic.com/v1"),
        Provider::Google => Some("https://generativelanguage.googleapis.com/v1beta"),
        Provider::Groq => Some("https://api.groq.com/openai/v1"),
        Provider::Mistral => Some("https://api.mistral.ai/v1"),
        Provider::DeepSeek => Some("https://api.deepseek.com/v1"),
        Provider::OpenRouter => Some("https://openrouter.ai/api/v1"),
        Provider::Unknown(_) => None,
    }
}

/// Where and how to reach one provider
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub base_url: Url,
    pub api_key: Option<SecretString>,
}

/// `reqwest`-based transport for the real vendor APIs
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    endpoints: HashMap<Provider, Endpoint>,
}

impl HttpTransport {
    /// Transport with no providers registered
    pub fn new(client: Client) -> Self {
        Self {
            client,
            endpoints: HashMap::new(),
        }
    }

    /// Register every known provider, applying configured keys and base URLs
    pub fn from_config(config: &Config) -> Result<Self, LlmError> {
        let mut transport = Self::new(Client::new());

        for (name, provider_config) in &config.providers {
            let provider = Provider::from(name.as_str());
            let base_url = match &provider_config.base_url {
                Some(url) => Some(url.clone()),
                None => default_url(&provider)?,
            };
            let Some(base_url) = base_url else {
                tracing::warn!(provider = %name, "provider has no known API and no base_url, skipping");
                continue;
            };

            transport.endpoints.insert(
                provider,
                Endpoint {
                    base_url,
                    api_key: provider_config.api_key.clone(),
                },
            );
        }

        Ok(transport)
    }

    /// Register or replace one provider's endpoint
    #[must_use]
    pub fn with_endpoint(mut self, provider: Provider, endpoint: Endpoint) -> Self {
        self.endpoints.insert(provider, endpoint);
        self
    }

    /// Providers this transport can reach
    pub fn providers(&self) -> impl Iterator<Item = &Provider> {
        self.endpoints.keys()
    }

    fn request(&self, call: &ProviderCall) -> Result<RequestBuilder, LlmError> {
        let endpoint = self.endpoints.get(&call.provider).ok_or_else(|| LlmError::MissingCredential {
            provider: call.provider.to_string(),
        })?;

        let base = endpoint.base_url.as_str().trim_end_matches('/');
        let key = endpoint.api_key.as_ref().map(ExposeSecret::expose_secret);

        let builder = match call.family() {
            ProviderFamily::OpenAiCompatible => {
                let builder = self.client.post(format!("{base}/chat/completions"));
                match key {
                    Some(key) => builder.bearer_auth(key),
                    None => builder,
                }
            }
            ProviderFamily::Anthropic => {
                let builder = self
                    .client
                    .post(format!("{base}/messages"))
                    .header("anthropic-version", ANTHROPIC_VERSION);
                match key {
                    Some(key) => builder.header("x-api-key", key),
                    None => builder,
                }
            }
            ProviderFamily::Google => {
                let builder = self.client.post(format!("{base}/models/{}:generateContent", call.model));
                match key {
                    Some(key) => builder.header("x-goog-api-key", key),
                    None => builder,
                }
            }
            ProviderFamily::Unknown => {
                return Err(LlmError::UnsupportedProvider {
                    provider: call.provider.to_string(),
                });
            }
        };

        Ok(builder.json(&call.body))
    }
}

fn default_url(provider: &Provider) -> Result<Option<Url>, LlmError> {
    default_base_url(provider)
        .map(|raw| Url::parse(raw).map_err(|e| LlmError::Internal(format!("invalid default base URL {raw}: {e}"))))
        .transpose()
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, call: &ProviderCall) -> Result<Value, LlmError> {
        let response = self.request(call)?.send().await.map_err(|e| {
            let e = e.without_url();
            tracing::debug!(provider = %call.provider, model = %call.model, error = %e, "provider request failed");
            LlmError::Network(e.to_string())
        })?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());

        let body = response
            .text()
            .await
            .map_err(|e| LlmError::Network(e.without_url().to_string()))?;

        if !status.is_success() {
            tracing::debug!(provider = %call.provider, model = %call.model, status = %status, "provider returned error");
            return Err(classify_status(status, retry_after, &body));
        }

        // Non-JSON bodies are handed on as a string for best-effort normalization
        Ok(serde_json::from_str(&body).unwrap_or(Value::String(body)))
    }
}

/// Map an unsuccessful HTTP status to an error class
pub fn classify_status(status: StatusCode, retry_after: Option<u64>, body: &str) -> LlmError {
    let code = status.as_u16();

    match status {
        StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimited { retry_after },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LlmError::Authentication { status: code },
        StatusCode::REQUEST_TIMEOUT => LlmError::Upstream {
            status: code,
            message: truncate(body),
        },
        s if s.is_client_error() => LlmError::Rejected {
            status: code,
            message: truncate(body),
        },
        _ => LlmError::Upstream {
            status: code,
            message: truncate(body),
        },
    }
}

fn truncate(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_owned(),
    }
}
