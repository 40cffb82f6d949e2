use async_trait::async_trait;
use log::{error, warn, debug};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::engine::{DecodingConfig, TranslationEngine};
use crate::errors::EngineError;
use crate::language_utils;

/// Client for a model server that hosts the translation model
///
/// The server exposes `GET /health`, `POST /translate`, `POST /unload` and
/// `POST /reload`. Language codes are sent as NLLB codes.
#[derive(Debug)]
pub struct HttpEngine {
    /// Base URL of the model server, always ending with '/'
    base_url: Url,
    /// HTTP client for making requests
    client: Client,
    /// Maximum number of retry attempts for transport failures
    max_retries: u32,
    /// Base backoff time in milliseconds for exponential backoff
    backoff_base_ms: u64,
}

/// Translate request for the model server
#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    texts: &'a [String],
    source_language: String,
    target_language: String,
    generation: &'a DecodingConfig,
}

/// Translate response from the model server
#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translations: Vec<Option<String>>,
}

/// Health response from the model server
#[derive(Debug, Deserialize)]
struct HealthResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    model_loaded: bool,
}

/// Generic acknowledgement for lifecycle calls
#[derive(Debug, Deserialize)]
struct AckResponse {
    #[serde(default)]
    ok: bool,
}

impl HttpEngine {
    /// Create a client for the server at `endpoint`
    pub fn new(endpoint: &str, timeout_secs: u64, max_retries: u32, backoff_base_ms: u64) -> Result<Self, EngineError> {
        let with_scheme = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.to_string()
        } else {
            format!("http://{}", endpoint)
        };
        let normalized = if with_scheme.ends_with('/') {
            with_scheme
        } else {
            format!("{}/", with_scheme)
        };
        let base_url = Url::parse(&normalized)
            .map_err(|e| EngineError::ConnectionError(format!("Invalid endpoint '{}': {}", endpoint, e)))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            // Keep connections alive between batches
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .build()
            .map_err(|e| EngineError::ConnectionError(e.to_string()))?;

        Ok(Self {
            base_url,
            client,
            max_retries,
            backoff_base_ms,
        })
    }

    /// Base URL of the server
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn url(&self, path: &str) -> Result<Url, EngineError> {
        self.base_url
            .join(path)
            .map_err(|e| EngineError::RequestFailed(format!("Invalid URL for '{}': {}", path, e)))
    }

    fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.backoff_base_ms.saturating_mul(1u64 << attempt.min(16)))
    }

    /// Send a request with retry on transport errors and server errors
    async fn send_with_retry<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<R, EngineError> {
        let url = self.url(path)?;
        let mut attempt = 0;

        loop {
            let request = match body {
                Some(body) => self.client.post(url.clone()).json(body),
                None => self.client.get(url.clone()),
            };

            let error = match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let text = response.text().await
                            .map_err(|e| EngineError::ParseError(format!("Failed to read response body: {}", e)))?;
                        return serde_json::from_str::<R>(&text).map_err(|e| {
                            error!("Failed to parse engine response from {}: {}. Raw response (first 500 chars): {}",
                                   path, e, text.chars().take(500).collect::<String>());
                            EngineError::ParseError(e.to_string())
                        });
                    }

                    let message = response.text().await.unwrap_or_default();
                    let api_error = EngineError::ApiError {
                        status_code: status.as_u16(),
                        message,
                    };
                    // Client errors will not get better on retry
                    if status.is_client_error() {
                        return Err(api_error);
                    }
                    api_error
                }
                Err(e) if e.is_connect() || e.is_timeout() => EngineError::ConnectionError(e.to_string()),
                Err(e) => EngineError::RequestFailed(e.to_string()),
            };

            if attempt >= self.max_retries {
                return Err(error);
            }

            let delay = self.backoff(attempt);
            warn!("Engine call to {} failed ({}), retrying in {:?}", path, error, delay);
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// Check whether the server has a model loaded
    pub async fn health(&self) -> Result<bool, EngineError> {
        let health: HealthResponse = self.send_with_retry::<(), _>("health", None).await?;
        debug!("Engine health: status={}, model_loaded={}", health.status, health.model_loaded);
        Ok(health.model_loaded)
    }
}

#[async_trait]
impl TranslationEngine for HttpEngine {
    async fn load(&mut self) -> Result<(), EngineError> {
        if self.health().await? {
            return Ok(());
        }

        // The server reloads from its configured model path
        let ack: AckResponse = self.send_with_retry("reload", Some(&serde_json::json!({}))).await?;
        if !ack.ok || !self.health().await? {
            return Err(EngineError::LoadFailed("server did not report a loaded model".to_string()));
        }
        Ok(())
    }

    async fn unload(&mut self) -> Result<(), EngineError> {
        let _: AckResponse = self.send_with_retry("unload", Some(&serde_json::json!({}))).await?;
        Ok(())
    }

    async fn reload(&mut self) -> Result<(), EngineError> {
        let ack: AckResponse = self
            .send_with_retry("reload", Some(&serde_json::json!({})))
            .await
            .map_err(|e| EngineError::LoadFailed(e.to_string()))?;
        if !ack.ok {
            return Err(EngineError::LoadFailed("server refused to reload".to_string()));
        }
        Ok(())
    }

    async fn translate(
        &self,
        texts: &[String],
        source_language: &str,
        target_language: &str,
        config: &DecodingConfig,
    ) -> Result<Vec<Option<String>>, EngineError> {
        let request = TranslateRequest {
            texts,
            source_language: language_utils::nllb_code(source_language),
            target_language: language_utils::nllb_code(target_language),
            generation: config,
        };

        let response: TranslateResponse = self.send_with_retry("translate", Some(&request)).await?;
        Ok(response.translations)
    }
}
