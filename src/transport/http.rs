use std::time::Instant;

use async_trait::async_trait;
use reqwest::{Proxy, StatusCode};

use super::{SynthesisBackend, SynthesisRequest};
use crate::audio::AudioClip;
use crate::config::{Config, Credential, PROXY_VAR};
use crate::{Error, ErrorContext, Result};

const BODY_EXCERPT_LIMIT: usize = 256;

/// reqwest-backed synthesis against hosted inference endpoints.
pub struct HttpSynthesisBackend {
    client: reqwest::Client,
    credential: Credential,
}

impl HttpSynthesisBackend {
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = reqwest::Client::builder();

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(proxy_url) = &config.proxy_url {
            let proxy = Proxy::all(proxy_url).map_err(|e| {
                Error::configuration_with_context(
                    format!("invalid proxy: {}", e),
                    ErrorContext::new()
                        .with_field_path(PROXY_VAR)
                        .with_source("http_backend"),
                )
            })?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().map_err(|e| {
            Error::configuration_with_context(
                format!("Failed to create HTTP client: {}", e),
                ErrorContext::new().with_source("http_backend"),
            )
        })?;

        Ok(Self {
            client,
            credential: config.credential.clone(),
        })
    }
}

#[async_trait]
impl SynthesisBackend for HttpSynthesisBackend {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<AudioClip> {
        let endpoint = request.model.endpoint.clone();
        let started = Instant::now();
        tracing::debug!(model = %request.model.name, %endpoint, chars = request.text.chars().count(), "sending synthesis request");

        let response = self
            .client
            .post(endpoint)
            .bearer_auth(self.credential.expose())
            .header("Content-Type", "application/json")
            .json(&request.payload())
            .send()
            .await
            .map_err(TransportError::from)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(TransportError::from)?;

        if status != StatusCode::OK {
            let excerpt: String = String::from_utf8_lossy(&bytes)
                .chars()
                .take(BODY_EXCERPT_LIMIT)
                .collect();
            return Err(Error::Remote {
                status: status.as_u16(),
                message: excerpt,
            });
        }

        tracing::debug!(
            model = %request.model.name,
            bytes = bytes.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "synthesis response received"
        );
        Ok(AudioClip::wav(bytes))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("HTTP error: {0}")]
    Http(reqwest::Error),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else {
            TransportError::Http(e)
        }
    }
}
