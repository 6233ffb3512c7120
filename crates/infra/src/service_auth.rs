use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use serde_json::json;

use crate::cache::TtlCache;
use crate::config::AppConfig;

const SERVICE_TOKEN_CACHE_KEY: &str = "s2s";

#[derive(Debug, thiserror::Error)]
pub enum ServiceAuthError {
    #[error("service auth rejected the lease request: {0}")]
    Rejected(String),
    #[error("service auth transport error: {0}")]
    Transport(String),
    #[error("service auth upstream error: status {status}: {body}")]
    Upstream { status: u16, body: String },
}

/// Leases service-to-service tokens for outbound case-store calls and keeps
/// the current lease in an explicit TTL cache.
#[derive(Clone)]
pub struct ServiceTokenProvider {
    http: reqwest::Client,
    base_url: String,
    microservice: String,
    secret: String,
    cache: Arc<TtlCache<String>>,
}

impl ServiceTokenProvider {
    pub fn from_config(config: &AppConfig, http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: config.s2s_base_url.trim_end_matches('/').to_string(),
            microservice: config.s2s_microservice.clone(),
            secret: config.s2s_secret.clone(),
            cache: Arc::new(TtlCache::new(Duration::from_millis(
                config.service_token_cache_ttl_ms,
            ))),
        }
    }

    pub async fn lease(&self) -> Result<String, ServiceAuthError> {
        if let Some(token) = self.cache.get(SERVICE_TOKEN_CACHE_KEY) {
            return Ok(token);
        }

        let url = format!("{}/lease", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&json!({
                "microservice": self.microservice,
                "oneTimePassword": self.secret,
            }))
            .send()
            .await
            .map_err(|err| ServiceAuthError::Transport(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| ServiceAuthError::Transport(err.to_string()))?;
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ServiceAuthError::Rejected(body));
        }
        if !status.is_success() {
            return Err(ServiceAuthError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let token = body.trim().to_string();
        if token.is_empty() {
            return Err(ServiceAuthError::Upstream {
                status: status.as_u16(),
                body: "lease returned an empty token".to_string(),
            });
        }
        self.cache.put(SERVICE_TOKEN_CACHE_KEY, token.clone());
        Ok(token)
    }

    /// Drops the cached lease, forcing the next call to fetch a fresh token.
    pub fn evict(&self) {
        self.cache.invalidate(SERVICE_TOKEN_CACHE_KEY);
    }
}
