use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;

use tribunal_domain::identity::UserInfo;
use tribunal_domain::ports::idam::{IdentityError, IdentityProvider};
use tribunal_domain::ports::BoxFuture;

use crate::cache::TtlCache;
use crate::config::AppConfig;

/// Identity provider client. Lookups are cached per bearer token with a
/// configured TTL so a batch of role modifications resolves the caller once.
#[derive(Clone)]
pub struct IdamClient {
    http: reqwest::Client,
    base_url: String,
    cache: Arc<TtlCache<UserInfo>>,
}

#[derive(Debug, Deserialize)]
struct UserInfoWire {
    uid: String,
    #[serde(default)]
    given_name: Option<String>,
    #[serde(default)]
    family_name: Option<String>,
}

impl IdamClient {
    pub fn from_config(config: &AppConfig, http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: config.idam_base_url.trim_end_matches('/').to_string(),
            cache: Arc::new(TtlCache::new(Duration::from_millis(
                config.user_info_cache_ttl_ms,
            ))),
        }
    }
}

impl IdentityProvider for IdamClient {
    fn user_info(&self, bearer: &str) -> BoxFuture<'_, Result<UserInfo, IdentityError>> {
        let bearer = bearer.to_string();
        Box::pin(async move {
            if let Some(info) = self.cache.get(&bearer) {
                return Ok(info);
            }
            if self.base_url.is_empty() {
                return Err(IdentityError::Transport(
                    "identity provider is not configured".to_string(),
                ));
            }

            let url = format!("{}/o/userinfo", self.base_url);
            let response = self
                .http
                .get(&url)
                .bearer_auth(&bearer)
                .send()
                .await
                .map_err(|err| IdentityError::Transport(err.to_string()))?;

            let status = response.status();
            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                return Err(IdentityError::Unauthorized);
            }
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(IdentityError::Transport(format!(
                    "status {}: {}",
                    status.as_u16(),
                    body
                )));
            }
            let wire = response
                .json::<UserInfoWire>()
                .await
                .map_err(|err| IdentityError::InvalidResponse(err.to_string()))?;
            let info = UserInfo {
                uid: wire.uid,
                given_name: wire.given_name,
                family_name: wire.family_name,
            };
            self.cache.put(bearer, info.clone());
            Ok(info)
        })
    }
}
