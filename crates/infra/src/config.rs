use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app_env: String,
    pub port: u16,
    pub log_level: String,
    pub jwt_secret: String,
    pub case_store_base_url: String,
    pub role_assignment_base_url: String,
    /// Which authorization backend handles role grants: `case-store`
    /// (legacy endpoint on the case store) or `assignment-service`.
    pub role_assignment_backend: String,
    /// Identity provider base URL. Empty disables remote token resolution
    /// and the api falls back to local JWT validation.
    pub idam_base_url: String,
    pub s2s_base_url: String,
    pub s2s_microservice: String,
    pub s2s_secret: String,
    pub http_timeout_ms: u64,
    pub user_info_cache_ttl_ms: u64,
    pub service_token_cache_ttl_ms: u64,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();
        let cfg = config::Config::builder()
            .set_default("app_env", "development")?
            .set_default("port", 3000)?
            .set_default("log_level", "info")?
            .set_default("jwt_secret", "dev-secret")?
            .set_default("case_store_base_url", "http://127.0.0.1:4452")?
            .set_default("role_assignment_base_url", "http://127.0.0.1:4096")?
            .set_default("role_assignment_backend", "case-store")?
            .set_default("idam_base_url", "")?
            .set_default("s2s_base_url", "http://127.0.0.1:4502")?
            .set_default("s2s_microservice", "tribunal_case_api")?
            .set_default("s2s_secret", "AAAAAAAAAAAAAAAA")?
            .set_default("http_timeout_ms", 10_000)?
            .set_default("user_info_cache_ttl_ms", 300_000)?
            .set_default("service_token_cache_ttl_ms", 3_600_000)?
            .add_source(config::Environment::default().separator("__"))
            .build()?;
        cfg.try_deserialize()
    }

    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("production")
    }

    pub fn idam_enabled(&self) -> bool {
        !self.idam_base_url.trim().is_empty()
    }
}
