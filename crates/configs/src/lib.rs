//! # configs
//!
//! Typed runtime configuration for the askforge binary. Values come from
//! defaults, an optional `askforge.toml`, and `ASKFORGE_*` environment
//! variables (highest precedence), e.g. `ASKFORGE_SERVER__PORT=9090`.

use secrecy::SecretString;
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Load(#[from] config::ConfigError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HS256 signing secret shared with the token issuer.
    pub jwt_secret: SecretString,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Sqlite,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Only read when `backend = "sqlite"`.
    pub sqlite_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub store: StoreConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let cfg = config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080_i64)?
            .set_default("auth.jwt_secret", "dev-secret-change-me")?
            .set_default("store.backend", "memory")?
            .set_default("store.sqlite_url", "sqlite:askforge.db")?
            .add_source(config::File::with_name("askforge").required(false))
            .add_source(config::Environment::with_prefix("ASKFORGE").separator("__"))
            .build()?;

        let app: AppConfig = cfg.try_deserialize()?;
        tracing::debug!(host = %app.server.host, port = app.server.port, "configuration loaded");
        Ok(app)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_load() {
        let cfg = AppConfig::load().expect("defaults must deserialize");
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.store.backend, StoreBackend::Memory);
    }
}
