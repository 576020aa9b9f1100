//! Application settings and the assembled server configuration.

use std::net::{IpAddr, SocketAddr};

use actix_web::cookie::{Key, SameSite, time::Duration};
use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::SkillModerationPolicy;
use crate::outbound::persistence::{DbPool, PoolConfig};

use super::session_config::SessionSettings;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

/// Process settings loaded from `SKILLSWAP_*` variables, a config file, or
/// command-line flags.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SKILLSWAP")]
pub struct AppSettings {
    /// Interface to bind, as an IP address.
    pub host: Option<String>,
    pub port: Option<u16>,
    /// PostgreSQL URL. Without one the server keeps state in memory.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
    /// Hold new skills for admin review instead of publishing them.
    #[ortho_config(default = false)]
    pub skill_review_required: bool,
}

/// Failure to turn settings into a socket address.
#[derive(Debug, thiserror::Error)]
#[error("invalid bind host {host:?}: {source}")]
pub struct BindAddrError {
    host: String,
    #[source]
    source: std::net::AddrParseError,
}

impl AppSettings {
    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, BindAddrError> {
        let host = self.host();
        let ip = host.parse::<IpAddr>().map_err(|source| BindAddrError {
            host: host.to_owned(),
            source,
        })?;
        Ok(SocketAddr::new(ip, self.port()))
    }

    pub fn moderation_policy(&self) -> SkillModerationPolicy {
        SkillModerationPolicy::from_review_required(self.skill_review_required)
    }

    /// Pool settings, if a database is configured.
    pub fn pool_config(&self) -> Option<PoolConfig> {
        let url = self.database_url.as_deref()?.trim();
        if url.is_empty() {
            return None;
        }
        let config = PoolConfig::new(url);
        Some(match self.db_max_connections {
            Some(max) => config.with_max_connections(max),
            None => config,
        })
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) session_ttl: Duration,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) moderation: SkillModerationPolicy,
}

impl ServerConfig {
    #[must_use]
    pub fn new(session: SessionSettings, bind_addr: SocketAddr) -> Self {
        let SessionSettings {
            key,
            cookie_secure,
            same_site,
            ttl,
        } = session;
        Self {
            key,
            cookie_secure,
            same_site,
            session_ttl: ttl,
            bind_addr,
            db_pool: None,
            moderation: SkillModerationPolicy::default(),
        }
    }

    /// Attach a database connection pool for the persistence adapters.
    ///
    /// Without one the server falls back to in-memory repositories.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    #[must_use]
    pub fn with_moderation(mut self, policy: SkillModerationPolicy) -> Self {
        self.moderation = policy;
        self
    }

    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 5] = [
        "SKILLSWAP_HOST",
        "SKILLSWAP_PORT",
        "SKILLSWAP_DATABASE_URL",
        "SKILLSWAP_DB_MAX_CONNECTIONS",
        "SKILLSWAP_SKILL_REVIEW_REQUIRED",
    ];

    fn load(overrides: &[(&str, &str)]) -> AppSettings {
        let _guard = lock_env(VARS.map(|name| {
            let value = overrides
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value).to_owned());
            (name, value)
        }));
        AppSettings::load_from_iter([OsString::from("skillswap")]).expect("config should load")
    }

    #[rstest]
    fn defaults_bind_every_interface_without_a_database() {
        let settings = load(&[]);
        assert_eq!(
            settings.bind_addr().expect("valid address"),
            SocketAddr::from(([0, 0, 0, 0], 8080))
        );
        assert!(settings.pool_config().is_none());
        assert_eq!(
            settings.moderation_policy(),
            SkillModerationPolicy::AutoApprove
        );
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let settings = load(&[
            ("SKILLSWAP_HOST", "127.0.0.1"),
            ("SKILLSWAP_PORT", "9000"),
            ("SKILLSWAP_DATABASE_URL", "postgres://localhost/skillswap"),
            ("SKILLSWAP_DB_MAX_CONNECTIONS", "4"),
            ("SKILLSWAP_SKILL_REVIEW_REQUIRED", "true"),
        ]);
        assert_eq!(
            settings.bind_addr().expect("valid address"),
            SocketAddr::from(([127, 0, 0, 1], 9000))
        );
        let pool = settings.pool_config().expect("database configured");
        assert_eq!(pool.database_url(), "postgres://localhost/skillswap");
        assert_eq!(pool.max_connections(), 4);
        assert_eq!(
            settings.moderation_policy(),
            SkillModerationPolicy::ReviewRequired
        );
    }

    #[rstest]
    fn hostnames_are_rejected() {
        let settings = load(&[("SKILLSWAP_HOST", "localhost")]);
        assert!(settings.bind_addr().is_err());
    }

    #[rstest]
    fn blank_database_urls_mean_memory() {
        let settings = load(&[("SKILLSWAP_DATABASE_URL", "  ")]);
        assert!(settings.pool_config().is_none());
    }
}
