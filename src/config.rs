use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Process-wide configuration, read once on first access.
///
/// Sources, lowest priority first:
/// - built-in defaults
/// - bare `DATABASE_URL`
/// - `PASSKEEP_*` environment variables (e.g. `PASSKEEP_BCRYPT_COST=12`)
pub static CONFIG: LazyLock<Config> = LazyLock::new(|| {
    Config::load().unwrap_or_else(|e| {
        // tracing is not initialized yet at this point
        eprintln!("failed to load configuration, using defaults: {e}");
        Config::default()
    })
});

/// Work factor of the hashes already stored by the previous deployment.
pub const DEFAULT_BCRYPT_COST: u32 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database_url: String,
    pub listen_addr: String,
    pub loglevel: String,
    pub bcrypt_cost: u32,
    pub max_connections: u32,
    /// Shared key required on every call when set.
    pub api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://passkeep.sqlite".to_string(),
            listen_addr: "0.0.0.0:8000".to_string(),
            loglevel: "info".to_string(),
            bcrypt_cost: DEFAULT_BCRYPT_COST,
            max_connections: 5,
            api_key: None,
        }
    }
}

impl Config {
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Env::raw().only(&["DATABASE_URL"]))
            .merge(Env::prefixed("PASSKEEP_"))
    }

    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_replaced_deployment() {
        let cfg = Config::default();
        assert_eq!(cfg.bcrypt_cost, 10);
        assert_eq!(cfg.listen_addr, "0.0.0.0:8000");
        assert!(cfg.api_key.is_none());
    }

    #[test]
    fn env_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("DATABASE_URL", "sqlite://legacy.sqlite");
            jail.set_env("PASSKEEP_BCRYPT_COST", "12");
            jail.set_env("PASSKEEP_API_KEY", "s3cret");

            let cfg = Config::load()?;
            assert_eq!(cfg.database_url, "sqlite://legacy.sqlite");
            assert_eq!(cfg.bcrypt_cost, 12);
            assert_eq!(cfg.api_key.as_deref(), Some("s3cret"));
            Ok(())
        });
    }

    #[test]
    fn prefixed_database_url_wins_over_bare() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("DATABASE_URL", "sqlite://legacy.sqlite");
            jail.set_env("PASSKEEP_DATABASE_URL", "sqlite://new.sqlite");

            let cfg = Config::load()?;
            assert_eq!(cfg.database_url, "sqlite://new.sqlite");
            Ok(())
        });
    }
}
