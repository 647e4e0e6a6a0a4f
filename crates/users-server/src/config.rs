use std::env;

use anyhow::{bail, Context};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres { database_url: String },
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub store: StoreBackend,
    pub allowed_origins: Vec<String>,
    pub project_id: String,
    pub environment: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .with_context(|| format!("{key} must be set"))
        };

        let store = match lookup("USERS_STORE").as_deref().unwrap_or("postgres") {
            "postgres" => StoreBackend::Postgres {
                database_url: require("DATABASE_URL")?,
            },
            "memory" => StoreBackend::Memory,
            other => bail!("USERS_STORE must be `postgres` or `memory`, got `{other}`"),
        };

        let allowed_origins: Vec<String> = require("ALLOWED_ORIGINS")?
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();
        if allowed_origins.is_empty() {
            bail!("ALLOWED_ORIGINS must list at least one origin");
        }

        Ok(Self {
            store,
            allowed_origins,
            project_id: require("PROJECT_ID")?,
            environment: lookup("APP_ENV").unwrap_or_else(|| "development".to_string()),
            port: lookup("PORT")
                .unwrap_or_else(|| "3000".to_string())
                .parse()
                .context("PORT must be a valid port number")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn loads_postgres_config_with_defaults() {
        let config = config(&[
            ("DATABASE_URL", "postgres://localhost/users"),
            ("ALLOWED_ORIGINS", "https://a.example, https://b.example"),
            ("PROJECT_ID", "demo-project"),
        ])
        .unwrap();

        assert_eq!(
            config.store,
            StoreBackend::Postgres {
                database_url: "postgres://localhost/users".to_string()
            }
        );
        assert_eq!(
            config.allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert_eq!(config.environment, "development");
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn memory_store_does_not_need_database_url() {
        let config = config(&[
            ("USERS_STORE", "memory"),
            ("ALLOWED_ORIGINS", "*"),
            ("PROJECT_ID", "demo"),
            ("APP_ENV", "production"),
            ("PORT", "8080"),
        ])
        .unwrap();

        assert_eq!(config.store, StoreBackend::Memory);
        assert_eq!(config.environment, "production");
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn missing_required_value_names_the_variable() {
        let err = config(&[("USERS_STORE", "memory"), ("ALLOWED_ORIGINS", "*")]).unwrap_err();
        assert_eq!(err.to_string(), "PROJECT_ID must be set");

        let err = config(&[("ALLOWED_ORIGINS", "*"), ("PROJECT_ID", "demo")]).unwrap_err();
        assert_eq!(err.to_string(), "DATABASE_URL must be set");
    }

    #[test]
    fn rejects_allow_list_without_origins() {
        let err = config(&[
            ("USERS_STORE", "memory"),
            ("ALLOWED_ORIGINS", " , "),
            ("PROJECT_ID", "demo"),
        ])
        .unwrap_err();

        assert_eq!(err.to_string(), "ALLOWED_ORIGINS must list at least one origin");
    }

    #[test]
    fn rejects_unknown_store_backend() {
        let err = config(&[
            ("USERS_STORE", "redis"),
            ("ALLOWED_ORIGINS", "*"),
            ("PROJECT_ID", "demo"),
        ])
        .unwrap_err();

        assert!(err.to_string().contains("redis"));
    }
}
