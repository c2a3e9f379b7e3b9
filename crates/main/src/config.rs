use std::{str::FromStr, time::Duration};

use db::PoolSettings;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a number, got {value:?}")]
    Malformed { name: &'static str, value: String },
    #[error("{name} must be at least 1")]
    Zero { name: &'static str },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_url: String,
    pub pool_size: u32,
    pub timeout: Duration,
    /// How often a conflicting transaction is attempted before giving up.
    pub transaction_attempts: u32,
    /// Fill an empty database with demo events on startup.
    pub seed_devdata: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from `lookup`, which maps the name of a
    /// variable to its value (if it is set).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let timeout: u64 = number(&lookup, "DATABASE_TIMEOUT", 5)?;
        Ok(Config {
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| "sqlite.db".to_string()),
            pool_size: positive(&lookup, "DATABASE_POOL_SIZE", 10)?,
            timeout: Duration::from_secs(timeout),
            transaction_attempts: positive(
                &lookup,
                "TRANSACTION_ATTEMPTS",
                5,
            )?,
            seed_devdata: lookup("SEED_DEVDATA")
                .is_some_and(|value| flag(&value)),
        })
    }

    pub fn pool_settings(&self) -> PoolSettings {
        PoolSettings {
            url: self.database_url.clone(),
            pool_size: self.pool_size,
            timeout: self.timeout,
            max_attempts: self.transaction_attempts,
        }
    }
}

fn number<T, F>(
    lookup: &F,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Malformed { name, value }),
    }
}

fn positive<F>(
    lookup: &F,
    name: &'static str,
    default: u32,
) -> Result<u32, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match number(lookup, name, default)? {
        0 => Err(ConfigError::Zero { name }),
        n => Ok(n),
    }
}

fn flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod test_config {
    use std::{collections::HashMap, time::Duration};

    use super::{Config, ConfigError};

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.database_url, "sqlite.db");
        assert_eq!(config.pool_size, 10);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.transaction_attempts, 5);
        assert!(!config.seed_devdata);
    }

    #[test]
    fn overrides() {
        let config = config(&[
            ("DATABASE_URL", "/tmp/votes.db"),
            ("DATABASE_POOL_SIZE", "3"),
            ("DATABASE_TIMEOUT", " 12 "),
            ("SEED_DEVDATA", "true"),
        ])
        .unwrap();
        assert_eq!(config.database_url, "/tmp/votes.db");
        assert_eq!(config.pool_size, 3);
        assert_eq!(config.timeout, Duration::from_secs(12));
        assert!(config.seed_devdata);
        assert_eq!(config.pool_settings().max_attempts, 5);
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        assert!(matches!(
            config(&[("DATABASE_POOL_SIZE", "many")]),
            Err(ConfigError::Malformed {
                name: "DATABASE_POOL_SIZE",
                ..
            })
        ));
        assert!(matches!(
            config(&[("TRANSACTION_ATTEMPTS", "0")]),
            Err(ConfigError::Zero { .. })
        ));
    }
}
