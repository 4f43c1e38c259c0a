use anyhow::{bail, Context, Result};

use crate::engagement::reactions::ReactionPolicy;

/// Which document store backs the engagement collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub run_migrations: bool,
    pub port: u16,
    pub rust_log: String,
    pub reaction_policy: ReactionPolicy,
    pub comment_max_len: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            store_backend: StoreBackend::Memory,
            database_url: None,
            run_migrations: false,
            port: 8080,
            rust_log: "info".to_string(),
            reaction_policy: ReactionPolicy::Independent,
            comment_max_len: 2000,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let store_backend = match get("STORE_BACKEND").as_deref().unwrap_or("postgres") {
            "postgres" => StoreBackend::Postgres,
            "memory" => StoreBackend::Memory,
            other => bail!("STORE_BACKEND must be 'postgres' or 'memory', got '{other}'"),
        };

        let database_url = get("DATABASE_URL");
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            bail!("Required environment variable 'DATABASE_URL' is not set");
        }

        let reaction_policy = match get("REACTION_POLICY") {
            Some(raw) => raw
                .parse::<ReactionPolicy>()
                .map_err(|e| anyhow::anyhow!(e))
                .context("REACTION_POLICY is invalid")?,
            None => ReactionPolicy::Independent,
        };

        Ok(Config {
            store_backend,
            database_url,
            run_migrations: parse_or("RUN_MIGRATIONS", get("RUN_MIGRATIONS"), true)?,
            port: parse_or("PORT", get("PORT"), 8080)?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            reaction_policy,
            comment_max_len: parse_or("COMMENT_MAX_LEN", get("COMMENT_MAX_LEN"), 2000)?,
        })
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(v) => v
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{v}'")),
        None => Ok(default),
    }
}
