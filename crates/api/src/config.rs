//! Environment-driven configuration, loaded once at start-up.

use anyhow::{Context, bail};
use chrono::Duration;

use quotedesk_auth::NewUser;
use quotedesk_infra::DEFAULT_MAX_ATTEMPTS;

const DEV_JWT_SECRET: &str = "dev-secret";

/// Where documents, catalogs and accounts are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Persistence {
    InMemory,
    Postgres { database_url: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub persistence: Persistence,
    pub allocation_max_attempts: u32,
    /// Account created at start-up if missing. `None` disables seeding.
    pub seed_admin: Option<NewUser>,
}

impl AppConfig {
    /// Read the process environment (plus an optional `.env` file).
    pub fn from_env() -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// In-memory stores with the default seeded account.
    pub fn in_memory(jwt_secret: impl Into<String>) -> Self {
        Self {
            bind_addr: "127.0.0.1:0".to_string(),
            jwt_secret: jwt_secret.into(),
            token_ttl: Duration::minutes(720),
            persistence: Persistence::InMemory,
            allocation_max_attempts: DEFAULT_MAX_ATTEMPTS,
            seed_admin: Some(default_admin(&|_: &str| None)),
        }
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let jwt_secret = get("JWT_SECRET").filter(|s| !s.is_empty()).unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            DEV_JWT_SECRET.to_string()
        });

        let token_ttl_minutes: i64 = parse_or(&get, "TOKEN_TTL_MINUTES", 720)?;
        if token_ttl_minutes <= 0 {
            bail!("TOKEN_TTL_MINUTES must be positive");
        }

        let persistence = if parse_or(&get, "USE_PERSISTENT_STORES", false)? {
            let database_url = get("DATABASE_URL")
                .context("DATABASE_URL must be set when USE_PERSISTENT_STORES=true")?;
            Persistence::Postgres { database_url }
        } else {
            Persistence::InMemory
        };

        let allocation_max_attempts = parse_or(&get, "ALLOCATION_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)?;
        if allocation_max_attempts == 0 {
            bail!("ALLOCATION_MAX_ATTEMPTS must be at least 1");
        }

        let seed_admin = parse_or(&get, "SEED_ADMIN", true)?.then(|| default_admin(&get));

        Ok(Self {
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string()),
            jwt_secret,
            token_ttl: Duration::minutes(token_ttl_minutes),
            persistence,
            allocation_max_attempts,
            seed_admin,
        })
    }
}

fn default_admin(get: &dyn Fn(&str) -> Option<String>) -> NewUser {
    NewUser {
        username: get("SEED_ADMIN_USERNAME").unwrap_or_else(|| "Admin".to_string()),
        password: get("SEED_ADMIN_PASSWORD").unwrap_or_else(|| "admin".to_string()),
        display_name: Some(get("SEED_ADMIN_NAME").unwrap_or_else(|| "Administrator".to_string())),
        email: Some(
            get("SEED_ADMIN_EMAIL").unwrap_or_else(|| "admin@masdevelopers.in".to_string()),
        ),
    }
}

fn parse_or<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid {key} '{raw}': {e}")),
    }
}
