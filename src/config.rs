use std::path::PathBuf;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub users_file: PathBuf,
    pub admin_key: String,
    pub session_expiry: time::Duration,
    pub log_level: String,
}

impl Config {
    /// Reads the process environment, after loading `.env` if there is one.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| dotenv::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_owned());

        let minutes = var("SESSION_EXPIRY_MINUTES", "60");
        let minutes: i64 = minutes
            .trim()
            .parse()
            .with_context(|| format!("SESSION_EXPIRY_MINUTES={minutes:?} is not a number"))?;
        anyhow::ensure!(minutes > 0, "SESSION_EXPIRY_MINUTES must be positive");

        Ok(Self {
            bind_addr: var("BIND_ADDR", "0.0.0.0:5000"),
            users_file: PathBuf::from(var("USERS_FILE", "users.json")),
            admin_key: var("ADMIN_KEY", "adminkey"),
            session_expiry: time::Duration::minutes(minutes),
            log_level: var("LOG_LEVEL", "info"),
        })
    }
}
