use anyhow::Context;
use std::env;

/// Environment-driven configuration, loaded once at startup after dotenv.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub google_api_key: String,
    pub serpstack_api_key: String,
    pub jwt_secret: String,
    /// Separate secret for refresh tokens; falls back to `jwt_secret`.
    pub jwt_refresh_secret: Option<String>,
    /// Access-token lifetime in seconds.
    pub jwt_expires_in_secs: i64,
    /// Upper bound on a provider round-trip. Provider calls block the
    /// request that triggered them, so they always run under a timeout.
    pub provider_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Config> {
        Ok(Config {
            port: parse_or("PORT", 3000)?,
            database_url: required("DATABASE_URL")?,
            google_api_key: required("GOOGLE_API_KEY")?,
            serpstack_api_key: required("SERPSTACK_API_KEY")?,
            jwt_secret: required("JWT_SECRET")?,
            jwt_refresh_secret: env::var("JWT_REFRESH_SECRET").ok(),
            jwt_expires_in_secs: parse_or("JWT_EXPIRES_IN_SECS", 900)?,
            provider_timeout_secs: parse_or("PROVIDER_TIMEOUT_SECS", 120)?,
        })
    }
}

fn required(name: &str) -> anyhow::Result<String> {
    env::var(name).with_context(|| format!("{name} is not set"))
}

fn parse_or<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{name} is not a valid value")),
        Err(_) => Ok(default),
    }
}
