use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub session: SessionConfig,
}

/// Settings for the signed session cookie.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub secret: String,
    pub cookie_name: String,
    /// Lifetime of a browser-session token.
    pub ttl_hours: i64,
    /// Lifetime of a "remember me" token and cookie.
    pub remember_days: i64,
    pub secure: bool,
}

impl SessionConfig {
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            cookie_name: "__session".to_string(),
            ttl_hours: 24,
            remember_days: 30,
            secure: false,
        }
    }
}

/// One year, in hours.
const MAX_TTL_HOURS: i64 = 24 * 366;
const MAX_REMEMBER_DAYS: i64 = 366;

/// Parse an optional positive integer setting no larger than `max`.
fn bounded(name: &str, raw: Option<&str>, default: i64, max: i64) -> anyhow::Result<i64> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    let value = raw
        .trim()
        .parse::<i64>()
        .map_err(|_| anyhow::anyhow!("{name} must be a whole number, got {raw:?}"))?;
    if !(1..=max).contains(&value) {
        anyhow::bail!("{name} must be between 1 and {max}, got {value}");
    }
    Ok(value)
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);

        let secret = env::var("SESSION_SECRET")
            .map_err(|_| anyhow::anyhow!("SESSION_SECRET is not set"))?;
        let mut session = SessionConfig::with_secret(secret);
        if let Ok(name) = env::var("SESSION_COOKIE_NAME") {
            session.cookie_name = name;
        }
        session.ttl_hours = bounded(
            "SESSION_TTL_HOURS",
            env::var("SESSION_TTL_HOURS").ok().as_deref(),
            session.ttl_hours,
            MAX_TTL_HOURS,
        )?;
        session.remember_days = bounded(
            "SESSION_REMEMBER_DAYS",
            env::var("SESSION_REMEMBER_DAYS").ok().as_deref(),
            session.remember_days,
            MAX_REMEMBER_DAYS,
        )?;
        session.secure = env::var("SESSION_SECURE_COOKIE")
            .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            port,
            database_url,
            host,
            session,
        })
    }
}
