use std::env;
use std::time::Duration;

/// Requests-per-minute limits for the public endpoints.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    /// POST /api/validate
    pub validate_rpm: u32,
    /// GET /health
    pub relaxed_rpm: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            validate_rpm: 30,
            relaxed_rpm: 60,
        }
    }
}

/// Credentials for the admin API. Checked on every request; nothing is cached
/// between requests.
#[derive(Clone)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    /// None disables the admin API (every admin request is rejected).
    pub admin: Option<AdminCredentials>,
    /// Upper bound on waiting for a pooled connection or a database lock.
    pub store_timeout: Duration,
    pub rate_limit: RateLimitConfig,
    pub dev_mode: bool,
}

fn env_u32(name: &str, default: u32) -> u32 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let dev_mode = env::var("LICENSE_ENV")
            .map(|v| v == "dev" || v == "development")
            .unwrap_or(false);

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let database_path = env::var("DB_PATH")
            .or_else(|_| env::var("DATABASE_PATH"))
            .unwrap_or_else(|_| "license_keys.db".to_string());

        let admin = match (env::var("ADMIN_USERNAME"), env::var("ADMIN_PASSWORD")) {
            (Ok(username), Ok(password)) if !username.is_empty() && !password.is_empty() => {
                Some(AdminCredentials { username, password })
            }
            _ => None,
        };

        let defaults = RateLimitConfig::default();

        Self {
            host,
            port,
            database_path,
            admin,
            store_timeout: Duration::from_secs(env_u32("STORE_TIMEOUT_SECS", 5) as u64),
            rate_limit: RateLimitConfig {
                validate_rpm: env_u32("RATE_LIMIT_VALIDATE_RPM", defaults.validate_rpm),
                relaxed_rpm: env_u32("RATE_LIMIT_RELAXED_RPM", defaults.relaxed_rpm),
            },
            dev_mode,
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
