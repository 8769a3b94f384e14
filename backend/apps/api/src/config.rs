//! Server Configuration
//!
//! Read from the process environment (after `.env` is loaded). A variable
//! that is missing falls back to its default; one that is present but
//! unparsable also falls back, with a warning, so a typo never keeps the
//! server from starting.

use platform::rate_limit::RateLimitConfig;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_ORIGINS: &str = "*";
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_DB_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_DB_MAX_LIFETIME: Duration = Duration::from_secs(30);
pub const DEFAULT_DB_IDLE_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Connection pool settings. Kept small: the statistics API is read-only
/// and typically shares its database with other tenants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// `DATABASE_URL`; startup fails without it
    pub url: Option<String>,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub max_lifetime: Duration,
    pub idle_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub rate_limit: RateLimitConfig,
    /// Comma-separated CORS origins; `*` allows any
    pub cors_origins: String,
}

impl Config {
    /// Load `.env` if present, then read the environment.
    pub fn load() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = RateLimitConfig::default();

        let server = ServerConfig {
            host: lookup("SERVER_HOST")
                .map(|host| host.trim().to_string())
                .filter(|host| !host.is_empty())
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parsed(&lookup, "SERVER_PORT", DEFAULT_PORT),
        };

        let database = DatabaseConfig {
            url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            max_connections: parsed(&lookup, "DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS),
            acquire_timeout: duration(&lookup, "DB_ACQUIRE_TIMEOUT", DEFAULT_DB_ACQUIRE_TIMEOUT),
            max_lifetime: duration(&lookup, "DB_CONN_MAX_LIFETIME", DEFAULT_DB_MAX_LIFETIME),
            idle_timeout: duration(&lookup, "DB_CONN_MAX_IDLE_TIME", DEFAULT_DB_IDLE_TIMEOUT),
        };

        let rate_limit = RateLimitConfig {
            enabled: parsed(&lookup, "RATE_LIMIT_ENABLED", defaults.enabled),
            requests_per_minute: parsed(
                &lookup,
                "RATE_LIMIT_REQUESTS_PER_MINUTE",
                defaults.requests_per_minute,
            ),
            burst_size: parsed(&lookup, "RATE_LIMIT_BURST_SIZE", defaults.burst_size),
            window: duration(&lookup, "RATE_LIMIT_WINDOW_SIZE", defaults.window),
            cleanup_interval: duration(
                &lookup,
                "RATE_LIMIT_CLEANUP_INTERVAL",
                defaults.cleanup_interval,
            ),
        };

        let cors_origins = lookup("FRONTEND_ORIGINS")
            .filter(|origins| !origins.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ORIGINS.to_string());

        Self {
            server,
            database,
            rate_limit,
            cors_origins,
        }
    }
}

fn parsed<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> T
where
    T: FromStr + std::fmt::Debug,
{
    let Some(raw) = lookup(name) else {
        return default;
    };
    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!(variable = name, value = %raw, ?default, "Invalid value, using default");
            default
        }
    }
}

fn duration(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: Duration) -> Duration {
    let Some(raw) = lookup(name) else {
        return default;
    };
    match parse_duration(&raw) {
        Some(value) if !value.is_zero() => value,
        _ => {
            tracing::warn!(variable = name, value = %raw, ?default, "Invalid duration, using default");
            default
        }
    }
}

/// Parse a duration the way Go's `time.ParseDuration` does: one or more
/// decimal numbers, each with an optional fraction and a unit suffix
/// (`ns`, `us`/`µs`, `ms`, `s`, `m`, `h`), e.g. `300ms`, `1.5s`, `1h30m`.
/// A bare number is taken as seconds. Signs are rejected.
pub fn parse_duration(raw: &str) -> Option<Duration> {
    let raw: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if raw.is_empty() {
        return None;
    }
    if raw.bytes().all(|b| b.is_ascii_digit()) {
        return raw.parse().ok().map(Duration::from_secs);
    }

    let mut rest = raw.as_str();
    let mut total_nanos: u128 = 0;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .unwrap_or(rest.len());
        let (number, tail) = rest.split_at(number_len);
        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);

        let unit_nanos: u128 = match unit {
            "ns" => 1,
            "us" | "µs" | "μs" => 1_000,
            "ms" => 1_000_000,
            "s" => 1_000_000_000,
            "m" => 60 * 1_000_000_000,
            "h" => 60 * 60 * 1_000_000_000,
            _ => return None,
        };
        total_nanos = total_nanos.checked_add(scaled(number, unit_nanos)?)?;
        rest = tail;
    }

    let secs = u64::try_from(total_nanos / 1_000_000_000).ok()?;
    Some(Duration::new(secs, (total_nanos % 1_000_000_000) as u32))
}

/// `number` (digits with at most one `.`) times `unit_nanos`, truncated to
/// whole nanoseconds.
fn scaled(number: &str, unit_nanos: u128) -> Option<u128> {
    let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if fraction.contains('.') {
        return None;
    }

    let whole: u128 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let mut nanos = whole.checked_mul(unit_nanos)?;

    let mut scale = unit_nanos;
    for digit in fraction.bytes() {
        scale /= 10;
        if scale == 0 {
            break;
        }
        nanos = nanos.checked_add(u128::from(digit - b'0') * scale)?;
    }
    Some(nanos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(
            config.server,
            ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080
            }
        );
        assert_eq!(config.rate_limit, RateLimitConfig::default());
        assert_eq!(config.cors_origins, "*");
        assert_eq!(
            config.database,
            DatabaseConfig {
                url: None,
                max_connections: 5,
                acquire_timeout: Duration::from_secs(5),
                max_lifetime: Duration::from_secs(30),
                idle_timeout: Duration::from_secs(15),
            }
        );
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("SERVER_HOST", "0.0.0.0"),
            ("SERVER_PORT", "31113"),
            ("RATE_LIMIT_ENABLED", "false"),
            ("RATE_LIMIT_REQUESTS_PER_MINUTE", "5"),
            ("RATE_LIMIT_BURST_SIZE", "2"),
            ("RATE_LIMIT_WINDOW_SIZE", "30s"),
            ("RATE_LIMIT_CLEANUP_INTERVAL", "10m"),
            ("FRONTEND_ORIGINS", "http://localhost:3000"),
            ("DATABASE_URL", "postgres://covid@localhost/covid"),
            ("DB_MAX_CONNECTIONS", "12"),
            ("DB_CONN_MAX_LIFETIME", "1m30s"),
            ("DB_CONN_MAX_IDLE_TIME", "7.5s"),
        ]);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 31113);
        assert!(!config.rate_limit.enabled);
        assert_eq!(config.rate_limit.requests_per_minute, 5);
        assert_eq!(config.rate_limit.burst_size, 2);
        assert_eq!(config.rate_limit.window, Duration::from_secs(30));
        assert_eq!(config.rate_limit.cleanup_interval, Duration::from_secs(600));
        assert_eq!(config.cors_origins, "http://localhost:3000");
        assert_eq!(
            config.database.url.as_deref(),
            Some("postgres://covid@localhost/covid")
        );
        assert_eq!(config.database.max_connections, 12);
        assert_eq!(config.database.max_lifetime, Duration::from_secs(90));
        assert_eq!(config.database.idle_timeout, Duration::from_millis(7500));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config_from(&[
            ("SERVER_PORT", "http"),
            ("RATE_LIMIT_ENABLED", "yes please"),
            ("RATE_LIMIT_REQUESTS_PER_MINUTE", "-1"),
            ("RATE_LIMIT_WINDOW_SIZE", "soon"),
            ("RATE_LIMIT_CLEANUP_INTERVAL", "0s"),
            ("DATABASE_URL", "  "),
            ("DB_MAX_CONNECTIONS", "many"),
        ]);
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.database.url, None);
        assert_eq!(config.database.max_connections, DEFAULT_DB_MAX_CONNECTIONS);
        assert_eq!(config.rate_limit, RateLimitConfig::default());
    }

    #[test]
    fn test_parse_duration() {
        let cases = [
            ("500ms", Some(Duration::from_millis(500))),
            ("30s", Some(Duration::from_secs(30))),
            ("1m", Some(Duration::from_secs(60))),
            ("2h", Some(Duration::from_secs(7200))),
            ("45", Some(Duration::from_secs(45))),
            (" 5 m ", Some(Duration::from_secs(300))),
            ("1m30s", Some(Duration::from_secs(90))),
            ("1h15m30.5s", Some(Duration::from_millis(4_530_500))),
            ("1.5s", Some(Duration::from_millis(1500))),
            (".5m", Some(Duration::from_secs(30))),
            ("2.5h", Some(Duration::from_secs(9000))),
            ("1500us", Some(Duration::from_micros(1500))),
            ("250ns", Some(Duration::from_nanos(250))),
            ("", None),
            ("m", None),
            (".s", None),
            ("1d", None),
            ("1.2.3s", None),
            ("1m30", None),
            ("-3s", None),
            ("+3s", None),
        ];
        for (raw, expected) in cases {
            assert_eq!(parse_duration(raw), expected, "input {raw:?}");
        }
    }
}
