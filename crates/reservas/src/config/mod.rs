use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::booking::BookingRules;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub booking: BookingConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let app_origin = env::var("APP_ORIGIN")
            .unwrap_or_else(|_| DEFAULT_APP_ORIGIN.to_string())
            .trim_end_matches('/')
            .to_string();

        let defaults = BookingRules::default();
        let rules = BookingRules {
            court_window_days: days_var("BOOKING_COURT_WINDOW_DAYS", defaults.court_window_days)?,
            room_window_days: days_var("BOOKING_ROOM_WINDOW_DAYS", defaults.room_window_days)?,
            room_fetch_days: days_var("BOOKING_ROOM_FETCH_DAYS", defaults.room_fetch_days)?,
        };
        if rules.room_fetch_days < rules.room_window_days {
            return Err(ConfigError::FetchWindowTooNarrow {
                fetch_days: rules.room_fetch_days,
                window_days: rules.room_window_days,
            });
        }

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            booking: BookingConfig { app_origin, rules },
        })
    }
}

const DEFAULT_APP_ORIGIN: &str = "http://localhost:3000";

fn days_var(var: &'static str, default: i64) -> Result<i64, ConfigError> {
    match env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|days| *days >= 0)
            .ok_or(ConfigError::InvalidNumber { var }),
        Err(_) => Ok(default),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Booking windows plus the public origin used to build cancellation links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingConfig {
    pub app_origin: String,
    pub rules: BookingRules,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            app_origin: DEFAULT_APP_ORIGIN.to_string(),
            rules: BookingRules::default(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { var: &'static str },
    FetchWindowTooNarrow { fetch_days: i64, window_days: i64 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { var } => {
                write!(f, "{var} must be a non-negative number of days")
            }
            ConfigError::FetchWindowTooNarrow {
                fetch_days,
                window_days,
            } => write!(
                f,
                "BOOKING_ROOM_FETCH_DAYS ({fetch_days}) must cover the room booking window ({window_days})"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::FetchWindowTooNarrow { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APP_ENV");
        env::remove_var("APP_HOST");
        env::remove_var("APP_PORT");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("APP_ORIGIN");
        env::remove_var("BOOKING_COURT_WINDOW_DAYS");
        env::remove_var("BOOKING_ROOM_WINDOW_DAYS");
        env::remove_var("BOOKING_ROOM_FETCH_DAYS");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.booking, BookingConfig::default());
        assert_eq!(config.booking.rules.court_window_days, 7);
        assert_eq!(config.booking.rules.room_window_days, 30);
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn strips_trailing_slash_from_origin() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_ORIGIN", "https://reservas.example.org/");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.booking.app_origin, "https://reservas.example.org");
        reset_env();
    }

    #[test]
    fn rejects_fetch_window_narrower_than_booking_window() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("BOOKING_ROOM_FETCH_DAYS", "10");
        match AppConfig::load() {
            Err(ConfigError::FetchWindowTooNarrow {
                fetch_days: 10,
                window_days: 30,
            }) => {}
            other => panic!("expected fetch window error, got {other:?}"),
        }
        reset_env();
    }

    #[test]
    fn rejects_non_numeric_windows() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("BOOKING_COURT_WINDOW_DAYS", "a week");
        match AppConfig::load() {
            Err(ConfigError::InvalidNumber { var }) => {
                assert_eq!(var, "BOOKING_COURT_WINDOW_DAYS")
            }
            other => panic!("expected invalid number, got {other:?}"),
        }
        reset_env();
    }
}
