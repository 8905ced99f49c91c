use std::env;
use std::time::Duration;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub default_speed_kmh: f64,
    pub minutes_per_stop: f64,
    pub crosswalk_radius_m: f64,
    pub crosswalk_limit_kmh: f64,
    pub routing_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_port: 3000,
            log_level: "info".to_string(),
            default_speed_kmh: 45.0,
            minutes_per_stop: 5.0,
            crosswalk_radius_m: 15.0,
            crosswalk_limit_kmh: 10.0,
            routing_timeout_ms: 3000,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();
        let defaults = Self::default();

        Ok(Self {
            http_port: parse_or_default("HTTP_PORT", defaults.http_port)?,
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            default_speed_kmh: parse_or_default("DEFAULT_SPEED_KMH", defaults.default_speed_kmh)?,
            minutes_per_stop: parse_or_default("MINUTES_PER_STOP", defaults.minutes_per_stop)?,
            crosswalk_radius_m: parse_or_default("CROSSWALK_RADIUS_M", defaults.crosswalk_radius_m)?,
            crosswalk_limit_kmh: parse_or_default(
                "CROSSWALK_LIMIT_KMH",
                defaults.crosswalk_limit_kmh,
            )?,
            routing_timeout_ms: parse_or_default("ROUTING_TIMEOUT_MS", defaults.routing_timeout_ms)?,
        })
    }

    pub fn routing_timeout(&self) -> Duration {
        Duration::from_millis(self.routing_timeout_ms)
    }
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}
