//! Server configuration parsed from environment variables.
//!
//! Everything has a default so `cargo run` works with no environment at all.
//! Values that are present but unparseable are a startup error rather than a
//! silent fallback.

use std::net::IpAddr;
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_CLIENT_QUEUE_CAPACITY: usize = 256;
pub const DEFAULT_MAX_STROKE_POINTS: usize = 10_000;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bind_addr: IpAddr,
    pub port: u16,
    /// Outbound frames buffered per connection before deliveries are dropped.
    pub client_queue_capacity: usize,
    pub max_stroke_points: usize,
    /// Directory holding the browser client, served at `/` when set.
    pub static_dir: Option<PathBuf>,
    /// Mounts `POST /api/dev/reset`.
    pub dev_reset_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::from([0, 0, 0, 0]),
            port: DEFAULT_PORT,
            client_queue_capacity: DEFAULT_CLIENT_QUEUE_CAPACITY,
            max_stroke_points: DEFAULT_MAX_STROKE_POINTS,
            static_dir: None,
            dev_reset_enabled: false,
        }
    }
}

impl Config {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `BIND_ADDR`: default `0.0.0.0`
    /// - `CLIENT_QUEUE_CAPACITY`: default 256, must be non-zero
    /// - `MAX_STROKE_POINTS`: default 10000, must be at least 2
    /// - `STATIC_DIR`: unset disables static file serving
    /// - `DEV_RESET_ENABLED`: `true`/`1` enables the reset endpoint
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first malformed variable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] but reads through `lookup`, so tests do
    /// not have to mutate the process environment.
    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_addr = parse_var(&lookup, "BIND_ADDR")?.unwrap_or(IpAddr::from([0, 0, 0, 0]));
        let port = parse_var(&lookup, "PORT")?.unwrap_or(DEFAULT_PORT);

        let client_queue_capacity =
            parse_var(&lookup, "CLIENT_QUEUE_CAPACITY")?.unwrap_or(DEFAULT_CLIENT_QUEUE_CAPACITY);
        if client_queue_capacity == 0 {
            return Err(ConfigError::Invalid { var: "CLIENT_QUEUE_CAPACITY", value: "0".into() });
        }

        let max_stroke_points = parse_var(&lookup, "MAX_STROKE_POINTS")?.unwrap_or(DEFAULT_MAX_STROKE_POINTS);
        if max_stroke_points < 2 {
            return Err(ConfigError::Invalid { var: "MAX_STROKE_POINTS", value: max_stroke_points.to_string() });
        }

        let static_dir = lookup("STATIC_DIR")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let dev_reset_enabled = match lookup("DEV_RESET_ENABLED") {
            None => false,
            Some(raw) => parse_flag(&raw).ok_or(ConfigError::Invalid { var: "DEV_RESET_ENABLED", value: raw })?,
        };

        Ok(Self { bind_addr, port, client_queue_capacity, max_stroke_points, static_dir, dev_reset_enabled })
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
{
    let Some(raw) = lookup(var) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<T>()
        .map(Some)
        .map_err(|_| ConfigError::Invalid { var, value: raw })
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
