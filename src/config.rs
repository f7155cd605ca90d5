use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub booking: BookingConfig,
    #[serde(default)]
    pub realtime: RealtimeConfig,
    #[serde(default)]
    pub webhook: WebhookConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Tokens are issued by the external identity provider and signed with
/// the shared project secret (HS256).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default)]
    pub leeway_secs: u64,
}

/// How a candidate slot conflicts with an existing booking.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SlotPolicy {
    /// Only a booking starting at exactly the candidate time blocks it.
    #[default]
    ExactStart,
    /// Every hour covered by a booking blocks the candidate.
    Overlap,
}

impl FromStr for SlotPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exact_start" => Ok(SlotPolicy::ExactStart),
            "overlap" => Ok(SlotPolicy::Overlap),
            other => Err(format!("unknown slot policy: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingConfig {
    /// First bookable start hour (inclusive)
    pub opening_hour: u32,
    /// Last bookable start hour (inclusive)
    pub closing_hour: u32,
    pub slot_policy: SlotPolicy,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            opening_hour: 7,
            closing_hour: 22,
            slot_policy: SlotPolicy::ExactStart,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RealtimeConfig {
    pub poll_interval_secs: u64,
    pub channel_capacity: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 15,
            channel_capacity: 256,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    pub timeout_secs: u64,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self { timeout_secs: 10 }
    }
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // Without a config file everything comes from the environment.
        let config_result = std::fs::read_to_string(&config_path);

        let mut config: Config = match config_result {
            Ok(config_str) => toml::from_str(&config_str)
                .map_err(|e| format!("failed to parse config file: {e}"))?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                fn get_env(name: &str) -> Option<String> {
                    env::var(name).ok()
                }
                fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
                    env::var(name)
                        .ok()
                        .and_then(|v| v.parse::<T>().ok())
                        .unwrap_or(default)
                }

                let database_url = get_env("DATABASE_URL")
                    .ok_or("DATABASE_URL is not set and no config.toml was found")?;
                let jwt_secret = get_env("JWT_SECRET")
                    .ok_or("JWT_SECRET is not set and no config.toml was found")?;

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 8080u16),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                    },
                    jwt: JwtConfig {
                        secret: jwt_secret,
                        leeway_secs: get_env_parse("JWT_LEEWAY_SECS", 0u64),
                    },
                    booking: BookingConfig::default(),
                    realtime: RealtimeConfig::default(),
                    webhook: WebhookConfig::default(),
                }
            }
            Err(e) => {
                return Err(format!("cannot read config file {config_path}: {e}").into());
            }
        };

        // Environment variables win over the file.
        if let Ok(v) = env::var("SERVER_HOST") {
            config.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            config.server.port = p;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            config.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            config.database.max_connections = mc;
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            config.jwt.secret = v;
        }
        if let Ok(v) = env::var("JWT_LEEWAY_SECS")
            && let Ok(n) = v.parse()
        {
            config.jwt.leeway_secs = n;
        }
        if let Ok(v) = env::var("BOOKING_OPENING_HOUR")
            && let Ok(h) = v.parse()
        {
            config.booking.opening_hour = h;
        }
        if let Ok(v) = env::var("BOOKING_CLOSING_HOUR")
            && let Ok(h) = v.parse()
        {
            config.booking.closing_hour = h;
        }
        if let Ok(v) = env::var("BOOKING_SLOT_POLICY") {
            config.booking.slot_policy = v.parse()?;
        }
        if let Ok(v) = env::var("REALTIME_POLL_INTERVAL_SECS")
            && let Ok(n) = v.parse()
        {
            config.realtime.poll_interval_secs = n;
        }
        if let Ok(v) = env::var("WEBHOOK_TIMEOUT_SECS")
            && let Ok(n) = v.parse()
        {
            config.webhook.timeout_secs = n;
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), String> {
        let b = &self.booking;
        // the last slot must still fit a one-hour booking before 23:00
        if b.opening_hour > b.closing_hour || b.closing_hour > 22 {
            return Err(format!(
                "invalid booking hours: opening {} closing {}",
                b.opening_hour, b.closing_hour
            ));
        }
        if self.jwt.secret.is_empty() {
            return Err("jwt.secret must not be empty".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_toml() {
        let raw = r#"
            [server]
            host = "127.0.0.1"
            port = 9000

            [database]
            url = "postgres://localhost/padel"
            max_connections = 5

            [jwt]
            secret = "s3cret"
        "#;
        let config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.booking.opening_hour, 7);
        assert_eq!(config.booking.closing_hour, 22);
        assert_eq!(config.booking.slot_policy, SlotPolicy::ExactStart);
        assert_eq!(config.realtime.poll_interval_secs, 15);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_overlap_policy() {
        let raw = r#"
            [server]
            host = "127.0.0.1"
            port = 9000

            [database]
            url = "postgres://localhost/padel"
            max_connections = 5

            [jwt]
            secret = "s3cret"

            [booking]
            opening_hour = 8
            closing_hour = 20
            slot_policy = "overlap"
        "#;
        let config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.booking.slot_policy, SlotPolicy::Overlap);
        assert_eq!("overlap".parse::<SlotPolicy>(), Ok(SlotPolicy::Overlap));
        assert!("sometimes".parse::<SlotPolicy>().is_err());
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let raw = r#"
            [server]
            host = "127.0.0.1"
            port = 9000

            [database]
            url = "postgres://localhost/padel"
            max_connections = 5

            [jwt]
            secret = "s3cret"

            [booking]
            slot_policy = "overlap"

            [realtime]
            poll_interval_secs = 5

            [webhook]
        "#;
        let config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.booking.slot_policy, SlotPolicy::Overlap);
        assert_eq!(config.booking.opening_hour, 7);
        assert_eq!(config.booking.closing_hour, 22);
        assert_eq!(config.realtime.poll_interval_secs, 5);
        assert_eq!(config.realtime.channel_capacity, 256);
        assert_eq!(config.webhook.timeout_secs, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_inverted_hours() {
        let config = Config {
            server: ServerConfig {
                host: "0.0.0.0".into(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: "postgres://localhost/padel".into(),
                max_connections: 1,
            },
            jwt: JwtConfig {
                secret: "x".into(),
                leeway_secs: 0,
            },
            booking: BookingConfig {
                opening_hour: 20,
                closing_hour: 8,
                slot_policy: SlotPolicy::ExactStart,
            },
            realtime: RealtimeConfig::default(),
            webhook: WebhookConfig::default(),
        };
        assert!(config.validate().is_err());
    }
}
