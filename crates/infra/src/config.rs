//! Configuration loading and representation.
//!
//! Everything comes from environment variables, optionally seeded from a
//! `.env` file. Parsing is separated from the process environment so it can be
//! tested with a plain map.

use std::net::SocketAddr;

use thiserror::Error;

use cargodesk_core::Locale;
use cargodesk_notify::{EmailApiConfig, SmsApiConfig};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_ADMIN_USERNAME: &str = "admin";
const DEV_SESSION_SECRET: &str = "cargodesk-dev-session-secret";
const DEFAULT_SESSION_TTL_MINUTES: i64 = 480;
const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_EMAIL_API_URL: &str = "https://api.resend.com/emails";
const DEFAULT_SMS_API_BASE: &str = "https://api.twilio.com";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },

    #[error("{0} must be set")]
    Missing(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Clone, PartialEq, Eq)]
pub struct AdminConfig {
    pub username: String,
    /// `None` disables admin login.
    pub password: Option<String>,
}

impl core::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("username", &self.username)
            .field("password_set", &self.password.is_some())
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub secret: String,
    pub ttl_minutes: i64,
    /// True when `SESSION_SECRET` was not set and the built-in dev secret is used.
    pub dev_secret: bool,
}

impl core::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("ttl_minutes", &self.ttl_minutes)
            .field("dev_secret", &self.dev_secret)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// `None` runs on in-memory stores.
    pub database: Option<DatabaseConfig>,
    pub admin: AdminConfig,
    pub session: SessionConfig,
    /// Base of public tracking links, without a trailing slash.
    pub public_base_url: String,
    pub default_locale: Locale,
    /// `None` logs emails instead of sending them.
    pub email: Option<EmailApiConfig>,
    /// `None` logs SMS instead of sending them.
    pub sms: Option<SmsApiConfig>,
}

impl AppConfig {
    /// Load `.env` (if present) and read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is normal outside local development.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // Blank values count as unset.
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_raw = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse().map_err(|_| ConfigError::Invalid {
            key: "BIND_ADDR",
            value: bind_raw.clone(),
        })?;

        let database = match get("DATABASE_URL") {
            Some(url) => Some(DatabaseConfig {
                url,
                max_connections: parse_or(
                    "DATABASE_MAX_CONNECTIONS",
                    get("DATABASE_MAX_CONNECTIONS"),
                    DEFAULT_MAX_CONNECTIONS,
                )?,
            }),
            None => None,
        };

        let admin = AdminConfig {
            username: get("ADMIN_USERNAME").unwrap_or_else(|| DEFAULT_ADMIN_USERNAME.to_string()),
            password: get("ADMIN_PASSWORD"),
        };

        let ttl_minutes = parse_or(
            "SESSION_TTL_MINUTES",
            get("SESSION_TTL_MINUTES"),
            DEFAULT_SESSION_TTL_MINUTES,
        )?;
        if ttl_minutes <= 0 {
            return Err(ConfigError::Invalid {
                key: "SESSION_TTL_MINUTES",
                value: ttl_minutes.to_string(),
            });
        }
        let session = match get("SESSION_SECRET") {
            Some(secret) => SessionConfig {
                secret,
                ttl_minutes,
                dev_secret: false,
            },
            None => SessionConfig {
                secret: DEV_SESSION_SECRET.to_string(),
                ttl_minutes,
                dev_secret: true,
            },
        };

        let public_base_url = get("PUBLIC_BASE_URL")
            .unwrap_or_else(|| DEFAULT_PUBLIC_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let default_locale = match get("DEFAULT_LOCALE") {
            Some(tag) => Locale::parse_tag(&tag).ok_or(ConfigError::Invalid {
                key: "DEFAULT_LOCALE",
                value: tag,
            })?,
            None => Locale::default(),
        };

        let email = match get("EMAIL_API_KEY") {
            Some(api_key) => Some(EmailApiConfig {
                api_url: get("EMAIL_API_URL").unwrap_or_else(|| DEFAULT_EMAIL_API_URL.to_string()),
                api_key,
                from: get("EMAIL_FROM").ok_or(ConfigError::Missing("EMAIL_FROM"))?,
            }),
            None => None,
        };

        let sms = match get("SMS_ACCOUNT_SID") {
            Some(account_sid) => Some(SmsApiConfig {
                api_base: get("SMS_API_BASE").unwrap_or_else(|| DEFAULT_SMS_API_BASE.to_string()),
                account_sid,
                auth_token: get("SMS_AUTH_TOKEN").ok_or(ConfigError::Missing("SMS_AUTH_TOKEN"))?,
                from: get("SMS_FROM").ok_or(ConfigError::Missing("SMS_FROM"))?,
            }),
            None => None,
        };

        Ok(Self {
            bind_addr,
            database,
            admin,
            session,
            public_base_url,
            default_locale,
            email,
            sms,
        })
    }
}

fn parse_or<T: core::str::FromStr>(
    key: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let cfg = load(&[]).expect("config");
        assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:8080");
        assert_eq!(cfg.database, None);
        assert_eq!(cfg.admin.username, "admin");
        assert_eq!(cfg.admin.password, None);
        assert!(cfg.session.dev_secret);
        assert_eq!(cfg.session.ttl_minutes, 480);
        assert_eq!(cfg.public_base_url, "http://localhost:3000");
        assert_eq!(cfg.default_locale, Locale::En);
        assert_eq!(cfg.email, None);
        assert_eq!(cfg.sms, None);
    }

    #[test]
    fn reads_full_environment() {
        let cfg = load(&[
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("DATABASE_URL", "postgres://localhost/cargodesk"),
            ("DATABASE_MAX_CONNECTIONS", "12"),
            ("ADMIN_USERNAME", "ops"),
            ("ADMIN_PASSWORD", "hunter2"),
            ("SESSION_SECRET", "prod-secret"),
            ("SESSION_TTL_MINUTES", "60"),
            ("PUBLIC_BASE_URL", "https://track.example.com/"),
            ("DEFAULT_LOCALE", "es-MX"),
            ("EMAIL_API_KEY", "re_123"),
            ("EMAIL_FROM", "noreply@example.com"),
            ("SMS_ACCOUNT_SID", "AC1"),
            ("SMS_AUTH_TOKEN", "tok"),
            ("SMS_FROM", "+15550000"),
        ])
        .expect("config");

        assert_eq!(cfg.bind_addr.port(), 9000);
        assert_eq!(
            cfg.database,
            Some(DatabaseConfig {
                url: "postgres://localhost/cargodesk".to_string(),
                max_connections: 12,
            })
        );
        assert_eq!(cfg.admin.password.as_deref(), Some("hunter2"));
        assert!(!cfg.session.dev_secret);
        assert_eq!(cfg.public_base_url, "https://track.example.com");
        assert_eq!(cfg.default_locale, Locale::Es);
        let email = cfg.email.expect("email configured");
        assert_eq!(email.api_url, DEFAULT_EMAIL_API_URL);
        let sms = cfg.sms.expect("sms configured");
        assert_eq!(sms.api_base, DEFAULT_SMS_API_BASE);
    }

    #[test]
    fn rejects_bad_numbers() {
        assert_eq!(
            load(&[("DATABASE_URL", "postgres://x"), ("DATABASE_MAX_CONNECTIONS", "many")]),
            Err(ConfigError::Invalid {
                key: "DATABASE_MAX_CONNECTIONS",
                value: "many".to_string(),
            })
        );
        assert!(matches!(
            load(&[("SESSION_TTL_MINUTES", "0")]),
            Err(ConfigError::Invalid { key: "SESSION_TTL_MINUTES", .. })
        ));
        assert!(matches!(
            load(&[("BIND_ADDR", "nowhere")]),
            Err(ConfigError::Invalid { key: "BIND_ADDR", .. })
        ));
    }

    #[test]
    fn partial_provider_settings_are_errors() {
        assert_eq!(
            load(&[("EMAIL_API_KEY", "re_123")]),
            Err(ConfigError::Missing("EMAIL_FROM"))
        );
        assert_eq!(
            load(&[("SMS_ACCOUNT_SID", "AC1"), ("SMS_FROM", "+1555")]),
            Err(ConfigError::Missing("SMS_AUTH_TOKEN"))
        );
    }

    #[test]
    fn blank_values_count_as_unset() {
        let cfg = load(&[("ADMIN_PASSWORD", "  "), ("DATABASE_URL", "")]).expect("config");
        assert_eq!(cfg.admin.password, None);
        assert_eq!(cfg.database, None);
    }

    #[test]
    fn debug_output_hides_secrets() {
        let cfg = load(&[("ADMIN_PASSWORD", "hunter2"), ("SESSION_SECRET", "prod-secret")])
            .expect("config");
        let shown = format!("{cfg:?}");
        assert!(!shown.contains("hunter2"));
        assert!(!shown.contains("prod-secret"));
    }
}
