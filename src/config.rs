//! Process-wide configuration, loaded once at startup.
//!
//! Sources, lowest precedence first: built-in defaults, an optional
//! `pressroom.toml` next to the binary's working directory, then
//! environment variables (`PORT`, `MONGODB_URI`, `JWT_SECRET`, ...).

use std::path::PathBuf;

use chrono::{Duration, Utc};
use serde::Deserialize;

use crate::error::AppError;

/// Deployment mode. Production hides internal error details from clients.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
    Test,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
            Environment::Test => "test",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    #[serde(rename = "app_env")]
    pub environment: Environment,
    pub mongodb_uri: String,
    pub mongodb_database: String,
    pub jwt_secret: String,
    /// Token lifetime such as `7d`, `12h`, `30m`, `45s`, or plain seconds.
    pub jwt_expire: String,
    pub website_api_key: String,
    pub uploads_dir: PathBuf,
    #[serde(default)]
    pub seed_admin_name: Option<String>,
    #[serde(default)]
    pub seed_admin_email: Option<String>,
    #[serde(default)]
    pub seed_admin_password: Option<String>,
}

impl Settings {
    /// Load settings from defaults, `pressroom.toml` and the environment.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::from_builder(
            config::Config::builder()
                .add_source(config::File::with_name("pressroom").required(false))
                .add_source(config::Environment::default().try_parsing(true)),
        )
    }

    /// Apply defaults beneath the given sources and deserialize.
    pub fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, config::ConfigError> {
        builder
            .set_default("host", "0.0.0.0")?
            .set_default("port", 5000)?
            .set_default("app_env", "development")?
            .set_default("mongodb_uri", "mongodb://localhost:27017")?
            .set_default("mongodb_database", "pressroom")?
            .set_default("jwt_expire", "7d")?
            .set_default("uploads_dir", "uploads")?
            .build()?
            .try_deserialize()
    }

    pub fn token_ttl(&self) -> Result<Duration, AppError> {
        parse_duration(&self.jwt_expire)
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

/// Parse a lifetime like `7d`, `12h`, `30m`, `45s`, or `3600`.
pub fn parse_duration(raw: &str) -> Result<Duration, AppError> {
    let raw = raw.trim();
    let invalid = || {
        AppError::Internal(format!(
            "Invalid duration '{raw}'. Expected e.g. 7d, 12h, 30m"
        ))
    };

    let (digits, unit) = match raw.char_indices().find(|(_, c)| !c.is_ascii_digit()) {
        Some((idx, _)) => raw.split_at(idx),
        None => (raw, "s"),
    };
    let amount: i64 = digits.parse().map_err(|_| invalid())?;
    if amount <= 0 {
        return Err(invalid());
    }

    let duration = match unit {
        "s" => Duration::try_seconds(amount),
        "m" => Duration::try_minutes(amount),
        "h" => Duration::try_hours(amount),
        "d" => Duration::try_days(amount),
        "w" => Duration::try_weeks(amount),
        _ => None,
    }
    .ok_or_else(invalid)?;

    // Tokens carry `now + duration` as their expiry
    Utc::now()
        .checked_add_signed(duration)
        .ok_or_else(invalid)?;
    Ok(duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder_with(
        pairs: &[(&str, &str)],
    ) -> config::ConfigBuilder<config::builder::DefaultState> {
        let mut builder = config::Config::builder();
        for (key, value) in pairs {
            builder = builder.set_override(*key, *value).unwrap();
        }
        builder
    }

    #[test]
    fn test_defaults_fill_optional_keys() {
        let settings = Settings::from_builder(builder_with(&[
            ("jwt_secret", "s3cret"),
            ("website_api_key", "key"),
        ]))
        .unwrap();

        assert_eq!(settings.port, 5000);
        assert_eq!(settings.environment, Environment::Development);
        assert_eq!(settings.mongodb_database, "pressroom");
        assert_eq!(settings.uploads_dir, PathBuf::from("uploads"));
        assert_eq!(settings.token_ttl().unwrap(), Duration::days(7));
        assert!(settings.seed_admin_email.is_none());
    }

    #[test]
    fn test_missing_secret_is_an_error() {
        assert!(Settings::from_builder(builder_with(&[("website_api_key", "key")])).is_err());
    }

    #[test]
    fn test_production_mode() {
        let settings = Settings::from_builder(builder_with(&[
            ("jwt_secret", "s3cret"),
            ("website_api_key", "key"),
            ("app_env", "production"),
        ]))
        .unwrap();
        assert!(settings.is_production());
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("7d").unwrap(), Duration::days(7));
        assert_eq!(parse_duration("12h").unwrap(), Duration::hours(12));
        assert_eq!(parse_duration("30m").unwrap(), Duration::minutes(30));
        assert_eq!(parse_duration("45s").unwrap(), Duration::seconds(45));
        assert_eq!(parse_duration("3600").unwrap(), Duration::seconds(3600));
        assert!(parse_duration("soon").is_err());
        assert!(parse_duration("0d").is_err());
        assert!(parse_duration("5y").is_err());
        assert!(parse_duration("999999999999999d").is_err());
        assert!(parse_duration("9223372036854775807w").is_err());
        assert!(parse_duration("100000000000d").is_err());
    }
}
