//! Environment-driven configuration for the monitor binary.

use std::{env, str::FromStr, time::Duration};

use rust_decimal::Decimal;
use thiserror::Error;

const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";
const DEFAULT_SENDGRID_API_BASE: &str = "https://api.sendgrid.com";

/// Credentials for the Telegram bot channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelegramConfig {
    pub api_base: String,
    pub bot_token: String,
    pub chat_id: String,
}

/// Credentials for the SendGrid email channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailConfig {
    pub api_base: String,
    pub api_key: String,
    pub sender: String,
    pub receiver: String,
}

/// Immutable settings loaded once at startup and handed to each component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    lcd_endpoint: String,
    account_address: String,
    validator_address: String,
    balance_denom: String,
    display_denom: String,
    balance_change_alerts: bool,
    balance_change_threshold: Decimal,
    database_url: String,
    poll_interval: Duration,
    http_timeout: Duration,
    telegram: Option<TelegramConfig>,
    email: Option<EmailConfig>,
}

impl MonitorConfig {
    /// Loads configuration by hydrating `.env` (if present) and reading the
    /// process variables. Missing or malformed entries surface as
    /// `ConfigError`.
    pub fn load_from_env() -> Result<Self, ConfigError> {
        hydrate_env_file()?;

        let lcd_endpoint = get_required_var("LCD_ENDPOINT")?
            .trim_end_matches('/')
            .to_string();
        let balance_change_threshold = match get_optional_var("ACC_BALANCE_CHANGE_THRESHOLD") {
            Some(raw) => Decimal::from_str(&raw).map_err(|source| ConfigError::InvalidDecimal {
                key: "ACC_BALANCE_CHANGE_THRESHOLD",
                source,
            })?,
            None => Decimal::ZERO,
        };

        let telegram = if get_flag("TELEGRAM_ALERTS") {
            Some(TelegramConfig {
                api_base: get_optional_var("TELEGRAM_API_BASE")
                    .unwrap_or_else(|| DEFAULT_TELEGRAM_API_BASE.to_string()),
                bot_token: get_required_var("TELEGRAM_BOT_TOKEN")?,
                chat_id: get_required_var("TELEGRAM_CHAT_ID")?,
            })
        } else {
            None
        };

        let email = if get_flag("EMAIL_ALERTS") {
            Some(EmailConfig {
                api_base: get_optional_var("SENDGRID_API_BASE")
                    .unwrap_or_else(|| DEFAULT_SENDGRID_API_BASE.to_string()),
                api_key: get_required_var("SENDGRID_API_KEY")?,
                sender: get_required_var("EMAIL_SENDER")?,
                receiver: get_required_var("EMAIL_RECEIVER")?,
            })
        } else {
            None
        };

        Ok(Self {
            lcd_endpoint,
            account_address: get_required_var("ACCOUNT_ADDRESS")?,
            validator_address: get_required_var("VAL_OPERATOR_ADDRESS")?,
            balance_denom: get_required_var("BALANCE_DENOM")?,
            display_denom: get_required_var("DENOM")?,
            balance_change_alerts: get_flag("BALANCE_CHANGE_ALERTS"),
            balance_change_threshold,
            database_url: get_required_var("DATABASE_URL")?,
            poll_interval: Duration::from_secs(get_secs(
                "POLL_INTERVAL_SECS",
                DEFAULT_POLL_INTERVAL_SECS,
            )?),
            http_timeout: Duration::from_secs(get_secs(
                "HTTP_TIMEOUT_SECS",
                DEFAULT_HTTP_TIMEOUT_SECS,
            )?),
            telegram,
            email,
        })
    }

    pub fn lcd_endpoint(&self) -> &str {
        &self.lcd_endpoint
    }

    pub fn account_address(&self) -> &str {
        &self.account_address
    }

    pub fn validator_address(&self) -> &str {
        &self.validator_address
    }

    /// Denomination of interest in the bank balances response.
    pub fn balance_denom(&self) -> &str {
        &self.balance_denom
    }

    /// Suffix appended to human-readable amounts.
    pub fn display_denom(&self) -> &str {
        &self.display_denom
    }

    pub fn balance_change_alerts(&self) -> bool {
        self.balance_change_alerts
    }

    pub fn balance_change_threshold(&self) -> Decimal {
        self.balance_change_threshold
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn http_timeout(&self) -> Duration {
        self.http_timeout
    }

    pub fn telegram(&self) -> Option<&TelegramConfig> {
        self.telegram.as_ref()
    }

    pub fn email(&self) -> Option<&EmailConfig> {
        self.email.as_ref()
    }
}

fn get_required_var(key: &'static str) -> Result<String, ConfigError> {
    get_optional_var(key).ok_or(ConfigError::MissingVar { key })
}

fn get_optional_var(key: &'static str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Boolean-like switches are on only when set to `yes` (any case).
fn get_flag(key: &'static str) -> bool {
    get_optional_var(key).is_some_and(|value| value.eq_ignore_ascii_case("yes"))
}

fn get_secs(key: &'static str, default: u64) -> Result<u64, ConfigError> {
    match get_optional_var(key) {
        Some(raw) => raw
            .parse()
            .map_err(|source| ConfigError::InvalidNumber { key, source }),
        None => Ok(default),
    }
}

pub fn hydrate_env_file() -> Result<(), ConfigError> {
    if env::var_os("ALERTBOT_SKIP_DOTENV").is_some() {
        return Ok(());
    }
    match dotenvy::dotenv() {
        Ok(_) => {}
        Err(dotenvy::Error::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => return Err(ConfigError::Dotenv { source: err }),
    }

    Ok(())
}

/// Errors emitted when `.env` hydration or environment parsing fails.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable `{key}`")]
    MissingVar { key: &'static str },
    #[error("invalid integer in `{key}`: {source}")]
    InvalidNumber {
        key: &'static str,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("invalid decimal in `{key}`: {source}")]
    InvalidDecimal {
        key: &'static str,
        #[source]
        source: rust_decimal::Error,
    },
    #[error("failed to load .env file: {source}")]
    Dotenv {
        #[from]
        source: dotenvy::Error,
    },
}
