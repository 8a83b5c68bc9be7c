use std::time::Duration;

use anyhow::{Context, ensure};
use chrono_tz::Tz;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::delivery::{EmailSettings, TwilioSettings};

#[derive(Deserialize, Debug, Clone)]
pub struct SchedulerSettings {
    pub cadence_secs: u64,
    pub heartbeat_secs: u64,
    pub timezone: String,
}

impl SchedulerSettings {
    pub fn cadence(&self) -> Duration {
        Duration::from_secs(self.cadence_secs)
    }

    pub fn heartbeat(&self) -> Duration {
        Duration::from_secs(self.heartbeat_secs)
    }

    pub fn timezone(&self) -> anyhow::Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|error| anyhow::anyhow!("Unknown timezone {:?}: {error}", self.timezone))
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.cadence_secs > 0, "scheduler.cadence_secs must be positive");
        ensure!(self.heartbeat_secs > 0, "scheduler.heartbeat_secs must be positive");
        self.timezone().context("scheduler.timezone")?;

        Ok(())
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct DatabaseSettings {
    pub url: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct AppSettings {
    pub scheduler: SchedulerSettings,
    pub database: DatabaseSettings,
    pub email: EmailSettings,
    pub twilio: TwilioSettings,
}

impl AppSettings {
    /// Layers `appsettings`, the optional `appsettings.local` and `APP__*`
    /// environment variables, e.g. `APP__TWILIO__AUTH_TOKEN`.
    pub fn new() -> Result<Self, ConfigError> {
        Self::builder()
            .add_source(File::with_name("appsettings").required(true))
            .add_source(File::with_name("appsettings.local").required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?
            .try_deserialize()
    }

    fn builder() -> config::ConfigBuilder<config::builder::DefaultState> {
        Config::builder()
            .set_default("scheduler.cadence_secs", 60)
            .and_then(|b| b.set_default("scheduler.heartbeat_secs", 60))
            .and_then(|b| b.set_default("scheduler.timezone", "UTC"))
            .and_then(|b| b.set_default("database.url", "sqlite://medicine.db?mode=rwc"))
            .and_then(|b| b.set_default("email.base_url", "https://api.resend.com"))
            .and_then(|b| b.set_default("twilio.base_url", "https://api.twilio.com"))
            .expect("Default keys are valid.")
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    fn from_toml(toml: &str) -> Result<AppSettings, ConfigError> {
        AppSettings::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    const MINIMAL: &str = r#"
        [email]
        api_key = "key"
        from_address = "reminders@example.com"

        [twilio]
        account_sid = "AC123"
        auth_token = "token"
        from_number = "+10000000000"
    "#;

    #[test]
    fn defaults_fill_in_scheduler_and_endpoints() {
        let settings = from_toml(MINIMAL).unwrap();

        assert_eq!(settings.scheduler.cadence(), Duration::from_secs(60));
        assert_eq!(settings.scheduler.heartbeat(), Duration::from_secs(60));
        assert_eq!(settings.scheduler.timezone().unwrap(), chrono_tz::UTC);
        assert_eq!(settings.email.base_url, "https://api.resend.com");
        assert_eq!(settings.twilio.base_url, "https://api.twilio.com");
        assert!(settings.scheduler.validate().is_ok());
    }

    #[test]
    fn scheduler_overrides_are_validated() {
        let toml = format!(
            "{MINIMAL}\n[scheduler]\ncadence_secs = 0\ntimezone = \"Asia/Kolkata\"\n"
        );
        let settings = from_toml(&toml).unwrap();

        assert_eq!(settings.scheduler.timezone().unwrap(), chrono_tz::Asia::Kolkata);
        assert!(settings.scheduler.validate().is_err());
    }

    #[test]
    fn unknown_timezone_is_rejected() {
        let toml = format!("{MINIMAL}\n[scheduler]\ntimezone = \"Mars/Olympus\"\n");
        let settings = from_toml(&toml).unwrap();

        assert!(settings.scheduler.validate().is_err());
    }
}
