use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::interval::ReminderInterval;

/// Initial interval shown by the console surface. Startup configuration only:
/// runtime changes are not written back, state resets on every launch.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ReminderSettings {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u8,
}

impl ReminderSettings {
    pub fn initial_interval(&self) -> ReminderInterval {
        ReminderInterval::from_hms(self.hours, self.minutes, self.seconds).unwrap_or_else(|| {
            log::warn!(
                "Configured initial interval is out of range, falling back to zero. [hours = {}, minutes = {}]",
                self.hours,
                self.minutes
            );
            ReminderInterval::default()
        })
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct StatusSettings {
    pub enabled: bool,
    pub tick_seconds: u64,
}

impl Default for StatusSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            tick_seconds: 10,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct AppSettings {
    pub reminder: ReminderSettings,
    pub status: StatusSettings,
}

impl AppSettings {
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("appsettings").required(false))
            .add_source(File::with_name("appsettings.local").required(false))
            .add_source(Environment::with_prefix("PHONEHOME").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}
