use serde::Deserialize;
use thiserror::Error;

use crate::model::lesson::DEFAULT_MIN_WATCH_PERCENT;

/// Completions per badge.
pub const DEFAULT_BADGE_INTERVAL: u32 = 3;
/// How long a completion notice stays visible.
pub const DEFAULT_NOTICE_SECS: u32 = 4;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("minimum watch percent must be between 0 and 100, got {0}")]
    InvalidMinWatchPercent(u8),

    #[error("badge interval must be > 0")]
    InvalidBadgeInterval,

    #[error("notice duration must be between 1 and 60 seconds, got {0}")]
    InvalidNoticeDuration(u32),
}

/// Player tuning knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerSettings {
    default_min_watch_percent: u8,
    badge_interval: u32,
    notice_secs: u32,
    persist_completed: bool,
}

/// Partially specified settings, as read from a config file or environment.
///
/// Unset fields fall back to the defaults on `validate`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PlayerSettingsDraft {
    pub default_min_watch_percent: Option<u8>,
    pub badge_interval: Option<u32>,
    pub notice_secs: Option<u32>,
    pub persist_completed: Option<bool>,
}

impl PlayerSettingsDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fields set in `other` win over fields set in `self`.
    #[must_use]
    pub fn merge(self, other: PlayerSettingsDraft) -> Self {
        Self {
            default_min_watch_percent: other
                .default_min_watch_percent
                .or(self.default_min_watch_percent),
            badge_interval: other.badge_interval.or(self.badge_interval),
            notice_secs: other.notice_secs.or(self.notice_secs),
            persist_completed: other.persist_completed.or(self.persist_completed),
        }
    }

    /// Validate and fill defaults.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` when a provided value is out of range.
    pub fn validate(self) -> Result<PlayerSettings, SettingsError> {
        let defaults = PlayerSettings::default();
        let default_min_watch_percent = self
            .default_min_watch_percent
            .unwrap_or(defaults.default_min_watch_percent);
        if default_min_watch_percent > 100 {
            return Err(SettingsError::InvalidMinWatchPercent(
                default_min_watch_percent,
            ));
        }
        let badge_interval = self.badge_interval.unwrap_or(defaults.badge_interval);
        if badge_interval == 0 {
            return Err(SettingsError::InvalidBadgeInterval);
        }
        let notice_secs = self.notice_secs.unwrap_or(defaults.notice_secs);
        if !(1..=60).contains(&notice_secs) {
            return Err(SettingsError::InvalidNoticeDuration(notice_secs));
        }

        Ok(PlayerSettings {
            default_min_watch_percent,
            badge_interval,
            notice_secs,
            persist_completed: self
                .persist_completed
                .unwrap_or(defaults.persist_completed),
        })
    }
}

impl PlayerSettings {
    /// Fallback threshold for video lessons that do not set their own.
    #[must_use]
    pub fn default_min_watch_percent(&self) -> u8 {
        self.default_min_watch_percent
    }

    #[must_use]
    pub fn badge_interval(&self) -> u32 {
        self.badge_interval
    }

    #[must_use]
    pub fn notice_duration(&self) -> chrono::Duration {
        chrono::Duration::seconds(i64::from(self.notice_secs))
    }

    /// When false, the completed set is kept for the session only.
    #[must_use]
    pub fn persist_completed(&self) -> bool {
        self.persist_completed
    }

    #[must_use]
    pub fn with_persist_completed(mut self, persist: bool) -> Self {
        self.persist_completed = persist;
        self
    }
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            default_min_watch_percent: DEFAULT_MIN_WATCH_PERCENT,
            badge_interval: DEFAULT_BADGE_INTERVAL,
            notice_secs: DEFAULT_NOTICE_SECS,
            persist_completed: true,
        }
    }
}
