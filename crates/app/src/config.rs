//! Layered configuration: built-in defaults, then an optional TOML file,
//! then `LMS_*` environment variables, then command-line flags.

use std::path::{Path, PathBuf};

use lms_core::model::{PlayerSettings, PlayerSettingsDraft, SettingsError};
use serde::Deserialize;
use services::{ParseStoreTargetError, StoreTarget};
use thiserror::Error;

pub const ENV_MIN_WATCH_PERCENT: &str = "LMS_MIN_WATCH_PERCENT";
pub const ENV_BADGE_INTERVAL: &str = "LMS_BADGE_INTERVAL";
pub const ENV_STORE: &str = "LMS_STORE";
pub const ENV_COURSES_FILE: &str = "LMS_COURSES_FILE";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("{var}={value:?} is not a valid number")]
    InvalidEnv { var: &'static str, value: String },
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Store(#[from] ParseStoreTargetError),
}

/// Shape of the TOML config file.
///
/// ```toml
/// store = "dir:.lms-progress"
/// courses = "courses.json"
///
/// [player]
/// default-min-watch-percent = 80
/// badge-interval = 3
/// notice-secs = 4
/// persist-completed = true
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
struct ConfigFile {
    store: Option<String>,
    courses: Option<PathBuf>,
    player: PlayerSettingsDraft,
}

/// Values not set by a layer stay `None` so the next layer can fill them.
#[derive(Debug, Default)]
struct Layer {
    store: Option<String>,
    courses: Option<PathBuf>,
    player: PlayerSettingsDraft,
}

impl Layer {
    fn merge(self, over: Layer) -> Layer {
        Layer {
            store: over.store.or(self.store),
            courses: over.courses.or(self.courses),
            player: self.player.merge(over.player),
        }
    }
}

/// Fully resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store: StoreTarget,
    pub courses_file: Option<PathBuf>,
    pub settings: PlayerSettings,
}

/// Command-line overrides, highest precedence.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub store: Option<String>,
    pub courses_file: Option<PathBuf>,
}

impl AppConfig {
    /// Resolve configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config file is unreadable or invalid, an
    /// environment variable is malformed, or the merged settings are out of
    /// range.
    pub fn load(config_path: Option<&Path>, cli: CliOverrides) -> Result<Self, ConfigError> {
        Self::resolve(config_path, cli, |var| std::env::var(var).ok())
    }

    fn resolve(
        config_path: Option<&Path>,
        cli: CliOverrides,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let file = match config_path {
            Some(path) => read_file(path)?,
            None => Layer::default(),
        };
        let merged = file.merge(env_layer(&env)?).merge(Layer {
            store: cli.store,
            courses: cli.courses_file,
            player: PlayerSettingsDraft::new(),
        });

        let store = match merged.store {
            Some(raw) => normalize_store(raw.parse()?),
            None => StoreTarget::Memory,
        };
        Ok(Self {
            store,
            courses_file: merged.courses,
            settings: merged.player.validate()?,
        })
    }
}

fn read_file(path: &Path) -> Result<Layer, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let file: ConfigFile = toml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Layer {
        store: file.store,
        courses: file.courses,
        player: file.player,
    })
}

fn env_layer(env: &impl Fn(&str) -> Option<String>) -> Result<Layer, ConfigError> {
    let number = |var: &'static str| -> Result<Option<u32>, ConfigError> {
        env(var)
            .filter(|v| !v.trim().is_empty())
            .map(|v| {
                v.trim()
                    .parse::<u32>()
                    .map_err(|_| ConfigError::InvalidEnv { var, value: v })
            })
            .transpose()
    };

    let min_watch = number(ENV_MIN_WATCH_PERCENT)?
        .map(|v| {
            u8::try_from(v).map_err(|_| ConfigError::InvalidEnv {
                var: ENV_MIN_WATCH_PERCENT,
                value: v.to_string(),
            })
        })
        .transpose()?;

    Ok(Layer {
        store: env(ENV_STORE).filter(|v| !v.trim().is_empty()),
        courses: env(ENV_COURSES_FILE)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from),
        player: PlayerSettingsDraft {
            default_min_watch_percent: min_watch,
            badge_interval: number(ENV_BADGE_INTERVAL)?,
            ..PlayerSettingsDraft::new()
        },
    })
}

/// Make `SQLite` file URLs absolute so the database lands in a predictable
/// place regardless of the working directory.
fn normalize_store(target: StoreTarget) -> StoreTarget {
    let StoreTarget::Sqlite(url) = target else {
        return target;
    };
    if url.starts_with("sqlite://") || url.contains(":memory:") || url.contains("mode=memory") {
        return StoreTarget::Sqlite(url);
    }
    let path = url.strip_prefix("sqlite:").unwrap_or(url.as_str());
    let absolute = std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(path);
    StoreTarget::Sqlite(format!("sqlite://{}", absolute.display()))
}

/// Create the `SQLite` file (and parent directories) so the pool can open it.
///
/// # Errors
///
/// Returns `std::io::Error` if the file or its directory cannot be created.
pub fn prepare_sqlite_file(target: &StoreTarget) -> std::io::Result<()> {
    let StoreTarget::Sqlite(url) = target else {
        return Ok(());
    };
    let Some(path) = url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let path = Path::new(path.split('?').next().unwrap_or(path));
    if path.as_os_str().is_empty() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }
    Ok(())
}
