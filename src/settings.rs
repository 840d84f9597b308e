use crate::visibility::RenderMode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

const SETTINGS_SCHEMA_VERSION: u32 = 1;
const SETTINGS_FILE_NAME: &str = "settings.json";
const SETTINGS_APP_DIR: &str = "four-dim-maze";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PersistedSettings {
    pub schema_version: u32,
    pub advanced_render_mode: bool,
    pub wobble_enabled: bool,
    pub post_solve_wander_enabled: bool,
}

impl Default for PersistedSettings {
    fn default() -> Self {
        Self {
            schema_version: SETTINGS_SCHEMA_VERSION,
            advanced_render_mode: true,
            wobble_enabled: true,
            post_solve_wander_enabled: true,
        }
    }
}

impl PersistedSettings {
    pub fn sanitized(mut self) -> Self {
        self.schema_version = SETTINGS_SCHEMA_VERSION;
        self
    }

    pub fn render_mode(&self) -> RenderMode {
        if self.advanced_render_mode {
            RenderMode::Advanced
        } else {
            RenderMode::Simple
        }
    }
}

#[derive(Debug)]
pub enum SettingsError {
    Io(io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Io(error) => write!(f, "settings i/o failed: {error}"),
            SettingsError::Parse(error) => write!(f, "settings are not valid json: {error}"),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Io(error) => Some(error),
            SettingsError::Parse(error) => Some(error),
        }
    }
}

impl From<io::Error> for SettingsError {
    fn from(error: io::Error) -> Self {
        SettingsError::Io(error)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(error: serde_json::Error) -> Self {
        SettingsError::Parse(error)
    }
}

pub fn settings_file_path() -> PathBuf {
    if let Some(base) = platform_config_dir() {
        return base.join(SETTINGS_APP_DIR).join(SETTINGS_FILE_NAME);
    }
    PathBuf::from("saves").join(SETTINGS_FILE_NAME)
}

pub fn read_settings(path: &Path) -> Result<PersistedSettings, SettingsError> {
    let raw = std::fs::read_to_string(path)?;
    let settings = serde_json::from_str::<PersistedSettings>(&raw)?;
    Ok(settings.sanitized())
}

/// A missing file is silent; anything else unreadable is logged and ignored.
pub fn load_settings(path: &Path) -> Option<PersistedSettings> {
    match read_settings(path) {
        Ok(settings) => Some(settings),
        Err(SettingsError::Io(error)) => {
            if error.kind() != io::ErrorKind::NotFound {
                log::warn!("Failed to read settings {}: {}", path.display(), error);
            }
            None
        }
        Err(SettingsError::Parse(error)) => {
            log::warn!(
                "Failed to parse settings {}: {} (ignoring file)",
                path.display(),
                error
            );
            None
        }
    }
}

pub fn save_settings(path: &Path, settings: &PersistedSettings) -> Result<(), SettingsError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let bytes = serde_json::to_vec_pretty(&settings.clone().sanitized())?;
    std::fs::write(path, bytes)?;
    Ok(())
}

#[cfg(target_os = "windows")]
fn platform_config_dir() -> Option<PathBuf> {
    std::env::var_os("APPDATA").map(PathBuf::from).or_else(|| {
        std::env::var_os("USERPROFILE")
            .map(PathBuf::from)
            .map(|home| home.join("AppData").join("Roaming"))
    })
}

#[cfg(target_os = "macos")]
fn platform_config_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .map(|home| home.join("Library").join("Application Support"))
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn platform_config_dir() -> Option<PathBuf> {
    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var_os("HOME")
                .map(PathBuf::from)
                .map(|home| home.join(".config"))
        })
}
