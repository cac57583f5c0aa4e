use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::progression::ProgressionTuning;

pub const DEFAULT_ROUND_SECONDS: u64 = 180;

/// Upper bound on a configured round, one hour.
const MAX_ROUND_SECONDS: u64 = 3_600;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EngineSettings {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default = "default_round_seconds")]
    pub round_seconds: u64,
    #[serde(default)]
    pub progression: ProgressionTuning,
    /// Fixed board seed; `None` lets the host pick one per session.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            version: default_version(),
            round_seconds: DEFAULT_ROUND_SECONDS,
            progression: ProgressionTuning::default(),
            seed: None,
        }
    }
}

impl EngineSettings {
    pub fn sanitized(mut self) -> Self {
        self.version = default_version();
        let round_seconds = self.round_seconds.clamp(1, MAX_ROUND_SECONDS);
        if round_seconds != self.round_seconds {
            warn!(
                requested = self.round_seconds,
                used = round_seconds,
                "round length out of range; clamped"
            );
        }
        self.round_seconds = round_seconds;
        self.progression = self.progression.sanitized();
        self
    }
}

fn default_version() -> u32 {
    1
}

fn default_round_seconds() -> u64 {
    DEFAULT_ROUND_SECONDS
}

#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_env() -> Self {
        if let Some(explicit) = std::env::var_os("GEMRUSH_SETTINGS_PATH") {
            return Self::new(explicit);
        }

        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var_os("HOME").map(|home| {
                    let mut p = PathBuf::from(home);
                    p.push(".config");
                    p
                })
            })
            .unwrap_or_else(|| PathBuf::from("."));

        let mut path = base;
        path.push("gemrush");
        path.push("settings.json");
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing or unreadable files fall back to the defaults.
    pub fn load(&self) -> EngineSettings {
        let Ok(bytes) = fs::read(&self.path) else {
            return EngineSettings::default();
        };
        match serde_json::from_slice::<EngineSettings>(&bytes) {
            Ok(settings) => settings.sanitized(),
            Err(err) => {
                warn!(path = %self.path.display(), %err, "ignoring invalid settings file");
                EngineSettings::default()
            }
        }
    }

    pub fn save(&self, settings: &EngineSettings) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let text = serde_json::to_string_pretty(settings)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(&self.path, text)
    }
}
