use crate::corpus::{LengthSelection, DEFAULT_TYPO_PROBABILITY};
use crate::session::{SessionConfig, DEFAULT_LIVES};
use crate::spawn::PlayField;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const DEFAULT_TICK_RATE_MS: u64 = 16;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub lives: i32,
    pub tick_rate_ms: u64,
    pub length_selection: LengthSelection,
    /// Custom word list, one word per line. The embedded list is used when unset.
    pub word_list: Option<PathBuf>,
    pub typo_probability: f64,
    pub field: PlayField,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lives: DEFAULT_LIVES,
            tick_rate_ms: DEFAULT_TICK_RATE_MS,
            length_selection: LengthSelection::default(),
            word_list: None,
            typo_probability: DEFAULT_TYPO_PROBABILITY,
            field: PlayField::default(),
        }
    }
}

impl Config {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            lives: self.lives,
            field: self.field,
            selection: self.length_selection,
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "type-defender") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("type_defender_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let Ok(bytes) = fs::read(&self.path) else {
            return Config::default();
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring unreadable config");
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).map_err(io::Error::other)?;
        fs::write(&self.path, data)
    }
}
