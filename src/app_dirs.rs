use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "type-defender";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// `$HOME/.local/state/type-defender`, or the platform data dir without a HOME.
    pub fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("state")
                    .join(APP_NAME),
            )
        } else {
            ProjectDirs::from("", "", APP_NAME)
                .map(|proj_dirs| proj_dirs.data_local_dir().to_path_buf())
        }
    }

    pub fn stats_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("statistics.csv"))
    }

    pub fn high_score_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("high_score.txt"))
    }

    pub fn log_dir() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("logs"))
    }
}
