use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    pub fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("state")
                    .join("bannerpop"),
            )
        } else {
            ProjectDirs::from("", "", "bannerpop")
                .map(|proj_dirs| proj_dirs.data_local_dir().to_path_buf())
        }
    }

    pub fn flags_json_path() -> Option<PathBuf> {
        Self::state_dir().map(|d| d.join("flags.json"))
    }

    pub fn flags_db_path() -> Option<PathBuf> {
        Self::state_dir().map(|d| d.join("flags.db"))
    }

    pub fn log_path() -> Option<PathBuf> {
        Self::state_dir().map(|d| d.join("bannerpop.log"))
    }
}
