use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// Where high scores and history live
    pub fn data_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "likhit").map(|proj_dirs| proj_dirs.data_local_dir().to_path_buf())
    }

    /// Where the log file goes; `$HOME/.local/state/likhit` when `HOME` is set
    pub fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(PathBuf::from(home).join(".local").join("state").join("likhit"))
        } else {
            ProjectDirs::from("", "", "likhit")
                .map(|proj_dirs| proj_dirs.data_local_dir().to_path_buf())
        }
    }

    pub fn log_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("likhit.log"))
    }
}
