use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// Where log files go: `$HOME/.local/state/oiltype`, else the platform
    /// data-local dir.
    pub fn log_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(PathBuf::from(home).join(".local").join("state").join("oiltype"))
        } else {
            ProjectDirs::from("", "", "oiltype").map(|pd| pd.data_local_dir().join("logs"))
        }
    }
}
