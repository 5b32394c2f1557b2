//! Per-user file locations.

use std::path::{Path, PathBuf};

use crate::window::state::STATE_FILE_NAME;

/// Folder under the platform data directory.
pub const APP_DIR_NAME: &str = "Lepton";

/// User configuration file in the home directory.
pub const CONFIG_FILE_NAME: &str = ".leptonrc";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub config_file: PathBuf,
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
    pub window_state_file: PathBuf,
}

impl AppPaths {
    /// Paths for the current user.
    ///
    /// Falls back to the temp directory when the platform reports no home
    /// or data directory, so startup never fails on path resolution.
    pub fn resolve() -> Self {
        let home = dirs::home_dir().unwrap_or_else(std::env::temp_dir);
        let data = dirs::data_dir().unwrap_or_else(std::env::temp_dir);
        Self::from_roots(&home, &data)
    }

    pub fn from_roots(home: &Path, data: &Path) -> Self {
        let data_dir = data.join(APP_DIR_NAME);
        Self {
            config_file: home.join(CONFIG_FILE_NAME),
            log_dir: data_dir.join("logs"),
            window_state_file: data_dir.join(STATE_FILE_NAME),
            data_dir,
        }
    }
}
