use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use crate::meta::NAME;

pub struct Directory {}

impl Directory {
    #[cfg(not(feature = "portable"))]
    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("dev", "spinlab", NAME)
    }

    /// Return path adjacent to spinlab executable when built as portable
    #[cfg(feature = "portable")]
    fn project_dirs() -> Option<ProjectDirs> {
        let current_exe = std::env::current_exe().ok()?;
        let parent = current_exe.parent()?;
        ProjectDirs::from_path(parent.join("spinlab-data"))
    }

    // Local data directory differs from data directory
    // on some platforms and is not transferred across
    // machines
    pub fn data_local_directory() -> Option<PathBuf> {
        let dirs = Self::project_dirs()?;
        let dir = dirs.data_local_dir();
        ensure_dir(dir);
        Some(dir.to_path_buf())
    }

    /// Get the path to logs directory
    /// Each log file is for individual application startup
    pub fn logs_directory() -> Option<PathBuf> {
        Self::data_local_directory().map(|dir| sub_directory(&dir, "logs"))
    }

    /// Folder holding the persisted panel layout, one file per storage key
    pub fn db_directory() -> Option<PathBuf> {
        Self::data_local_directory().map(|dir| sub_directory(&dir, "db"))
    }

    pub fn config_directory() -> Option<PathBuf> {
        let dirs = Self::project_dirs()?;
        let dir = dirs.config_dir();
        ensure_dir(dir);
        Some(dir.to_path_buf())
    }

    pub fn settings_file() -> Option<PathBuf> {
        Self::config_directory().map(|dir| dir.join("settings.toml"))
    }
}

fn sub_directory(parent: &Path, name: &str) -> PathBuf {
    let dir = parent.join(name);
    ensure_dir(&dir);
    dir
}

fn ensure_dir(dir: &Path) {
    if !dir.exists() {
        if let Err(err) = std::fs::create_dir_all(dir) {
            tracing::error!("{:?}", err);
        }
    }
}
