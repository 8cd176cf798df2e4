//! Application paths management.

use directories::ProjectDirs;
use std::path::PathBuf;

/// Environment variable that points at an alternative config file.
pub const CONFIG_ENV_VAR: &str = "HANGE_CONFIG";

/// Manages all application paths following platform conventions.
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub config_file: PathBuf,
}

impl AppPaths {
    /// Create paths using platform-specific directories.
    pub fn new() -> Option<Self> {
        let proj_dirs = ProjectDirs::from("com", "hange", "hange")?;
        let config_dir = proj_dirs.config_dir().to_path_buf();

        Some(Self {
            config_file: config_dir.join("config.toml"),
            config_dir,
        })
    }

    /// Use an explicit config file, falling back to the platform default.
    pub fn with_config_file(config_file: Option<PathBuf>) -> Option<Self> {
        match config_file {
            Some(file) => {
                let config_dir = file
                    .parent()
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("."));
                Some(Self {
                    config_dir,
                    config_file: file,
                })
            }
            None => Self::new(),
        }
    }

    /// Create all necessary directories.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.config_dir)
    }

    /// Check if hange has been initialized.
    pub fn is_initialized(&self) -> bool {
        self.config_file.exists()
    }
}
