//! Per-user directories for the optional config file and run logs.
//!
//! Everything lives under one `audiocluster` folder in the platform config
//! directory. `AUDIOCLUSTER_CONFIG_HOME` replaces the platform directory,
//! which keeps test runs and portable setups self-contained.

use std::path::{Path, PathBuf};

use directories::BaseDirs;
use thiserror::Error;

/// Folder created under the base config directory.
pub const APP_DIR_NAME: &str = "audiocluster";
/// Environment variable replacing the platform base directory.
pub const CONFIG_HOME_ENV: &str = "AUDIOCLUSTER_CONFIG_HOME";
/// Config file picked up when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Error)]
pub enum AppDirError {
    #[error("No base config directory available for application files")]
    NoBaseDir,
    #[error("Failed to create application directory at {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Application root without touching the filesystem.
pub fn app_root_path() -> Result<PathBuf, AppDirError> {
    let override_dir = std::env::var_os(CONFIG_HOME_ENV).map(PathBuf::from);
    let base = resolve_base(override_dir, || {
        BaseDirs::new().map(|dirs| dirs.config_dir().to_path_buf())
    })
    .ok_or(AppDirError::NoBaseDir)?;
    Ok(base.join(APP_DIR_NAME))
}

/// Location of the default config file; it may not exist.
pub fn default_config_file() -> Result<PathBuf, AppDirError> {
    Ok(app_root_path()?.join(CONFIG_FILE_NAME))
}

/// Logs directory inside the application root, created if needed.
pub fn logs_dir() -> Result<PathBuf, AppDirError> {
    let path = app_root_path()?.join("logs");
    create_dir(&path)?;
    Ok(path)
}

fn create_dir(path: &Path) -> Result<(), AppDirError> {
    std::fs::create_dir_all(path).map_err(|source| AppDirError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

/// A non-empty override wins over the platform directory.
fn resolve_base(
    override_dir: Option<PathBuf>,
    platform: impl FnOnce() -> Option<PathBuf>,
) -> Option<PathBuf> {
    match override_dir {
        Some(dir) if !dir.as_os_str().is_empty() => Some(dir),
        _ => platform(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn override_replaces_platform_dir() {
        let base = resolve_base(Some(PathBuf::from("/tmp/portable")), || {
            Some(PathBuf::from("/home/user/.config"))
        });
        assert_eq!(base, Some(PathBuf::from("/tmp/portable")));
    }

    #[test]
    fn empty_override_falls_back() {
        let base = resolve_base(Some(PathBuf::new()), || Some(PathBuf::from("/cfg")));
        assert_eq!(base, Some(PathBuf::from("/cfg")));
        assert_eq!(resolve_base(None, || None), None);
    }

    #[test]
    fn create_dir_builds_nested_paths() {
        let root = tempdir().unwrap();
        let nested = root.path().join(APP_DIR_NAME).join("logs");
        create_dir(&nested).unwrap();
        assert!(nested.is_dir());
    }
}
