//! Cross-platform configuration path resolution
//!
//! - Linux/macOS: XDG Base Directory specification (~/.config)
//! - Windows: Known Folder API (AppData\Roaming)

use std::path::PathBuf;

/// File name of the per-project configuration
pub const PROJECT_CONFIG_FILE: &str = "informergen.yaml";

/// Environment variable overriding the configuration directory
pub const CONFIG_DIR_ENV: &str = "INFORMERGEN_CONFIG_DIR";

/// Get the user configuration directory path
///
/// Checks INFORMERGEN_CONFIG_DIR environment variable first (ignored when
/// empty), then falls back to:
/// - Unix (Linux/macOS): XDG_CONFIG_HOME/informergen or ~/.config/informergen
/// - Windows: %APPDATA%\informergen\config
pub fn config_dir() -> PathBuf {
    resolve_config_dir(std::env::var_os(CONFIG_DIR_ENV).map(PathBuf::from))
}

fn resolve_config_dir(overridden: Option<PathBuf>) -> PathBuf {
    overridden
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(platform_config_dir)
}

#[cfg(windows)]
fn platform_config_dir() -> PathBuf {
    // ProjectDirs resolves the roaming AppData folder
    use directories::ProjectDirs;
    ProjectDirs::from("", "", "informergen")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".").join(".config").join("informergen"))
}

#[cfg(not(windows))]
fn platform_config_dir() -> PathBuf {
    // XDG_CONFIG_HOME wins over $HOME/.config
    use directories::BaseDirs;
    std::env::var_os("XDG_CONFIG_HOME")
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            BaseDirs::new()
                .map(|dirs| dirs.home_dir().join(".config"))
                .unwrap_or_else(|| PathBuf::from(".").join(".config"))
        })
        .join("informergen")
}

/// Get the user configuration file path
pub fn user_config_path() -> PathBuf {
    config_dir().join("config.yaml")
}

/// Project configuration in the working directory, if one exists
pub fn project_config_path() -> Option<PathBuf> {
    let path = PathBuf::from(PROJECT_CONFIG_FILE);
    path.is_file().then_some(path)
}
