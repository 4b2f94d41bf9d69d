//! Configuration loading and merging logic
//!
//! Handles loading configuration from multiple sources and merging them
//! according to precedence rules.

use super::paths;
use super::schema::{Config, ConfigLayer};
use crate::discovery::VersionPolicy;
use anyhow::{Context, Result};
use std::path::Path;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with all file and environment layers merged
    ///
    /// Precedence order (highest to lowest):
    /// 1. Environment variable overrides
    /// 2. Project config (`project_file`, else `./informergen.yaml`)
    /// 3. User config
    /// 4. Built-in defaults
    ///
    /// Command-line flags are applied on top by the caller.
    pub fn load(project_file: Option<&Path>) -> Result<Config> {
        let mut config = Config::default();

        let user_path = paths::user_config_path();
        if user_path.is_file() {
            config.apply(Self::load_file(&user_path)?);
        }

        match project_file {
            Some(path) => config.apply(Self::load_file(path)?),
            None => {
                if let Some(path) = paths::project_config_path() {
                    config.apply(Self::load_file(&path)?);
                }
            }
        }

        Self::apply_env_overrides(&mut config)?;
        Ok(config)
    }

    /// Load one configuration layer from a file
    pub fn load_file(path: &Path) -> Result<ConfigLayer> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        // An empty file is a valid layer that sets nothing
        if contents.trim().is_empty() {
            return Ok(ConfigLayer::default());
        }

        serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(config: &mut Config) -> Result<()> {
        if let Ok(dir) = std::env::var("INFORMERGEN_OUTPUT_DIR") {
            config.output_dir = dir.into();
        }

        if let Ok(name) = std::env::var("INFORMERGEN_PACKAGE_NAME") {
            config.package_name = name;
        }

        if let Ok(policy) = std::env::var("INFORMERGEN_VERSION_POLICY") {
            config.version_policy = serde_yaml::from_str::<VersionPolicy>(&policy)
                .with_context(|| {
                    format!(
                        "INFORMERGEN_VERSION_POLICY must be 'firstOnly' or 'all', got '{}'",
                        policy
                    )
                })?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_load_file_layers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("informergen.yaml");
        std::fs::write(
            &path,
            "inputDir: src/apis\ngroupVersions:\n  - example:v1\nfileExtension: rs\n",
        )
        .unwrap();

        let mut config = Config::default();
        config.apply(ConfigLoader::load_file(&path).unwrap());
        assert_eq!(config.input_dir, Some(PathBuf::from("src/apis")));
        assert_eq!(config.group_versions, vec!["example:v1"]);
        assert_eq!(config.package_name, "externalversions");
    }

    #[test]
    fn test_empty_file_sets_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("informergen.yaml");
        std::fs::write(&path, "\n").unwrap();
        assert_eq!(ConfigLoader::load_file(&path).unwrap(), ConfigLayer::default());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ConfigLoader::load(Some(&dir.path().join("absent.yaml"))).is_err());
    }

    #[test]
    fn test_env_overrides() {
        // SAFETY: set_var is unsafe in Rust 2024 due to potential data races.
        // No other test reads these variables.
        unsafe {
            std::env::set_var("INFORMERGEN_PACKAGE_NAME", "informers");
            std::env::set_var("INFORMERGEN_VERSION_POLICY", "all");
        }

        let mut config = Config::default();
        let result = ConfigLoader::apply_env_overrides(&mut config);

        // SAFETY: see above
        unsafe {
            std::env::remove_var("INFORMERGEN_PACKAGE_NAME");
            std::env::remove_var("INFORMERGEN_VERSION_POLICY");
        }

        result.unwrap();
        assert_eq!(config.package_name, "informers");
        assert_eq!(config.version_policy, VersionPolicy::All);
    }
}
