//! Configuration system for informergen
//!
//! Settings come from built-in defaults, the user config, a project config
//! file, environment variables and finally command-line flags, each layer
//! overriding the keys it sets.

pub mod loader;
pub mod paths;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::{Config, ConfigLayer};

/// Get a configuration value by key
pub fn get_config_value(config: &Config, key: &str) -> anyhow::Result<String> {
    let path = |p: &Option<std::path::PathBuf>| {
        p.as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default()
    };

    match key {
        "inputDir" => Ok(path(&config.input_dir)),
        "outputDir" => Ok(config.output_dir.display().to_string()),
        "groupVersions" => Ok(config.group_versions.join(" ")),
        "headerFile" => Ok(path(&config.header_file)),
        "packageName" => Ok(config.package_name.clone()),
        "fileExtension" => Ok(config.file_extension.clone()),
        "listersPackage" => Ok(config.listers_package.clone()),
        "informersPackage" => Ok(config.informers_package.clone().unwrap_or_default()),
        "versionPolicy" => serde_yaml::to_string(&config.version_policy)
            .map(|s| s.trim_end().to_string())
            .map_err(|e| anyhow::anyhow!("Failed to serialize versionPolicy: {}", e)),
        _ => Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_config_value() {
        let config = Config::default();
        assert_eq!(get_config_value(&config, "packageName").unwrap(), "externalversions");
        assert_eq!(get_config_value(&config, "versionPolicy").unwrap(), "firstOnly");
        assert_eq!(get_config_value(&config, "inputDir").unwrap(), "");
        assert!(get_config_value(&config, "readOnly").is_err());
    }
}
