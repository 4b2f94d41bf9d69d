//! Configuration schema definitions
//!
//! [`Config`] is the resolved configuration of a run. Every file layer is read
//! as a [`ConfigLayer`], where an absent key leaves the value below it alone.

use crate::discovery::VersionPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Resolved configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory holding `<group>/<version>` source trees
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_dir: Option<PathBuf>,

    /// Directory generated informers are written below
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Declared group/versions, as `group:v1,v2`
    #[serde(default)]
    pub group_versions: Vec<String>,

    /// Boilerplate prepended to every generated file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_file: Option<PathBuf>,

    /// Name of the generated informers package
    #[serde(default = "default_package_name")]
    pub package_name: String,

    /// Extension of generated files
    #[serde(default = "default_file_extension")]
    pub file_extension: String,

    /// Import path of the cluster-aware listers
    #[serde(default = "default_listers_package")]
    pub listers_package: String,

    /// Import path of the generated informers; derived when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub informers_package: Option<String>,

    /// Which versions of a group are generated
    #[serde(default)]
    pub version_policy: VersionPolicy,
}

/// One configuration source; absent keys are inherited
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigLayer {
    pub input_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub group_versions: Option<Vec<String>>,
    pub header_file: Option<PathBuf>,
    pub package_name: Option<String>,
    pub file_extension: Option<String>,
    pub listers_package: Option<String>,
    pub informers_package: Option<String>,
    pub version_policy: Option<VersionPolicy>,
}

impl Config {
    /// Overlay every key set in `layer`
    pub fn apply(&mut self, layer: ConfigLayer) {
        if let Some(v) = layer.input_dir {
            self.input_dir = Some(v);
        }
        if let Some(v) = layer.output_dir {
            self.output_dir = v;
        }
        if let Some(v) = layer.group_versions {
            self.group_versions = v;
        }
        if let Some(v) = layer.header_file {
            self.header_file = Some(v);
        }
        if let Some(v) = layer.package_name {
            self.package_name = v;
        }
        if let Some(v) = layer.file_extension {
            self.file_extension = v;
        }
        if let Some(v) = layer.listers_package {
            self.listers_package = v;
        }
        if let Some(v) = layer.informers_package {
            self.informers_package = Some(v);
        }
        if let Some(v) = layer.version_policy {
            self.version_policy = v;
        }
    }

    /// Check the settings a generation run depends on
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.input_dir.is_none() {
            anyhow::bail!("inputDir is required");
        }
        if self.group_versions.is_empty() {
            anyhow::bail!("at least one group/version is required");
        }
        for gv in &self.group_versions {
            gv.parse::<crate::models::GroupVersions>()
                .map_err(|e| anyhow::anyhow!("invalid groupVersions entry: {}", e))?;
        }
        if !is_identifier(&self.package_name) {
            anyhow::bail!(
                "packageName '{}' is not a valid identifier",
                self.package_name
            );
        }
        if self.file_extension.trim().is_empty() {
            anyhow::bail!("fileExtension must not be empty");
        }
        // The derived import path is built from outputDir's components
        if self.output_dir.is_absolute() && self.informers_package.is_none() {
            anyhow::bail!(
                "outputDir '{}' is absolute; set informersPackage to its import path",
                self.output_dir.display()
            );
        }
        Ok(())
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c == '_' || c.is_ascii_alphabetic())
        && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

// Default value functions
fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_package_name() -> String {
    "externalversions".to_string()
}

fn default_file_extension() -> String {
    "rs".to_string()
}

fn default_listers_package() -> String {
    "informergen::cache".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dir: None,
            output_dir: default_output_dir(),
            group_versions: Vec::new(),
            header_file: None,
            package_name: default_package_name(),
            file_extension: default_file_extension(),
            listers_package: default_listers_package(),
            informers_package: None,
            version_policy: VersionPolicy::default(),
        }
    }
}
