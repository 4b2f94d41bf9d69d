//! Type discovery
//!
//! Scans one group/version source directory per unit and reports the types
//! that should get cluster-aware accessors. [`Aggregator`] runs every declared
//! unit and merges the results.

mod aggregator;
mod loader;
pub mod markers;

pub use aggregator::{Aggregator, VersionPolicy};
pub use loader::{module_path, FsSourceLoader, LoadedPackage, SourceLoader};

#[cfg(test)]
pub use loader::MockSourceLoader;

use crate::error::GenerationError;
use crate::models::{DiscoveredApi, GroupVersionKind};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Discovery errors
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("source path {path:?} is not a directory")]
    NotADirectory { path: PathBuf },

    #[error("failed to read {path:?}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse manifest {path:?}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("no module information found for {path:?}")]
    NoModule { path: PathBuf },

    #[error("type {kind} is declared more than once")]
    DuplicateKind { kind: String },

    #[error("invalid declaration pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Result of discovering one group/version unit
#[derive(Debug, Default)]
pub struct UnitDiscovery {
    /// Module of the first loaded package that has one
    pub module: Option<String>,
    /// Eligible APIs in declaration order
    pub apis: Vec<DiscoveredApi>,
    /// Failures recorded for the unit or for single types within it
    pub errors: Vec<GenerationError>,
    loaded: bool,
}

impl UnitDiscovery {
    fn failed(unit: String, err: DiscoveryError) -> Self {
        Self {
            errors: vec![GenerationError::new(unit, err)],
            ..Default::default()
        }
    }

    /// Whether the unit's sources were loaded
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }
}

/// Identifier used for a group/version unit in errors and logs
pub fn unit_id(group: &str, version: &str) -> String {
    format!("{}/{}", group, version)
}

/// Module of the first package that has one
pub fn first_module(packages: &[LoadedPackage]) -> Option<String> {
    packages
        .iter()
        .find_map(|p| p.module.as_ref().filter(|m| !m.is_empty()).cloned())
}

/// Discover the eligible types of one group/version
///
/// Never fails the run: a load failure or missing module information yields an
/// empty result carrying the recorded error.
pub fn discover(
    loader: &dyn SourceLoader,
    input_dir: &Path,
    group: &str,
    version: &str,
) -> UnitDiscovery {
    let unit = unit_id(group, version);
    let path = input_dir.join(group).join(version);
    tracing::debug!("Discovering types for {} in {:?}", unit, path);

    let packages = match loader.load(&path) {
        Ok(packages) => packages,
        Err(e) => return UnitDiscovery::failed(unit, e),
    };

    let Some(module) = first_module(&packages) else {
        return UnitDiscovery::failed(unit, DiscoveryError::NoModule { path });
    };

    let mut seen = HashSet::new();
    let mut apis = Vec::new();
    let mut errors = Vec::new();

    for package in &packages {
        for ty in package.types.iter().filter(|t| markers::is_eligible(t)) {
            if !seen.insert(ty.name.clone()) {
                errors.push(GenerationError::new(
                    format!("{} Kind={}", unit, ty.name),
                    DiscoveryError::DuplicateKind {
                        kind: ty.name.clone(),
                    },
                ));
                continue;
            }
            apis.push(DiscoveredApi {
                gvk: GroupVersionKind::new(group, version, &ty.name),
                namespaced: ty.namespaced,
                package: package.import_path.clone(),
            });
        }
    }

    tracing::debug!("Discovered {} eligible type(s) in {}", apis.len(), unit);

    UnitDiscovery {
        module: Some(module),
        apis,
        errors,
        loaded: true,
    }
}
