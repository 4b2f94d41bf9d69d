//! Model aggregation
//!
//! Runs discovery for every declared group/version exactly once and folds the
//! per-unit results into one [`AggregatedModel`]. Unit failures are collected;
//! aggregation never stops early.

use super::{discover, unit_id, SourceLoader};
use crate::error::{GenerateError, GenerationError};
use crate::models::{AggregatedModel, GroupVersions};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Which declared versions of a group are discovered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VersionPolicy {
    /// Only the first version seen for a group is current; later versions of
    /// the same group are dropped with a warning
    #[default]
    FirstOnly,
    /// Every distinct version is discovered
    All,
}

/// Merges per-unit discovery results into one model
pub struct Aggregator<'a> {
    loader: &'a dyn SourceLoader,
    input_dir: PathBuf,
    policy: VersionPolicy,
}

impl<'a> Aggregator<'a> {
    pub fn new(loader: &'a dyn SourceLoader, input_dir: impl AsRef<Path>) -> Self {
        Self {
            loader,
            input_dir: input_dir.as_ref().to_path_buf(),
            policy: VersionPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: VersionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Discover every declared unit
    ///
    /// The error is `None` only when no unit recorded a failure.
    pub fn aggregate(&self, declared: &[GroupVersions]) -> (AggregatedModel, Option<GenerateError>) {
        let mut model = AggregatedModel::new();
        let mut errors: Vec<GenerationError> = Vec::new();
        let mut current: HashMap<&str, &str> = HashMap::new();
        let mut visited: HashSet<(&str, &str)> = HashSet::new();

        for gv in declared {
            let group = gv.group.as_str();
            for version in gv.versions.iter().map(String::as_str) {
                if self.policy == VersionPolicy::FirstOnly {
                    match current.get(group) {
                        Some(first) if *first != version => {
                            tracing::warn!(
                                "Ignoring {}: only the first version ({}) of a group is generated",
                                unit_id(group, version),
                                first
                            );
                            continue;
                        }
                        Some(_) => {}
                        None => {
                            current.insert(group, version);
                        }
                    }
                }

                if !visited.insert((group, version)) {
                    tracing::debug!("Skipping repeated {}", unit_id(group, version));
                    continue;
                }

                let unit = discover(self.loader, &self.input_dir, group, version);

                if model.module.is_none() {
                    if let Some(module) = &unit.module {
                        tracing::debug!("Resolved module {}", module);
                        model.module = Some(module.clone());
                    }
                }

                for err in &unit.errors {
                    tracing::warn!("Discovery failed for {}", err);
                }

                if unit.is_loaded() {
                    model.insert(group, version, unit.apis);
                }
                errors.extend(unit.errors);
            }
        }

        tracing::info!(
            "Discovered {} API(s) across {} group(s), {} failure(s)",
            model.apis().count(),
            model.groups().count(),
            errors.len()
        );

        let err = (!errors.is_empty()).then(|| GenerateError::new(errors));
        (model, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::{DiscoveryError, LoadedPackage, MockSourceLoader};
    use crate::models::DeclaredType;
    use std::path::Path;

    fn eligible(name: &str) -> DeclaredType {
        DeclaredType {
            name: name.to_string(),
            namespaced: true,
            eligible: true,
        }
    }

    /// Loader serving `<group>/<version>` paths; "broken" groups fail to load
    fn loader() -> MockSourceLoader {
        let mut loader = MockSourceLoader::new();
        loader.expect_load().returning(|path: &Path| {
            let version = path.file_name().unwrap().to_string_lossy().to_string();
            let group = path
                .parent()
                .and_then(|p| p.file_name())
                .unwrap()
                .to_string_lossy()
                .to_string();
            if group == "broken" {
                return Err(DiscoveryError::NotADirectory {
                    path: path.to_path_buf(),
                });
            }
            Ok(vec![LoadedPackage {
                dir: path.to_path_buf(),
                module: Some("example_apis".to_string()),
                import_path: format!("example_apis::apis::{}::{}", group, version),
                types: vec![eligible(&format!("{}Type", version.to_uppercase()))],
            }])
        });
        loader
    }

    #[test]
    fn test_first_version_only_policy() {
        let loader = loader();
        let declared = vec![
            GroupVersions::new("example", &["v1", "v2"]),
            GroupVersions::new("example", &["v3"]),
        ];

        let (model, err) = Aggregator::new(&loader, "/apis").aggregate(&declared);
        assert!(err.is_none());
        assert_eq!(model.versions("example"), vec!["v1"]);
    }

    #[test]
    fn test_all_versions_policy_dedups_pairs() {
        let loader = loader();
        let declared = vec![
            GroupVersions::new("example", &["v1", "v2"]),
            GroupVersions::new("example", &["v1"]),
        ];

        let (model, err) = Aggregator::new(&loader, "/apis")
            .with_policy(VersionPolicy::All)
            .aggregate(&declared);
        assert!(err.is_none());
        assert_eq!(model.versions("example"), vec!["v1", "v2"]);
        assert_eq!(model.apis().count(), 2);
    }

    #[test]
    fn test_unit_failure_does_not_stop_aggregation() {
        let loader = loader();
        let declared = vec![
            GroupVersions::new("alpha", &["v1"]),
            GroupVersions::new("broken", &["v1"]),
            GroupVersions::new("beta", &["v1"]),
            GroupVersions::new("gamma", &["v1"]),
        ];

        let (model, err) = Aggregator::new(&loader, "/apis").aggregate(&declared);
        let err = err.expect("one unit failed");
        assert_eq!(err.failures.len(), 1);
        assert_eq!(err.failures[0].unit, "broken/v1");

        let groups: Vec<_> = model.groups().map(|(g, _)| g).collect();
        assert_eq!(groups, vec!["alpha", "beta", "gamma"]);
        assert_eq!(model.module.as_deref(), Some("example_apis"));
    }

    #[test]
    fn test_aggregation_is_deterministic() {
        let declared = vec![
            GroupVersions::new("zeta", &["v1"]),
            GroupVersions::new("alpha", &["v2", "v1"]),
        ];

        let first = Aggregator::new(&loader(), "/apis")
            .with_policy(VersionPolicy::All)
            .aggregate(&declared)
            .0;
        let second = Aggregator::new(&loader(), "/apis")
            .with_policy(VersionPolicy::All)
            .aggregate(&declared)
            .0;

        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
