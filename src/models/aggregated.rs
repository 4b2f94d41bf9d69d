//! Aggregated discovery model
//!
//! Groups, versions and APIs are kept in discovery order so that repeated runs
//! over unchanged input plan artifacts in the same order.

use super::DiscoveredApi;
use indexmap::IndexMap;
use serde::Serialize;

/// Versions of one group, each with its discovered APIs
pub type GroupVersionMap = IndexMap<String, Vec<DiscoveredApi>>;

/// Merged result of discovery across every group/version unit
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregatedModel {
    /// Owning module, resolved from the first successful load
    pub module: Option<String>,
    groups: IndexMap<String, GroupVersionMap>,
}

impl AggregatedModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a group/version pair has already been merged
    pub fn contains(&self, group: &str, version: &str) -> bool {
        self.groups
            .get(group)
            .is_some_and(|versions| versions.contains_key(version))
    }

    /// Merge the APIs discovered for one group/version
    ///
    /// The first merge of a pair wins; later merges of the same pair are
    /// ignored and return false.
    pub fn insert(&mut self, group: &str, version: &str, apis: Vec<DiscoveredApi>) -> bool {
        let versions = self.groups.entry(group.to_string()).or_default();
        if versions.contains_key(version) {
            return false;
        }
        versions.insert(version.to_string(), apis);
        true
    }

    /// Groups in discovery order
    pub fn groups(&self) -> impl Iterator<Item = (&str, &GroupVersionMap)> {
        self.groups.iter().map(|(g, v)| (g.as_str(), v))
    }

    /// Versions of a group in discovery order
    pub fn versions(&self, group: &str) -> Vec<&str> {
        self.groups
            .get(group)
            .map(|versions| versions.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Every discovered API, ordered by group, then version, then discovery
    pub fn apis(&self) -> impl Iterator<Item = &DiscoveredApi> {
        self.groups
            .values()
            .flat_map(|versions| versions.values())
            .flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
