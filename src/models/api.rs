//! Declared and discovered API types

use super::GroupVersionKind;
use serde::{Deserialize, Serialize};

/// Structural description of one type declared in a group/version source tree
///
/// Eligibility and scope come from the markers attached to the declaration;
/// see [`crate::discovery::markers`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredType {
    pub name: String,
    /// False when the type carries the cluster-scoped-only marker
    pub namespaced: bool,
    /// True when the type should get generated accessors
    pub eligible: bool,
}

/// An API type selected for accessor generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredApi {
    pub gvk: GroupVersionKind,
    pub namespaced: bool,
    /// Import path of the module declaring the type
    pub package: String,
}

impl DiscoveredApi {
    pub fn kind(&self) -> &str {
        &self.gvk.kind
    }
}
