//! Rendering contexts, one per artifact kind

use crate::models::DiscoveredApi;
use serde::Serialize;

/// One API as seen by the templates
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiContext {
    pub group: String,
    pub version: String,
    pub kind: String,
    /// Lowercased plural kind
    pub resource: String,
    /// Import path of the module declaring the type
    pub package: String,
    pub namespaced: bool,
}

impl From<&DiscoveredApi> for ApiContext {
    fn from(api: &DiscoveredApi) -> Self {
        Self {
            group: api.gvk.group.clone(),
            version: api.gvk.version.clone(),
            kind: api.gvk.kind.clone(),
            resource: api.gvk.resource(),
            package: api.package.clone(),
            namespaced: api.namespaced,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FactoryContext {
    pub package_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenericContext {
    pub package_name: String,
    pub lister_package: String,
    pub apis: Vec<ApiContext>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupContext {
    pub informer_package: String,
    pub group: String,
    pub versions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionContext {
    pub informer_package: String,
    pub group: String,
    pub version: String,
    pub apis: Vec<ApiContext>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessorContext {
    pub informer_package: String,
    pub lister_package: String,
    #[serde(flatten)]
    pub api: ApiContext,
}

/// Data handed to the renderer for one artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ArtifactContext {
    Factory(FactoryContext),
    Generic(GenericContext),
    Group(GroupContext),
    Version(VersionContext),
    Accessor(AccessorContext),
}
