//! Composite index keys
//!
//! Every object is addressed by (cluster, namespace, name). The cluster comes
//! from the object's own cluster annotation, never from the caller.

use kube::{Resource, ResourceExt};
use std::fmt;

/// Annotation carrying the logical cluster an object belongs to
pub const CLUSTER_ANNOTATION: &str = "kcp.io/cluster";

/// Composite key; empty parts select a whole partition
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct IndexKey {
    pub cluster: String,
    pub namespace: String,
    pub name: String,
}

impl IndexKey {
    pub fn new(
        cluster: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            cluster: cluster.into(),
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Partition key of every object in a cluster
    pub fn cluster(cluster: impl Into<String>) -> Self {
        Self::new(cluster, "", "")
    }

    /// Partition key of every object in one namespace of a cluster
    pub fn cluster_namespace(cluster: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self::new(cluster, namespace, "")
    }

    /// Full key of a stored object
    pub fn for_object<K: Resource>(obj: &K) -> Self {
        Self::new(
            cluster_name(obj),
            obj.namespace().unwrap_or_default(),
            obj.meta().name.clone().unwrap_or_default(),
        )
    }
}

/// Prints `cluster|namespace/name`, leaving out empty parts
impl fmt::Display for IndexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.cluster.is_empty() {
            write!(f, "{}|", self.cluster)?;
        }
        if !self.namespace.is_empty() {
            write!(f, "{}/", self.namespace)?;
        }
        f.write_str(&self.name)
    }
}

/// Logical cluster of an object; empty when unannotated
pub fn cluster_name<K: Resource>(obj: &K) -> String {
    obj.annotations()
        .get(CLUSTER_ANNOTATION)
        .cloned()
        .unwrap_or_default()
}

/// Signature of a secondary index function
pub type IndexFunc<K> = fn(&K) -> Vec<String>;

/// Indexes objects by cluster
pub fn cluster_index_func<K: Resource>(obj: &K) -> Vec<String> {
    vec![IndexKey::cluster(cluster_name(obj)).to_string()]
}

/// Indexes objects by cluster and namespace
pub fn cluster_and_namespace_index_func<K: Resource>(obj: &K) -> Vec<String> {
    vec![
        IndexKey::cluster_namespace(cluster_name(obj), obj.namespace().unwrap_or_default())
            .to_string(),
    ]
}
