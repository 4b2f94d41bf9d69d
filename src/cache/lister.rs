//! Scoped listers
//!
//! Three nested scopes over one [`ClusterIndexer`]: every cluster, one
//! cluster, and one namespace of one cluster. Each scope answers from the
//! matching index partition, so listing a namespace never scans other
//! clusters.

use super::indexer::{ClusterIndexer, CLUSTER_AND_NAMESPACE_INDEX, CLUSTER_INDEX};
use super::key::IndexKey;
use super::CacheError;
use kube::core::{ClusterResourceScope, NamespaceResourceScope, Selector, SelectorExt};
use kube::{Resource, ResourceExt};
use std::sync::Arc;

/// Keep the objects whose labels satisfy `selector`; `None` keeps everything
fn filter<K: Resource>(objects: Vec<Arc<K>>, selector: Option<&Selector>) -> Vec<Arc<K>> {
    match selector {
        Some(selector) if !selector.selects_all() => objects
            .into_iter()
            .filter(|obj| selector.matches(obj.labels()))
            .collect(),
        _ => objects,
    }
}

fn get_exact<K: Resource>(
    indexer: &ClusterIndexer<K>,
    key: IndexKey,
) -> Result<Arc<K>, CacheError> {
    indexer
        .get_by_key(&key)?
        .ok_or_else(|| CacheError::NotFound {
            resource: indexer.resource().to_string(),
            name: key.name,
        })
}

/// Lists objects across every cluster
pub struct ClusterLister<K> {
    indexer: ClusterIndexer<K>,
}

impl<K> Clone for ClusterLister<K> {
    fn clone(&self) -> Self {
        Self {
            indexer: self.indexer.clone(),
        }
    }
}

impl<K: Resource> ClusterLister<K> {
    pub fn new(indexer: ClusterIndexer<K>) -> Self {
        Self { indexer }
    }

    /// Every object of every cluster matching `selector`
    pub fn list(&self, selector: Option<&Selector>) -> Result<Vec<Arc<K>>, CacheError> {
        Ok(filter(self.indexer.list()?, selector))
    }

    /// Narrow to one logical cluster
    pub fn cluster(&self, cluster: impl Into<String>) -> Lister<K> {
        Lister {
            indexer: self.indexer.clone(),
            cluster: cluster.into(),
        }
    }
}

/// Lists objects within one cluster
pub struct Lister<K> {
    indexer: ClusterIndexer<K>,
    cluster: String,
}

impl<K> Clone for Lister<K> {
    fn clone(&self) -> Self {
        Self {
            indexer: self.indexer.clone(),
            cluster: self.cluster.clone(),
        }
    }
}

impl<K: Resource> Lister<K> {
    pub fn cluster_name(&self) -> &str {
        &self.cluster
    }

    /// Objects of this cluster matching `selector`
    pub fn list(&self, selector: Option<&Selector>) -> Result<Vec<Arc<K>>, CacheError> {
        let objects = self
            .indexer
            .by_index(CLUSTER_INDEX, &IndexKey::cluster(self.cluster.as_str()))?;
        Ok(filter(objects, selector))
    }
}

impl<K: Resource<Scope = NamespaceResourceScope>> Lister<K> {
    /// Narrow to one namespace of this cluster
    pub fn namespace(&self, namespace: impl Into<String>) -> NamespaceLister<K> {
        NamespaceLister {
            indexer: self.indexer.clone(),
            cluster: self.cluster.clone(),
            namespace: namespace.into(),
        }
    }
}

impl<K: Resource<Scope = ClusterResourceScope>> Lister<K> {
    /// Cluster-scoped object `name` of this cluster
    pub fn get(&self, name: &str) -> Result<Arc<K>, CacheError> {
        get_exact(&self.indexer, IndexKey::new(self.cluster.as_str(), "", name))
    }
}

/// Lists and gets objects within one namespace of one cluster
pub struct NamespaceLister<K> {
    indexer: ClusterIndexer<K>,
    cluster: String,
    namespace: String,
}

impl<K> Clone for NamespaceLister<K> {
    fn clone(&self) -> Self {
        Self {
            indexer: self.indexer.clone(),
            cluster: self.cluster.clone(),
            namespace: self.namespace.clone(),
        }
    }
}

impl<K: Resource> NamespaceLister<K> {
    /// Objects of this namespace matching `selector`
    pub fn list(&self, selector: Option<&Selector>) -> Result<Vec<Arc<K>>, CacheError> {
        let key = IndexKey::cluster_namespace(self.cluster.as_str(), self.namespace.as_str());
        let objects = self.indexer.by_index(CLUSTER_AND_NAMESPACE_INDEX, &key)?;
        Ok(filter(objects, selector))
    }

    /// Object `name` of this namespace
    pub fn get(&self, name: &str) -> Result<Arc<K>, CacheError> {
        get_exact(
            &self.indexer,
            IndexKey::new(self.cluster.as_str(), self.namespace.as_str(), name),
        )
    }
}
