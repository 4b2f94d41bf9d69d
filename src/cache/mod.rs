//! Cluster-aware cache
//!
//! Runtime support the generated informers build on: a composite-key store
//! indexed by cluster and by cluster+namespace, scoped listers over it and a
//! watch-driven informer keeping it current.

mod indexer;
mod informer;
mod key;
mod lister;

pub use indexer::{ClusterIndexer, IndexWriter, CLUSTER_AND_NAMESPACE_INDEX, CLUSTER_INDEX};
pub use informer::ClusterInformer;
pub use key::{
    cluster_and_namespace_index_func, cluster_index_func, cluster_name, IndexFunc, IndexKey,
    CLUSTER_ANNOTATION,
};
pub use lister::{ClusterLister, Lister, NamespaceLister};

/// Cache lookup errors
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// No object stored under the requested key
    #[error("{resource} \"{name}\" not found")]
    NotFound { resource: String, name: String },

    /// The store itself failed
    #[error("cache store error: {0}")]
    Store(String),
}

impl CacheError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, CacheError::NotFound { .. })
    }
}
