//! Cluster-aware indexer
//!
//! Stores objects under their full composite key and maintains two secondary
//! indexes, by cluster and by cluster+namespace, as objects are added, updated
//! and deleted. Index entries are computed from the object alone.

use super::key::{cluster_and_namespace_index_func, cluster_index_func, IndexFunc, IndexKey};
use super::CacheError;
use kube::runtime::watcher;
use kube::Resource;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Name of the index partitioning objects by cluster
pub const CLUSTER_INDEX: &str = "cluster";

/// Name of the index partitioning objects by cluster and namespace
pub const CLUSTER_AND_NAMESPACE_INDEX: &str = "cluster-namespace";

struct Store<K> {
    items: BTreeMap<String, Arc<K>>,
    indices: HashMap<&'static str, HashMap<String, BTreeSet<String>>>,
}

impl<K> Store<K> {
    fn unindex(&mut self, indexers: &[(&'static str, IndexFunc<K>)], key: &str, obj: &K) {
        for (name, index_fn) in indexers {
            let Some(index) = self.indices.get_mut(name) else {
                continue;
            };
            for value in index_fn(obj) {
                if let Some(keys) = index.get_mut(&value) {
                    keys.remove(key);
                    if keys.is_empty() {
                        index.remove(&value);
                    }
                }
            }
        }
    }

    fn index(&mut self, indexers: &[(&'static str, IndexFunc<K>)], key: &str, obj: &K) {
        for (name, index_fn) in indexers {
            let index = self.indices.entry(*name).or_default();
            for value in index_fn(obj) {
                index.entry(value).or_default().insert(key.to_string());
            }
        }
    }
}

/// Thread-safe object store with cluster-aware secondary indexes
///
/// Reads return shared handles to the stored objects; no copy is made, so
/// callers must treat them as read-only.
pub struct ClusterIndexer<K> {
    resource: Arc<str>,
    indexers: Arc<[(&'static str, IndexFunc<K>)]>,
    store: Arc<RwLock<Store<K>>>,
    synced: Arc<AtomicBool>,
}

impl<K> Clone for ClusterIndexer<K> {
    fn clone(&self) -> Self {
        Self {
            resource: self.resource.clone(),
            indexers: self.indexers.clone(),
            store: self.store.clone(),
            synced: self.synced.clone(),
        }
    }
}

impl<K: Resource> ClusterIndexer<K> {
    /// Indexer maintaining the cluster and cluster+namespace indexes
    ///
    /// `resource` names the stored resource in not-found errors.
    pub fn new(resource: impl Into<String>) -> Self {
        Self::with_indexers(
            resource,
            vec![
                (CLUSTER_INDEX, cluster_index_func::<K> as IndexFunc<K>),
                (
                    CLUSTER_AND_NAMESPACE_INDEX,
                    cluster_and_namespace_index_func::<K> as IndexFunc<K>,
                ),
            ],
        )
    }

    pub fn with_indexers(
        resource: impl Into<String>,
        indexers: Vec<(&'static str, IndexFunc<K>)>,
    ) -> Self {
        let resource: String = resource.into();
        let indices = indexers
            .iter()
            .map(|(name, _)| (*name, HashMap::new()))
            .collect();
        Self {
            resource: Arc::from(resource),
            indexers: indexers.into(),
            store: Arc::new(RwLock::new(Store {
                items: BTreeMap::new(),
                indices,
            })),
            synced: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Whether an initial listing has been loaded
    pub fn has_synced(&self) -> bool {
        self.synced.load(Ordering::Acquire)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Store<K>>, CacheError> {
        self.store
            .read()
            .map_err(|_| CacheError::Store(format!("{} store lock poisoned", self.resource)))
    }

    fn write(&self) -> RwLockWriteGuard<'_, Store<K>> {
        // Mutations always finish their index bookkeeping, so a poisoned
        // guard still holds a consistent store
        self.store.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add or update an object
    pub fn add(&self, obj: K) {
        let key = IndexKey::for_object(&obj).to_string();
        let mut store = self.write();
        if let Some(old) = store.items.remove(&key) {
            store.unindex(&self.indexers, &key, &old);
        }
        store.index(&self.indexers, &key, &obj);
        store.items.insert(key, Arc::new(obj));
    }

    /// Remove an object
    pub fn delete(&self, obj: &K) {
        let key = IndexKey::for_object(obj).to_string();
        let mut store = self.write();
        if let Some(old) = store.items.remove(&key) {
            store.unindex(&self.indexers, &key, &old);
        }
    }

    /// Swap the whole content for `objects` and mark the indexer synced
    pub fn replace(&self, objects: impl IntoIterator<Item = K>) {
        let mut store = self.write();
        store.items.clear();
        for index in store.indices.values_mut() {
            index.clear();
        }
        for obj in objects {
            let key = IndexKey::for_object(&obj).to_string();
            if let Some(old) = store.items.remove(&key) {
                store.unindex(&self.indexers, &key, &old);
            }
            store.index(&self.indexers, &key, &obj);
            store.items.insert(key, Arc::new(obj));
        }
        drop(store);
        self.synced.store(true, Ordering::Release);
    }

    /// Exact lookup by full composite key
    pub fn get_by_key(&self, key: &IndexKey) -> Result<Option<Arc<K>>, CacheError> {
        let store = self.read()?;
        Ok(store.items.get(&key.to_string()).cloned())
    }

    /// Objects whose `index` value equals `key`
    pub fn by_index(&self, index: &str, key: &IndexKey) -> Result<Vec<Arc<K>>, CacheError> {
        let store = self.read()?;
        let partition = store
            .indices
            .get(index)
            .ok_or_else(|| CacheError::Store(format!("index {} does not exist", index)))?;

        Ok(partition
            .get(&key.to_string())
            .map(|keys| {
                keys.iter()
                    .filter_map(|k| store.items.get(k).cloned())
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Every stored object
    pub fn list(&self) -> Result<Vec<Arc<K>>, CacheError> {
        let store = self.read()?;
        Ok(store.items.values().cloned().collect())
    }

    pub fn len(&self) -> Result<usize, CacheError> {
        Ok(self.read()?.items.len())
    }

    pub fn is_empty(&self) -> Result<bool, CacheError> {
        Ok(self.read()?.items.is_empty())
    }
}

/// Applies watcher events to an indexer
///
/// Objects of an initial listing are buffered until the listing completes and
/// then replace the indexer content in one step.
pub struct IndexWriter<K> {
    indexer: ClusterIndexer<K>,
    buffer: Option<Vec<K>>,
}

impl<K: Resource> IndexWriter<K> {
    pub fn new(indexer: ClusterIndexer<K>) -> Self {
        Self {
            indexer,
            buffer: None,
        }
    }

    pub fn apply_watcher_event(&mut self, event: watcher::Event<K>) {
        match event {
            watcher::Event::Init => {
                self.buffer = Some(Vec::new());
            }
            watcher::Event::InitApply(obj) => {
                self.buffer.get_or_insert_with(Vec::new).push(obj);
            }
            watcher::Event::InitDone => {
                let objects = self.buffer.take().unwrap_or_default();
                tracing::debug!(
                    "{} initial listing complete: {} object(s)",
                    self.indexer.resource(),
                    objects.len()
                );
                self.indexer.replace(objects);
            }
            watcher::Event::Apply(obj) => self.indexer.add(obj),
            watcher::Event::Delete(obj) => self.indexer.delete(&obj),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CLUSTER_ANNOTATION;
    use k8s_openapi::api::core::v1::ConfigMap;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use std::collections::BTreeMap;

    fn cm(cluster: &str, namespace: &str, name: &str) -> ConfigMap {
        ConfigMap {
            metadata: ObjectMeta {
                name: Some(name.into()),
                namespace: Some(namespace.into()),
                annotations: Some(BTreeMap::from([(
                    CLUSTER_ANNOTATION.to_string(),
                    cluster.to_string(),
                )])),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn names(objects: &[Arc<ConfigMap>]) -> Vec<String> {
        objects
            .iter()
            .map(|o| o.metadata.name.clone().unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_add_indexes_both_partitions() {
        let indexer = ClusterIndexer::<ConfigMap>::new("configmaps");
        indexer.add(cm("c1", "ns1", "a"));
        indexer.add(cm("c1", "ns2", "b"));
        indexer.add(cm("c2", "ns1", "c"));

        let c1 = indexer
            .by_index(CLUSTER_INDEX, &IndexKey::cluster("c1"))
            .unwrap();
        assert_eq!(names(&c1), vec!["a", "b"]);

        let c1_ns1 = indexer
            .by_index(
                CLUSTER_AND_NAMESPACE_INDEX,
                &IndexKey::cluster_namespace("c1", "ns1"),
            )
            .unwrap();
        assert_eq!(names(&c1_ns1), vec!["a"]);
        assert_eq!(indexer.len().unwrap(), 3);
    }

    #[test]
    fn test_update_moves_index_entries() {
        let indexer = ClusterIndexer::<ConfigMap>::new("configmaps");
        indexer.add(cm("c1", "ns1", "a"));

        let mut updated = cm("c1", "ns1", "a");
        updated.data = Some(BTreeMap::from([("k".to_string(), "v".to_string())]));
        indexer.add(updated);

        let stored = indexer
            .get_by_key(&IndexKey::new("c1", "ns1", "a"))
            .unwrap()
            .unwrap();
        assert!(stored.data.is_some());
        assert_eq!(indexer.len().unwrap(), 1);
    }

    #[test]
    fn test_delete_clears_indexes() {
        let indexer = ClusterIndexer::<ConfigMap>::new("configmaps");
        indexer.add(cm("c1", "ns1", "a"));
        indexer.delete(&cm("c1", "ns1", "a"));

        assert!(indexer.is_empty().unwrap());
        assert!(indexer
            .by_index(CLUSTER_INDEX, &IndexKey::cluster("c1"))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_unknown_index_is_store_error() {
        let indexer = ClusterIndexer::<ConfigMap>::new("configmaps");
        let err = indexer
            .by_index("by-owner", &IndexKey::cluster("c1"))
            .unwrap_err();
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_poisoned_store_is_reported_by_every_read() {
        let indexer = ClusterIndexer::<ConfigMap>::new("configmaps");
        indexer.add(cm("c1", "ns1", "a"));

        let store = indexer.store.clone();
        let result = std::thread::spawn(move || {
            let _guard = store.write().unwrap();
            panic!("writer panicked");
        })
        .join();
        assert!(result.is_err());

        assert!(matches!(indexer.len(), Err(CacheError::Store(_))));
        assert!(matches!(indexer.is_empty(), Err(CacheError::Store(_))));
        assert!(indexer.list().is_err());
    }

    #[test]
    fn test_writer_replaces_on_initial_listing() {
        let indexer = ClusterIndexer::<ConfigMap>::new("configmaps");
        indexer.add(cm("c1", "ns1", "stale"));

        let mut writer = IndexWriter::new(indexer.clone());
        writer.apply_watcher_event(watcher::Event::Init);
        writer.apply_watcher_event(watcher::Event::InitApply(cm("c1", "ns1", "a")));
        assert!(!indexer.has_synced());
        // The initial listing is not visible until it completes
        assert_eq!(names(&indexer.list().unwrap()), vec!["stale"]);

        writer.apply_watcher_event(watcher::Event::InitDone);
        assert!(indexer.has_synced());
        assert_eq!(names(&indexer.list().unwrap()), vec!["a"]);

        writer.apply_watcher_event(watcher::Event::Apply(cm("c2", "ns1", "b")));
        writer.apply_watcher_event(watcher::Event::Delete(cm("c1", "ns1", "a")));
        assert_eq!(names(&indexer.list().unwrap()), vec!["b"]);
    }
}
